//! Deadline for slow classifier calls.
//!
//! Inference runs on a tokio blocking thread while the caller waits up to a
//! fixed duration. One-time setup ([`Classifier::prepare`]) runs before the
//! clock starts. A call that misses the deadline is reported as
//! [`AdapterError::Timeout`]; the abandoned inference keeps running in the
//! background until it returns, and is not waited for when the wrapper is dropped.

use std::{io, sync::Arc, time::Duration};

use image::DynamicImage;
use tokio::{runtime::Runtime, time::timeout};

use crate::{
    classifier::{ClassificationResult, Classifier},
    error::AdapterError,
};

/// Wraps a classifier so each call fails once `limit` has elapsed.
pub struct Deadline<C> {
    inner: Arc<C>,
    limit: Duration,
    runtime: Option<Runtime>,
}

impl<C> Deadline<C> {
    pub fn new(inner: C, limit: Duration) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .thread_name("is-it-fake-deadline")
            .build()?;
        Ok(Self {
            inner: Arc::new(inner),
            limit,
            runtime: Some(runtime),
        })
    }

    #[must_use]
    pub fn limit(&self) -> Duration {
        self.limit
    }

    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C> Classifier for Deadline<C>
where
    C: Classifier + Send + Sync + 'static,
{
    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassificationResult>, AdapterError> {
        self.inner.prepare()?;

        let runtime = self.runtime.as_ref().ok_or_else(|| {
            AdapterError::Unavailable("timeout runtime shut down".to_string())
        })?;
        let inner = Arc::clone(&self.inner);
        let image = image.clone();
        let limit = self.limit;

        runtime.block_on(async move {
            let task = tokio::task::spawn_blocking(move || inner.classify(&image));
            match timeout(limit, task).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_err)) => Err(AdapterError::Inference(format!(
                    "classifier task failed: {join_err}"
                ))),
                Err(_) => {
                    let millis = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    tracing::error!(millis, "classification timed out");
                    Err(AdapterError::Timeout { millis })
                }
            }
        })
    }

    fn prepare(&self) -> Result<(), AdapterError> {
        self.inner.prepare()
    }
}

impl<C> Drop for Deadline<C> {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
