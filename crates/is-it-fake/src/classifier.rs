use std::sync::Arc;

use image::DynamicImage;
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::error::AdapterError;

/// A single (label, confidence) pair returned by a classifier.
///
/// Labels are canonicalized to uppercase so `"fake"`, `"Fake"` and `"FAKE"`
/// all compare equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    label: String,
    score: f64,
}

impl ClassificationResult {
    pub fn new(label: impl AsRef<str>, score: f64) -> Self {
        Self {
            label: label.as_ref().to_uppercase(),
            score,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }
}

impl<S: AsRef<str>> From<(S, f64)> for ClassificationResult {
    fn from((label, score): (S, f64)) -> Self {
        Self::new(label, score)
    }
}

/// An image classification service.
///
/// Implementations return one entry per label they know about, in whatever
/// order the service yields them. Scores are expected in `[0, 1]` but are not
/// required to sum to one.
pub trait Classifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassificationResult>, AdapterError>;

    /// Finish any one-time setup, such as loading a model, before the first call.
    ///
    /// Wrappers that bound the duration of [`Classifier::classify`] call this
    /// first so setup does not count against the limit.
    fn prepare(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassificationResult>, AdapterError> {
        (**self).classify(image)
    }
    fn prepare(&self) -> Result<(), AdapterError> {
        (**self).prepare()
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassificationResult>, AdapterError> {
        (**self).classify(image)
    }
    fn prepare(&self) -> Result<(), AdapterError> {
        (**self).prepare()
    }
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassificationResult>, AdapterError> {
        (**self).classify(image)
    }
    fn prepare(&self) -> Result<(), AdapterError> {
        (**self).prepare()
    }
}

/// Builds the wrapped classifier on first use and reuses it afterwards.
///
/// Construction runs at most once successfully. A failed construction is not
/// cached: the error is returned to the caller and the next call tries again.
pub struct LazyClassifier<C, F = fn() -> Result<C, AdapterError>> {
    cell: OnceCell<C>,
    init: F,
}

impl<C, F> LazyClassifier<C, F>
where
    F: Fn() -> Result<C, AdapterError>,
{
    pub fn new(init: F) -> Self {
        Self {
            cell: OnceCell::new(),
            init,
        }
    }

    /// Get the classifier, constructing it if this is the first call.
    pub fn get(&self) -> Result<&C, AdapterError> {
        self.cell.get_or_try_init(|| {
            tracing::info!("initializing classifier");
            (self.init)().inspect_err(|err| {
                tracing::error!(error = %err, "classifier initialization failed");
            })
        })
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<C, F> Classifier for LazyClassifier<C, F>
where
    C: Classifier,
    F: Fn() -> Result<C, AdapterError>,
{
    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassificationResult>, AdapterError> {
        self.get()?.classify(image)
    }

    fn prepare(&self) -> Result<(), AdapterError> {
        self.get()?.prepare()
    }
}
