//! ONNX Runtime backed classifier for Hugging Face image-classification exports.
//!
//! A model directory holds `model.onnx` and, optionally, the `config.json`
//! (`id2label`) and `preprocessor_config.json` written by the export.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Mutex,
};

use image::DynamicImage;
use is_it_fake_preprocessing::{PreprocessorParams, to_input_array};
use ort::session::{Session, builder::GraphOptimizationLevel};

mod artifacts;
mod inference;

pub use artifacts::{CONFIG_FILENAME, DEFAULT_LABELS, MODEL_FILENAME, PREPROCESSOR_FILENAME};

use crate::{
    classifier::{ClassificationResult, Classifier},
    error::AdapterError,
};

/// Intra-op threads used when the caller does not choose.
pub const DEFAULT_INTRA_THREADS: usize = 4;

fn unavailable(err: impl fmt::Display) -> AdapterError {
    AdapterError::Unavailable(err.to_string())
}

pub struct OnnxClassifier {
    session: Mutex<Session>,
    labels: Vec<String>,
    params: PreprocessorParams,
    model_path: PathBuf,
}

impl OnnxClassifier {
    /// Load the model and its label/preprocessing configuration from `model_dir`.
    pub fn load(model_dir: impl AsRef<Path>, intra_threads: usize) -> Result<Self, AdapterError> {
        let model_dir = model_dir.as_ref();
        let model_path = model_dir.join(MODEL_FILENAME);
        if !model_path.is_file() {
            return Err(AdapterError::Unavailable(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }

        let labels = artifacts::load_labels(model_dir)?;
        let params = artifacts::load_preprocessor(model_dir)?;

        let session = Session::builder()
            .map_err(unavailable)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(unavailable)?
            .with_intra_threads(intra_threads)
            .map_err(unavailable)?
            .commit_from_file(&model_path)
            .map_err(|err| {
                AdapterError::Unavailable(format!(
                    "failed to load {}: {err}",
                    model_path.display()
                ))
            })?;

        tracing::info!(
            model = %model_path.display(),
            labels = ?labels,
            intra_threads,
            "loaded ONNX classifier"
        );
        Ok(Self {
            session: Mutex::new(session),
            labels,
            params,
            model_path,
        })
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn params(&self) -> &PreprocessorParams {
        &self.params
    }

    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassificationResult>, AdapterError> {
        let input = to_input_array(image, &self.params);
        let logits = {
            let mut session = self.session.lock().map_err(|_| {
                AdapterError::Unavailable("model session lock poisoned".to_string())
            })?;
            inference::run_inference(&mut session, input)
                .map_err(|err| AdapterError::Inference(err.to_string()))?
        };
        inference::rank(&self.labels, &inference::softmax(&logits))
    }
}
