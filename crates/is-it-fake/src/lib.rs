//! # is-it-fake
//!
//! Triage images as REAL or AI generated (FAKE).
//!
//! A [`Classifier`] scores each image, the scores are collapsed into a
//! [`ScoreMap`], and [`verdict`] turns the FAKE confidence into one of three
//! outcomes using a decision threshold and a symmetric manual review band
//! around it. Batches are processed image by image with each failure kept in
//! its own [`AnalysisRecord`].
//!
//! ## Quick Start
//!
//! ```rust
//! use image::{DynamicImage, RgbImage};
//! use is_it_fake::{AdapterError, ClassificationResult, Classifier, Detector, VerdictKind};
//!
//! struct AlwaysFake;
//!
//! impl Classifier for AlwaysFake {
//!     fn classify(&self, _: &DynamicImage) -> Result<Vec<ClassificationResult>, AdapterError> {
//!         Ok(vec![("FAKE", 0.97).into(), ("REAL", 0.03).into()])
//!     }
//! }
//!
//! let detector = Detector::new(AlwaysFake).with_threshold(0.6)?;
//! let image = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
//! let analysis = detector.analyze(&image)?;
//! assert_eq!(analysis.verdict(), VerdictKind::AiGenerated);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Batch Processing
//!
//! ```rust,ignore
//! use is_it_fake::{Detector, ImageInput, SortKey, sort_records};
//!
//! let detector = Detector::new(classifier);
//! let mut records = detector.analyze_batch(vec![
//!     ImageInput::from_path("a.png")?,
//!     ImageInput::from_path("b.jpg")?,
//! ]);
//! sort_records(&mut records, SortKey::HighestFake);
//! ```
//!
//! With the `onnx` feature, [`model::OnnxClassifier`] runs a Hugging Face
//! image-classification export through ONNX Runtime.

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "onnx")]
pub mod model;

mod batch;
mod classifier;
mod config;
mod error;
pub mod logging;
mod pipeline;
mod scores;
mod timeout;
mod verdict;

use image::DynamicImage;

pub use batch::{AnalysisRecord, ImageInput, Outcome, analyze_batch, analyze_input, sort_records};
pub use classifier::{ClassificationResult, Classifier, LazyClassifier};
pub use config::{
    DEFAULT_GRAY_ZONE, DEFAULT_THRESHOLD, MAX_GRAY_ZONE, Mode, SortKey, TriageConfig,
};
pub use error::{AdapterError, AnalysisError, ConfigError, DecodeError, ErrorKind};
pub use pipeline::{Analysis, analyze_bytes, analyze_one};
pub use scores::{FAKE_LABEL, REAL_LABEL, ScoreMap, to_score_map};
pub use timeout::Deadline;
pub use verdict::{VerdictKind, verdict};

/// A classifier paired with the threshold and manual review band to apply.
///
/// Use `Detector::new(classifier)` for the default configuration, then chain
/// `.with_threshold()` / `.with_gray_zone()` to adjust it.
pub struct Detector<C> {
    classifier: C,
    config: TriageConfig,
}

impl<C: Classifier> Detector<C> {
    /// Create a detector with the default threshold and gray zone.
    #[must_use]
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            config: TriageConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TriageConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the FAKE confidence at or above which images are flagged.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        self.config = self.config.with_threshold(threshold)?;
        Ok(self)
    }

    /// Set the half-width of the manual review band.
    pub fn with_gray_zone(mut self, gray_zone: f64) -> Result<Self, ConfigError> {
        self.config = self.config.with_gray_zone(gray_zone)?;
        Ok(self)
    }

    #[must_use]
    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Analyze a decoded image.
    pub fn analyze(&self, image: &DynamicImage) -> Result<Analysis, AdapterError> {
        analyze_one(&self.classifier, image, &self.config)
    }

    /// Decode and analyze raw image bytes.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<(DynamicImage, Analysis), AnalysisError> {
        analyze_bytes(&self.classifier, bytes, &self.config)
    }

    /// Analyze each input independently, one record per input.
    pub fn analyze_batch<I>(&self, images: I) -> Vec<AnalysisRecord>
    where
        I: IntoIterator<Item = ImageInput>,
    {
        analyze_batch(&self.classifier, images, &self.config)
    }
}
