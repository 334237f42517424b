use image::DynamicImage;
use is_it_fake_preprocessing::decode_image;
use serde::Serialize;

use crate::{
    classifier::{ClassificationResult, Classifier},
    config::TriageConfig,
    error::{AdapterError, AnalysisError},
    scores::{ScoreMap, to_score_map},
    verdict::VerdictKind,
};

/// Scores and verdict for one successfully classified image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    scores: ScoreMap,
    verdict: VerdictKind,
    raw: Vec<ClassificationResult>,
}

impl Analysis {
    #[must_use]
    pub fn scores(&self) -> ScoreMap {
        self.scores
    }

    #[must_use]
    pub fn fake_score(&self) -> f64 {
        self.scores.fake()
    }

    #[must_use]
    pub fn real_score(&self) -> f64 {
        self.scores.real()
    }

    #[must_use]
    pub fn verdict(&self) -> VerdictKind {
        self.verdict
    }

    /// The classifier response exactly as returned.
    #[must_use]
    pub fn raw(&self) -> &[ClassificationResult] {
        &self.raw
    }

    pub(crate) fn into_raw(self) -> Vec<ClassificationResult> {
        self.raw
    }
}

/// Classify an already decoded image and derive its verdict.
///
/// A NaN or infinite REAL/FAKE score is rejected as
/// [`AdapterError::InvalidOutput`] rather than given a verdict.
pub fn analyze_one<C: Classifier + ?Sized>(
    classifier: &C,
    image: &DynamicImage,
    config: &TriageConfig,
) -> Result<Analysis, AdapterError> {
    let raw = classifier.classify(image)?;
    let scores = to_score_map(&raw);
    if !scores.is_finite() {
        return Err(AdapterError::InvalidOutput(format!(
            "non-finite score (REAL={}, FAKE={})",
            scores.real(),
            scores.fake()
        )));
    }
    let verdict = config.verdict(scores.fake());
    tracing::debug!(
        fake = scores.fake(),
        real = scores.real(),
        verdict = ?verdict,
        "classified image"
    );
    Ok(Analysis {
        scores,
        verdict,
        raw,
    })
}

/// Decode `bytes` and analyze the result, returning the decoded image too.
pub fn analyze_bytes<C: Classifier + ?Sized>(
    classifier: &C,
    bytes: &[u8],
    config: &TriageConfig,
) -> Result<(DynamicImage, Analysis), AnalysisError> {
    let image = decode_image(bytes)?;
    let analysis = analyze_one(classifier, &image, config)?;
    Ok((image, analysis))
}
