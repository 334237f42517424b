use serde::Serialize;

use crate::classifier::ClassificationResult;

pub const REAL_LABEL: &str = "REAL";
pub const FAKE_LABEL: &str = "FAKE";

/// How far REAL + FAKE may drift from 1.0 before it is logged.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-3;

/// REAL and FAKE confidences pulled out of a classifier response.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreMap {
    real: f64,
    fake: f64,
}

impl ScoreMap {
    #[must_use]
    pub fn new(real: f64, fake: f64) -> Self {
        Self { real, fake }
    }

    #[must_use]
    pub fn real(&self) -> f64 {
        self.real
    }

    #[must_use]
    pub fn fake(&self) -> f64 {
        self.fake
    }

    /// Score for `label` (case-insensitive); anything but REAL/FAKE is 0.0.
    #[must_use]
    pub fn get(&self, label: &str) -> f64 {
        if label.eq_ignore_ascii_case(REAL_LABEL) {
            self.real
        } else if label.eq_ignore_ascii_case(FAKE_LABEL) {
            self.fake
        } else {
            0.0
        }
    }

    /// True if neither score is NaN or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.real.is_finite() && self.fake.is_finite()
    }

    /// True if REAL + FAKE is within [`NORMALIZATION_TOLERANCE`] of 1.0.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        (self.real + self.fake - 1.0).abs() <= NORMALIZATION_TOLERANCE
    }
}

/// Collapse a classifier response into REAL/FAKE scores.
///
/// Never fails. Labels match case-insensitively, unknown labels are ignored,
/// a missing label scores 0.0 and a repeated label keeps its last score.
/// Responses whose scores do not sum to one are logged but used as-is.
#[must_use]
pub fn to_score_map(results: &[ClassificationResult]) -> ScoreMap {
    let mut scores = ScoreMap::default();
    for result in results {
        match result.label() {
            label if label.eq_ignore_ascii_case(REAL_LABEL) => scores.real = result.score(),
            label if label.eq_ignore_ascii_case(FAKE_LABEL) => scores.fake = result.score(),
            label => tracing::trace!(label, "ignoring unknown label"),
        }
    }

    if !scores.is_finite() {
        tracing::warn!(
            real = scores.real,
            fake = scores.fake,
            "classifier returned a non-finite score"
        );
    } else if !results.is_empty() && !scores.is_normalized() {
        tracing::warn!(
            real = scores.real,
            fake = scores.fake,
            "classifier scores do not sum to 1.0"
        );
    }
    scores
}

impl From<&[ClassificationResult]> for ScoreMap {
    fn from(results: &[ClassificationResult]) -> Self {
        to_score_map(results)
    }
}
