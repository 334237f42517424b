use core::fmt;

use serde::{Deserialize, Serialize};

/// Three-way triage outcome for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    AiGenerated,
    LikelyReal,
    ManualReview,
}

impl VerdictKind {
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::AiGenerated => "🛑",
            Self::LikelyReal => "✅",
            Self::ManualReview => "⚠️",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AiGenerated => "AI generated (FAKE)",
            Self::LikelyReal => "Likely real",
            Self::ManualReview => "Manual review",
        }
    }

    /// Returns true if this verdict needs a human to look at the image
    #[must_use]
    pub fn needs_review(&self) -> bool {
        matches!(self, Self::ManualReview)
    }
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.label())
    }
}

/// Map a FAKE confidence to a verdict.
///
/// The manual review band `[threshold - gray_zone, threshold + gray_zone]` is
/// checked first and is inclusive on both ends, so `fake == threshold` is
/// always [`VerdictKind::ManualReview`], even with a zero-width band.
/// Outside the band, `fake >= threshold` is AI generated and anything lower
/// is likely real.
#[inline]
#[must_use]
pub fn verdict(fake: f64, threshold: f64, gray_zone: f64) -> VerdictKind {
    if (fake - threshold).abs() <= gray_zone {
        VerdictKind::ManualReview
    } else if fake >= threshold {
        VerdictKind::AiGenerated
    } else {
        VerdictKind::LikelyReal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(verdict(0.50, 0.50, 0.05), VerdictKind::ManualReview);
        assert_eq!(verdict(0.56, 0.50, 0.05), VerdictKind::AiGenerated);
        assert_eq!(verdict(0.44, 0.50, 0.05), VerdictKind::LikelyReal);
        assert_eq!(verdict(0.30, 0.50, 0.05), VerdictKind::LikelyReal);
        assert_eq!(verdict(0.99, 0.50, 0.05), VerdictKind::AiGenerated);
        assert_eq!(verdict(0.52, 0.50, 0.05), VerdictKind::ManualReview);
        assert_eq!(verdict(0.48, 0.50, 0.05), VerdictKind::ManualReview);
    }

    #[test]
    fn test_zero_gray_zone() {
        assert_eq!(verdict(0.50, 0.50, 0.0), VerdictKind::ManualReview);
        assert_eq!(verdict(0.500_000_01, 0.50, 0.0), VerdictKind::AiGenerated);
        assert_eq!(verdict(0.499_999_99, 0.50, 0.0), VerdictKind::LikelyReal);
    }

    #[test]
    fn test_band_beyond_unit_interval() {
        assert_eq!(verdict(1.0, 0.9, 0.3), VerdictKind::ManualReview);
        assert_eq!(verdict(0.0, 0.1, 0.3), VerdictKind::ManualReview);
        assert_eq!(verdict(0.0, 1.0, 0.3), VerdictKind::LikelyReal);
    }

    #[test]
    fn test_manual_review_iff_within_band() {
        for t in 0..=20 {
            let threshold = f64::from(t) / 20.0;
            for g in 0..=6 {
                let gray_zone = f64::from(g) / 20.0;
                for f in 0..=100 {
                    let fake = f64::from(f) / 100.0;
                    let kind = verdict(fake, threshold, gray_zone);
                    let within = (fake - threshold).abs() <= gray_zone;
                    assert_eq!(kind == VerdictKind::ManualReview, within);
                    if !within {
                        let expected = if fake >= threshold {
                            VerdictKind::AiGenerated
                        } else {
                            VerdictKind::LikelyReal
                        };
                        assert_eq!(kind, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(verdict(0.61, 0.4, 0.1), verdict(0.61, 0.4, 0.1));
    }

    #[test]
    fn test_display() {
        assert_eq!(VerdictKind::AiGenerated.to_string(), "🛑 AI generated (FAKE)");
        assert_eq!(VerdictKind::LikelyReal.to_string(), "✅ Likely real");
        assert_eq!(VerdictKind::ManualReview.to_string(), "⚠️ Manual review");
        assert!(VerdictKind::ManualReview.needs_review());
        assert!(!VerdictKind::AiGenerated.needs_review());
    }
}
