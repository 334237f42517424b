use core::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    verdict::{VerdictKind, verdict},
};

/// Default FAKE confidence at or above which an image is flagged.
pub const DEFAULT_THRESHOLD: f64 = 0.50;

/// Default half-width of the manual review band around the threshold.
pub const DEFAULT_GRAY_ZONE: f64 = 0.05;

pub const MAX_GRAY_ZONE: f64 = 0.30;

pub const THRESHOLD_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const GRAY_ZONE_RANGE: RangeInclusive<f64> = 0.0..=MAX_GRAY_ZONE;

/// Decision threshold and manual review band used for one analysis pass.
///
/// Deserialization applies the same range checks as [`TriageConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTriageConfig")]
pub struct TriageConfig {
    threshold: f64,
    gray_zone: f64,
}

#[derive(Deserialize)]
struct RawTriageConfig {
    #[serde(default = "default_threshold")]
    threshold: f64,
    #[serde(default = "default_gray_zone")]
    gray_zone: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_gray_zone() -> f64 {
    DEFAULT_GRAY_ZONE
}

impl TryFrom<RawTriageConfig> for TriageConfig {
    type Error = ConfigError;

    fn try_from(raw: RawTriageConfig) -> Result<Self, Self::Error> {
        Self::new(raw.threshold, raw.gray_zone)
    }
}

impl TriageConfig {
    pub fn new(threshold: f64, gray_zone: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold: validate_threshold(threshold)?,
            gray_zone: validate_gray_zone(gray_zone)?,
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        self.threshold = validate_threshold(threshold)?;
        Ok(self)
    }

    pub fn with_gray_zone(mut self, gray_zone: f64) -> Result<Self, ConfigError> {
        self.gray_zone = validate_gray_zone(gray_zone)?;
        Ok(self)
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn gray_zone(&self) -> f64 {
        self.gray_zone
    }

    /// Verdict for `fake` under this configuration.
    #[must_use]
    pub fn verdict(&self, fake: f64) -> VerdictKind {
        verdict(fake, self.threshold, self.gray_zone)
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            gray_zone: DEFAULT_GRAY_ZONE,
        }
    }
}

pub fn validate_threshold(threshold: f64) -> Result<f64, ConfigError> {
    if THRESHOLD_RANGE.contains(&threshold) {
        Ok(threshold)
    } else {
        Err(ConfigError::ThresholdOutOfRange(threshold))
    }
}

pub fn validate_gray_zone(gray_zone: f64) -> Result<f64, ConfigError> {
    if GRAY_ZONE_RANGE.contains(&gray_zone) {
        Ok(gray_zone)
    } else {
        Err(ConfigError::GrayZoneOutOfRange(gray_zone))
    }
}

#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Analyze one uploaded or captured image
    #[default]
    Single,
    /// Analyze many images and list them sorted
    Batch,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Batch => write!(f, "batch"),
        }
    }
}

/// Ordering applied to batch results.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Highest FAKE confidence first
    #[default]
    HighestFake,
    /// Lowest FAKE confidence first
    LowestFake,
    /// Filename A to Z, ignoring case
    FilenameAsc,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighestFake => write!(f, "highest-fake"),
            Self::LowestFake => write!(f, "lowest-fake"),
            Self::FilenameAsc => write!(f, "filename-asc"),
        }
    }
}
