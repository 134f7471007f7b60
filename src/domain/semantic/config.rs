//! Three-zone threshold configuration

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::DomainError;

pub const DEFAULT_HIGH_THRESHOLD: f32 = 0.70;
pub const DEFAULT_LOW_THRESHOLD: f32 = 0.30;
pub const DEFAULT_GRAY_ZONE_VERIFICATION: bool = true;

/// Similarity thresholds splitting scores into hit, gray zone and miss
///
/// Invariant: `low_threshold < high_threshold`, both in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    high_threshold: f32,
    low_threshold: f32,
    gray_zone_verification: bool,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            low_threshold: DEFAULT_LOW_THRESHOLD,
            gray_zone_verification: DEFAULT_GRAY_ZONE_VERIFICATION,
        }
    }
}

impl ThresholdConfig {
    /// Validate an explicit configuration
    pub fn try_new(
        high_threshold: f32,
        low_threshold: f32,
        gray_zone_verification: bool,
    ) -> Result<Self, DomainError> {
        for (name, value) in [("high", high_threshold), ("low", low_threshold)] {
            if !is_valid_threshold(value) {
                return Err(DomainError::configuration(format!(
                    "{} threshold {} is outside (0, 1]",
                    name, value
                )));
            }
        }

        if high_threshold <= low_threshold {
            return Err(DomainError::configuration(format!(
                "high threshold {} must be greater than low threshold {}",
                high_threshold, low_threshold
            )));
        }

        Ok(Self {
            high_threshold,
            low_threshold,
            gray_zone_verification,
        })
    }

    /// Build from optional raw inputs, recovering from invalid values
    ///
    /// Missing or out-of-range thresholds take their default individually.
    /// An ordering violation reverts both thresholds to the defaults.
    pub fn from_parts(
        high_threshold: Option<f32>,
        low_threshold: Option<f32>,
        gray_zone_verification: Option<bool>,
    ) -> Self {
        let high = high_threshold
            .filter(|v| is_valid_threshold(*v))
            .unwrap_or(DEFAULT_HIGH_THRESHOLD);
        let low = low_threshold
            .filter(|v| is_valid_threshold(*v))
            .unwrap_or(DEFAULT_LOW_THRESHOLD);
        let verify = gray_zone_verification.unwrap_or(DEFAULT_GRAY_ZONE_VERIFICATION);

        match Self::try_new(high, low, verify) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Invalid threshold configuration, using defaults");
                Self {
                    gray_zone_verification: verify,
                    ..Self::default()
                }
            }
        }
    }

    pub fn high_threshold(&self) -> f32 {
        self.high_threshold
    }

    pub fn low_threshold(&self) -> f32 {
        self.low_threshold
    }

    pub fn gray_zone_verification(&self) -> bool {
        self.gray_zone_verification
    }
}

fn is_valid_threshold(value: f32) -> bool {
    value > 0.0 && value <= 1.0
}
