use std::env;

use crate::error::{Result, SptmError};
use crate::topics::conditional::Accumulation;
use crate::topics::distance::DistanceMeasure;

/// Output scaling applied to each normalized conditional-probability row.
/// Carried over from the topic count of the corpus the format was built for.
pub const DEFAULT_SCALE: f64 = 65.0;

/// Central configuration, created once at startup and passed by reference.
///
/// Values come from environment variables (a .env file is loaded first by
/// the binary via dotenvy). Command-line flags override them afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Multiplier applied after dividing a row by its topic mass (SPTM_SCALE)
    pub scale: f64,
    /// How the per-topic normalizing mass is accumulated (SPTM_ACCUMULATION)
    pub accumulation: Accumulation,
    /// Keep going when doc-topic rows have the wrong width, marking them
    /// unusable instead of failing (SPTM_ALLOW_PARTIAL)
    pub allow_partial: bool,
    /// Distance measure between topic-word distributions (SPTM_MEASURE)
    pub measure: DistanceMeasure,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            accumulation: Accumulation::Literal,
            allow_partial: false,
            measure: DistanceMeasure::Hellinger,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional. A variable that is set but can't be
    /// interpreted is an error rather than a silent fallback to the default.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let scale = match env::var("SPTM_SCALE") {
            Ok(raw) => parse_scale(&raw)?,
            Err(_) => defaults.scale,
        };

        let accumulation = match env::var("SPTM_ACCUMULATION") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.accumulation,
        };

        let allow_partial = match env::var("SPTM_ALLOW_PARTIAL") {
            Ok(raw) => parse_flag(&raw)?,
            Err(_) => defaults.allow_partial,
        };

        let measure = match env::var("SPTM_MEASURE") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.measure,
        };

        Ok(Self {
            scale,
            accumulation,
            allow_partial,
            measure,
        })
    }

    /// Check that the settings make sense together.
    /// Call this after applying command-line overrides.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(SptmError::Config(format!(
                "scale must be a positive finite number, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Parse a scale factor from text.
pub fn parse_scale(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| SptmError::Config(format!("SPTM_SCALE is not a number: {raw:?}")))
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SptmError::Config(format!(
            "SPTM_ALLOW_PARTIAL must be true or false, got {other:?}"
        ))),
    }
}
