//! Configuration management for the ego-splitter

use serde::Serialize;

use crate::error::{Error, Result};

/// Tuning knobs of an ego-splitting session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitterConfig {
    /// Clustering resolution, forwarded unchanged to the oracle
    pub resolution: f64,

    /// Node count at which egonets are decomposed on the rayon pool
    pub parallel_threshold: usize,

    /// Smallest community written out by the results writer
    pub min_community_size: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            parallel_threshold: 1000,
            min_community_size: 1,
        }
    }
}

impl SplitterConfig {
    /// Create a new configuration with custom values
    pub fn new(resolution: f64, parallel_threshold: usize, min_community_size: usize) -> Self {
        Self {
            resolution,
            parallel_threshold,
            min_community_size,
        }
    }

    /// Default configuration with a different resolution
    pub fn with_resolution(resolution: f64) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution < 0.0 {
            return Err(Error::InvalidParameter {
                name: "resolution",
                message: format!("must be a finite value >= 0, got {}", self.resolution),
            });
        }
        if self.parallel_threshold == 0 {
            return Err(Error::InvalidParameter {
                name: "parallel_threshold",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SplitterConfig::default();
        assert_eq!(config.resolution, 1.0);
        assert!(config.validate().is_ok());
        assert_eq!(SplitterConfig::with_resolution(0.5).resolution, 0.5);
    }

    #[test]
    fn test_validate() {
        assert!(SplitterConfig::with_resolution(-1.0).validate().is_err());
        assert!(SplitterConfig::with_resolution(f64::NAN).validate().is_err());
        assert!(SplitterConfig::new(1.0, 0, 1).validate().is_err());
    }
}
