use crate::errors::ConfigError;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Inclusive range of desired species counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCountBand {
    pub min: usize,
    pub max: usize,
}

impl SpeciesCountBand {
    /// Whether `count` lies within the band.
    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// Configuration data for population generation
/// and speciation.
///
/// Call [`validate`] (done by [`Population::new`])
/// before running any generation.
///
/// [`validate`]: PopulationConfig::validate
/// [`Population::new`]: crate::Population::new
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Size of the population.
    pub size: NonZeroUsize,
    /// Initial genetic distance threshold, beyond which
    /// genomes are considered as belonging to
    /// different species.
    pub distance_threshold: f32,
    /// Desired number of species. The distance threshold
    /// is adjusted every generation the species count
    /// falls outside of this band.
    pub target_species: SpeciesCountBand,
    /// Amount by which the distance threshold is
    /// raised or lowered.
    pub threshold_step: f32,
    /// Lower bound on the distance threshold.
    pub min_threshold: f32,
    /// Number of generations without a fitness increase
    /// a species may go through before being pruned.
    pub stagnation_limit: usize,
    /// Whether the distances from a genome to every
    /// species are computed in parallel.
    pub parallel_assignment: bool,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, empty, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value does not pass [`validate`], as the
    /// distance threshold must be positive. It is meant
    /// as a way to abbreviate configuration instantiation.
    ///
    /// [`validate`]: PopulationConfig::validate
    ///
    /// # Examples
    /// ```
    /// use oxineat::PopulationConfig;
    ///
    /// let config = PopulationConfig {
    ///     distance_threshold: 3.0,
    ///     min_threshold: 0.3,
    ///     ..PopulationConfig::zero()
    /// };
    ///
    /// assert!(config.validate().is_ok());
    /// assert!(PopulationConfig::zero().validate().is_err());
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 1 is non-zero.
            size: unsafe { NonZeroUsize::new_unchecked(1) },
            distance_threshold: 0.0,
            target_species: SpeciesCountBand { min: 0, max: usize::MAX },
            threshold_step: 0.0,
            min_threshold: 0.0,
            stagnation_limit: 0,
            parallel_assignment: false,
        }
    }

    /// Checks the configuration for values that would
    /// make speciation ill-defined.
    ///
    /// # Errors
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(ConfigError::NonPositiveThreshold(self.distance_threshold));
        }
        if !(self.min_threshold > 0.0 && self.min_threshold <= self.distance_threshold) {
            return Err(ConfigError::InvalidMinimumThreshold(self.min_threshold));
        }
        if !self.threshold_step.is_finite() || self.threshold_step < 0.0 {
            return Err(ConfigError::InvalidThresholdStep(self.threshold_step));
        }
        if self.target_species.min > self.target_species.max {
            return Err(ConfigError::InvertedSpeciesBand {
                min: self.target_species.min,
                max: self.target_species.max,
            });
        }
        Ok(())
    }
}

impl Default for PopulationConfig {
    fn default() -> PopulationConfig {
        PopulationConfig {
            // SAFETY: 150 is a valid NonZeroUsize.
            size: unsafe { NonZeroUsize::new_unchecked(150) },
            distance_threshold: 3.0,
            target_species: SpeciesCountBand { min: 5, max: 15 },
            threshold_step: 0.3,
            min_threshold: 0.3,
            stagnation_limit: 15,
            parallel_assignment: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(PopulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_invalid_values() {
        let base = PopulationConfig::default();
        let cases = [
            (
                PopulationConfig {
                    distance_threshold: -1.0,
                    ..base.clone()
                },
                ConfigError::NonPositiveThreshold(-1.0),
            ),
            (
                PopulationConfig {
                    min_threshold: 0.0,
                    ..base.clone()
                },
                ConfigError::InvalidMinimumThreshold(0.0),
            ),
            (
                PopulationConfig {
                    min_threshold: 4.0,
                    ..base.clone()
                },
                ConfigError::InvalidMinimumThreshold(4.0),
            ),
            (
                PopulationConfig {
                    threshold_step: -0.1,
                    ..base.clone()
                },
                ConfigError::InvalidThresholdStep(-0.1),
            ),
            (
                PopulationConfig {
                    target_species: SpeciesCountBand { min: 8, max: 2 },
                    ..base.clone()
                },
                ConfigError::InvertedSpeciesBand { min: 8, max: 2 },
            ),
        ];
        for (config, error) in cases {
            assert_eq!(config.validate(), Err(error));
        }
    }

    #[test]
    fn band_is_inclusive() {
        let band = SpeciesCountBand { min: 2, max: 4 };
        assert!(!band.contains(1));
        assert!(band.contains(2));
        assert!(band.contains(4));
        assert!(!band.contains(5));
    }
}
