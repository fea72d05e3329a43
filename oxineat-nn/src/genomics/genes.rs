use crate::genomics::GeneticConfig;
use crate::Innovation;

use rand::{distributions::Uniform, Rng};
use serde::{Deserialize, Serialize};

use std::fmt;

/// A link gene: a weighted connection between two nodes,
/// identified across the population by its innovation number.
///
/// Genes are what [`genetic_distance`] aligns, so a disabled
/// gene still counts as matched, disjoint or excess even though
/// its connection is not expressed.
///
/// [`genetic_distance`]: oxineat::Genome::genetic_distance
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Gene {
    innovation: Innovation,
    input: Innovation,
    output: Innovation,
    weight: f32,
    enabled: bool,
}

impl Gene {
    /// Returns an enabled gene from `input` to `output`.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::Gene;
    ///
    /// let gene = Gene::new(42, 3, 9, 2.0);
    /// assert!(gene.enabled());
    /// assert_eq!(gene.endpoints(), (3, 9));
    /// ```
    pub fn new(innovation: Innovation, input: Innovation, output: Innovation, weight: f32) -> Gene {
        Gene {
            innovation,
            input,
            output,
            weight,
            enabled: true,
        }
    }

    /// Samples a weight uniformly from ±`weight_bound`.
    pub(super) fn random_weight(config: &GeneticConfig) -> f32 {
        sample_symmetric(config.weight_bound)
    }

    /// Replaces the weight with one sampled uniformly
    /// from ±[`weight_bound`].
    ///
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    pub fn randomize_weight(&mut self, config: &GeneticConfig) {
        self.weight = Self::random_weight(config);
    }

    /// Perturbs the weight by up to ±[`weight_mutation_power`],
    /// then clamps it to ±[`weight_bound`].
    ///
    /// [`weight_mutation_power`]: crate::genomics::GeneticConfig::weight_mutation_power
    /// [`weight_bound`]: crate::genomics::GeneticConfig::weight_bound
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{Gene, GeneticConfig};
    ///
    /// let config = GeneticConfig {
    ///     weight_mutation_power: 2.5,
    ///     weight_bound: 4.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut gene = Gene::new(0, 0, 1, 3.0);
    /// gene.nudge_weight(&config);
    ///
    /// assert!(gene.weight() >= 0.5 && gene.weight() <= 4.0);
    /// ```
    pub fn nudge_weight(&mut self, config: &GeneticConfig) {
        self.weight = (self.weight + sample_symmetric(config.weight_mutation_power))
            .clamp(-config.weight_bound, config.weight_bound);
    }

    pub fn innovation(&self) -> Innovation {
        self.innovation
    }

    pub fn input(&self) -> Innovation {
        self.input
    }

    pub fn output(&self) -> Innovation {
        self.output
    }

    /// Returns `(input, output)`, the pair that identifies
    /// the gene in the innovation [`History`].
    ///
    /// [`History`]: crate::genomics::History
    pub fn endpoints(&self) -> (Innovation, Innovation) {
        (self.input, self.output)
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    /// Whether the gene's connection is expressed.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

// Degenerate ranges yield 0.
fn sample_symmetric(bound: f32) -> f32 {
    if bound > 0.0 {
        rand::thread_rng().sample(Uniform::new_inclusive(-bound, bound))
    } else {
        0.0
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {}->{} ({:+.3})",
            self.innovation, self.input, self.output, self.weight
        )?;
        if !self.enabled {
            write!(f, " off")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nudge_clamps_to_bound() {
        let config = GeneticConfig {
            weight_bound: 1.0,
            weight_mutation_power: 0.5,
            ..GeneticConfig::zero()
        };
        let mut gene = Gene::new(0, 0, 1, 1.0);
        for _ in 0..100 {
            gene.nudge_weight(&config);
            assert!(gene.weight().abs() <= 1.0);
        }
    }

    #[test]
    fn zero_bounds_give_zero_weights() {
        let mut gene = Gene::new(0, 0, 1, 3.0);
        gene.nudge_weight(&GeneticConfig {
            weight_bound: 5.0,
            ..GeneticConfig::zero()
        });
        assert_eq!(gene.weight(), 3.0);

        gene.randomize_weight(&GeneticConfig::zero());
        assert_eq!(gene.weight(), 0.0);
    }

    #[test]
    fn display_marks_disabled_genes() {
        let mut gene = Gene::new(7, 0, 1, 0.5);
        assert_eq!(gene.to_string(), "#7 0->1 (+0.500)");
        gene.set_enabled(false);
        assert_eq!(gene.to_string(), "#7 0->1 (+0.500) off");
    }
}
