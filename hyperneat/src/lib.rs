//! # HyperNEAT
//! Genomes for evolving compositional pattern-producing networks
//! (CPPNs), the indirect encoding used by HyperNEAT.
//!
//! A [`HyperNeatGenome`] is an [`NNGenome`] whose hidden nodes
//! draw their activation functions from the CPPN set, so it
//! speciates and mutates exactly like a plain NEAT genome.
//!
//! [`NNGenome`]: oxineat_nn::genomics::NNGenome
//!
//! # Examples
//! ```
//! use hyperneat::{cppn_config, HyperNeatGenome};
//! use oxineat::{Population, PopulationConfig};
//! use oxineat_nn::genomics::GeneticConfig;
//! use std::num::NonZeroUsize;
//!
//! // Queries are (x1, y1, x2, y2), answers a connection weight.
//! let config = cppn_config(
//!     GeneticConfig {
//!         input_count: NonZeroUsize::new(4).unwrap(),
//!         ..GeneticConfig::default()
//!     },
//!     0.5,
//! );
//!
//! let mut population = Population::<_, _, HyperNeatGenome>::new(
//!     PopulationConfig::default(),
//!     config,
//! )
//! .unwrap();
//! population.speciate().unwrap();
//! ```

use oxineat::{Genome, IntegrityError};
use oxineat_nn::genomics::{ActivationType, GeneticConfig, GeneticConfigError, History, NNGenome};
use serde::{Deserialize, Serialize};

use std::ops::Deref;

/// Activation functions available to CPPN hidden nodes,
/// with their relative selection weights.
pub const CPPN_ACTIVATIONS: [(ActivationType, f32); 4] = [
    (ActivationType::ClippedLinear, 0.25),
    (ActivationType::BipolarSteepenedSigmoid, 0.25),
    (ActivationType::Gaussian, 0.25),
    (ActivationType::Sinusoidal, 0.25),
];

/// Returns the CPPN activation types and their weights,
/// in the form used by [`GeneticConfig`].
///
/// # Examples
/// ```
/// use hyperneat::cppn_activation_types;
///
/// let (types, weights) = cppn_activation_types();
/// assert_eq!(types.len(), 4);
/// assert_eq!(weights.iter().sum::<f32>(), 1.0);
/// ```
pub fn cppn_activation_types() -> (Vec<ActivationType>, Vec<f32>) {
    CPPN_ACTIVATIONS.iter().copied().unzip()
}

/// Adapts `base` for CPPN evolution: hidden nodes use the
/// CPPN activation set, outputs are clipped linear, and the
/// initial genes are expressed with `connection_density`
/// probability (1 for fully connected).
pub fn cppn_config(base: GeneticConfig, connection_density: f32) -> GeneticConfig {
    let (activation_types, activation_weights) = cppn_activation_types();
    GeneticConfig {
        output_activation_types: vec![ActivationType::ClippedLinear; base.output_count.get()],
        activation_types,
        activation_weights,
        initial_expression_chance: connection_density,
        ..base
    }
}

/// A CPPN genome.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct HyperNeatGenome(NNGenome);

impl HyperNeatGenome {
    /// Applies weight and structural mutations, with hidden
    /// nodes drawn from the CPPN activation set regardless
    /// of the activation types in `config`.
    pub fn mutate_all(&mut self, history: &mut History, config: &GeneticConfig) {
        let (activation_types, activation_weights) = cppn_activation_types();
        if config.activation_types == activation_types
            && config.activation_weights == activation_weights
        {
            self.0.mutate_all(history, config);
        } else {
            let config = GeneticConfig {
                activation_types,
                activation_weights,
                ..config.clone()
            };
            self.0.mutate_all(history, &config);
        }
    }

    /// Returns the underlying network genome.
    pub fn into_inner(self) -> NNGenome {
        self.0
    }
}

impl From<NNGenome> for HyperNeatGenome {
    fn from(genome: NNGenome) -> Self {
        HyperNeatGenome(genome)
    }
}

impl Deref for HyperNeatGenome {
    type Target = NNGenome;

    fn deref(&self) -> &NNGenome {
        &self.0
    }
}

impl Genome for HyperNeatGenome {
    type Config = GeneticConfig;
    type InnovationHistory = History;
    type ConfigError = GeneticConfigError;

    fn validate_config(config: &GeneticConfig) -> Result<(), GeneticConfigError> {
        NNGenome::validate_config(config)
    }

    fn new(config: &GeneticConfig) -> Self {
        HyperNeatGenome(NNGenome::new(config))
    }

    fn genetic_distance(first: &Self, second: &Self, config: &GeneticConfig) -> f32 {
        NNGenome::genetic_distance(&first.0, &second.0, config)
    }

    fn check_integrity(&self) -> Result<(), IntegrityError> {
        self.0.check_integrity()
    }

    fn set_fitness(&mut self, fitness: f32) {
        self.0.set_fitness(fitness);
    }

    fn fitness(&self) -> f32 {
        self.0.fitness()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxineat_nn::genomics::NodeType;
    use std::num::NonZeroUsize;

    fn config() -> GeneticConfig {
        cppn_config(
            GeneticConfig {
                input_count: NonZeroUsize::new(4).unwrap(),
                output_count: NonZeroUsize::new(2).unwrap(),
                node_addition_mutation_chance: 1.0,
                ..GeneticConfig::default()
            },
            1.0,
        )
    }

    #[test]
    fn cppn_config_is_valid() {
        let config = config();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.activation_types.len(), 4);
        assert!(config.activation_weights.iter().all(|w| *w == 0.25));
    }

    #[test]
    fn outputs_are_clipped_linear() {
        let genome = HyperNeatGenome::new(&config());
        let outputs: Vec<_> = genome
            .nodes()
            .filter(|n| n.node_type() == NodeType::Output)
            .collect();
        assert_eq!(outputs.len(), 2);
        assert!(outputs
            .iter()
            .all(|n| n.activation_type() == ActivationType::ClippedLinear));
    }

    #[test]
    fn connection_density_controls_initial_genes() {
        let config = config();
        // 4 inputs + bias, 2 outputs.
        assert_eq!(HyperNeatGenome::new(&config).genes().count(), 5 * 2);

        let sparse = GeneticConfig {
            initial_expression_chance: 0.0,
            ..config
        };
        assert_eq!(HyperNeatGenome::new(&sparse).genes().count(), 0);
    }

    #[test]
    fn hidden_nodes_use_cppn_activations() {
        let base = GeneticConfig {
            node_addition_mutation_chance: 1.0,
            ..GeneticConfig::default()
        };
        let mut history = History::new(&base);
        let mut genome = HyperNeatGenome::new(&base);
        for _ in 0..10 {
            genome.mutate_all(&mut history, &base);
        }

        let cppn_types = cppn_activation_types().0;
        let hidden: Vec<_> = genome
            .nodes()
            .filter(|n| n.node_type() == NodeType::Hidden)
            .collect();
        assert!(!hidden.is_empty());
        assert!(hidden
            .iter()
            .all(|n| cppn_types.contains(&n.activation_type())));
        assert_eq!(genome.check_integrity(), Ok(()));
    }

    #[test]
    fn distance_matches_inner_genome() {
        let config = config();
        let mut history = History::new(&config);
        let first = HyperNeatGenome::new(&config);
        let mut second = first.clone();
        second.mutate_all(&mut history, &config);

        assert_eq!(
            HyperNeatGenome::genetic_distance(&first, &second, &config),
            NNGenome::genetic_distance(&first, &second, &config)
        );
        assert!(HyperNeatGenome::genetic_distance(&first, &second, &config) > 0.0);
    }

    #[test]
    fn serde_round_trip() {
        let genome = HyperNeatGenome::new(&config());
        let json = serde_json::to_string(&genome).unwrap();
        let restored: HyperNeatGenome = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, genome);
    }
}
