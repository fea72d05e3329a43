use crate::genomics::{ActivationType, GeneticConfigError};

use oxineat::CompatibilityCoefficients;
use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Settings for building and mutating [`NNGenome`]s,
/// and for measuring the distance between them.
///
/// Probabilities must lie in `[0, 1]`, and bounds must be
/// finite and non-negative; [`validate`] checks both.
///
/// [`NNGenome`]: crate::genomics::NNGenome
/// [`validate`]: GeneticConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    pub input_count: NonZeroUsize,
    pub output_count: NonZeroUsize,
    /// Adds a bias sensor after the inputs.
    pub bias: bool,
    /// Activation choices for new hidden nodes.
    /// Empty means [`Sigmoid`].
    ///
    /// [`Sigmoid`]: crate::genomics::ActivationType::Sigmoid
    pub activation_types: Vec<ActivationType>,
    /// Relative odds of each of the [`activation_types`].
    /// Empty means uniform.
    ///
    /// [`activation_types`]: GeneticConfig::activation_types
    pub activation_weights: Vec<f32>,
    /// Activation of each output node, in order. Outputs
    /// past the end of the list use [`Sigmoid`].
    ///
    /// [`Sigmoid`]: crate::genomics::ActivationType::Sigmoid
    pub output_activation_types: Vec<ActivationType>,
    /// Odds that a sensor-output gene exists in a freshly
    /// generated genome. HyperNEAT calls this connection density.
    pub initial_expression_chance: f32,
    /// Weights never leave `±weight_bound`.
    pub weight_bound: f32,
    pub weight_reset_chance: f32,
    /// Odds of a nudge for weights that were not reset.
    pub weight_nudge_chance: f32,
    /// Largest single nudge.
    pub weight_mutation_power: f32,
    pub node_addition_mutation_chance: f32,
    pub gene_addition_mutation_chance: f32,
    /// Endpoint pairs tried by [`mutate_add_gene`] before giving up.
    ///
    /// [`mutate_add_gene`]: crate::genomics::NNGenome::mutate_add_gene
    pub max_gene_addition_mutation_attempts: usize,
    /// Odds that an added gene may close a cycle.
    pub recursion_chance: f32,
    /// Factors of the genetic distance terms.
    pub compatibility: CompatibilityCoefficients,
}

impl GeneticConfig {
    /// Every probability, bound and coefficient at 0, no
    /// activation lists, and one input and one output.
    /// Used as the base of struct-update syntax.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::GeneticConfig;
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// assert!(config.validate().is_ok());
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            // SAFETY: 1 is non-zero.
            input_count: unsafe { NonZeroUsize::new_unchecked(1) },
            output_count: unsafe { NonZeroUsize::new_unchecked(1) },
            bias: false,
            activation_types: Vec::new(),
            activation_weights: Vec::new(),
            output_activation_types: Vec::new(),
            initial_expression_chance: 0.0,
            weight_bound: 0.0,
            weight_reset_chance: 0.0,
            weight_nudge_chance: 0.0,
            weight_mutation_power: 0.0,
            node_addition_mutation_chance: 0.0,
            gene_addition_mutation_chance: 0.0,
            max_gene_addition_mutation_attempts: 0,
            recursion_chance: 0.0,
            compatibility: CompatibilityCoefficients::zero(),
        }
    }

    /// Number of nodes genes may not end at:
    /// the inputs, plus the bias node if present.
    pub fn sensor_count(&self) -> usize {
        self.input_count.get() + usize::from(self.bias)
    }

    /// Checks the configuration for out-of-range values.
    ///
    /// # Errors
    /// Returns the first invalid value found.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::GeneticConfig;
    ///
    /// assert!(GeneticConfig::default().validate().is_ok());
    ///
    /// let config = GeneticConfig {
    ///     recursion_chance: 1.5,
    ///     ..GeneticConfig::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), GeneticConfigError> {
        let probabilities = [
            ("initial_expression_chance", self.initial_expression_chance),
            ("weight_reset_chance", self.weight_reset_chance),
            ("weight_nudge_chance", self.weight_nudge_chance),
            ("node_addition_mutation_chance", self.node_addition_mutation_chance),
            ("gene_addition_mutation_chance", self.gene_addition_mutation_chance),
            ("recursion_chance", self.recursion_chance),
        ];
        if let Some((name, value)) = probabilities
            .into_iter()
            .find(|(_, p)| !(0.0..=1.0).contains(p))
        {
            return Err(GeneticConfigError::InvalidProbability { name, value });
        }

        let bounds = [
            ("weight_bound", self.weight_bound),
            ("weight_mutation_power", self.weight_mutation_power),
        ];
        if let Some((name, value)) = bounds
            .into_iter()
            .find(|(_, b)| !b.is_finite() || *b < 0.0)
        {
            return Err(GeneticConfigError::InvalidBound { name, value });
        }

        if !self.activation_weights.is_empty() {
            if self.activation_weights.len() != self.activation_types.len() {
                return Err(GeneticConfigError::MismatchedActivationWeights {
                    weights: self.activation_weights.len(),
                    types: self.activation_types.len(),
                });
            }
            if let Some(value) = self
                .activation_weights
                .iter()
                .copied()
                .find(|w| !w.is_finite() || *w < 0.0)
            {
                return Err(GeneticConfigError::InvalidBound {
                    name: "activation_weights",
                    value,
                });
            }
        }

        Ok(self.compatibility.validate()?)
    }
}

impl Default for GeneticConfig {
    fn default() -> GeneticConfig {
        GeneticConfig {
            bias: true,
            activation_types: vec![ActivationType::Sigmoid],
            initial_expression_chance: 1.0,
            weight_bound: 5.0,
            weight_reset_chance: 0.1,
            weight_nudge_chance: 0.8,
            weight_mutation_power: 2.5,
            node_addition_mutation_chance: 0.03,
            gene_addition_mutation_chance: 0.05,
            max_gene_addition_mutation_attempts: 20,
            compatibility: CompatibilityCoefficients::default(),
            ..GeneticConfig::zero()
        }
    }
}
