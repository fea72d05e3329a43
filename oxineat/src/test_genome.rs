//! Minimal genome used by the crate's unit tests:
//! a sorted list of `(innovation, weight)` genes.
use crate::compatibility::{check_innovation_order, distance, CompatibilityCoefficients};
use crate::{ConfigError, Genome, Innovation, InnovationHistory, IntegrityError};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TestGenome {
    pub genes: Vec<(Innovation, f32)>,
    pub fitness: f32,
}

impl TestGenome {
    pub fn with_fitness(mut self, fitness: f32) -> TestGenome {
        self.fitness = fitness;
        self
    }
}

/// Builds a genome with the given innovations, all at `weight`.
pub(crate) fn genome(innovations: &[Innovation], weight: f32) -> TestGenome {
    TestGenome {
        genes: innovations.iter().map(|id| (*id, weight)).collect(),
        fitness: 0.0,
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct Counter(pub usize);

impl InnovationHistory for Counter {
    type Config = CompatibilityCoefficients;

    fn new(_: &CompatibilityCoefficients) -> Counter {
        Counter(0)
    }
}

impl Genome for TestGenome {
    type Config = CompatibilityCoefficients;
    type InnovationHistory = Counter;
    type ConfigError = ConfigError;

    fn validate_config(config: &CompatibilityCoefficients) -> Result<(), ConfigError> {
        config.validate()
    }

    fn new(_: &CompatibilityCoefficients) -> TestGenome {
        genome(&[0, 1], 0.0)
    }

    fn genetic_distance(first: &Self, second: &Self, config: &Self::Config) -> f32 {
        distance(
            first.genes.iter().copied(),
            second.genes.iter().copied(),
            config,
        )
    }

    fn check_integrity(&self) -> Result<(), IntegrityError> {
        check_innovation_order(self.genes.iter().map(|(id, _)| *id))
    }

    fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    fn fitness(&self) -> f32 {
        self.fitness
    }
}
