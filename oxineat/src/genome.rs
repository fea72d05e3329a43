use crate::errors::IntegrityError;

/// Identifier type used to designate historically
/// identical mutations for the purposes of
/// genome comparison and genetic tracking.
pub type Innovation = usize;

/// An interface for genomes that can be used by NEAT.
pub trait Genome {
    type Config;
    type InnovationHistory: InnovationHistory<Config = Self::Config>;
    type ConfigError: std::error::Error + Send + Sync + 'static;

    /// Checks `config` for values genomes can't be built or
    /// compared with. [`Population`]s call this before
    /// generating or speciating anything.
    ///
    /// # Errors
    /// Returns the first invalid value found.
    ///
    /// [`Population`]: crate::Population
    fn validate_config(config: &Self::Config) -> Result<(), Self::ConfigError>;

    /// Returns a randomized genome.
    fn new(config: &Self::Config) -> Self;

    /// Returns the genetic distance between two genomes.
    ///
    /// Must be symmetric, non-negative, and zero for
    /// genetically identical genomes.
    fn genetic_distance(first: &Self, second: &Self, config: &Self::Config) -> f32;

    /// Checks the structural invariants the distance
    /// computation relies on (e.g. gene ordering).
    ///
    /// # Errors
    /// Returns the first violation found.
    fn check_integrity(&self) -> Result<(), IntegrityError>;

    /// Sets the genome's fitness value.
    ///
    /// Should make sure that the fitness value is ≥0;
    /// otherwise NEAT will probably break.
    fn set_fitness(&mut self, fitness: f32);

    /// Returns the genome's fitness value.
    fn fitness(&self) -> f32;
}

/// An Innovation History is used to keep track
/// of genetic innovations throughout successive
/// generations of genomes.
///
/// A single history lives for the whole of an
/// evolutionary run, and is only reset when the
/// run restarts.
pub trait InnovationHistory {
    type Config;

    fn new(config: &Self::Config) -> Self;

    /// Returns the history to the state of a fresh run.
    fn reset(&mut self, config: &Self::Config)
    where
        Self: Sized,
    {
        *self = Self::new(config);
    }
}
