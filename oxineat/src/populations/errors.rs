use crate::errors::{ConfigError, IntegrityError};

/// An error type indicating a speciation pass
/// could not run. The population is left as it
/// was before the pass.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpeciationError {
    #[error("attempted speciation of empty population")]
    EmptyPopulation,
    #[error("genome {index} is malformed: {source}")]
    MalformedGenome {
        index: usize,
        #[source]
        source: IntegrityError,
    },
    #[error("genome {index} has an uncomparable fitness value (NaN)")]
    UncomparableFitness { index: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OffspringAllotmentError {
    #[error("attempted offspring allotment on degenerate population")]
    DegeneratePopulation,
}

/// Any error raised while building or evolving a population.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The genetic config was rejected by
    /// [`Genome::validate_config`](crate::Genome::validate_config).
    #[error("invalid genetic config: {0}")]
    GeneticConfig(Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    Speciation(#[from] SpeciationError),
    #[error(transparent)]
    OffspringAllotment(#[from] OffspringAllotmentError),
}
