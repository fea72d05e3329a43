use crate::Innovation;

/// An error type indicating a genome violates
/// the structural invariants required for
/// gene alignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// Gene innovation numbers are not in increasing order.
    #[error("gene {next} follows gene {previous} out of innovation order")]
    UnsortedInnovations {
        previous: Innovation,
        next: Innovation,
    },
    /// The same innovation number appears twice.
    #[error("duplicate gene with innovation number {0}")]
    DuplicateInnovation(Innovation),
    /// Node ids are not in strictly increasing order.
    #[error("node {next} follows node {previous} out of order")]
    UnsortedNodes {
        previous: Innovation,
        next: Innovation,
    },
    /// A gene references a node the genome doesn't have.
    #[error("gene {gene} references nonexistant node {node}")]
    DanglingGene { gene: Innovation, node: Innovation },
}

/// An error type indicating an invalid configuration,
/// detected before any generation is run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("compatibility coefficient `{name}` must be finite and non-negative, got {value}")]
    InvalidCoefficient { name: &'static str, value: f32 },
    #[error("distance threshold must be finite and positive, got {0}")]
    NonPositiveThreshold(f32),
    #[error("minimum threshold must be positive and at most the distance threshold, got {0}")]
    InvalidMinimumThreshold(f32),
    #[error("threshold step must be finite and non-negative, got {0}")]
    InvalidThresholdStep(f32),
    #[error("target species band is inverted ({min} > {max})")]
    InvertedSpeciesBand { min: usize, max: usize },
}
