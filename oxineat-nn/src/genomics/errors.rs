use crate::Innovation;

use oxineat::ConfigError;

/// An error type indicating the gene being created
/// or added is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneValidityError {
    /// The gene's ID is a duplicate.
    #[error("duplicate gene insertion with id {0}")]
    DuplicateGeneID(Innovation),
    /// The gene's endpoints do not exist.
    #[error("gene insertion between nonexistant endpoint(s) {0} -> {1}")]
    NonexistantEndpoints(Innovation, Innovation),
    /// The gene has the same endpoints as another with a different ID.
    #[error("gene insertion with id {0} shadows gene with same endpoints {1:?}")]
    DuplicateGeneWithEndpoints(Innovation, (Innovation, Innovation)),
    /// The endpoint of the gene is an input or bias node, which is not allowed.
    #[error("gene insertion with input node as endpoint with id {0}")]
    SensorEndpoint(Innovation),
}

/// An error type indicating the node being created
/// or added is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeValidityError {
    /// The node's ID is a duplicate.
    #[error("duplicate node insertion with id {0}")]
    DuplicateNodeID(Innovation),
}

/// An error type indicating a failure
/// to carry out a gene addition mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneAdditionMutationError {
    /// All nodes in the genome are fully connected.
    #[error("gene mutation on fully-connected genome")]
    GenomeFullyConnected,
    /// No pair of nodes was found to connect.
    #[error("no viable input-output pair found for gene mutation")]
    NoInputOutputPairFound,
}

/// An error type indicating a failure
/// to carry out a node addition mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeAdditionMutationError {
    /// The genome had no enabled gene to split.
    #[error("node mutation on genome without enabled genes")]
    EmptyGenome,
}

/// An error type indicating an out-of-range
/// [`GeneticConfig`](crate::genomics::GeneticConfig) value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneticConfigError {
    #[error("`{name}` must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f32 },
    #[error("`{name}` must be finite and non-negative, got {value}")]
    InvalidBound { name: &'static str, value: f32 },
    #[error("activation weights ({weights}) don't match activation types ({types})")]
    MismatchedActivationWeights { weights: usize, types: usize },
    /// The compatibility coefficients are invalid.
    #[error(transparent)]
    Compatibility(#[from] ConfigError),
}
