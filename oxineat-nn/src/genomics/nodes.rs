use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::fmt;

/// Activation function a node applies once the genome
/// is decoded into a network.
///
/// The last two variants belong to the CPPN set
/// used by HyperNEAT genomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ActivationType {
    /// `1 / (1 + exp(-4.9x))`
    Sigmoid,
    Identity,
    /// `max(0, x)`
    ReLU,
    /// `exp(-x²)`
    Gaussian,
    /// `sin(πx)`
    Sinusoidal,
    /// `x` clamped to `[-1, 1]`
    ClippedLinear,
    /// `2 / (1 + exp(-4.9x)) - 1`
    BipolarSteepenedSigmoid,
}

/// Role of a node in the genome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Input,
    /// Constant-output sensor, placed after the inputs.
    Bias,
    Hidden,
    Output,
}

impl NodeType {
    /// Whether genes may never end at nodes of this type.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::NodeType;
    ///
    /// assert!(NodeType::Bias.is_sensor());
    /// assert!(!NodeType::Output.is_sensor());
    /// ```
    pub fn is_sensor(self) -> bool {
        matches!(self, NodeType::Input | NodeType::Bias)
    }
}

/// A node gene. Its id is a node innovation number,
/// shared by every genome that made the same split.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Node {
    innovation: Innovation,
    node_type: NodeType,
    activation_type: ActivationType,
}

impl Node {
    pub fn new(innovation: Innovation, node_type: NodeType, activation_type: ActivationType) -> Node {
        Node {
            innovation,
            node_type,
            activation_type,
        }
    }

    pub fn innovation(&self) -> Innovation {
        self.innovation
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn activation_type(&self) -> ActivationType {
        self.activation_type
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{} {:?}/{:?}",
            self.innovation, self.node_type, self.activation_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_role_and_activation() {
        let node = Node::new(5, NodeType::Hidden, ActivationType::Gaussian);
        assert_eq!(node.to_string(), "@5 Hidden/Gaussian");
    }

    #[test]
    fn only_inputs_and_bias_are_sensors() {
        let sensors: Vec<_> = [
            NodeType::Input,
            NodeType::Bias,
            NodeType::Hidden,
            NodeType::Output,
        ]
        .into_iter()
        .filter(|t| t.is_sensor())
        .collect();
        assert_eq!(sensors, [NodeType::Input, NodeType::Bias]);
    }
}
