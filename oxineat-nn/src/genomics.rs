//! Genomes are the focus of evolution in NEAT.
//! They are a collection of genes and nodes that can be instantiated
//! as a phenotype (a neural network). Genomes can be progressively mutated,
//! thus adding complexity and functionality.
//!
//! Both genes and nodes are kept sorted by innovation number,
//! so that genomes can be aligned in a single pass.

mod config;
mod errors;
mod genes;
mod history;
mod nodes;

pub use config::GeneticConfig;
pub use errors::*;
pub use genes::Gene;
pub use history::History;
pub use nodes::{ActivationType, Node, NodeType};

use crate::Innovation;
use oxineat::compatibility::{check_innovation_order, distance};
use oxineat::{Genome, IntegrityError};

use ahash::RandomState;
use log::trace;
use rand::distributions::{Distribution, WeightedIndex};
use rand::prelude::{IteratorRandom, Rng, SliceRandom};
use serde::{Deserialize, Serialize};

use std::collections::HashSet;
use std::fmt;

/// A mutable collection of genes and nodes.
///
/// Suports Serde for convenient genome saving and loading.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NNGenome {
    genes: Vec<Gene>,
    nodes: Vec<Node>,
    fitness: f32,
}

impl NNGenome {
    /// Create a new genome with the specified configuration.
    ///
    /// Nodes are numbered inputs first, then the bias node
    /// if configured, then outputs.
    /// Initially generated genes are given the innovation number
    /// `o + s ⨯ output_count`, where `s` is the innovation number
    /// of their input (or bias) node and `o` is the index of their
    /// output node. Thus, genes created through mutation start
    /// at innovation number `sensor_count ⨯ output_count`.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, NNGenome, NodeType};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     bias: true,
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 5.0,
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let genome = NNGenome::new(&config);
    ///
    /// // As configured, the genome should have 3 inputs + 1 bias + 2 outputs.
    /// assert_eq!(genome.nodes().count(), 3 + 1 + 2);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Input).count(), 3);
    /// assert_eq!(genome.nodes().filter(|n| n.node_type() == NodeType::Output).count(), 2);
    ///
    /// // And with an initial_expression_chance of 1, there is a gene for every pair of nodes.
    /// assert_eq!(genome.genes().count(), 4 * 2);
    ///
    /// // All genes should have weights within the established bound.
    /// assert!(genome.genes().all(|g| g.weight().abs() <= config.weight_bound));
    ///
    /// // Genes are in innovation order.
    /// assert!(genome.genes().map(|g| g.innovation()).eq(0..8));
    /// ```
    pub fn new(config: &GeneticConfig) -> NNGenome {
        let nodes = Self::generate_nodes(config);
        let genes = Self::generate_initial_genes(config);

        NNGenome {
            genes,
            nodes,
            fitness: 0.0,
        }
    }

    fn generate_nodes(config: &GeneticConfig) -> Vec<Node> {
        let input_count = config.input_count.get();
        let sensor_count = config.sensor_count();
        let output_count = config.output_count.get();

        let mut nodes = Vec::with_capacity(sensor_count + output_count);

        for i in 0..input_count {
            nodes.push(Node::new(i, NodeType::Input, ActivationType::Identity));
        }

        if config.bias {
            nodes.push(Node::new(
                input_count,
                NodeType::Bias,
                ActivationType::Identity,
            ));
        }

        for o in 0..output_count {
            nodes.push(Node::new(
                o + sensor_count,
                NodeType::Output,
                *config
                    .output_activation_types
                    .get(o)
                    .unwrap_or(&ActivationType::Sigmoid),
            ));
        }

        nodes
    }

    fn generate_initial_genes(config: &GeneticConfig) -> Vec<Gene> {
        let sensor_count = config.sensor_count();
        let output_count = config.output_count.get();
        let mut genes = vec![];

        if config.initial_expression_chance != 0.0 {
            let mut rng = rand::thread_rng();
            for s in 0..sensor_count {
                for o in 0..output_count {
                    if rng.gen::<f32>() < config.initial_expression_chance {
                        let id = o + s * output_count;
                        genes.push(Gene::new(
                            id,
                            s,
                            o + sensor_count,
                            Gene::random_weight(config),
                        ));
                    }
                }
            }
        }

        genes
    }

    /// Add a new gene to the genome.
    /// Returns a reference to the new gene.
    ///
    /// # Errors
    ///
    /// Returns an error if a gene with the same
    /// `gene_id` already existed in the genome, if either `input_id`
    /// or `output_id` do not correspond to nodes present in the genome,
    /// if another gene already connects the same nodes, or if
    /// `output_id` corresponds to an input or bias node.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, NNGenome};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     initial_expression_chance: 0.0,
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let mut genome = NNGenome::new(&config);
    ///
    /// // The genome is initially empty.
    /// assert_eq!(genome.genes().count(), 0);
    ///
    /// let inserted_gene = genome.add_gene(42, 2, 4, 2.5).unwrap().clone();
    ///
    /// // The genome now contains a gene with the specified characteristics.
    /// assert_eq!(&inserted_gene, genome.genes().next().unwrap());
    /// assert_eq!(inserted_gene.endpoints(), (2, 4));
    /// assert_eq!(inserted_gene.weight(), 2.5);
    ///
    /// // Make a cycle (gene 43 goes 3 -> 4, gene 44 goes 4 -> 3).
    /// genome.add_gene(43, 3, 4, -3.0).unwrap();
    /// genome.add_gene(44, 4, 3, 1.0).unwrap();
    ///
    /// // Genes may not end at input nodes.
    /// assert!(genome.add_gene(46, 4, 0, 1.0).is_err());
    ///
    /// // Recursive gene.
    /// genome.add_gene(45, 4, 4, -1.0).unwrap();
    /// ```
    pub fn add_gene(
        &mut self,
        gene_id: Innovation,
        input_id: Innovation,
        output_id: Innovation,
        weight: f32,
    ) -> Result<&mut Gene, GeneValidityError> {
        self.check_gene_viability(gene_id, input_id, output_id)?;
        Ok(self.add_gene_unchecked(gene_id, input_id, output_id, weight))
    }

    /// Add a new gene to the genome, in innovation order.
    /// Returns a reference to the new gene.
    /// Assumes that the gene is not a duplicate
    /// or invalid gene for the genome.
    fn add_gene_unchecked(
        &mut self,
        gene_id: Innovation,
        input_id: Innovation,
        output_id: Innovation,
        weight: f32,
    ) -> &mut Gene {
        let position = self
            .gene_position(gene_id)
            .unwrap_or_else(|position| position);
        debug_assert!(self.genes.get(position).map_or(true, |g| g.innovation() != gene_id));
        self.genes
            .insert(position, Gene::new(gene_id, input_id, output_id, weight));
        &mut self.genes[position]
    }

    /// Checks whether a gene is a duplicate or
    /// is invalid for the genome.
    ///
    /// # Errors
    ///
    /// Returns an error if the gene is not viable.
    fn check_gene_viability(
        &self,
        gene_id: Innovation,
        input_id: Innovation,
        output_id: Innovation,
    ) -> Result<(), GeneValidityError> {
        use GeneValidityError::*;
        if self.gene_position(gene_id).is_ok() {
            Err(DuplicateGeneID(gene_id))
        } else if let (Some(_), Some(output)) = (self.node(input_id), self.node(output_id)) {
            if self.genes.iter().any(|g| g.endpoints() == (input_id, output_id)) {
                Err(DuplicateGeneWithEndpoints(gene_id, (input_id, output_id)))
            } else if output.node_type().is_sensor() {
                Err(SensorEndpoint(output_id))
            } else {
                Ok(())
            }
        } else {
            Err(NonexistantEndpoints(input_id, output_id))
        }
    }

    /// Add a new hidden node to the genome.
    /// Returns a reference to the newly created node.
    ///
    /// # Errors
    ///
    /// Returns an error if a node of the
    /// same ID already existed in the genome.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{ActivationType, GeneticConfig, NNGenome, NodeType};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let mut genome = NNGenome::new(&config);
    ///
    /// let inserted_node = genome.add_node(42, ActivationType::Gaussian).unwrap().clone();
    ///
    /// // The genome now has 1 additional node, as returned.
    /// assert_eq!(genome.nodes().count(), 3 + 2 + 1);
    /// assert_eq!(genome.nodes().last(), Some(&inserted_node));
    /// assert_eq!(inserted_node.node_type(), NodeType::Hidden);
    ///
    /// assert!(genome.add_node(42, ActivationType::Sigmoid).is_err());
    /// ```
    pub fn add_node(
        &mut self,
        node_id: Innovation,
        activation_type: ActivationType,
    ) -> Result<&mut Node, NodeValidityError> {
        match self.node_position(node_id) {
            Ok(_) => Err(NodeValidityError::DuplicateNodeID(node_id)),
            Err(position) => {
                self.nodes.insert(
                    position,
                    Node::new(node_id, NodeType::Hidden, activation_type),
                );
                Ok(&mut self.nodes[position])
            }
        }
    }

    /// Induces a _weight mutation_ in the genome.
    ///
    /// # Examples
    /// ### Weight reset
    /// The weight is set to a random value in the range
    /// `[-weight_bound, weight_bound]`.
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, NNGenome};
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 5.0,
    ///     weight_reset_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// // The genome has a single gene, whose weight we can retrieve.
    /// let mut genome = NNGenome::new(&config);
    ///
    /// genome.mutate_weights(&config);
    /// let new_weight = genome.genes().next().unwrap().weight();
    ///
    /// // The gene's weight is still within the weight bounds.
    /// assert!(new_weight.abs() <= config.weight_bound);
    /// ```
    ///
    /// ### Weight nudge
    /// A random value from the range `[-weight_mutation_power, weight_mutation_power]`
    /// is added to the weight, which is then clamped to `[-weight_bound, weight_bound]`.
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, NNGenome};
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 5.0,
    ///     weight_mutation_power: 2.5,
    ///     weight_nudge_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let mut genome = NNGenome::new(&config);
    /// let initial_weight = genome.genes().next().unwrap().weight();
    ///
    /// genome.mutate_weights(&config);
    /// let new_weight = genome.genes().next().unwrap().weight();
    ///
    /// // The gene's weight is still within the weight bounds, and the nudge distance.
    /// assert!(new_weight.abs() <= config.weight_bound);
    /// assert!((new_weight - initial_weight).abs() <= config.weight_mutation_power);
    /// ```
    pub fn mutate_weights(&mut self, config: &GeneticConfig) {
        let mut rng = rand::thread_rng();
        let max_innovation = self
            .genes
            .last()
            .map_or(0, Gene::innovation)
            .max(1) as f32;
        for gene in &mut self.genes {
            // Older genes have a lower chance of being reset,
            // with the assumption being they've had more time
            // to settle into an optimised value.
            if rng.gen::<f32>()
                < config.weight_reset_chance
                    * ((gene.innovation() + 1) as f32 / max_innovation).powf(2.0)
            {
                gene.randomize_weight(config);
            } else if rng.gen::<f32>() < config.weight_nudge_chance {
                gene.nudge_weight(config);
            }
        }
    }

    /// Induces a _gene mutation_ in the genome.
    /// If successful, returns the newly added gene.
    ///
    /// # Errors
    ///
    /// Returns an error if no viable pair of nodes
    /// exists or [too many] attempts have failed.
    ///
    /// [too many]: crate::genomics::GeneticConfig::max_gene_addition_mutation_attempts
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, History, NNGenome};
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 0.0,
    ///     weight_bound: 5.0,
    ///     max_gene_addition_mutation_attempts: 2,
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let mut genome = NNGenome::new(&config);
    ///
    /// // The genome is initially empty.
    /// assert_eq!(genome.genes().count(), 0);
    ///
    /// let gene = genome.mutate_add_gene(&mut History::new(&config), &config).unwrap();
    ///
    /// // The only possible gene connects the input to the output.
    /// assert_eq!(gene.endpoints(), (0, 1));
    /// assert_eq!(genome.genes().count(), 1);
    /// ```
    pub fn mutate_add_gene(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
    ) -> Result<&Gene, GeneAdditionMutationError> {
        let non_sensor_nodes = self.select_non_sensor_nodes();
        let pairings = self.node_pairings();
        let mut potential_inputs = self.select_potential_input_nodes(&pairings, &non_sensor_nodes);

        if potential_inputs.is_empty() {
            return Err(GeneAdditionMutationError::GenomeFullyConnected);
        }

        potential_inputs.shuffle(&mut rand::thread_rng());

        match self.find_node_pair(&potential_inputs, &non_sensor_nodes, &pairings, config) {
            Some((input, output)) => Ok(self.add_gene_mutation(input, output, history, config)),
            None => Err(GeneAdditionMutationError::NoInputOutputPairFound),
        }
    }

    fn select_non_sensor_nodes(&self) -> HashSet<Innovation, RandomState> {
        self.nodes
            .iter()
            .filter(|n| !n.node_type().is_sensor())
            .map(Node::innovation)
            .collect()
    }

    fn node_pairings(&self) -> HashSet<(Innovation, Innovation), RandomState> {
        self.genes.iter().map(Gene::endpoints).collect()
    }

    fn select_potential_input_nodes(
        &self,
        pairings: &HashSet<(Innovation, Innovation), RandomState>,
        non_sensor_nodes: &HashSet<Innovation, RandomState>,
    ) -> Vec<Innovation> {
        self.nodes
            .iter()
            .map(Node::innovation)
            .filter(|id| pairings.iter().filter(|(i, _)| i == id).count() < non_sensor_nodes.len())
            .collect()
    }

    fn choose_output_node_for(
        &self,
        candidate_input: Innovation,
        potential_outputs: &HashSet<Innovation, RandomState>,
        pairings: &HashSet<(Innovation, Innovation), RandomState>,
        config: &GeneticConfig,
    ) -> Option<Innovation> {
        let mut rng = rand::thread_rng();

        if potential_outputs.contains(&candidate_input)
            && !pairings.contains(&(candidate_input, candidate_input))
            && rng.gen::<f32>() < config.recursion_chance
        {
            Some(candidate_input)
        } else {
            potential_outputs
                .iter()
                .copied()
                .filter(|o| *o != candidate_input && !pairings.contains(&(candidate_input, *o)))
                .choose(&mut rng)
        }
    }

    fn find_node_pair(
        &self,
        potential_inputs: &[Innovation],
        potential_outputs: &HashSet<Innovation, RandomState>,
        pairings: &HashSet<(Innovation, Innovation), RandomState>,
        config: &GeneticConfig,
    ) -> Option<(Innovation, Innovation)> {
        potential_inputs
            .iter()
            .take(config.max_gene_addition_mutation_attempts)
            .find_map(|i| {
                self.choose_output_node_for(*i, potential_outputs, pairings, config)
                    .map(|output| (*i, output))
            })
    }

    fn add_gene_mutation(
        &mut self,
        input_node: Innovation,
        output_node: Innovation,
        history: &mut History,
        config: &GeneticConfig,
    ) -> &Gene {
        let gene_id = history.register_gene(input_node, output_node);
        trace!("adding gene {} ({} -> {})", gene_id, input_node, output_node);
        self.add_gene_unchecked(gene_id, input_node, output_node, Gene::random_weight(config))
    }

    /// Induces a _node mutation_ in the genome.
    /// If succesful, returns the triplet (_in gene_, _new node_, _out gene_)
    /// as a tuple of references.
    ///
    /// The split gene is disabled. The in gene has weight 1,
    /// and the out gene inherits the split gene's weight.
    ///
    /// # Errors
    ///
    /// This function returns an error if there are no enabled
    /// genes in the genome that could be split.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{ActivationType, GeneticConfig, History, NNGenome, NodeType};
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 3.0,
    ///     activation_types: vec![ActivationType::ReLU],
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let mut genome = NNGenome::new(&config);
    ///
    /// // The genome starts with a single gene,
    /// // and an input and output node.
    /// assert_eq!(genome.genes().count(), 1);
    /// assert_eq!(genome.nodes().count(), 1 + 1);
    ///
    /// let prev_gene = genome.genes().next().unwrap().clone();
    ///
    /// let (new_input_gene, new_node, new_output_gene) =
    ///     genome.mutate_add_node(&mut History::new(&config), &config).unwrap();
    ///
    /// assert_eq!(new_input_gene.output(), new_node.innovation());
    /// assert_eq!(new_input_gene.weight(), 1.0);
    ///
    /// assert_eq!(new_output_gene.input(), new_node.innovation());
    /// assert_eq!(new_output_gene.weight(), prev_gene.weight());
    ///
    /// assert_eq!(new_node.activation_type(), ActivationType::ReLU);
    /// assert_eq!(new_node.node_type(), NodeType::Hidden);
    ///
    /// assert_eq!(genome.genes().count(), 1 + 2);
    /// assert_eq!(genome.nodes().count(), 1 + 1 + 1);
    ///
    /// // Old gene is disabled.
    /// assert!(!genome.genes().next().unwrap().enabled());
    /// ```
    pub fn mutate_add_node(
        &mut self,
        history: &mut History,
        config: &GeneticConfig,
    ) -> Result<(&Gene, &Node, &Gene), NodeAdditionMutationError> {
        let split_position = self
            .genes
            .iter()
            .enumerate()
            .filter(|(_, g)| g.enabled())
            .map(|(i, _)| i)
            .choose(&mut rand::thread_rng())
            .ok_or(NodeAdditionMutationError::EmptyGenome)?;
        let split_gene = &self.genes[split_position];
        let (split_id, endpoints, weight) =
            (split_gene.innovation(), split_gene.endpoints(), split_gene.weight());

        let mut mutation = history.register_split(split_id, endpoints, false);
        // The genome split this gene before, and the
        // recorded node would be duplicated.
        if self.node_position(mutation.1).is_ok() {
            mutation = history.register_split(split_id, endpoints, true);
        }
        let (input_gene, new_node, output_gene) = mutation;
        trace!("splitting gene {} with node {}", split_id, new_node);

        self.genes[split_position].set_enabled(false);
        let activation_type = Self::random_activation_type(config);
        if let Err(position) = self.node_position(new_node) {
            self.nodes
                .insert(position, Node::new(new_node, NodeType::Hidden, activation_type));
        }
        self.add_gene_unchecked(input_gene, endpoints.0, new_node, 1.0);
        self.add_gene_unchecked(output_gene, new_node, endpoints.1, weight);

        Ok((
            &self.genes[self.gene_position(input_gene).unwrap_or_else(|i| i)],
            &self.nodes[self.node_position(new_node).unwrap_or_else(|i| i)],
            &self.genes[self.gene_position(output_gene).unwrap_or_else(|i| i)],
        ))
    }

    /// Picks a hidden node activation type according to
    /// the configured weights.
    fn random_activation_type(config: &GeneticConfig) -> ActivationType {
        let mut rng = rand::thread_rng();
        let chosen = if config.activation_weights.is_empty() {
            config.activation_types.choose(&mut rng)
        } else {
            WeightedIndex::new(&config.activation_weights)
                .ok()
                .and_then(|index| config.activation_types.get(index.sample(&mut rng)))
        };
        chosen.copied().unwrap_or(ActivationType::Sigmoid)
    }

    /// Applies every mutation in turn, each with its
    /// configured chance: a weight mutation, then a node
    /// addition, then a gene addition. Failed structural
    /// mutations leave the genome as it was.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, History, NNGenome};
    ///
    /// let config = GeneticConfig {
    ///     node_addition_mutation_chance: 1.0,
    ///     ..GeneticConfig::default()
    /// };
    /// let mut history = History::new(&config);
    /// let mut genome = NNGenome::new(&config);
    ///
    /// genome.mutate_all(&mut history, &config);
    ///
    /// assert!(genome.nodes().count() > 3);
    /// ```
    pub fn mutate_all(&mut self, history: &mut History, config: &GeneticConfig) {
        let mut rng = rand::thread_rng();
        self.mutate_weights(config);
        if rng.gen::<f32>() < config.node_addition_mutation_chance {
            if let Err(e) = self.mutate_add_node(history, config) {
                trace!("{}", e);
            }
        }
        if rng.gen::<f32>() < config.gene_addition_mutation_chance {
            if let Err(e) = self.mutate_add_gene(history, config) {
                trace!("{}", e);
            }
        }
    }

    fn gene_position(&self, gene_id: Innovation) -> Result<usize, usize> {
        self.genes.binary_search_by_key(&gene_id, Gene::innovation)
    }

    fn node_position(&self, node_id: Innovation) -> Result<usize, usize> {
        self.nodes.binary_search_by_key(&node_id, Node::innovation)
    }

    /// Returns the gene with the passed innovation number, if present.
    pub fn gene(&self, gene_id: Innovation) -> Option<&Gene> {
        self.gene_position(gene_id).ok().map(|i| &self.genes[i])
    }

    /// Returns the node with the passed innovation number, if present.
    pub fn node(&self, node_id: Innovation) -> Option<&Node> {
        self.node_position(node_id).ok().map(|i| &self.nodes[i])
    }

    /// Returns an iterator over the genome's genes,
    /// in increasing innovation order.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, NNGenome};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(3).unwrap(),
    ///     output_count: NonZeroUsize::new(2).unwrap(),
    ///     initial_expression_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    ///
    /// let genome = NNGenome::new(&config);
    ///
    /// for gene in genome.genes() {
    ///     println!("gene: {}", gene);
    /// }
    /// ```
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.iter()
    }

    /// Returns an iterator over the genome's nodes,
    /// in increasing innovation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns the genome's genes as `(innovation, weight)`
    /// pairs, the form they are aligned in.
    pub fn innovations_and_weights(&self) -> impl Iterator<Item = (Innovation, f32)> + '_ {
        self.genes.iter().map(|g| (g.innovation(), g.weight()))
    }

    /// Sets the genome's fitness to the value passed.
    /// Fitness should be a positive quantity.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, NNGenome};
    ///
    /// let mut genome = NNGenome::new(&GeneticConfig::zero());
    ///
    /// assert_eq!(genome.fitness(), 0.0);
    ///
    /// genome.set_fitness(32.0);
    ///
    /// assert_eq!(genome.fitness(), 32.0);
    /// ```
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Returns a the genome's current fitness.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

impl Genome for NNGenome {
    type Config = GeneticConfig;
    type InnovationHistory = History;
    type ConfigError = GeneticConfigError;

    fn validate_config(config: &GeneticConfig) -> Result<(), GeneticConfigError> {
        config.validate()
    }

    fn new(config: &GeneticConfig) -> Self {
        Self::new(config)
    }

    fn genetic_distance(first: &Self, second: &Self, config: &GeneticConfig) -> f32 {
        distance(
            first.innovations_and_weights(),
            second.innovations_and_weights(),
            &config.compatibility,
        )
    }

    fn check_integrity(&self) -> Result<(), IntegrityError> {
        check_innovation_order(self.genes.iter().map(Gene::innovation))?;
        if let Some(w) = self
            .nodes
            .windows(2)
            .find(|w| w[0].innovation() >= w[1].innovation())
        {
            return Err(IntegrityError::UnsortedNodes {
                previous: w[0].innovation(),
                next: w[1].innovation(),
            });
        }
        for gene in &self.genes {
            for node in [gene.input(), gene.output()] {
                if self.node_position(node).is_err() {
                    return Err(IntegrityError::DanglingGene {
                        gene: gene.innovation(),
                        node,
                    });
                }
            }
        }
        Ok(())
    }

    fn set_fitness(&mut self, fitness: f32) {
        self.set_fitness(fitness);
    }

    fn fitness(&self) -> f32 {
        self.fitness()
    }
}

impl fmt::Display for NNGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NNGenome")
            .field("Genes", &self.genes)
            .field("Nodes", &self.nodes)
            .field("Fitness", &self.fitness)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use oxineat::CompatibilityCoefficients;
    use std::num::NonZeroUsize;

    fn unconnected(input_count: usize, output_count: usize) -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::new(input_count).unwrap(),
            output_count: NonZeroUsize::new(output_count).unwrap(),
            weight_bound: 3.0,
            max_gene_addition_mutation_attempts: 20,
            compatibility: CompatibilityCoefficients::default(),
            ..GeneticConfig::zero()
        }
    }

    #[test]
    fn new_fully_connected() {
        for input_count in 1..6 {
            for output_count in 1..6 {
                for bias in [false, true] {
                    let config = GeneticConfig {
                        bias,
                        initial_expression_chance: 1.0,
                        output_activation_types: vec![
                            ActivationType::Gaussian,
                            ActivationType::Identity,
                        ],
                        ..unconnected(input_count, output_count)
                    };
                    let sensor_count = config.sensor_count();

                    let genome = NNGenome::new(&config);
                    assert_eq!(genome.genes.len(), sensor_count * output_count);
                    assert_eq!(genome.check_integrity(), Ok(()));
                    assert_eq!(
                        genome
                            .nodes
                            .iter()
                            .filter(|n| n.node_type() == NodeType::Bias)
                            .count(),
                        usize::from(bias)
                    );
                    for n in genome.nodes.iter().filter(|n| n.node_type() == NodeType::Output) {
                        assert_eq!(
                            n.activation_type(),
                            *config
                                .output_activation_types
                                .get(n.innovation() - sensor_count)
                                .unwrap_or(&ActivationType::Sigmoid)
                        );
                    }
                    for g in &genome.genes {
                        assert_eq!(
                            g.innovation(),
                            g.input() * output_count + (g.output() - sensor_count)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn new_unconnected() {
        let genome = NNGenome::new(&unconnected(3, 3));
        assert_eq!(genome.genes.len(), 0);
        assert_eq!(genome.nodes.len(), 6);
    }

    #[test]
    fn add_gene_keeps_innovation_order() {
        let mut genome = NNGenome::new(&unconnected(2, 2));
        for (id, input, output) in [(40, 0, 3), (7, 1, 3), (23, 0, 2)] {
            genome.add_gene(id, input, output, 1.0).unwrap();
        }
        assert_eq!(
            genome.genes().map(Gene::innovation).collect::<Vec<_>>(),
            vec![7, 23, 40]
        );
        assert_eq!(genome.check_integrity(), Ok(()));
    }

    #[test]
    fn add_gene_invalid() {
        let mut genome = NNGenome::new(&unconnected(1, 1));
        genome.add_gene(5, 0, 1, 1.0).unwrap();

        assert_eq!(
            genome.add_gene(5, 1, 1, 1.0).unwrap_err(),
            GeneValidityError::DuplicateGeneID(5)
        );
        assert_eq!(
            genome.add_gene(6, 0, 1, 1.0).unwrap_err(),
            GeneValidityError::DuplicateGeneWithEndpoints(6, (0, 1))
        );
        assert_eq!(
            genome.add_gene(6, 0, 9, 1.0).unwrap_err(),
            GeneValidityError::NonexistantEndpoints(0, 9)
        );
        assert_eq!(
            genome.add_gene(6, 1, 0, 1.0).unwrap_err(),
            GeneValidityError::SensorEndpoint(0)
        );
        assert_eq!(genome.genes.len(), 1);
    }

    #[test]
    fn add_node_duplicate() {
        let mut genome = NNGenome::new(&unconnected(1, 1));
        assert_eq!(
            genome.add_node(1, ActivationType::Sigmoid).unwrap_err(),
            NodeValidityError::DuplicateNodeID(1)
        );
    }

    #[test]
    fn mutate_weights_none() {
        let config = GeneticConfig {
            initial_expression_chance: 1.0,
            ..unconnected(2, 2)
        };
        let mut genome = NNGenome::new(&config);
        let before = genome.clone();
        genome.mutate_weights(&config);
        assert_eq!(genome, before);
    }

    #[test]
    fn mutate_gene_addition() {
        let config = unconnected(1, 1);
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(&config);
        genome.add_node(2, ActivationType::Sigmoid).unwrap();

        let gene = genome.mutate_add_gene(&mut history, &config).unwrap().clone();

        assert_eq!(gene.innovation(), history.register_gene(gene.input(), gene.output()));
        assert!((0..=2).contains(&gene.input()));
        assert!((1..=2).contains(&gene.output()));
        assert_ne!(gene.input(), gene.output());
        assert_eq!(genome.check_integrity(), Ok(()));
    }

    #[test]
    fn mutate_gene_addition_recursive() {
        let config = GeneticConfig {
            initial_expression_chance: 1.0,
            recursion_chance: 1.0,
            ..unconnected(1, 1)
        };
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(&config);
        genome.add_node(50, ActivationType::Sigmoid).unwrap();
        genome.add_gene(42, 0, 50, 2.0).unwrap();
        genome.add_gene(43, 50, 1, 2.0).unwrap();
        genome.add_gene(44, 1, 50, 2.0).unwrap();

        let gene = genome.mutate_add_gene(&mut history, &config).unwrap();

        assert_eq!(gene.input(), gene.output());
    }

    #[test]
    fn mutate_gene_addition_fully_connected() {
        let config = GeneticConfig {
            initial_expression_chance: 1.0,
            recursion_chance: 1.0,
            ..unconnected(1, 1)
        };
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(&config);
        genome.add_gene(42, 1, 1, 5.0).unwrap();

        assert_eq!(
            genome.mutate_add_gene(&mut history, &config).unwrap_err(),
            GeneAdditionMutationError::GenomeFullyConnected
        );
    }

    #[test]
    fn mutate_node_addition() {
        let config = GeneticConfig {
            initial_expression_chance: 1.0,
            activation_types: vec![ActivationType::Sigmoid, ActivationType::ReLU],
            ..unconnected(1, 1)
        };
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(&config);

        let (input, node, output) = genome.mutate_add_node(&mut history, &config).unwrap();
        assert_eq!((input.innovation(), node.innovation(), output.innovation()), (1, 2, 2));
        assert!(config.activation_types.contains(&node.activation_type()));

        assert_eq!(genome.genes.len(), 3);
        assert_eq!(genome.nodes.len(), 3);
        assert!(!genome.genes[0].enabled());
        assert_eq!(genome.check_integrity(), Ok(()));

        // Only disabled genes and the new ones remain; splitting
        // again never touches the disabled gene.
        genome.mutate_add_node(&mut history, &config).unwrap();
        assert!(!genome.genes[0].enabled());
        assert_eq!(genome.nodes.len(), 4);
        assert_eq!(genome.check_integrity(), Ok(()));
    }

    #[test]
    fn identical_splits_share_innovations() {
        let config = GeneticConfig {
            initial_expression_chance: 1.0,
            ..unconnected(1, 1)
        };
        let mut history = History::new(&config);
        let mut first = NNGenome::new(&config);
        let mut second = first.clone();

        first.mutate_add_node(&mut history, &config).unwrap();
        second.mutate_add_node(&mut history, &config).unwrap();

        assert_eq!(
            first.genes().map(Gene::innovation).collect::<Vec<_>>(),
            second.genes().map(Gene::innovation).collect::<Vec<_>>()
        );
    }

    #[test]
    fn resplitting_reenabled_gene_gets_fresh_innovations() {
        let config = GeneticConfig {
            initial_expression_chance: 1.0,
            ..unconnected(1, 1)
        };
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(&config);
        genome.mutate_add_node(&mut history, &config).unwrap();

        // Disable everything but the original gene.
        for gene in &mut genome.genes {
            gene.set_enabled(gene.innovation() == 0);
        }
        let (_, node, _) = genome.mutate_add_node(&mut history, &config).unwrap();

        assert_eq!(node.innovation(), 3);
        assert_eq!(genome.check_integrity(), Ok(()));
    }

    #[test]
    fn mutate_node_addition_no_gene_found() {
        let config = unconnected(1, 1);
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(&config);
        assert_eq!(
            genome.mutate_add_node(&mut history, &config).unwrap_err(),
            NodeAdditionMutationError::EmptyGenome
        );
    }

    #[test]
    fn weighted_activation_choice() {
        let config = GeneticConfig {
            activation_types: vec![ActivationType::Gaussian, ActivationType::Sinusoidal],
            activation_weights: vec![0.0, 1.0],
            ..GeneticConfig::zero()
        };
        for _ in 0..20 {
            assert_eq!(
                NNGenome::random_activation_type(&config),
                ActivationType::Sinusoidal
            );
        }
    }

    #[test]
    fn genetic_distance() {
        let config = unconnected(2, 2);
        let mut first = NNGenome::new(&config);
        let mut second = NNGenome::new(&config);
        for (id, input, output) in [(0, 0, 2), (1, 0, 3), (2, 1, 2)] {
            first.add_gene(id, input, output, 0.5).unwrap();
        }
        for (id, input, output, weight) in [(0, 0, 2, 0.6), (1, 0, 3, 0.5), (2, 1, 2, 0.4), (3, 1, 3, 1.0)] {
            second.add_gene(id, input, output, weight).unwrap();
        }

        assert_approx_eq!(NNGenome::genetic_distance(&first, &second, &config), 1.02667, 1e-4);
        assert_approx_eq!(NNGenome::genetic_distance(&second, &first, &config), 1.02667, 1e-4);
        assert_eq!(NNGenome::genetic_distance(&first, &first, &config), 0.0);
    }

    #[test]
    fn populations_reject_invalid_genetic_configs() {
        use oxineat::{Population, PopulationConfig, PopulationError};

        let config = GeneticConfig {
            compatibility: CompatibilityCoefficients {
                excess: -1.0,
                disjoint: -1.0,
                matched: 0.4,
            },
            ..GeneticConfig::default()
        };
        let population = Population::<_, _, NNGenome>::new(
            PopulationConfig {
                size: NonZeroUsize::new(20).unwrap(),
                ..PopulationConfig::default()
            },
            config,
        );

        match population {
            Err(PopulationError::GeneticConfig(e)) => assert_eq!(
                e.downcast_ref::<GeneticConfigError>(),
                Some(&GeneticConfigError::Compatibility(
                    oxineat::ConfigError::InvalidCoefficient {
                        name: "excess",
                        value: -1.0
                    }
                ))
            ),
            _ => panic!("negative coefficients were accepted"),
        }
    }

    #[test]
    fn integrity_violations_detected() {
        let mut genome = NNGenome::new(&unconnected(1, 1));
        genome.genes.push(Gene::new(3, 0, 1, 1.0));
        genome.genes.push(Gene::new(2, 0, 1, 1.0));
        assert_eq!(
            genome.check_integrity(),
            Err(IntegrityError::UnsortedInnovations {
                previous: 3,
                next: 2
            })
        );

        genome.genes = vec![Gene::new(0, 0, 7, 1.0)];
        assert_eq!(
            genome.check_integrity(),
            Err(IntegrityError::DanglingGene { gene: 0, node: 7 })
        );

        genome.genes.clear();
        genome.nodes.reverse();
        assert_eq!(
            genome.check_integrity(),
            Err(IntegrityError::UnsortedNodes {
                previous: 1,
                next: 0
            })
        );
    }

    #[test]
    fn serde_round_trip() {
        let config = GeneticConfig {
            initial_expression_chance: 1.0,
            ..unconnected(2, 1)
        };
        let mut history = History::new(&config);
        let mut genome = NNGenome::new(&config);
        genome.mutate_add_node(&mut history, &config).unwrap();
        genome.set_fitness(4.5);

        let json = serde_json::to_string(&genome).unwrap();
        let restored: NNGenome = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, genome);
        assert_eq!(restored.check_integrity(), Ok(()));
    }
}
