//! An implementation of NeuroEvolution of Augmenting Topologies,
//! following the 2002 paper: <http://nn.cs.utexas.edu/keyword?stanley:ec02>,
//! centered on the speciation of evolving populations.
//!
//! Genomes are grouped into species by genetic distance, species are
//! tracked across generations, and the compatibility threshold is
//! adapted each generation to keep the number of species inside a
//! target band. Stagnant species are pruned, except the one holding
//! the population champion.
//!
//! It is designed to be highly-configurable, allowing arbitrary user-defined
//! genomic structures via the `Genome` trait, and arbitrary speciation
//! schemes via the `SpeciationStrategy` trait. Reproduction is left to the
//! caller, which receives the species and their offspring allotments.
//! A neural network-based genome representation, as in the original
//! algorithm, is supplied via the [`OxiNEAT-NN`](https://crates.io/crates/oxineat-nn) crate.
//!
//! This is still very much a work-in-progress, so interfaces and implementations
//! may change in the future.
//!
//! # Example usage: evolving weights towards a target, using `OxiNEAT-NN`
//! ```
//! use oxineat::{Genome, Population, PopulationConfig};
//! use oxineat_nn::genomics::{GeneticConfig, NNGenome};
//! use std::num::NonZeroUsize;
//!
//! // Every gene should have a weight of 1.
//! fn evaluate(genome: &NNGenome) -> f32 {
//!     genome
//!         .genes()
//!         .map(|g| 5.0 - (g.weight() - 1.0).abs())
//!         .sum::<f32>()
//!         .max(0.0)
//! }
//!
//! fn main() {
//!     let genetic_config = GeneticConfig {
//!         input_count: NonZeroUsize::new(2).unwrap(),
//!         output_count: NonZeroUsize::new(1).unwrap(),
//!         ..GeneticConfig::default()
//!     };
//!
//!     let population_config = PopulationConfig {
//!         size: NonZeroUsize::new(50).unwrap(),
//!         distance_threshold: 1.0,
//!         ..PopulationConfig::default()
//!     };
//!
//!     let mut population =
//!         Population::<_, _, NNGenome>::new(population_config, genetic_config).unwrap();
//!     for _ in 0..10 {
//!         population.evaluate_fitness(evaluate);
//!         let step = population.evolve(|species, allotted, genomes, history, config| {
//!             let mut offspring = vec![];
//!             for (s, &n) in species.iter().zip(allotted) {
//!                 let parent = s.champion(genomes).unwrap();
//!                 for _ in 0..n {
//!                     let mut child = parent.clone();
//!                     child.mutate_all(history, config);
//!                     offspring.push(child);
//!                 }
//!             }
//!             offspring
//!         });
//!         match step {
//!             Ok(report) => println!(
//!                 "generation {}: {} species",
//!                 report.generation, report.surviving_species
//!             ),
//!             Err(e) => {
//!                 eprintln!("{}", e);
//!                 break;
//!             }
//!         }
//!     }
//! }
//! ```

pub mod compatibility;
mod errors;
mod genome;
mod populations;
#[cfg(test)]
mod test_genome;

pub use compatibility::CompatibilityCoefficients;
pub use errors::{ConfigError, IntegrityError};
pub use genome::*;
pub use populations::*;
