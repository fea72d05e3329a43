//! # OxiNEAT-NN
//! An neural network-based implementation of the [`OxiNEAT` crate](https://crates.io/crates/oxineat)'s `Genome` trait.
//!
//! Provides an [`NNGenome`] type usable in `OxiNEAT` `Population`s, made of
//! node genes and link genes ordered by innovation number, along with the
//! [`History`] that keeps innovation numbers consistent across a run.
//!
//! [`NNGenome`]: crate::genomics::NNGenome
//! [`History`]: crate::genomics::History
//!
//! # Example usage: seeding and speciating a population
//! ```
//! use oxineat::{Population, PopulationConfig};
//! use oxineat_nn::genomics::{GeneticConfig, History, NNGenome};
//! use std::num::NonZeroUsize;
//!
//! let config = GeneticConfig {
//!     input_count: NonZeroUsize::new(3).unwrap(),
//!     output_count: NonZeroUsize::new(1).unwrap(),
//!     node_addition_mutation_chance: 1.0,
//!     ..GeneticConfig::default()
//! };
//!
//! // Seed the population with structurally varied genomes.
//! let mut history = History::new(&config);
//! let genomes = (0..30)
//!     .map(|i| {
//!         let mut genome = NNGenome::new(&config);
//!         for _ in 0..i % 3 {
//!             genome.mutate_all(&mut history, &config);
//!         }
//!         genome
//!     })
//!     .collect();
//!
//! let mut population = Population::from_genomes(
//!     genomes,
//!     history,
//!     PopulationConfig {
//!         size: NonZeroUsize::new(30).unwrap(),
//!         ..PopulationConfig::default()
//!     },
//!     config,
//! )
//! .unwrap();
//!
//! let report = population.speciate().unwrap();
//! assert!(report.surviving_species >= 1);
//! assert!((0..30).all(|i| population.species_of(i).is_some()));
//! ```

pub mod genomics;

pub use oxineat::Innovation;
