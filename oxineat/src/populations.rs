//! A Population is a collection of genomes.
//! These are grouped into species, which can
//! be evolved using a genome evaluation function
//! as the source of selective pressure.
//!
//! Reproduction is left to the caller: the population
//! speciates its genomes, hands out the species and
//! their offspring allotments, and takes back the
//! next generation.
mod config;
mod errors;
mod speciation;
mod species;

use crate::{Genome, InnovationHistory};
pub use config::{PopulationConfig, SpeciesCountBand};
pub use errors::{OffspringAllotmentError, PopulationError, SpeciationError};
pub use speciation::{
    SpeciationPhase, SpeciationReport, SpeciationStrategy, ThresholdAdjustment,
    ThresholdSpeciation,
};
pub use species::{Species, SpeciesID};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A population of genomes.
#[derive(Serialize, Deserialize)]
pub struct Population<C, H, G, S = ThresholdSpeciation> {
    genomes: Vec<G>,
    species: Vec<Species<G>>,
    membership: Vec<Option<SpeciesID>>,
    strategy: S,
    history: H,
    generation: usize,
    population_config: PopulationConfig,
    genetic_config: C,
}

impl<C, H, G> Population<C, H, G>
where
    G: Genome<InnovationHistory = H, Config = C> + Clone + Sync,
    H: InnovationHistory<Config = C>,
    C: Sync,
{
    /// Creates a new population of randomized genomes using
    /// the passed configurations, speciated with a
    /// [`ThresholdSpeciation`].
    ///
    /// The type of `genetic_config` depends on the implementation
    /// of [`Genome`], and is effectively opaque to the population.
    ///
    /// The population is not speciated until [`speciate`]
    /// is first called.
    ///
    /// # Errors
    /// Returns an error if either config is invalid.
    ///
    /// [`Genome`]: crate::Genome
    /// [`speciate`]: Population::speciate
    ///
    /// # Examples
    /// ```
    /// # use oxineat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use oxineat::{Population, PopulationConfig};
    ///
    /// let pop_config = PopulationConfig {
    ///     // Set desired configuration
    ///     ..PopulationConfig::default()
    /// };
    /// # let genetic_config = GeneticConfig::default();
    ///
    /// // With `G` a suitable type implementing `Genome`...
    /// let population = Population::<_, _, G>::new(pop_config, genetic_config).unwrap();
    /// assert_eq!(population.genomes().count(), 150);
    /// ```
    pub fn new(
        population_config: PopulationConfig,
        genetic_config: C,
    ) -> Result<Population<C, H, G>, PopulationError> {
        validate_configs::<G>(&population_config, &genetic_config)?;
        let genomes = (0..population_config.size.get())
            .map(|_| G::new(&genetic_config))
            .collect();
        let history = H::new(&genetic_config);
        let strategy = ThresholdSpeciation::new(&population_config);
        Population::with_strategy(genomes, strategy, history, population_config, genetic_config)
    }

    /// Creates a population from existing genomes, e.g. seed
    /// genomes or genomes loaded from storage, along with the
    /// innovation history they were produced with.
    ///
    /// # Errors
    /// Returns an error if either config is invalid, or
    /// if `genomes` is empty.
    pub fn from_genomes(
        genomes: Vec<G>,
        history: H,
        population_config: PopulationConfig,
        genetic_config: C,
    ) -> Result<Population<C, H, G>, PopulationError> {
        let strategy = ThresholdSpeciation::new(&population_config);
        Population::with_strategy(genomes, strategy, history, population_config, genetic_config)
    }

    /// Resets the population to an initial randomized state,
    /// including the innovation history and the strategy's
    /// adjusted threshold. Used primarily in case of population
    /// degeneration, e.g. when all genomes have a fitness score of 0.
    ///
    /// # Examples
    /// ```
    /// # use oxineat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use oxineat::{Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig::default();
    /// // With `G` a suitable type implementing `Genome`...
    /// let mut population = Population::<_, _, G>::new(
    ///     PopulationConfig::default(),
    ///     genetic_config,
    /// ).unwrap();
    ///
    /// // Evolve the population on some task, until
    /// // population.evolve() returns an Err.
    /// population.reset();
    /// assert_eq!(population.generation(), 0);
    /// ```
    pub fn reset(&mut self) {
        info!("resetting population at generation {}", self.generation);
        self.genomes = (0..self.population_config.size.get())
            .map(|_| G::new(&self.genetic_config))
            .collect();
        self.membership = vec![None; self.genomes.len()];
        self.species.clear();
        self.history.reset(&self.genetic_config);
        self.strategy = ThresholdSpeciation::new(&self.population_config);
        self.generation = 0;
    }
}

impl<C, H, G, S> Population<C, H, G, S>
where
    G: Genome<InnovationHistory = H, Config = C> + Clone,
    H: InnovationHistory<Config = C>,
    S: SpeciationStrategy<G>,
{
    /// Creates a population from existing genomes, using
    /// a custom speciation strategy.
    ///
    /// # Errors
    /// Returns an error if either config is invalid, or
    /// if `genomes` is empty.
    pub fn with_strategy(
        genomes: Vec<G>,
        strategy: S,
        history: H,
        population_config: PopulationConfig,
        genetic_config: C,
    ) -> Result<Population<C, H, G, S>, PopulationError> {
        validate_configs::<G>(&population_config, &genetic_config)?;
        if genomes.is_empty() {
            return Err(SpeciationError::EmptyPopulation.into());
        }
        Ok(Population {
            membership: vec![None; genomes.len()],
            genomes,
            species: vec![],
            strategy,
            history,
            generation: 0,
            population_config,
            genetic_config,
        })
    }

    /// Evaluates the fitness of each genome in the
    /// population using the passed evaluator.
    ///
    /// The return value of the evaluation function
    /// should be positive.
    ///
    /// # Panics
    /// Panics if the evaluator returns a negative value.
    ///
    /// # Examples
    /// ```
    /// # use oxineat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use oxineat::{Genome, Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig::default();
    /// let mut population = Population::<_, _, G>::new(
    ///     PopulationConfig::default(),
    ///     genetic_config,
    /// ).unwrap();
    ///
    /// population.evaluate_fitness(|g| {
    ///     // Compute genome's fitness...
    ///     g.genes().map(|gene| gene.weight().abs()).sum()
    /// });
    /// ```
    pub fn evaluate_fitness<E>(&mut self, mut evaluator: E)
    where
        E: FnMut(&G) -> f32,
    {
        for genome in &mut self.genomes {
            let fitness = evaluator(genome);
            assert!(fitness >= 0.0, "fitness function returned a negative value");
            genome.set_fitness(fitness);
        }
    }

    /// Evaluates the fitness of each genome in parallel.
    ///
    /// # Panics
    /// Panics if the evaluator returns a negative value.
    pub fn evaluate_fitness_parallel<E>(&mut self, evaluator: E)
    where
        E: Fn(&G) -> f32 + Sync,
        G: Send,
    {
        self.genomes.par_iter_mut().for_each(|genome| {
            let fitness = evaluator(genome);
            assert!(fitness >= 0.0, "fitness function returned a negative value");
            genome.set_fitness(fitness);
        });
    }

    /// Partitions the current genomes into species.
    ///
    /// This is the hand-off point to reproduction: once it
    /// returns, [`species`] lists the surviving species in
    /// order of creation, each with its members and records.
    ///
    /// # Errors
    /// Returns an error if the genomes violate a precondition
    /// of the speciation strategy, in which case the population
    /// is left unchanged.
    ///
    /// [`species`]: Population::species
    pub fn speciate(&mut self) -> Result<SpeciationReport, SpeciationError> {
        let report = self.strategy.speciate(
            &self.genomes,
            &mut self.species,
            &self.genetic_config,
            self.generation,
        )?;

        self.membership = vec![None; self.genomes.len()];
        for s in &self.species {
            for i in s.members() {
                self.membership[i] = Some(s.id());
            }
        }

        debug!(
            "generation {}: {} species, {} created, {} pruned, threshold {:?}",
            self.generation,
            report.surviving_species,
            report.created.len(),
            report.pruned_empty.len() + report.pruned_stagnant.len(),
            self.strategy.compatibility_threshold(),
        );
        Ok(report)
    }

    /// Replaces the current genomes with the next generation.
    ///
    /// Species keep their representatives and records, but
    /// lose their members until the next [`speciate`] call.
    ///
    /// # Errors
    /// Returns an error if `offspring` is empty, in which case
    /// the population is left unchanged.
    ///
    /// [`speciate`]: Population::speciate
    pub fn next_generation(&mut self, offspring: Vec<G>) -> Result<(), SpeciationError> {
        if offspring.is_empty() {
            return Err(SpeciationError::EmptyPopulation);
        }
        self.species
            .iter_mut()
            .for_each(Species::reset_for_new_generation);
        self.membership = vec![None; offspring.len()];
        self.genomes = offspring;
        self.generation += 1;
        Ok(())
    }

    /// Runs one generation step: speciates the evaluated
    /// genomes, allots offspring to each species, and
    /// replaces the genomes with those produced by `reproduce`.
    ///
    /// `reproduce` receives the surviving species, their
    /// allotted offspring counts (in the same order), the
    /// current genomes, the innovation history and the
    /// genetic config.
    ///
    /// # Errors
    /// Returns an error if speciation fails, if the population
    /// has become degenerate (zero total fitness), or if no
    /// offspring are produced.
    pub fn evolve<R>(&mut self, reproduce: R) -> Result<SpeciationReport, PopulationError>
    where
        R: FnOnce(&[Species<G>], &[usize], &[G], &mut H, &C) -> Vec<G>,
    {
        let report = self.speciate()?;
        let allotted_offspring = self.allot_offspring()?;
        let offspring = reproduce(
            &self.species,
            &allotted_offspring,
            &self.genomes,
            &mut self.history,
            &self.genetic_config,
        );
        self.next_generation(offspring)?;
        Ok(report)
    }

    /// Allots the number of offspring for each species,
    /// in proportion to its adjusted fitness, so that the
    /// total matches the configured population size.
    ///
    /// # Errors
    ///
    /// Returns an error if the total adjusted fitness is 0.
    pub fn allot_offspring(&self) -> Result<Vec<usize>, OffspringAllotmentError> {
        let fitnesses: Vec<f32> = self
            .species
            .iter()
            .map(|s| s.adjusted_fitness(&self.genomes))
            .collect();
        let fitness_sum: f32 = fitnesses.iter().sum();
        if fitness_sum <= 0.0 || !fitness_sum.is_finite() {
            return Err(OffspringAllotmentError::DegeneratePopulation);
        }
        let size = self.population_config.size.get() as f32;
        Ok(round_retain_sum(
            &fitnesses
                .iter()
                .map(|f| f / fitness_sum * size)
                .collect::<Vec<_>>(),
        ))
    }

    /// Returns the currently best-performing genome.
    ///
    /// # Examples
    /// ```
    /// # use oxineat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use oxineat::{Genome, Population, PopulationConfig};
    /// use std::num::NonZeroUsize;
    ///
    /// # let genetic_config = GeneticConfig::default();
    /// // With `G` a suitable type implementing `Genome`...
    /// let mut population = Population::<_, _, G>::new(
    ///     PopulationConfig {
    ///         size: NonZeroUsize::new(20).unwrap(),
    ///         ..PopulationConfig::default()
    ///     },
    ///     genetic_config,
    /// ).unwrap();
    ///
    /// let mut fitness = 0.0;
    /// population.evaluate_fitness(move |_| {
    ///     fitness += 10.0;
    ///     fitness
    /// });
    ///
    /// assert_eq!(population.champion().fitness(), 20.0 * 10.0);
    /// ```
    pub fn champion(&self) -> &G {
        // Populations are never empty.
        &self.genomes[speciation::population_champion(&self.genomes).unwrap_or(0)]
    }

    /// Returns an iterator over all current genomes,
    /// in the order they are speciated.
    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.genomes.iter()
    }

    /// Returns the genome at `index`.
    pub fn genome(&self, index: usize) -> Option<&G> {
        self.genomes.get(index)
    }

    /// Returns an iterator over all current species,
    /// in order of creation.
    ///
    /// # Examples
    /// ```
    /// # use oxineat_nn::genomics::{GeneticConfig, NNGenome as G};
    /// use oxineat::{Population, PopulationConfig};
    ///
    /// # let genetic_config = GeneticConfig::default();
    /// // With `G` a suitable type implementing `Genome`...
    /// let mut population = Population::<_, _, G>::new(
    ///     PopulationConfig::default(),
    ///     genetic_config,
    /// ).unwrap();
    /// population.speciate().unwrap();
    ///
    /// for species in population.species() {
    ///     println!(
    ///         "Species {:?} contains genomes {:?}",
    ///         species.id(),
    ///         species.members().collect::<Vec<_>>()
    ///     );
    /// }
    /// ```
    pub fn species(&self) -> impl Iterator<Item = &Species<G>> {
        self.species.iter()
    }

    /// Returns the ID of the species the genome at `index`
    /// was assigned to in the last speciation, or `None` if
    /// it has not been speciated or its species was pruned.
    pub fn species_of(&self, index: usize) -> Option<SpeciesID> {
        self.membership.get(index).copied().flatten()
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the population's innovation history.
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Returns the population's innovation history, for
    /// use in mutations performed outside the population.
    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// Returns the speciation strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Returns the current compatibility threshold, if the
    /// strategy uses one.
    pub fn compatibility_threshold(&self) -> Option<f32> {
        self.strategy.compatibility_threshold()
    }

    /// Returns the population configuration.
    pub fn population_config(&self) -> &PopulationConfig {
        &self.population_config
    }

    /// Returns the genetic configuration.
    pub fn genetic_config(&self) -> &C {
        &self.genetic_config
    }
}

fn validate_configs<G: Genome>(
    population_config: &PopulationConfig,
    genetic_config: &G::Config,
) -> Result<(), PopulationError> {
    population_config.validate()?;
    G::validate_config(genetic_config).map_err(|e| PopulationError::GeneticConfig(Box::new(e)))
}

/// Rounds all values to positive whole numbers
/// while preserving their order and sum, assuming it is also whole.
/// Rounding is done in the manner that minimizes
/// the average error to the original set of values.
fn round_retain_sum(values: &[f32]) -> Vec<usize> {
    let total_sum = values.iter().sum::<f32>().round() as usize;
    let mut truncated: Vec<(usize, usize, f32)> = values
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let u = f.floor();
            (i, u as usize, f - u)
        })
        .collect();
    let truncated_sum: usize = truncated.iter().map(|(_, u, _)| *u).sum();
    let remainder = total_sum.saturating_sub(truncated_sum).min(truncated.len());
    // Sort in decreasing order of error
    truncated.sort_by(|a, b| b.2.total_cmp(&a.2));
    for (_, u, _) in &mut truncated[..remainder] {
        *u += 1;
    }
    truncated.sort_by_key(|(i, ..)| *i);
    truncated.iter().map(|(_, u, _)| *u).collect()
}
