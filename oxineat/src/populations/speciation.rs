//! Assignment of genomes to species.
//!
//! A [`SpeciationStrategy`] partitions a generation's genomes
//! into species, and decides which species survive into the
//! next generation. [`ThresholdSpeciation`] implements the
//! original NEAT scheme, with a self-adjusting threshold.
use super::config::{PopulationConfig, SpeciesCountBand};
use super::errors::SpeciationError;
use super::species::{Species, SpeciesID};
use crate::Genome;

use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A way of partitioning genomes into species.
pub trait SpeciationStrategy<G: Genome> {
    /// Assigns each genome of `genomes` to a species in `species`,
    /// creating and removing species as needed.
    ///
    /// On success, every surviving species is non-empty and
    /// `species` is ordered by creation.
    ///
    /// # Errors
    /// Returns an error, leaving `species` untouched, if the
    /// genomes violate a precondition of the strategy.
    fn speciate(
        &mut self,
        genomes: &[G],
        species: &mut Vec<Species<G>>,
        config: &G::Config,
        generation: usize,
    ) -> Result<SpeciationReport, SpeciationError>;

    /// The current compatibility threshold, if the
    /// strategy uses one.
    fn compatibility_threshold(&self) -> Option<f32> {
        None
    }
}

/// Steps of a speciation pass, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeciationPhase {
    /// Species members are cleared.
    Reset,
    /// Genomes are assigned to species.
    Assign,
    /// The threshold is moved toward the target species count.
    AdaptThreshold,
    /// Empty and stagnant species are removed.
    Prune,
    /// Species are ready for reproduction.
    Done,
}

/// Direction of a threshold adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdAdjustment {
    Raised,
    Lowered,
    Unchanged,
}

/// Summary of a speciation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciationReport {
    pub generation: usize,
    /// Species holding members after assignment.
    pub active_species: usize,
    /// Species surviving the pass.
    pub surviving_species: usize,
    pub created: Vec<SpeciesID>,
    pub pruned_empty: Vec<SpeciesID>,
    pub pruned_stagnant: Vec<SpeciesID>,
    /// Threshold to be used in the next pass.
    pub threshold: f32,
    pub adjustment: ThresholdAdjustment,
}

/// The original NEAT speciation scheme.
///
/// Genomes are considered in order, and each joins the
/// first (oldest) species whose representative is within
/// the compatibility threshold. A genome compatible with
/// no species founds a new one, which later genomes of the
/// same pass may join.
///
/// After assignment, the threshold is nudged to keep the
/// number of species within the [target band], and
/// species that are empty or have [stagnated] are removed.
/// The species holding the population champion is never
/// removed for stagnation.
///
/// Since representatives are re-elected every pass, the
/// same genomes may be partitioned differently on the next
/// pass: once a fitter member becomes the representative,
/// members that were only compatible with the founder
/// found a species of their own.
///
/// [target band]: PopulationConfig::target_species
/// [stagnated]: PopulationConfig::stagnation_limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdSpeciation {
    threshold: f32,
    min_threshold: f32,
    threshold_step: f32,
    target_species: SpeciesCountBand,
    stagnation_limit: usize,
    parallel_assignment: bool,
    species_created: usize,
    phase: SpeciationPhase,
}

impl ThresholdSpeciation {
    /// Creates a strategy with the speciation settings
    /// of `config`. The config is assumed to be valid.
    ///
    /// # Examples
    /// ```
    /// use oxineat::{PopulationConfig, ThresholdSpeciation, SpeciationPhase};
    ///
    /// let strategy = ThresholdSpeciation::new(&PopulationConfig::default());
    ///
    /// assert_eq!(strategy.threshold(), 3.0);
    /// assert_eq!(strategy.phase(), SpeciationPhase::Done);
    /// ```
    pub fn new(config: &PopulationConfig) -> ThresholdSpeciation {
        ThresholdSpeciation {
            threshold: config.distance_threshold,
            min_threshold: config.min_threshold,
            threshold_step: config.threshold_step,
            target_species: config.target_species,
            stagnation_limit: config.stagnation_limit,
            parallel_assignment: config.parallel_assignment,
            species_created: 0,
            phase: SpeciationPhase::Done,
        }
    }

    /// Returns the current compatibility threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns the phase the last pass reached.
    pub fn phase(&self) -> SpeciationPhase {
        self.phase
    }

    /// Returns the number of species created over the run.
    pub fn species_created(&self) -> usize {
        self.species_created
    }

    fn enter(&mut self, phase: SpeciationPhase) {
        trace!("speciation phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Checks the pass preconditions before anything is mutated.
    fn check_preconditions<G: Genome>(genomes: &[G]) -> Result<(), SpeciationError> {
        if genomes.is_empty() {
            return Err(SpeciationError::EmptyPopulation);
        }
        for (index, genome) in genomes.iter().enumerate() {
            genome
                .check_integrity()
                .map_err(|source| SpeciationError::MalformedGenome { index, source })?;
            if genome.fitness().is_nan() {
                return Err(SpeciationError::UncomparableFitness { index });
            }
        }
        Ok(())
    }

    /// Assigns every genome to the first compatible species,
    /// founding new species as needed. Returns the IDs of
    /// new species.
    fn assign<G>(
        &mut self,
        genomes: &[G],
        species: &mut Vec<Species<G>>,
        config: &G::Config,
    ) -> Vec<SpeciesID>
    where
        G: Genome + Clone + Sync,
        G::Config: Sync,
    {
        let mut created = vec![];
        for (index, genome) in genomes.iter().enumerate() {
            let joined = if self.parallel_assignment {
                match Self::first_compatible(genome, species, self.threshold, config) {
                    Some(s) => {
                        species[s].add_member(index);
                        true
                    }
                    None => false,
                }
            } else {
                species
                    .iter_mut()
                    .any(|s| s.try_add(index, genome, self.threshold, config))
            };

            if !joined {
                let id = SpeciesID(self.species_created);
                self.species_created += 1;
                debug!("genome {} founded species {:?}", index, id);
                species.push(Species::new(id, genome.clone(), index));
                created.push(id);
            }
        }
        created
    }

    /// Finds the oldest species compatible with `genome`,
    /// evaluating distances in parallel.
    fn first_compatible<G>(
        genome: &G,
        species: &[Species<G>],
        threshold: f32,
        config: &G::Config,
    ) -> Option<usize>
    where
        G: Genome + Clone + Sync,
        G::Config: Sync,
    {
        species
            .par_iter()
            .position_first(|s| s.genetic_distance(genome, config) < threshold)
    }

    /// Moves the threshold toward the target species count.
    fn adapt_threshold(&mut self, active_species: usize) -> ThresholdAdjustment {
        if self.target_species.contains(active_species) {
            ThresholdAdjustment::Unchanged
        } else if active_species > self.target_species.max {
            self.threshold += self.threshold_step;
            debug!(
                "{} species above target {:?}, raising threshold to {}",
                active_species, self.target_species, self.threshold
            );
            ThresholdAdjustment::Raised
        } else {
            let lowered = (self.threshold - self.threshold_step).max(self.min_threshold);
            if lowered == self.threshold {
                return ThresholdAdjustment::Unchanged;
            }
            self.threshold = lowered;
            debug!(
                "{} species below target {:?}, lowering threshold to {}",
                active_species, self.target_species, self.threshold
            );
            ThresholdAdjustment::Lowered
        }
    }

    /// Removes empty species, and stagnant ones other than
    /// the species holding the population champion.
    /// Returns the IDs of the removed empty and stagnant species.
    fn prune<G: Genome + Clone>(
        &self,
        genomes: &[G],
        species: &mut Vec<Species<G>>,
    ) -> (Vec<SpeciesID>, Vec<SpeciesID>) {
        let champion = population_champion(genomes);
        let mut empty = vec![];
        let mut stagnant = vec![];
        species.retain(|s| {
            if s.is_empty() {
                empty.push(s.id());
                false
            } else if s.is_stagnant(self.stagnation_limit)
                && !champion.map_or(false, |c| s.contains(c))
            {
                debug!(
                    "pruning species {:?}, stagnant for {} generations",
                    s.id(),
                    s.generations_since_improvement()
                );
                stagnant.push(s.id());
                false
            } else {
                true
            }
        });
        (empty, stagnant)
    }
}

impl<G> SpeciationStrategy<G> for ThresholdSpeciation
where
    G: Genome + Clone + Sync,
    G::Config: Sync,
{
    fn speciate(
        &mut self,
        genomes: &[G],
        species: &mut Vec<Species<G>>,
        config: &G::Config,
        generation: usize,
    ) -> Result<SpeciationReport, SpeciationError> {
        Self::check_preconditions(genomes)?;

        self.enter(SpeciationPhase::Reset);
        species.iter_mut().for_each(Species::reset_for_new_generation);

        self.enter(SpeciationPhase::Assign);
        let created = self.assign(genomes, species, config);
        for s in species.iter_mut().filter(|s| !s.is_empty()) {
            let best = s.champion(genomes).map_or(0.0, |g| g.fitness());
            s.record_generation_result(best);
        }
        let active_species = species.iter().filter(|s| !s.is_empty()).count();

        self.enter(SpeciationPhase::AdaptThreshold);
        let adjustment = self.adapt_threshold(active_species);

        self.enter(SpeciationPhase::Prune);
        let (pruned_empty, pruned_stagnant) = self.prune(genomes, species);

        for s in species.iter_mut() {
            s.elect_representative(genomes);
        }
        self.enter(SpeciationPhase::Done);

        Ok(SpeciationReport {
            generation,
            active_species,
            surviving_species: species.len(),
            created,
            pruned_empty,
            pruned_stagnant,
            threshold: self.threshold,
            adjustment,
        })
    }

    fn compatibility_threshold(&self) -> Option<f32> {
        Some(self.threshold)
    }
}

/// Returns the index of the fittest genome,
/// the earliest one in case of ties.
pub(super) fn population_champion<G: Genome>(genomes: &[G]) -> Option<usize> {
    genomes
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, g)| match best {
            Some((_, f)) if f >= g.fitness() => best,
            _ => Some((i, g.fitness())),
        })
        .map(|(i, _)| i)
}
