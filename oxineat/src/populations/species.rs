use crate::Genome;

use serde::{Deserialize, Serialize};

/// Species identifier. Species are numbered
/// in order of creation over the whole run, so
/// ordering species by ID orders them by age.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SpeciesID(pub usize);

/// Species are collections of reproductively
/// compatible (within a certain genetic distance)
/// genomes. Membership is determined by calculating
/// the genetic distance to a _representative_,
/// which is the founder of the species in its first
/// generation, and thereafter the best-performing
/// member of the previous generation.
///
/// Members are stored as indices into the
/// population's genome list; species never own
/// the genomes assigned to them.
///
/// Species will stagnate after enough generations
/// without improving their best fitness, and are
/// then subject to pruning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species<G> {
    id: SpeciesID,
    representative: G,
    pub(super) members: Vec<usize>,
    best_fitness_ever: f32,
    generations_since_improvement: usize,
}

impl<G: Genome + Clone> Species<G> {
    /// Creates a new species with the specified ID and
    /// representative. The founder, at `index` in the
    /// population's genome list, is its first member.
    ///
    /// # Examples
    /// ```
    /// use oxineat::{Genome, Species, SpeciesID};
    /// use oxineat_nn::genomics::{GeneticConfig, NNGenome};
    ///
    /// let species = Species::new(
    ///     SpeciesID(0),
    ///     NNGenome::new(&GeneticConfig::zero()),
    ///     0,
    /// );
    ///
    /// assert_eq!(species.members().collect::<Vec<_>>(), vec![0]);
    /// ```
    pub fn new(id: SpeciesID, representative: G, index: usize) -> Species<G> {
        Species {
            id,
            representative,
            members: vec![index],
            best_fitness_ever: 0.0,
            generations_since_improvement: 0,
        }
    }

    /// Returns the species' ID.
    pub fn id(&self) -> SpeciesID {
        self.id
    }

    /// Returns the species' representative.
    pub fn representative(&self) -> &G {
        &self.representative
    }

    /// Returns the genetic distance between the species'
    /// representative and `other`.
    pub fn genetic_distance(&self, other: &G, config: &G::Config) -> f32 {
        G::genetic_distance(&self.representative, other, config)
    }

    /// Adds the genome at `index` to the species if it lies
    /// strictly within `threshold` of the representative.
    /// Returns whether the genome was added; the species
    /// is left untouched otherwise.
    ///
    /// # Examples
    /// ```
    /// use oxineat::{Genome, Species, SpeciesID};
    /// use oxineat_nn::genomics::{GeneticConfig, NNGenome};
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     input_count: NonZeroUsize::new(2).unwrap(),
    ///     initial_expression_chance: 1.0,
    ///     weight_bound: 1.0,
    ///     ..GeneticConfig::default()
    /// };
    /// let founder = NNGenome::new(&config);
    /// let mut species = Species::new(SpeciesID(0), founder.clone(), 0);
    ///
    /// // An identical genome is at distance 0.
    /// assert!(species.try_add(1, &founder, 0.5, &config));
    /// // Nothing is strictly within a threshold of 0.
    /// assert!(!species.try_add(2, &founder, 0.0, &config));
    ///
    /// assert_eq!(species.len(), 2);
    /// ```
    pub fn try_add(&mut self, index: usize, genome: &G, threshold: f32, config: &G::Config) -> bool {
        if self.genetic_distance(genome, config) < threshold {
            self.members.push(index);
            true
        } else {
            false
        }
    }

    /// Adds the genome at `index` without a compatibility check.
    pub(super) fn add_member(&mut self, index: usize) {
        self.members.push(index);
    }

    /// Clears the species' members, keeping the
    /// representative and fitness records.
    pub fn reset_for_new_generation(&mut self) {
        self.members.clear();
    }

    /// Updates the species' fitness records with
    /// the best fitness achieved this generation.
    ///
    /// # Examples
    /// ```
    /// use oxineat::{Genome, Species, SpeciesID};
    /// use oxineat_nn::genomics::{GeneticConfig, NNGenome};
    ///
    /// let mut species = Species::new(
    ///     SpeciesID(0),
    ///     NNGenome::new(&GeneticConfig::zero()),
    ///     0,
    /// );
    ///
    /// species.record_generation_result(3.0);
    /// species.record_generation_result(2.0);
    /// species.record_generation_result(3.0);
    /// assert_eq!(species.best_fitness_ever(), 3.0);
    /// assert_eq!(species.generations_since_improvement(), 2);
    ///
    /// species.record_generation_result(3.5);
    /// assert_eq!(species.generations_since_improvement(), 0);
    /// ```
    pub fn record_generation_result(&mut self, best_fitness: f32) {
        if best_fitness > self.best_fitness_ever {
            self.best_fitness_ever = best_fitness;
            self.generations_since_improvement = 0;
        } else {
            self.generations_since_improvement += 1;
        }
    }

    /// Replaces the representative with a copy of the species'
    /// best-performing member. Does nothing for an empty species.
    pub fn elect_representative(&mut self, genomes: &[G]) {
        if let Some(champion) = self.champion(genomes) {
            self.representative = champion.clone();
        }
    }

    /// Returns the best-performing member, or `None`
    /// if the species has no members. Ties go to the
    /// earliest member.
    ///
    /// Member indices missing from `genomes` are skipped.
    pub fn champion<'a>(&self, genomes: &'a [G]) -> Option<&'a G> {
        self.members
            .iter()
            .filter_map(|i| genomes.get(*i))
            .fold(None, |best: Option<&G>, g| match best {
                Some(b) if b.fitness() >= g.fitness() => Some(b),
                _ => Some(g),
            })
    }

    /// Returns the species' _member-count adjusted_
    /// fitness. I.e., the average of the species'
    /// genome's fitnesses, or 0 if it has no members.
    ///
    /// Member indices missing from `genomes` are skipped.
    pub fn adjusted_fitness(&self, genomes: &[G]) -> f32 {
        let (sum, count) = self
            .members
            .iter()
            .filter_map(|i| genomes.get(*i))
            .fold((0.0, 0), |(sum, count), g| (sum + g.fitness(), count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    /// Returns the highest fitness the species has ever achieved.
    pub fn best_fitness_ever(&self) -> f32 {
        self.best_fitness_ever
    }

    /// Returns the number of consecutive generations
    /// without an improvement of the best fitness.
    pub fn generations_since_improvement(&self) -> usize {
        self.generations_since_improvement
    }

    /// Whether the species has gone longer than
    /// `stagnation_limit` generations without improving.
    pub fn is_stagnant(&self, stagnation_limit: usize) -> bool {
        self.generations_since_improvement > stagnation_limit
    }

    /// Returns an iterator over the indices of the
    /// species' members in the population's genome list.
    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }

    /// Whether `index` is a member of the species.
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the species has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
