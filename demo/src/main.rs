//! Evolves genomes whose expressed genes should all carry
//! a target weight, logging the speciation of every generation.
//!
//! Usage: `demo [config.ron]`. Set `RUST_LOG=debug` to follow
//! species creation and pruning, `RUST_LOG=trace` for every
//! speciation phase and innovation.
use hyperneat::{cppn_config, HyperNeatGenome};
use oxineat::{Genome, Population, PopulationConfig, PopulationError, Species};
use oxineat_nn::genomics::{GeneticConfig, History, NNGenome};

use log::{error, info, warn};
use rand::seq::SliceRandom;
use serde::Deserialize;

use std::{env, fs, io, process};

const DEFAULT_CONFIG: &str = "demo/config.ron";

#[derive(Debug, Deserialize)]
struct DemoConfig {
    population: PopulationConfig,
    genetic: GeneticConfig,
    /// Evolve CPPNs instead of plain networks.
    cppn: bool,
    generations: usize,
    target_weight: f32,
    /// Fraction of each species allowed to reproduce.
    survival_threshold: f32,
    solved_fitness: f32,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("could not read config file: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse config file: {0}")]
    Ron(#[from] ron::Error),
    #[error(transparent)]
    Population(#[from] PopulationError),
}

/// Genomes the demo knows how to reproduce.
trait Offspring:
    Genome<Config = GeneticConfig, InnovationHistory = History> + Clone + Send + Sync
{
    fn network(&self) -> &NNGenome;
    fn mutate(&mut self, history: &mut History, config: &GeneticConfig);
}

impl Offspring for NNGenome {
    fn network(&self) -> &NNGenome {
        self
    }

    fn mutate(&mut self, history: &mut History, config: &GeneticConfig) {
        self.mutate_all(history, config);
    }
}

impl Offspring for HyperNeatGenome {
    fn network(&self) -> &NNGenome {
        self
    }

    fn mutate(&mut self, history: &mut History, config: &GeneticConfig) {
        self.mutate_all(history, config);
    }
}

/// Mean closeness of the expressed gene weights
/// to `target`, in `[0, 1]`.
fn weight_matching(genome: &NNGenome, target: f32, weight_bound: f32) -> f32 {
    let span = 2.0 * weight_bound.max(f32::EPSILON);
    let (sum, count) = genome
        .genes()
        .filter(|g| g.enabled())
        .fold((0.0, 0), |(sum, count), g| {
            (sum + (1.0 - (g.weight() - target).abs() / span).max(0.0), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

/// Each species' champion is carried over unchanged; the rest
/// of its allotment are mutated copies of its fittest members.
fn reproduce<G: Offspring>(
    species: &[Species<G>],
    allotted: &[usize],
    genomes: &[G],
    history: &mut History,
    config: &GeneticConfig,
    survival_threshold: f32,
) -> Vec<G> {
    let mut rng = rand::thread_rng();
    let mut offspring = Vec::with_capacity(allotted.iter().sum());
    for (s, &count) in species.iter().zip(allotted) {
        let mut members: Vec<&G> = s.members().filter_map(|i| genomes.get(i)).collect();
        members.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        let survivors = ((members.len() as f32 * survival_threshold).ceil() as usize).max(1);
        members.truncate(survivors);

        let Some(champion) = members.first() else {
            continue;
        };
        if count > 0 {
            offspring.push((*champion).clone());
        }
        for _ in 1..count {
            if let Some(parent) = members.choose(&mut rng) {
                let mut child = (*parent).clone();
                child.mutate(history, config);
                offspring.push(child);
            }
        }
    }
    offspring
}

fn run<G: Offspring>(config: &DemoConfig, genetic_config: GeneticConfig) -> Result<(), DemoError> {
    let mut population = Population::<_, _, G>::new(config.population.clone(), genetic_config)?;
    let target = config.target_weight;
    let weight_bound = population.genetic_config().weight_bound;
    let survival_threshold = config.survival_threshold;

    for _ in 0..config.generations {
        population.evaluate_fitness_parallel(|g| weight_matching(g.network(), target, weight_bound));
        let best = population.champion().fitness();
        if best >= config.solved_fitness {
            info!(
                "solved at generation {} with fitness {:.4}",
                population.generation(),
                best
            );
            info!("champion: {}", ron::to_string(population.champion().network())?);
            return Ok(());
        }

        let step = population.evolve(|species, allotted, genomes, history, genetic_config| {
            reproduce(species, allotted, genomes, history, genetic_config, survival_threshold)
        });
        match step {
            Ok(report) => info!(
                "generation {}: {} species ({} new, {} stagnant pruned), threshold {:.3} ({:?}), best fitness {:.4}",
                report.generation,
                report.surviving_species,
                report.created.len(),
                report.pruned_stagnant.len(),
                report.threshold,
                report.adjustment,
                best,
            ),
            Err(PopulationError::OffspringAllotment(e)) => {
                warn!("{}, resetting population", e);
                population.reset();
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        "no solution after {} generations, best fitness {:.4}",
        config.generations,
        population.champion().fitness()
    );
    Ok(())
}

fn try_main() -> Result<(), DemoError> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config: DemoConfig = ron::from_str(&fs::read_to_string(&path)?)?;
    info!("loaded configuration from {}", path);

    if config.cppn {
        let genetic_config = cppn_config(
            config.genetic.clone(),
            config.genetic.initial_expression_chance,
        );
        run::<HyperNeatGenome>(&config, genetic_config)
    } else {
        run::<NNGenome>(&config, config.genetic.clone())
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = try_main() {
        error!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxineat::SpeciesID;
    use std::num::NonZeroUsize;

    fn genetic_config() -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::new(2).unwrap(),
            output_count: NonZeroUsize::new(1).unwrap(),
            ..GeneticConfig::default()
        }
    }

    #[test]
    fn bundled_config_parses() {
        let config: DemoConfig = ron::from_str(include_str!("../config.ron")).unwrap();
        assert_eq!(config.population.validate(), Ok(()));
        assert_eq!(config.genetic.validate(), Ok(()));
    }

    #[test]
    fn perfect_weights_score_one() {
        let config = GeneticConfig {
            initial_expression_chance: 0.0,
            ..genetic_config()
        };
        let mut genome = NNGenome::new(&config);
        // Sensors 0, 1 and bias 2; output 3.
        for id in [0, 1, 2] {
            genome.add_gene(id, id, 3, 1.5).unwrap();
        }
        assert_eq!(weight_matching(&genome, 1.5, config.weight_bound), 1.0);
        assert_eq!(weight_matching(&NNGenome::new(&GeneticConfig::zero()), 1.5, 5.0), 0.0);
    }

    #[test]
    fn reproduction_fills_allotment() {
        let config = genetic_config();
        let mut history = History::new(&config);
        let genomes: Vec<NNGenome> = (0..4)
            .map(|i| {
                let mut genome = NNGenome::new(&config);
                genome.set_fitness(i as f32);
                genome
            })
            .collect();
        let species = vec![Species::new(SpeciesID(0), genomes[3].clone(), 3)];

        let offspring = reproduce(&species, &[5], &genomes, &mut history, &config, 0.5);

        assert_eq!(offspring.len(), 5);
        assert_eq!(offspring[0], genomes[3]);
    }
}
