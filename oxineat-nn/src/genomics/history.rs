use crate::genomics::GeneticConfig;
use crate::Innovation;

use ahash::RandomState;
use log::trace;
use oxineat::InnovationHistory;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::collections::hash_map::{Entry, HashMap};

type GeneInnovations = HashMap<(Innovation, Innovation), Innovation, RandomState>;

/// Innovation record of a run. Identical structural
/// mutations made by different genomes receive the same
/// innovation numbers, which is what lets genes be aligned
/// when computing genetic distances.
///
/// Genes are keyed by their `(input, output)` endpoints.
/// Splits are keyed by the split gene and record
/// `(input gene, new node, output gene)`.
///
/// One history is shared by a whole population, and only
/// [`reset`] along with it.
///
/// [`reset`]: oxineat::InnovationHistory::reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    next_gene_innovation: Innovation,
    next_node_innovation: Innovation,
    #[serde(
        serialize_with = "serialize_gene_innovations",
        deserialize_with = "deserialize_gene_innovations"
    )]
    gene_innovations: GeneInnovations,
    node_innovations: HashMap<Innovation, (Innovation, Innovation, Innovation), RandomState>,
}

impl InnovationHistory for History {
    type Config = GeneticConfig;

    fn new(config: &GeneticConfig) -> History {
        Self::new(config)
    }
}

impl History {
    /// Returns a history in which every sensor-output gene a
    /// fresh genome may carry is already registered, as
    /// innovation `o + s ⨯ output_count` for sensor `s` and
    /// output `o`. Mutations are numbered from
    /// `sensor_count ⨯ output_count` on.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, History};
    /// use std::num::NonZeroUsize;
    ///
    /// let history = History::new(&GeneticConfig {
    ///     input_count: NonZeroUsize::new(2).unwrap(),
    ///     output_count: NonZeroUsize::new(3).unwrap(),
    ///     bias: true,
    ///     ..GeneticConfig::zero()
    /// });
    ///
    /// assert_eq!(history.max_gene_innovation(), Some(8));
    /// assert_eq!(history.max_node_innovation(), 5);
    /// ```
    pub fn new(config: &GeneticConfig) -> History {
        let sensor_count = config.sensor_count();
        let output_count = config.output_count.get();
        let gene_innovations = (0..sensor_count)
            // Cartesian product of sensors and outputs...
            .flat_map(|s| (0..output_count).map(move |o| (s, o)))
            // keyed by node innovation numbers.
            .map(|(s, o)| ((s, o + sensor_count), o + s * output_count))
            .collect();
        History {
            next_gene_innovation: sensor_count * output_count,
            next_node_innovation: sensor_count + output_count,
            gene_innovations,
            node_innovations: HashMap::default(),
        }
    }

    /// Returns the innovation number of a gene between
    /// `input_id` and `output_id`, reusing the one
    /// assigned to an identical earlier mutation if any.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, History};
    ///
    /// let mut history = History::new(&GeneticConfig::zero());
    ///
    /// let gene = history.register_gene(1, 1);
    /// assert_eq!(gene, 1);
    /// assert_eq!(history.register_gene(1, 1), gene);
    /// assert_eq!(history.register_gene(0, 1), 0);
    /// ```
    pub fn register_gene(&mut self, input_id: Innovation, output_id: Innovation) -> Innovation {
        match self.gene_innovations.entry((input_id, output_id)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let innovation = self.next_gene_innovation;
                entry.insert(innovation);
                self.next_gene_innovation += 1;
                trace!(
                    "new gene innovation {} ({} -> {})",
                    innovation,
                    input_id,
                    output_id
                );
                innovation
            }
        }
    }

    /// Returns the innovation numbers of the split of `split_gene`,
    /// which goes from `endpoints.0` to `endpoints.1`, in the format
    /// `(input gene, new node, output gene)`. An identical earlier
    /// split is reused.
    ///
    /// If `fresh` is `true`, new innovation numbers are
    /// assigned even if the split is already registered, and
    /// substitute the previously assigned ones. This is used
    /// when the mutating genome already split the same gene
    /// in a previous mutation, which would otherwise result
    /// in duplicate genes and nodes within the same genome.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, History};
    ///
    /// let mut history = History::new(&GeneticConfig::zero());
    ///
    /// // Gene 0 goes from node 0 to node 1.
    /// let split = history.register_split(0, (0, 1), false);
    /// assert_eq!(split, (1, 2, 2));
    /// assert_eq!(history.register_split(0, (0, 1), false), split);
    ///
    /// let resplit = history.register_split(0, (0, 1), true);
    /// assert_eq!(resplit, (3, 3, 4));
    /// ```
    pub fn register_split(
        &mut self,
        split_gene: Innovation,
        endpoints: (Innovation, Innovation),
        fresh: bool,
    ) -> (Innovation, Innovation, Innovation) {
        if !fresh {
            if let Some(record) = self.node_innovations.get(&split_gene) {
                return *record;
            }
        }
        let (input_node, output_node) = endpoints;
        let new_node = self.next_node_innovation;
        self.next_node_innovation += 1;

        let input_gene = self.register_gene(input_node, new_node);
        let output_gene = self.register_gene(new_node, output_node);
        let record = (input_gene, new_node, output_gene);
        self.node_innovations.insert(split_gene, record);
        trace!("gene {} split into {:?}", split_gene, record);
        record
    }

    /// Returns the highest gene innovation number generated,
    /// or `None` if none has been.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, History};
    ///
    /// let history = History::new(&GeneticConfig::zero());
    ///
    /// assert_eq!(history.max_gene_innovation(), Some(0));
    /// ```
    pub fn max_gene_innovation(&self) -> Option<Innovation> {
        self.next_gene_innovation.checked_sub(1)
    }

    /// Returns the highest node innovation number generated.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, History};
    ///
    /// let history = History::new(&GeneticConfig::zero());
    ///
    /// assert_eq!(history.max_node_innovation(), 1);
    /// ```
    pub fn max_node_innovation(&self) -> Innovation {
        self.next_node_innovation - 1
    }

    /// Every registered gene as `((input, output), innovation)`,
    /// in no particular order.
    pub fn gene_innovation_history(
        &self,
    ) -> impl Iterator<Item = (&(Innovation, Innovation), &Innovation)> {
        self.gene_innovations.iter()
    }

    /// Every registered split as
    /// `(split gene, (input gene, new node, output gene))`,
    /// in no particular order.
    ///
    /// # Examples
    /// ```
    /// use oxineat_nn::genomics::{GeneticConfig, History, NNGenome};
    ///
    /// let config = GeneticConfig {
    ///     initial_expression_chance: 1.0,
    ///     ..GeneticConfig::zero()
    /// };
    /// let mut history = History::new(&config);
    ///
    /// // Add mutations to the history through genome mutation.
    /// NNGenome::new(&config).mutate_add_node(&mut history, &config).unwrap();
    ///
    /// for (split_gene, (input_gene, new_node, output_gene)) in history.node_innovation_history() {
    ///     println!("gene {} split into genes {} and {} with node {} in between",
    ///         split_gene, input_gene, output_gene, new_node);
    /// }
    /// ```
    pub fn node_innovation_history(
        &self,
    ) -> impl Iterator<Item = (&Innovation, &(Innovation, Innovation, Innovation))> {
        self.node_innovations.iter()
    }
}

// Endpoint pairs are not valid map keys in most formats,
// so gene innovations are stored as a list of entries.
fn serialize_gene_innovations<S: Serializer>(
    innovations: &GeneInnovations,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(innovations.iter())
}

fn deserialize_gene_innovations<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<GeneInnovations, D::Error> {
    let entries = Vec::<((Innovation, Innovation), Innovation)>::deserialize(deserializer)?;
    Ok(entries.into_iter().collect())
}
