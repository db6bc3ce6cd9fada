//! Network of populations and the per-tick scheduler driving them

use crate::{
    connection::ProjectionHandle,
    connector::Connector,
    error::*,
    ids::{PopulationId, ProjectionId, SynapseType},
    neuron::{GlobalOperation, NeuronModel, SynapticInput},
    plasticity::LearningRuleConfig,
    population::{Population, DEFAULT_DT_MS},
    projection::{Projection, ProjectionAccess, ProjectionLearning},
};
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

type ProjectionStore = BTreeMap<ProjectionId, Box<dyn Projection>>;

/// Network configuration parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkConfig {
    /// Integration step (ms) shared by every population
    pub dt: f64,
    /// Run the Learning phase of projections
    pub learning_enabled: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT_MS,
            learning_enabled: true,
        }
    }
}

impl NetworkConfig {
    /// Create a new configuration with validation
    pub fn new(dt: f64, learning_enabled: bool) -> Result<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(RuntimeError::invalid_parameter(
                "dt",
                dt.to_string(),
                "> 0.0",
            ));
        }
        Ok(Self {
            dt,
            learning_enabled,
        })
    }

    /// Enable or disable learning
    pub fn with_learning(mut self, enabled: bool) -> Self {
        self.learning_enabled = enabled;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.dt, self.learning_enabled)?;
        Ok(())
    }
}

/// Read-only view handed to populations during Summing
struct SummingView<'a> {
    projections: &'a ProjectionStore,
    populations: &'a BTreeMap<PopulationId, Population>,
}

impl ProjectionAccess for SummingView<'_> {
    fn contribution(&self, handle: &ProjectionHandle) -> Result<f64> {
        let projection = self
            .projections
            .get(&handle.id)
            .ok_or(RuntimeError::ProjectionNotFound { id: handle.id })?;
        let pre = self
            .populations
            .get(&handle.source)
            .ok_or(RuntimeError::PopulationNotFound { id: handle.source })?;
        projection.compute_sum(pre)
    }
}

/// View handed to populations during Learning; projections are mutable,
/// populations are not.
struct LearningView<'a> {
    projections: &'a mut ProjectionStore,
    populations: &'a BTreeMap<PopulationId, Population>,
    dt: f64,
}

impl ProjectionLearning for LearningView<'_> {
    fn learn(&mut self, handle: &ProjectionHandle, post: &Population) -> Result<()> {
        let projection = self
            .projections
            .get_mut(&handle.id)
            .ok_or(RuntimeError::ProjectionNotFound { id: handle.id })?;
        let pre = self
            .populations
            .get(&handle.source)
            .ok_or(RuntimeError::PopulationNotFound { id: handle.source })?;
        projection.learn(pre, post, self.dt)
    }
}

/// Rate-coded network: owns populations and the projection store, and steps
/// them through the tick cycle.
#[derive(Debug)]
pub struct Network {
    /// Network configuration
    config: NetworkConfig,
    /// Populations ordered by ID
    populations: BTreeMap<PopulationId, Population>,
    /// Every projection, addressed by the handles stored in population indexes
    projections: ProjectionStore,
    next_population: PopulationId,
    next_projection: ProjectionId,
    /// Completed ticks since creation or the last reset
    tick: u64,
}

impl Network {
    /// Create a new empty network
    pub fn new(config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            populations: BTreeMap::new(),
            projections: BTreeMap::new(),
            next_population: PopulationId::new(0),
            next_projection: ProjectionId::new(0),
            tick: 0,
        })
    }

    /// Network configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------

    /// Add a population; names must be unique within the network
    pub fn add_population(
        &mut self,
        name: impl Into<String>,
        neuron_count: usize,
        model: NeuronModel,
    ) -> Result<PopulationId> {
        let name = name.into();
        if self.population_id(&name).is_some() {
            return Err(RuntimeError::invalid_config(format!(
                "Population '{}' already exists",
                name
            )));
        }

        let id = self.next_population;
        let mut population = Population::new(id, name, neuron_count, model)?;
        population.set_dt(self.config.dt)?;
        log::debug!(
            "Added population '{}' as {} ({} neurons, {})",
            population.name(),
            id,
            neuron_count,
            population.model().name()
        );
        self.populations.insert(id, population);
        self.next_population = id.next();
        Ok(id)
    }

    /// Register a projection.
    ///
    /// The projection is validated against its source and the target's
    /// connection index is updated first, so a rejected projection leaves the
    /// network untouched. The source's delay history is then grown to the
    /// projection's deepest delay.
    pub fn connect(&mut self, projection: Box<dyn Projection>) -> Result<ProjectionId> {
        let source = projection.source();
        let target = projection.target();
        projection.validate(self.population(source)?)?;

        let id = self.next_projection;
        let handle = ProjectionHandle::new(id, source, projection.synapse_type());
        self.populations
            .get_mut(&target)
            .ok_or(RuntimeError::PopulationNotFound { id: target })?
            .add_projection(projection.post_rank(), handle)?;

        if let Some(pre) = self.populations.get_mut(&source) {
            pre.set_max_delay(projection.max_delay());
        }
        self.projections.insert(id, projection);
        self.next_projection = id.next();
        Ok(id)
    }

    /// Expand `connector` between two populations and register every dendrite.
    ///
    /// All-or-nothing: on any failure the projections added by this call are
    /// removed again.
    pub fn connect_with(
        &mut self,
        pre: PopulationId,
        post: PopulationId,
        synapse_type: SynapseType,
        connector: &Connector,
        rule: Option<&LearningRuleConfig>,
    ) -> Result<Vec<ProjectionId>> {
        let pre_pop = self.population(pre)?;
        let post_pop = self.population(post)?;
        let dendrites = connector.build(pre_pop, post_pop, synapse_type, rule)?;

        let mut added = Vec::with_capacity(dendrites.len());
        for dendrite in dendrites {
            match self.connect(Box::new(dendrite)) {
                Ok(id) => added.push(id),
                Err(err) => {
                    for id in added {
                        // Rollback of projections just inserted cannot miss.
                        let _ = self.disconnect(id);
                    }
                    return Err(err);
                }
            }
        }

        log::debug!(
            "Connected {} -> {} with {} projections of type {}",
            pre,
            post,
            added.len(),
            synapse_type
        );
        Ok(added)
    }

    /// Remove a single projection. The source's delay depth is kept.
    pub fn disconnect(&mut self, id: ProjectionId) -> Result<Box<dyn Projection>> {
        let projection = self
            .projections
            .remove(&id)
            .ok_or(RuntimeError::ProjectionNotFound { id })?;
        if let Some(post) = self.populations.get_mut(&projection.target()) {
            post.detach_projection(id);
        }
        Ok(projection)
    }

    /// Remove a population together with every projection it sources or receives
    pub fn remove_population(&mut self, id: PopulationId) -> Result<Population> {
        let removed = self
            .populations
            .remove(&id)
            .ok_or(RuntimeError::PopulationNotFound { id })?;

        for population in self.populations.values_mut() {
            population.remove_projection(id);
        }
        let before = self.projections.len();
        self.projections
            .retain(|_, p| p.source() != id && p.target() != id);

        log::debug!(
            "Removed population '{}' ({}) and {} projections",
            removed.name(),
            id,
            before - self.projections.len()
        );
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Population by ID
    pub fn population(&self, id: PopulationId) -> Result<&Population> {
        self.populations
            .get(&id)
            .ok_or(RuntimeError::PopulationNotFound { id })
    }

    /// Mutable population by ID, for seeding rates or changing the reduction
    pub fn population_mut(&mut self, id: PopulationId) -> Result<&mut Population> {
        self.populations
            .get_mut(&id)
            .ok_or(RuntimeError::PopulationNotFound { id })
    }

    /// ID of the population called `name`
    pub fn population_id(&self, name: &str) -> Option<PopulationId> {
        self.populations
            .values()
            .find(|p| p.name() == name)
            .map(|p| p.id())
    }

    /// Population called `name`
    pub fn population_by_name(&self, name: &str) -> Option<&Population> {
        self.populations.values().find(|p| p.name() == name)
    }

    /// All populations in ID order
    pub fn populations(&self) -> impl Iterator<Item = &Population> + '_ {
        self.populations.values()
    }

    /// Projection by ID
    pub fn projection(&self, id: ProjectionId) -> Result<&dyn Projection> {
        self.projections
            .get(&id)
            .map(|p| p.as_ref())
            .ok_or(RuntimeError::ProjectionNotFound { id })
    }

    /// Number of populations
    pub fn population_count(&self) -> usize {
        self.populations.len()
    }

    /// Number of projections
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current simulation time in ms
    pub fn time(&self) -> f64 {
        self.tick as f64 * self.config.dt
    }

    /// Change the integration step of every population
    pub fn set_dt(&mut self, dt: f64) -> Result<()> {
        let config = NetworkConfig::new(dt, self.config.learning_enabled)?;
        for population in self.populations.values_mut() {
            population.set_dt(dt)?;
        }
        self.config = config;
        Ok(())
    }

    /// Enable or disable the Learning phase
    pub fn set_learning(&mut self, enabled: bool) {
        self.config.learning_enabled = enabled;
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    /// Advance the whole network by one tick.
    ///
    /// Summing runs for every population before any population integrates, so
    /// all projections observe the state committed by the previous tick.
    pub fn step(&mut self) -> Result<()> {
        let inputs = self.sum_all()?;

        for (id, input) in &inputs {
            if let Some(population) = self.populations.get_mut(id) {
                population.integrate(input)?;
            }
        }

        if self.config.learning_enabled && !self.projections.is_empty() {
            let mut view = LearningView {
                projections: &mut self.projections,
                populations: &self.populations,
                dt: self.config.dt,
            };
            for population in self.populations.values() {
                population.meta_learn(&mut view)?;
            }
        }

        for population in self.populations.values_mut() {
            population.global_operations()?;
        }
        for population in self.populations.values_mut() {
            population.advance()?;
        }

        self.tick += 1;
        log::trace!("Tick {} completed", self.tick);
        Ok(())
    }

    /// Run `steps` ticks
    pub fn run(&mut self, steps: u64) -> Result<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn sum_all(&self) -> Result<Vec<(PopulationId, SynapticInput)>> {
        let view = SummingView {
            projections: &self.projections,
            populations: &self.populations,
        };
        self.populations
            .par_iter()
            .map(|(id, population)| population.meta_sum(&view).map(|input| (*id, input)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn sum_all(&self) -> Result<Vec<(PopulationId, SynapticInput)>> {
        let view = SummingView {
            projections: &self.projections,
            populations: &self.populations,
        };
        self.populations
            .iter()
            .map(|(id, population)| population.meta_sum(&view).map(|input| (*id, input)))
            .collect()
    }

    /// Zero rates and histories of every population and restart the tick count.
    ///
    /// Wiring and learned weights are kept.
    pub fn reset(&mut self) {
        for population in self.populations.values_mut() {
            population.reset();
        }
        self.tick = 0;
    }
}

/// Population entry of a [`NetworkBuilder`]
#[derive(Debug)]
struct PopulationSpec {
    name: String,
    neuron_count: usize,
    model: NeuronModel,
    global_operation: GlobalOperation,
}

/// Connection entry of a [`NetworkBuilder`], referring to populations by name
#[derive(Debug, Clone)]
struct ConnectionSpec {
    pre: String,
    post: String,
    synapse_type: SynapseType,
    connector: Connector,
    rule: Option<LearningRuleConfig>,
}

/// Builder for constructing networks by population name
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    config: NetworkConfig,
    populations: Vec<PopulationSpec>,
    connections: Vec<ConnectionSpec>,
}

impl NetworkBuilder {
    /// Create a new network builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set network configuration
    pub fn with_config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a population
    pub fn population(mut self, name: impl Into<String>, neuron_count: usize, model: NeuronModel) -> Self {
        self.populations.push(PopulationSpec {
            name: name.into(),
            neuron_count,
            model,
            global_operation: GlobalOperation::None,
        });
        self
    }

    /// Set the reduction of the most recently added population
    pub fn with_global_operation(mut self, op: GlobalOperation) -> Self {
        if let Some(last) = self.populations.last_mut() {
            last.global_operation = op;
        }
        self
    }

    /// Connect two named populations
    pub fn connect(
        mut self,
        pre: impl Into<String>,
        post: impl Into<String>,
        synapse_type: SynapseType,
        connector: Connector,
    ) -> Self {
        self.connections.push(ConnectionSpec {
            pre: pre.into(),
            post: post.into(),
            synapse_type,
            connector,
            rule: None,
        });
        self
    }

    /// Connect two named populations with plastic dendrites
    pub fn connect_plastic(
        mut self,
        pre: impl Into<String>,
        post: impl Into<String>,
        synapse_type: SynapseType,
        connector: Connector,
        rule: LearningRuleConfig,
    ) -> Self {
        self.connections.push(ConnectionSpec {
            pre: pre.into(),
            post: post.into(),
            synapse_type,
            connector,
            rule: Some(rule),
        });
        self
    }

    /// Build the network
    pub fn build(self) -> Result<Network> {
        let mut network = Network::new(self.config)?;

        for spec in self.populations {
            let id = network.add_population(spec.name, spec.neuron_count, spec.model)?;
            network.population_mut(id)?.set_global_operation(spec.global_operation);
        }

        for spec in self.connections {
            let resolve = |name: &str| {
                network.population_id(name).ok_or_else(|| {
                    RuntimeError::invalid_config(format!("Unknown population '{}'", name))
                })
            };
            let pre = resolve(&spec.pre)?;
            let post = resolve(&spec.post)?;
            network.connect_with(pre, post, spec.synapse_type, &spec.connector, spec.rule.as_ref())?;
        }

        Ok(network)
    }
}
