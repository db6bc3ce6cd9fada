//! Projections: weighted connection groups into a single postsynaptic neuron

use crate::{
    connection::ProjectionHandle,
    error::*,
    ids::{PopulationId, SynapseType},
    plasticity::LearningRule,
    population::Population,
};
use core::fmt;

/// A connection group from one source population into one target neuron.
///
/// Projections read their source population through its rate-query API and own
/// their weights and delays exclusively.
pub trait Projection: fmt::Debug + Send + Sync {
    /// Synapse type the projection feeds
    fn synapse_type(&self) -> SynapseType;

    /// Presynaptic population
    fn source(&self) -> PopulationId;

    /// Postsynaptic population
    fn target(&self) -> PopulationId;

    /// Rank of the postsynaptic neuron in the target population
    fn post_rank(&self) -> usize;

    /// Deepest delay (ticks) the projection will ask of its source
    fn max_delay(&self) -> usize {
        0
    }

    /// Check the projection against its source before it is wired in
    fn validate(&self, _pre: &Population) -> Result<()> {
        Ok(())
    }

    /// Scalar input contributed during the Summing phase
    fn compute_sum(&self, pre: &Population) -> Result<f64>;

    /// Weight update invoked once per Learning phase
    fn learn(&mut self, _pre: &Population, _post: &Population, _dt: f64) -> Result<()> {
        Ok(())
    }
}

/// Read access to projections during the Summing phase
pub trait ProjectionAccess {
    /// Contribution of the projection behind `handle`
    fn contribution(&self, handle: &ProjectionHandle) -> Result<f64>;
}

/// Mutable access to projections during the Learning phase
pub trait ProjectionLearning {
    /// Run the learning hook of the projection behind `handle`
    fn learn(&mut self, handle: &ProjectionHandle, post: &Population) -> Result<()>;
}

/// Stock projection: one weight and one delay per presynaptic neuron.
///
/// Synapses are stored as parallel arrays so a uniform-delay dendrite reads one
/// snapshot and a mixed-delay one issues a single batched query.
#[derive(Debug)]
pub struct Dendrite {
    source: PopulationId,
    target: PopulationId,
    post_rank: usize,
    synapse_type: SynapseType,
    ranks: Vec<usize>,
    weights: Vec<f64>,
    delays: Vec<usize>,
    max_delay: usize,
    rule: Option<Box<dyn LearningRule>>,
}

impl Dendrite {
    /// Create a dendrite without synapses
    pub fn new(
        source: PopulationId,
        target: PopulationId,
        post_rank: usize,
        synapse_type: SynapseType,
    ) -> Self {
        Self {
            source,
            target,
            post_rank,
            synapse_type,
            ranks: Vec::new(),
            weights: Vec::new(),
            delays: Vec::new(),
            max_delay: 0,
            rule: None,
        }
    }

    /// Add a synapse from presynaptic neuron `pre_rank`
    pub fn add_synapse(&mut self, pre_rank: usize, weight: f64, delay: usize) -> Result<()> {
        if !weight.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "weight",
                weight.to_string(),
                "finite",
            ));
        }
        if self.ranks.contains(&pre_rank) {
            return Err(RuntimeError::invalid_config(format!(
                "synapse from {} neuron {} to {} neuron {} already exists",
                self.source, pre_rank, self.target, self.post_rank
            )));
        }
        self.push_synapse(pre_rank, weight, delay);
        Ok(())
    }

    /// Append a synapse the caller knows to be new and finite
    pub(crate) fn push_synapse(&mut self, pre_rank: usize, weight: f64, delay: usize) {
        self.ranks.push(pre_rank);
        self.weights.push(weight);
        self.delays.push(delay);
        self.max_delay = self.max_delay.max(delay);
    }

    /// Builder form of [`Dendrite::add_synapse`]
    pub fn with_synapse(mut self, pre_rank: usize, weight: f64, delay: usize) -> Result<Self> {
        self.add_synapse(pre_rank, weight, delay)?;
        Ok(self)
    }

    /// Attach a learning rule
    pub fn with_learning(mut self, rule: Box<dyn LearningRule>) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Number of synapses
    pub fn synapse_count(&self) -> usize {
        self.ranks.len()
    }

    /// Presynaptic ranks
    pub fn pre_ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// Synaptic weights, aligned with [`Dendrite::pre_ranks`]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Synaptic delays in ticks, aligned with [`Dendrite::pre_ranks`]
    pub fn delays(&self) -> &[usize] {
        &self.delays
    }

    /// Weight of the synapse from `pre_rank`
    pub fn weight(&self, pre_rank: usize) -> Option<f64> {
        self.ranks
            .iter()
            .position(|r| *r == pre_rank)
            .map(|i| self.weights[i])
    }

    /// Overwrite the weight of the synapse from `pre_rank`
    pub fn set_weight(&mut self, pre_rank: usize, weight: f64) -> Result<()> {
        let i = self
            .ranks
            .iter()
            .position(|r| *r == pre_rank)
            .ok_or_else(|| {
                RuntimeError::invalid_config(format!("no synapse from neuron {}", pre_rank))
            })?;
        self.weights[i] = weight;
        Ok(())
    }

    fn uniform_delay(&self) -> Option<usize> {
        let first = *self.delays.first()?;
        self.delays.iter().all(|d| *d == first).then_some(first)
    }
}

impl Projection for Dendrite {
    fn synapse_type(&self) -> SynapseType {
        self.synapse_type
    }

    fn source(&self) -> PopulationId {
        self.source
    }

    fn target(&self) -> PopulationId {
        self.target
    }

    fn post_rank(&self) -> usize {
        self.post_rank
    }

    fn max_delay(&self) -> usize {
        self.max_delay
    }

    fn validate(&self, pre: &Population) -> Result<()> {
        match self.ranks.iter().find(|r| **r >= pre.neuron_count()) {
            Some(rank) => Err(RuntimeError::invalid_config(format!(
                "synapse from {} neuron {} but {} has {} neurons",
                self.source,
                rank,
                pre.name(),
                pre.neuron_count()
            ))),
            None => Ok(()),
        }
    }

    fn compute_sum(&self, pre: &Population) -> Result<f64> {
        if self.ranks.is_empty() {
            return Ok(0.0);
        }

        let weighted = |rates: &[f64], rank: usize, weight: f64| {
            rates
                .get(rank)
                .map(|r| weight * r)
                .ok_or(RuntimeError::RankOutOfRange {
                    rank,
                    neuron_count: pre.neuron_count(),
                })
        };

        match self.uniform_delay() {
            Some(delay) => {
                // Delay 0 reads the current vector, never the history.
                let rates = if delay == 0 {
                    pre.rates()
                } else {
                    // The scheduler grows the source history to max_delay on
                    // wiring, so a missing snapshot means an unregistered dendrite.
                    pre.rates_at(delay).ok_or(RuntimeError::DelayOutOfRange {
                        delay,
                        max_delay: pre.max_delay(),
                    })?
                };
                self.ranks
                    .iter()
                    .zip(&self.weights)
                    .map(|(&rank, &w)| weighted(rates, rank, w))
                    .sum()
            }
            None => {
                // Mixed delays: zero-delay synapses from the current vector,
                // the rest through one batched history query.
                let mut sum = 0.0;
                let mut delays = Vec::with_capacity(self.delays.len());
                let mut ranks = Vec::with_capacity(self.ranks.len());
                let mut weights = Vec::with_capacity(self.weights.len());
                for ((&rank, &w), &delay) in self.ranks.iter().zip(&self.weights).zip(&self.delays)
                {
                    if delay == 0 {
                        sum += weighted(pre.rates(), rank, w)?;
                    } else {
                        delays.push(delay);
                        ranks.push(rank);
                        weights.push(w);
                    }
                }
                let values = pre.rates_batch(&delays, &ranks)?;
                Ok(sum + weights.iter().zip(values).map(|(w, r)| w * r).sum::<f64>())
            }
        }
    }

    fn learn(&mut self, pre: &Population, post: &Population, dt: f64) -> Result<()> {
        let Some(rule) = self.rule.as_ref() else {
            return Ok(());
        };
        let post_rate = post.rate(self.post_rank).ok_or(RuntimeError::RankOutOfRange {
            rank: self.post_rank,
            neuron_count: post.neuron_count(),
        })?;
        // Weights are committed only once every update succeeded.
        let updated = self
            .ranks
            .iter()
            .zip(&self.weights)
            .map(|(&rank, &weight)| {
                let pre_rate = pre.rate(rank).ok_or(RuntimeError::RankOutOfRange {
                    rank,
                    neuron_count: pre.neuron_count(),
                })?;
                rule.update_weight(weight, pre_rate, post_rate, dt)
            })
            .collect::<Result<Vec<_>>>()?;
        self.weights = updated;
        Ok(())
    }
}
