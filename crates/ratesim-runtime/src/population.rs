//! Neuron populations: rate state, delay history and incoming connections
//!
//! A [`Population`] owns the current rate vector of its neurons, a
//! [`DelayRing`] of past rate vectors and a [`ConnectionIndex`] naming, per
//! neuron and synapse type, the projection that feeds it. The scheduler drives
//! each population through a fixed cycle every tick:
//!
//! 1. **Summing** ([`Population::meta_sum`]): read-only; collects one scalar per
//!    neuron and synapse type from the attached projections.
//! 2. **Integrating** ([`Population::integrate`]): the neuron model turns the
//!    summed input into the new rate vector.
//! 3. **Learning** ([`Population::meta_learn`]): read-only on the population;
//!    each attached projection updates its own weights.
//! 4. **GlobalOps** ([`Population::global_operations`]): population-wide
//!    reduction of the new rates.
//!
//! [`Population::advance`] then commits the rates into the history and the
//! cycle starts over. Between two `advance` calls the rate vector and the
//! history of a population are not modified, so the Summing phase of all
//! populations can run concurrently.

use crate::{
    connection::{ConnectionIndex, ProjectionHandle},
    delay::DelayRing,
    error::*,
    ids::{PopulationId, ProjectionId, SynapseType},
    neuron::{GlobalOperation, NeuronModel, SynapticInput},
    projection::{ProjectionAccess, ProjectionLearning},
};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default integration step (1 millisecond)
pub const DEFAULT_DT_MS: f64 = 1.0;

/// Stage of the per-tick cycle a population is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TickPhase {
    /// State frozen; inputs may be summed. Initial state of every tick.
    Summing,
    /// Integration in progress. Only observed after a failed integration.
    Integrating,
    /// New rates computed; projections may learn.
    Learning,
    /// Reduction applied; ready to be committed by `advance`.
    GlobalOps,
}

/// Summary of a rate vector, refreshed during the GlobalOps phase
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RateStatistics {
    /// Smallest rate
    pub min: f64,
    /// Largest rate
    pub max: f64,
    /// Mean rate
    pub mean: f64,
}

impl RateStatistics {
    /// Compute statistics of `rates`; all zero for an empty slice
    pub fn from_rates(rates: &[f64]) -> Self {
        if rates.is_empty() {
            return Self::default();
        }
        let (min, max, sum) = rates.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), r| (min.min(*r), max.max(*r), sum + r),
        );
        Self {
            min,
            max,
            mean: sum / rates.len() as f64,
        }
    }
}

/// A fixed-size group of rate-coded neurons sharing one model
#[derive(Debug)]
pub struct Population {
    id: PopulationId,
    name: String,
    neuron_count: usize,
    dt: f64,
    rate: Vec<f64>,
    history: DelayRing,
    connections: ConnectionIndex,
    model: NeuronModel,
    global_operation: GlobalOperation,
    phase: TickPhase,
    statistics: RateStatistics,
}

impl Population {
    /// Create a population with zeroed rates and an empty history.
    ///
    /// `neuron_count` may be zero; every phase is then a no-op.
    pub fn new(
        id: PopulationId,
        name: impl Into<String>,
        neuron_count: usize,
        model: NeuronModel,
    ) -> Result<Self> {
        model.validate()?;
        Ok(Self {
            id,
            name: name.into(),
            neuron_count,
            dt: DEFAULT_DT_MS,
            rate: vec![0.0; neuron_count],
            history: DelayRing::new(neuron_count),
            connections: ConnectionIndex::new(neuron_count),
            model,
            global_operation: GlobalOperation::None,
            phase: TickPhase::Summing,
            statistics: RateStatistics::default(),
        })
    }

    /// Set the reduction applied during GlobalOps
    pub fn with_global_operation(mut self, op: GlobalOperation) -> Self {
        self.global_operation = op;
        self
    }

    /// Replace the reduction applied during GlobalOps
    pub fn set_global_operation(&mut self, op: GlobalOperation) {
        self.global_operation = op;
    }

    /// Population ID
    pub fn id(&self) -> PopulationId {
        self.id
    }

    /// Population name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of neurons, fixed at construction
    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    /// Neuron model
    pub fn model(&self) -> &NeuronModel {
        &self.model
    }

    /// Reduction applied during GlobalOps
    pub fn global_operation(&self) -> GlobalOperation {
        self.global_operation
    }

    /// Current tick phase
    pub fn phase(&self) -> TickPhase {
        self.phase
    }

    /// Integration step size (ms)
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Set the integration step size
    pub fn set_dt(&mut self, dt: f64) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(RuntimeError::invalid_parameter("dt", dt.to_string(), "> 0.0"));
        }
        self.dt = dt;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rate queries
    // ------------------------------------------------------------------

    /// Current (delay 0) rate vector
    pub fn rates(&self) -> &[f64] {
        &self.rate
    }

    /// Rate vector `delay` ticks in the past, for `1 <= delay <= max_delay()`.
    ///
    /// `None` otherwise: the snapshot is not retained, and callers decide how
    /// to treat it. The current vector is [`Population::rates`].
    pub fn rates_at(&self, delay: usize) -> Option<&[f64]> {
        self.history.get(delay)
    }

    /// Current rate of a single neuron
    pub fn rate(&self, rank: usize) -> Option<f64> {
        self.rate.get(rank).copied()
    }

    /// Rates of `ranks[i]` at `delays[i]`, in input order.
    ///
    /// Every delay must lie in `1..=max_delay()`. Fails as a whole if any pair
    /// is out of range.
    pub fn rates_batch(&self, delays: &[usize], ranks: &[usize]) -> Result<Vec<f64>> {
        if delays.len() != ranks.len() {
            return Err(RuntimeError::invalid_parameter(
                "ranks",
                format!("{} entries", ranks.len()),
                format!("{} entries to match delays", delays.len()),
            ));
        }
        delays
            .iter()
            .zip(ranks)
            .map(|(&delay, &rank)| {
                let snapshot = self.rates_at(delay).ok_or(RuntimeError::DelayOutOfRange {
                    delay,
                    max_delay: self.max_delay(),
                })?;
                snapshot.get(rank).copied().ok_or(RuntimeError::RankOutOfRange {
                    rank,
                    neuron_count: self.neuron_count,
                })
            })
            .collect()
    }

    /// Overwrite the current rate vector
    pub fn set_rates(&mut self, rates: &[f64]) -> Result<()> {
        if rates.len() != self.neuron_count {
            return Err(RuntimeError::RateLengthMismatch {
                expected: self.neuron_count,
                found: rates.len(),
            });
        }
        self.rate.copy_from_slice(rates);
        Ok(())
    }

    /// Overwrite the current rate of one neuron
    pub fn set_rate(&mut self, rank: usize, value: f64) -> Result<()> {
        let neuron_count = self.neuron_count;
        let slot = self
            .rate
            .get_mut(rank)
            .ok_or(RuntimeError::RankOutOfRange { rank, neuron_count })?;
        *slot = value;
        Ok(())
    }

    /// Statistics of the rates after the last GlobalOps phase
    pub fn statistics(&self) -> RateStatistics {
        self.statistics
    }

    // ------------------------------------------------------------------
    // Delay history
    // ------------------------------------------------------------------

    /// Number of past rate vectors retained
    pub fn max_delay(&self) -> usize {
        self.history.max_delay()
    }

    /// Make at least `delay` past rate vectors available.
    ///
    /// Never shrinks. Newly created slots read as zero until filled.
    pub fn set_max_delay(&mut self, delay: usize) {
        let previous = self.history.max_delay();
        if self.history.set_max_delay(delay) {
            log::debug!(
                "Population '{}' delay history grown from {} to {}",
                self.name,
                previous,
                delay
            );
        }
    }

    // ------------------------------------------------------------------
    // Connection index
    // ------------------------------------------------------------------

    /// Attach a projection to neuron `rank` under its synapse type.
    ///
    /// Rejects out-of-range ranks and occupied `(rank, type)` keys; the index is
    /// unchanged on rejection.
    pub fn add_projection(&mut self, rank: usize, handle: ProjectionHandle) -> Result<()> {
        self.connections.insert(rank, handle).map_err(|err| {
            log::warn!("Population '{}' rejected {}: {}", self.name, handle.id, err);
            err
        })?;
        log::debug!(
            "Population '{}' neuron {} receives {} from {} as {}",
            self.name,
            rank,
            handle.id,
            handle.source,
            handle.synapse_type
        );
        Ok(())
    }

    /// Detach every projection coming from `source`. Idempotent; returns the
    /// number of entries removed.
    pub fn remove_projection(&mut self, source: PopulationId) -> usize {
        let removed = self.connections.remove_source(source);
        if removed > 0 {
            log::debug!(
                "Population '{}' detached {} projections from {}",
                self.name,
                removed,
                source
            );
        }
        removed
    }

    /// Detach a single projection by ID
    pub fn detach_projection(&mut self, id: ProjectionId) -> Option<ProjectionHandle> {
        self.connections.remove_projection(id)
    }

    /// Projection feeding neuron `rank` with `synapse_type`, if any
    pub fn get_projection(&self, rank: usize, synapse_type: SynapseType) -> Option<ProjectionId> {
        self.connections.get(rank, synapse_type).map(|h| h.id)
    }

    /// Synapse types registered for neuron `rank`, in ascending order
    pub fn synapse_types(&self, rank: usize) -> &[SynapseType] {
        self.connections.types(rank)
    }

    /// Attached projections in rank-major, synapse-type-minor order
    pub fn handles(&self) -> impl Iterator<Item = (usize, &ProjectionHandle)> + '_ {
        self.connections.iter()
    }

    /// Number of attached projections
    pub fn projection_count(&self) -> usize {
        self.connections.len()
    }

    // ------------------------------------------------------------------
    // Tick phases
    // ------------------------------------------------------------------

    fn expect_phase(&self, expected: TickPhase) -> Result<()> {
        if self.phase != expected {
            return Err(RuntimeError::PhaseOrder {
                expected,
                current: self.phase,
            });
        }
        Ok(())
    }

    /// Summed input of `synapse_type` for neuron `rank`; zero when nothing is attached
    pub fn sum<A>(&self, rank: usize, synapse_type: SynapseType, access: &A) -> Result<f64>
    where
        A: ProjectionAccess + ?Sized,
    {
        match self.connections.get(rank, synapse_type) {
            Some(handle) => access.contribution(handle),
            None => Ok(0.0),
        }
    }

    /// Summing phase: query every attached projection
    pub fn meta_sum<A>(&self, access: &A) -> Result<SynapticInput>
    where
        A: ProjectionAccess + ?Sized,
    {
        self.expect_phase(TickPhase::Summing)?;
        let mut input = SynapticInput::new(self.neuron_count);
        for (rank, handle) in self.connections.iter() {
            let value = access.contribution(handle)?;
            input.set(handle.synapse_type, rank, value);
        }
        Ok(input)
    }

    /// Integrating phase: compute the new rate vector from the summed input
    pub fn integrate(&mut self, input: &SynapticInput) -> Result<()> {
        self.expect_phase(TickPhase::Summing)?;
        if self.neuron_count == 0 {
            self.phase = TickPhase::Learning;
            return Ok(());
        }
        if input.neuron_count() != self.neuron_count {
            return Err(RuntimeError::RateLengthMismatch {
                expected: self.neuron_count,
                found: input.neuron_count(),
            });
        }

        self.phase = TickPhase::Integrating;
        if let Some(next) = self.model.integrate(input, &self.rate, self.dt)? {
            self.rate = next;
        }
        self.phase = TickPhase::Learning;
        Ok(())
    }

    /// Learning phase: let every attached projection update its weights.
    ///
    /// Projections are visited in rank-major, synapse-type-minor order.
    pub fn meta_learn<L>(&self, learner: &mut L) -> Result<()>
    where
        L: ProjectionLearning + ?Sized,
    {
        self.expect_phase(TickPhase::Learning)?;
        for (_, handle) in self.connections.iter() {
            learner.learn(handle, self)?;
        }
        Ok(())
    }

    /// GlobalOps phase: apply the population-wide reduction
    pub fn global_operations(&mut self) -> Result<()> {
        self.expect_phase(TickPhase::Learning)?;
        if self.neuron_count > 0 {
            self.global_operation.apply(&mut self.rate);
            self.statistics = RateStatistics::from_rates(&self.rate);
        }
        self.phase = TickPhase::GlobalOps;
        Ok(())
    }

    /// Commit the current rates as the one-tick-old snapshot and start a new tick.
    ///
    /// Valid after GlobalOps, or from Summing to seed history between ticks.
    pub fn advance(&mut self) -> Result<()> {
        match self.phase {
            TickPhase::Summing | TickPhase::GlobalOps => {}
            current => {
                return Err(RuntimeError::PhaseOrder {
                    expected: TickPhase::GlobalOps,
                    current,
                })
            }
        }
        self.history.push(&self.rate)?;
        self.phase = TickPhase::Summing;
        Ok(())
    }

    /// Zero rates and history, keep depth and connections, return to Summing
    pub fn reset(&mut self) {
        self.rate.iter_mut().for_each(|r| *r = 0.0);
        self.history.clear();
        self.statistics = RateStatistics::default();
        self.phase = TickPhase::Summing;
    }

    /// Log the diagnostic rate dump
    pub fn print_rates(&self) {
        log::info!("{}", self);
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Population '{}' ({}, {} neurons, {}): [",
            self.name,
            self.id,
            self.neuron_count,
            self.model.name()
        )?;
        for (i, r) in self.rate.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.4}", r)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neuron::{LinearParams, RateDynamics};

    fn input_population(n: usize) -> Population {
        Population::new(PopulationId::new(0), "input", n, NeuronModel::Input).unwrap()
    }

    fn handle(id: u32, source: u32, ty: SynapseType) -> ProjectionHandle {
        ProjectionHandle::new(ProjectionId::new(id), PopulationId::new(source), ty)
    }

    /// Access returning a fixed value per projection ID
    struct FixedAccess;

    impl ProjectionAccess for FixedAccess {
        fn contribution(&self, handle: &ProjectionHandle) -> Result<f64> {
            Ok(handle.id.raw() as f64)
        }
    }

    #[derive(Default)]
    struct RecordingLearner {
        visited: Vec<u32>,
    }

    impl ProjectionLearning for RecordingLearner {
        fn learn(&mut self, handle: &ProjectionHandle, _post: &Population) -> Result<()> {
            self.visited.push(handle.id.raw());
            Ok(())
        }
    }

    #[test]
    fn test_population_creation() {
        let pop = input_population(3);
        assert_eq!(pop.neuron_count(), 3);
        assert_eq!(pop.rates(), &[0.0, 0.0, 0.0]);
        assert_eq!(pop.max_delay(), 0);
        assert_eq!(pop.phase(), TickPhase::Summing);
        assert_eq!(pop.dt(), DEFAULT_DT_MS);
        assert_eq!(pop.name(), "input");
    }

    #[test]
    fn test_set_dt_validation() {
        let mut pop = input_population(1);
        assert!(pop.set_dt(0.0).is_err());
        assert!(pop.set_dt(f64::NAN).is_err());
        pop.set_dt(0.5).unwrap();
        assert_eq!(pop.dt(), 0.5);
    }

    #[test]
    fn test_set_rates_length_checked() {
        let mut pop = input_population(3);
        let err = pop.set_rates(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err, RuntimeError::RateLengthMismatch { expected: 3, found: 2 });
        assert_eq!(pop.rates(), &[0.0, 0.0, 0.0]);

        assert!(pop.set_rate(3, 1.0).is_err());
        pop.set_rate(1, 4.0).unwrap();
        assert_eq!(pop.rate(1), Some(4.0));
    }

    #[test]
    fn test_delayed_rates() {
        let mut pop = input_population(3);
        pop.set_max_delay(2);

        pop.set_rates(&[1.0, 2.0, 3.0]).unwrap();
        pop.advance().unwrap();
        pop.set_rates(&[4.0, 5.0, 6.0]).unwrap();
        pop.advance().unwrap();

        assert_eq!(pop.rates_at(2), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(pop.rates_at(1), Some(&[4.0, 5.0, 6.0][..]));
        assert!(pop.rates_at(3).is_none());
    }

    #[test]
    fn test_delay_zero_is_not_a_snapshot() {
        let mut pop = input_population(3);
        pop.set_max_delay(2);
        pop.set_rates(&[1.0, 2.0, 3.0]).unwrap();

        assert!(pop.rates_at(0).is_none());
        assert_eq!(pop.rates(), &[1.0, 2.0, 3.0]);
        assert_eq!(
            pop.rates_batch(&[0], &[0]).unwrap_err(),
            RuntimeError::DelayOutOfRange { delay: 0, max_delay: 2 }
        );
    }

    #[test]
    fn test_rates_batch() {
        let mut pop = input_population(2);
        pop.set_max_delay(1);
        pop.set_rates(&[1.0, 2.0]).unwrap();
        pop.advance().unwrap();
        pop.set_rates(&[3.0, 4.0]).unwrap();

        let values = pop.rates_batch(&[1, 1, 1], &[1, 0, 0]).unwrap();
        assert_eq!(values, vec![2.0, 1.0, 1.0]);

        let err = pop.rates_batch(&[1, 2], &[0, 0]).unwrap_err();
        assert_eq!(err, RuntimeError::DelayOutOfRange { delay: 2, max_delay: 1 });

        let err = pop.rates_batch(&[1], &[2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        assert!(pop.rates_batch(&[1, 1], &[0]).is_err());
    }

    #[test]
    fn test_projection_index() {
        let mut pop = input_population(2);
        pop.add_projection(0, handle(3, 1, SynapseType::EXCITATORY)).unwrap();
        assert_eq!(
            pop.get_projection(0, SynapseType::EXCITATORY),
            Some(ProjectionId::new(3))
        );

        let err = pop
            .add_projection(0, handle(4, 2, SynapseType::EXCITATORY))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            pop.get_projection(0, SynapseType::EXCITATORY),
            Some(ProjectionId::new(3))
        );

        assert!(pop.add_projection(5, handle(5, 1, SynapseType::EXCITATORY)).is_err());
        assert_eq!(pop.projection_count(), 1);

        assert_eq!(pop.remove_projection(PopulationId::new(1)), 1);
        assert_eq!(pop.remove_projection(PopulationId::new(1)), 0);
        assert!(pop.get_projection(0, SynapseType::EXCITATORY).is_none());
    }

    #[test]
    fn test_sum_and_meta_sum() {
        let mut pop = Population::new(
            PopulationId::new(0),
            "out",
            2,
            NeuronModel::Linear(LinearParams::default()),
        )
        .unwrap();
        pop.add_projection(0, handle(3, 1, SynapseType::EXCITATORY)).unwrap();
        pop.add_projection(0, handle(1, 1, SynapseType::INHIBITORY)).unwrap();
        pop.add_projection(1, handle(2, 1, SynapseType::EXCITATORY)).unwrap();

        assert_eq!(pop.sum(0, SynapseType::EXCITATORY, &FixedAccess).unwrap(), 3.0);
        assert_eq!(pop.sum(1, SynapseType::INHIBITORY, &FixedAccess).unwrap(), 0.0);

        let input = pop.meta_sum(&FixedAccess).unwrap();
        assert_eq!(input.get(SynapseType::EXCITATORY, 0), 3.0);
        assert_eq!(input.get(SynapseType::INHIBITORY, 0), 1.0);
        assert_eq!(input.get(SynapseType::EXCITATORY, 1), 2.0);
        assert_eq!(input.net(0), 2.0);

        // Summing does not touch state
        assert_eq!(pop.rates(), &[0.0, 0.0]);

        pop.integrate(&input).unwrap();
        assert_eq!(pop.rates(), &[2.0, 2.0]);
    }

    #[test]
    fn test_phase_order() {
        let mut pop = input_population(1);
        let input = SynapticInput::new(1);

        // Learning and GlobalOps before integration
        assert!(matches!(
            pop.global_operations(),
            Err(RuntimeError::PhaseOrder { .. })
        ));
        assert!(pop.meta_learn(&mut RecordingLearner::default()).is_err());

        pop.integrate(&input).unwrap();
        assert_eq!(pop.phase(), TickPhase::Learning);
        assert!(pop.integrate(&input).is_err());
        assert!(pop.meta_sum(&FixedAccess).is_err());
        assert!(pop.advance().is_err());

        pop.meta_learn(&mut RecordingLearner::default()).unwrap();
        pop.global_operations().unwrap();
        assert_eq!(pop.phase(), TickPhase::GlobalOps);
        assert!(pop.global_operations().is_err());

        pop.advance().unwrap();
        assert_eq!(pop.phase(), TickPhase::Summing);
    }

    #[test]
    fn test_meta_learn_order() {
        let mut pop = input_population(2);
        pop.add_projection(1, handle(0, 1, SynapseType::EXCITATORY)).unwrap();
        pop.add_projection(0, handle(1, 1, SynapseType::INHIBITORY)).unwrap();
        pop.add_projection(0, handle(2, 1, SynapseType::EXCITATORY)).unwrap();
        pop.integrate(&SynapticInput::new(2)).unwrap();

        let mut learner = RecordingLearner::default();
        pop.meta_learn(&mut learner).unwrap();
        assert_eq!(learner.visited, vec![2, 1, 0]);
    }

    #[test]
    fn test_global_operations_and_statistics() {
        let mut pop = input_population(3).with_global_operation(GlobalOperation::NormalizeMax);
        pop.set_rates(&[1.0, 2.0, 4.0]).unwrap();
        pop.integrate(&SynapticInput::new(3)).unwrap();
        pop.global_operations().unwrap();

        assert_eq!(pop.rates(), &[0.25, 0.5, 1.0]);
        let stats = pop.statistics();
        assert_eq!(stats.min, 0.25);
        assert_eq!(stats.max, 1.0);
        assert!((stats.mean - 1.75 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_neuron_population() {
        let mut pop = input_population(0);
        pop.set_max_delay(3);

        let input = pop.meta_sum(&FixedAccess).unwrap();
        pop.integrate(&input).unwrap();
        pop.meta_learn(&mut RecordingLearner::default()).unwrap();
        pop.global_operations().unwrap();
        pop.advance().unwrap();

        assert!(pop.rates().is_empty());
        assert_eq!(pop.rates_at(3), Some(&[][..]));
        assert_eq!(pop.statistics(), RateStatistics::default());
    }

    #[derive(Debug)]
    struct Shrinking;

    impl RateDynamics for Shrinking {
        fn integrate(&mut self, _input: &SynapticInput, _rates: &[f64], _dt: f64) -> Vec<f64> {
            Vec::new()
        }
    }

    #[test]
    fn test_failed_integration_keeps_rates() {
        let mut pop = Population::new(
            PopulationId::new(0),
            "custom",
            2,
            NeuronModel::custom(Shrinking),
        )
        .unwrap();
        pop.set_rates(&[1.0, 2.0]).unwrap();

        let err = pop.integrate(&SynapticInput::new(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
        assert_eq!(pop.rates(), &[1.0, 2.0]);
        assert_eq!(pop.phase(), TickPhase::Integrating);

        // Poisoned until reset
        assert!(pop.advance().is_err());
        pop.reset();
        assert_eq!(pop.phase(), TickPhase::Summing);
        assert_eq!(pop.rates(), &[0.0, 0.0]);
    }

    #[test]
    fn test_mismatched_input_rejected() {
        let mut pop = input_population(2);
        assert!(pop.integrate(&SynapticInput::new(3)).is_err());
        assert_eq!(pop.phase(), TickPhase::Summing);
    }

    #[test]
    fn test_reset_keeps_depth_and_connections() {
        let mut pop = input_population(1);
        pop.set_max_delay(2);
        pop.add_projection(0, handle(0, 1, SynapseType::EXCITATORY)).unwrap();
        pop.set_rates(&[3.0]).unwrap();
        pop.advance().unwrap();

        pop.reset();
        assert_eq!(pop.max_delay(), 2);
        assert_eq!(pop.projection_count(), 1);
        assert_eq!(pop.rates_at(1), Some(&[0.0][..]));
    }

    #[test]
    fn test_display() {
        let mut pop = input_population(2);
        pop.set_rates(&[1.0, 0.5]).unwrap();
        let dump = pop.to_string();
        assert!(dump.contains("'input'"));
        assert!(dump.contains("[1.0000, 0.5000]"));
    }
}
