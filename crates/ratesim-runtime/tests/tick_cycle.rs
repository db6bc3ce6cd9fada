//! Tick phase ordering on a single population and across a network

use ratesim_runtime::{
    Connector, ErrorKind, GlobalOperation, LinearParams, Network, NetworkConfig, NeuronModel,
    Population, PopulationId, ProjectionAccess, ProjectionHandle, ProjectionId,
    ProjectionLearning, RateDynamics, Result, RuntimeError, SynapseType, SynapticInput,
    TickPhase,
};

/// Answers every projection with a fixed value
struct Constant(f64);

impl ProjectionAccess for Constant {
    fn contribution(&self, _handle: &ProjectionHandle) -> Result<f64> {
        Ok(self.0)
    }
}

/// Counts learning calls
#[derive(Default)]
struct Counter(usize);

impl ProjectionLearning for Counter {
    fn learn(&mut self, _handle: &ProjectionHandle, _post: &Population) -> Result<()> {
        self.0 += 1;
        Ok(())
    }
}

fn linear(n: usize) -> Population {
    Population::new(
        PopulationId::new(1),
        "linear",
        n,
        NeuronModel::Linear(LinearParams::default()),
    )
    .unwrap()
}

fn wire(pop: &mut Population, rank: usize, id: u32, synapse_type: SynapseType) {
    pop.add_projection(
        rank,
        ProjectionHandle::new(ProjectionId::new(id), PopulationId::new(0), synapse_type),
    )
    .unwrap();
}

#[test]
fn full_cycle_in_order() {
    let mut pop = linear(2).with_global_operation(GlobalOperation::NormalizeMax);
    pop.set_max_delay(1);
    wire(&mut pop, 0, 1, SynapseType::EXCITATORY);
    wire(&mut pop, 1, 2, SynapseType::EXCITATORY);
    wire(&mut pop, 1, 3, SynapseType::INHIBITORY);

    assert_eq!(pop.phase(), TickPhase::Summing);
    let input = pop.meta_sum(&Constant(2.0)).unwrap();
    assert_eq!(input.get(SynapseType::EXCITATORY, 1), 2.0);
    assert_eq!(input.net(1), 0.0);

    pop.integrate(&input).unwrap();
    assert_eq!(pop.phase(), TickPhase::Learning);
    assert_eq!(pop.rates(), &[2.0, 0.0]);

    let mut counter = Counter::default();
    pop.meta_learn(&mut counter).unwrap();
    assert_eq!(counter.0, 3);

    pop.global_operations().unwrap();
    assert_eq!(pop.phase(), TickPhase::GlobalOps);
    assert_eq!(pop.rates(), &[1.0, 0.0]);
    assert_eq!(pop.statistics().max, 1.0);

    pop.advance().unwrap();
    assert_eq!(pop.phase(), TickPhase::Summing);
    assert_eq!(pop.rates_at(1), Some(&[1.0, 0.0][..]));
}

#[test]
fn out_of_order_calls_are_rejected() {
    let mut pop = linear(1);
    let mut counter = Counter::default();

    assert_eq!(pop.meta_learn(&mut counter).unwrap_err().kind(), ErrorKind::Phase);
    assert_eq!(pop.global_operations().unwrap_err().kind(), ErrorKind::Phase);

    let input = pop.meta_sum(&Constant(1.0)).unwrap();
    pop.integrate(&input).unwrap();

    // Second integration and summing are both out of order now
    assert_eq!(
        pop.integrate(&input).unwrap_err(),
        RuntimeError::PhaseOrder {
            expected: TickPhase::Summing,
            current: TickPhase::Learning,
        }
    );
    assert!(pop.meta_sum(&Constant(1.0)).is_err());
    assert!(pop.advance().is_err());
    assert_eq!(pop.phase(), TickPhase::Learning);
}

#[test]
fn sum_without_projection_is_zero() {
    let pop = linear(2);
    assert_eq!(pop.sum(0, SynapseType::EXCITATORY, &Constant(5.0)).unwrap(), 0.0);
}

#[test]
fn zero_neuron_population_steps_safely() {
    let mut pop = linear(0);
    pop.set_max_delay(2);
    let input = pop.meta_sum(&Constant(1.0)).unwrap();
    pop.integrate(&input).unwrap();
    pop.meta_learn(&mut Counter::default()).unwrap();
    pop.global_operations().unwrap();
    pop.advance().unwrap();
    assert!(pop.rates().is_empty());
    assert_eq!(pop.rates_at(2), Some(&[][..]));
}

#[derive(Debug)]
struct Doubling;

impl RateDynamics for Doubling {
    fn integrate(&mut self, input: &SynapticInput, rates: &[f64], _dt: f64) -> Vec<f64> {
        rates
            .iter()
            .enumerate()
            .map(|(i, r)| 2.0 * r + input.net(i))
            .collect()
    }
}

#[derive(Debug)]
struct Truncating;

impl RateDynamics for Truncating {
    fn integrate(&mut self, _input: &SynapticInput, rates: &[f64], _dt: f64) -> Vec<f64> {
        rates.iter().skip(1).copied().collect()
    }
}

#[test]
fn custom_dynamics_are_checked() {
    let mut pop = Population::new(PopulationId::new(0), "custom", 2, NeuronModel::custom(Doubling)).unwrap();
    pop.set_rates(&[1.0, 2.0]).unwrap();
    let input = pop.meta_sum(&Constant(0.0)).unwrap();
    pop.integrate(&input).unwrap();
    assert_eq!(pop.rates(), &[2.0, 4.0]);

    let mut bad = Population::new(PopulationId::new(1), "bad", 2, NeuronModel::custom(Truncating)).unwrap();
    bad.set_rates(&[1.0, 2.0]).unwrap();
    let input = bad.meta_sum(&Constant(0.0)).unwrap();
    let err = bad.integrate(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invariant);
    // The length invariant still holds and the population stays stuck until reset
    assert_eq!(bad.rates(), &[1.0, 2.0]);
    assert_eq!(bad.phase(), TickPhase::Integrating);
    bad.reset();
    assert_eq!(bad.phase(), TickPhase::Summing);
}

#[test]
fn network_sums_before_any_population_integrates() {
    // Two linear populations feeding each other with zero delay: each must see
    // the other's rate from the previous tick, not the freshly integrated one.
    let mut network = Network::new(NetworkConfig::default()).unwrap();
    let a = network
        .add_population("a", 1, NeuronModel::Linear(LinearParams::new(1.0, false).unwrap()))
        .unwrap();
    let b = network
        .add_population("b", 1, NeuronModel::Linear(LinearParams::default()))
        .unwrap();
    network
        .connect_with(a, b, SynapseType::EXCITATORY, &Connector::all_to_all(1.0, 0), None)
        .unwrap();
    network
        .connect_with(b, a, SynapseType::EXCITATORY, &Connector::all_to_all(1.0, 0), None)
        .unwrap();

    network.step().unwrap();
    assert_eq!(network.population(a).unwrap().rates(), &[1.0]);
    assert_eq!(network.population(b).unwrap().rates(), &[0.0]);

    network.step().unwrap();
    assert_eq!(network.population(a).unwrap().rates(), &[1.0]);
    assert_eq!(network.population(b).unwrap().rates(), &[1.0]);

    network.step().unwrap();
    assert_eq!(network.population(a).unwrap().rates(), &[2.0]);
    assert_eq!(network.population(b).unwrap().rates(), &[1.0]);

    for pop in network.populations() {
        assert_eq!(pop.phase(), TickPhase::Summing);
    }
}

#[test]
fn failed_tick_reports_the_population_error() {
    let mut network = Network::new(NetworkConfig::default()).unwrap();
    let pop = network
        .add_population("bad", 2, NeuronModel::custom(Truncating))
        .unwrap();
    let err = network.step().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invariant);

    // Stuck until reset
    assert_eq!(network.step().unwrap_err().kind(), ErrorKind::Phase);
    network.reset();
    assert_eq!(network.population(pop).unwrap().phase(), TickPhase::Summing);
}
