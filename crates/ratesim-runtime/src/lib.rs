//! Rate-coded neural network runtime
//!
//! This crate provides the population core of a rate-coded simulation kernel:
//! per-neuron firing rates, a synaptic delay history with O(1) delayed lookups,
//! a per-neuron connection index keyed by synapse type, and the four-phase
//! tick cycle (Summing, Integrating, Learning, GlobalOps) a scheduler drives
//! across the network. [`Network`] is the reference scheduler and
//! [`SimulationEngine`] runs it with stimuli and recording.
//!
//! ```
//! use ratesim_runtime::{Connector, NetworkBuilder, NeuronModel, LinearParams, SynapseType};
//!
//! let mut network = NetworkBuilder::new()
//!     .population("input", 2, NeuronModel::Input)
//!     .population("output", 1, NeuronModel::Linear(LinearParams::default()))
//!     .connect("input", "output", SynapseType::EXCITATORY, Connector::all_to_all(0.5, 0))
//!     .build()?;
//!
//! let input = network.population_id("input").unwrap();
//! network.population_mut(input)?.set_rates(&[2.0, 4.0])?;
//! network.step()?;
//! assert_eq!(network.population_by_name("output").unwrap().rates(), &[3.0]);
//! # Ok::<(), ratesim_runtime::RuntimeError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod connection;
pub mod connector;
pub mod delay;
pub mod error;
pub mod ids;
pub mod network;
pub mod neuron;
pub mod plasticity;
pub mod population;
pub mod projection;
pub mod simulation;

// Re-export essential types
pub use connection::{ConnectionIndex, ProjectionHandle};
pub use connector::Connector;
pub use delay::DelayRing;
pub use error::{ErrorKind, Result, RuntimeError};
pub use ids::{PopulationId, ProjectionId, SynapseType};
pub use network::{Network, NetworkBuilder, NetworkConfig};
pub use neuron::{
    GlobalOperation, LeakyRateParams, LinearParams, NeuronModel, RateDynamics, SynapticInput,
};
pub use plasticity::{
    HebbianParams, HebbianRule, LearningRule, LearningRuleConfig, OjaParams, OjaRule,
};
pub use population::{Population, RateStatistics, TickPhase, DEFAULT_DT_MS};
pub use projection::{Dendrite, Projection, ProjectionAccess, ProjectionLearning};
pub use simulation::{
    run_fixed_step, PerfReport, RateSample, SimulationEngine, SimulationParams, SimulationResult,
    Stimulus,
};

/// Runtime crate version for compatibility checking
pub const RUNTIME_VERSION: u32 = 1;
