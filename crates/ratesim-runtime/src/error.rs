//! Error types for the rate-coded runtime

use crate::{ids::PopulationId, ids::ProjectionId, ids::SynapseType, population::TickPhase};
use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Broad class of a [`RuntimeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wiring or parameter problem reported at the call site
    Configuration,
    /// Delay or rank outside the valid range
    Range,
    /// Internal invariant broken by an external collaborator
    Invariant,
    /// Tick phase invoked out of order
    Phase,
    /// Non-finite value produced by a computation
    Numerical,
    /// Unknown population or projection
    Lookup,
    /// Failure wrapped by the simulation driver
    Simulation,
}

/// Errors that can occur in the rate-coded runtime
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Invalid network configuration
    #[error("Invalid network configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// A projection is already registered for this neuron and synapse type
    #[error("Neuron {rank} already has a projection of type {synapse_type}")]
    DuplicateProjection {
        /// Postsynaptic rank
        rank: usize,
        /// Synapse type of the rejected projection
        synapse_type: SynapseType,
    },

    /// Neuron rank outside `[0, neuron_count)`
    #[error("Rank {rank} out of range for population of {neuron_count} neurons")]
    RankOutOfRange {
        /// Offending rank
        rank: usize,
        /// Population size
        neuron_count: usize,
    },

    /// Delay beyond the population's history depth
    #[error("Delay {delay} exceeds maximum delay {max_delay}")]
    DelayOutOfRange {
        /// Requested delay in ticks
        delay: usize,
        /// Current history depth
        max_delay: usize,
    },

    /// Rate vector length differs from the neuron count
    #[error("Rate vector has {found} entries, expected {expected}")]
    RateLengthMismatch {
        /// Neuron count
        expected: usize,
        /// Length actually supplied
        found: usize,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Tick phase called out of order
    #[error("Operation requires phase {expected:?} but population is in {current:?}")]
    PhaseOrder {
        /// Phase the operation must be called in
        expected: TickPhase,
        /// Phase the population is actually in
        current: TickPhase,
    },

    /// Population not found
    #[error("Population {id} not found")]
    PopulationNotFound {
        /// Population ID that was not found
        id: PopulationId,
    },

    /// Projection not found
    #[error("Projection {id} not found")]
    ProjectionNotFound {
        /// Projection ID that was not found
        id: ProjectionId,
    },

    /// Simulation step failed
    #[error("Simulation step failed at tick {tick}: {reason}")]
    SimulationStep {
        /// Tick at which the step failed
        tick: u64,
        /// Reason for failure
        reason: String,
    },

    /// Numerical computation error
    #[error("Numerical error: {reason}")]
    NumericalError {
        /// Reason for numerical error
        reason: String,
    },
}

impl RuntimeError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create a simulation step error
    pub fn simulation_step(tick: u64, reason: impl Into<String>) -> Self {
        Self::SimulationStep {
            tick,
            reason: reason.into(),
        }
    }

    /// Create a numerical error
    pub fn numerical_error(reason: impl Into<String>) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration { .. }
            | Self::DuplicateProjection { .. }
            | Self::InvalidParameter { .. } => ErrorKind::Configuration,
            Self::RankOutOfRange { .. } | Self::DelayOutOfRange { .. } => ErrorKind::Range,
            Self::RateLengthMismatch { .. } => ErrorKind::Invariant,
            Self::PhaseOrder { .. } => ErrorKind::Phase,
            Self::NumericalError { .. } => ErrorKind::Numerical,
            Self::PopulationNotFound { .. } | Self::ProjectionNotFound { .. } => ErrorKind::Lookup,
            Self::SimulationStep { .. } => ErrorKind::Simulation,
        }
    }
}
