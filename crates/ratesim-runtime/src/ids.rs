//! Identifier and tag types shared across the runtime

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unique identifier for a population within a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PopulationId(pub u32);

impl PopulationId {
    /// Create a new population ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Get the next population ID
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for PopulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Unique identifier for a projection in the network's projection store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectionId(pub u32);

impl ProjectionId {
    /// Create a new projection ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Get the next projection ID
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for ProjectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}", self.0)
    }
}

/// Synapse-type tag carried by every projection.
///
/// Each postsynaptic neuron receives at most one projection per tag. The two
/// conventional targets are predefined; any other value is a user-defined
/// target that contributes positively to the net input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynapseType(pub u16);

impl SynapseType {
    /// Excitatory target
    pub const EXCITATORY: Self = Self(0);

    /// Inhibitory target
    pub const INHIBITORY: Self = Self(1);

    /// Create a new synapse type
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }

    /// Get the raw tag value
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Sign applied when aggregating this target into the net input
    pub fn sign(&self) -> f64 {
        if *self == Self::INHIBITORY {
            -1.0
        } else {
            1.0
        }
    }
}

impl fmt::Display for SynapseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EXCITATORY => write!(f, "exc"),
            Self::INHIBITORY => write!(f, "inh"),
            Self(tag) => write!(f, "t{}", tag),
        }
    }
}
