//! Sparse index of incoming projections per neuron and synapse type

use crate::{
    error::*,
    ids::{PopulationId, ProjectionId, SynapseType},
};
use smallvec::SmallVec;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a population keeps about an attached projection.
///
/// The projection itself lives in the network's projection store; the index
/// only holds its ID plus the two attributes it needs for lookup and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectionHandle {
    /// Projection ID in the store
    pub id: ProjectionId,
    /// Presynaptic population
    pub source: PopulationId,
    /// Synapse type the projection targets
    pub synapse_type: SynapseType,
}

impl ProjectionHandle {
    /// Create a new handle
    pub fn new(id: ProjectionId, source: PopulationId, synapse_type: SynapseType) -> Self {
        Self {
            id,
            source,
            synapse_type,
        }
    }
}

type ConnectionKey = (usize, SynapseType);

/// Mapping `(rank, synapse_type) -> projection` with at most one entry per key
#[derive(Debug, Clone, Default)]
pub struct ConnectionIndex {
    entries: HashMap<ConnectionKey, ProjectionHandle>,
    /// Registered types per rank, kept sorted for deterministic iteration
    types: Vec<SmallVec<[SynapseType; 2]>>,
}

impl ConnectionIndex {
    /// Create an empty index for `neuron_count` neurons
    pub fn new(neuron_count: usize) -> Self {
        Self {
            entries: HashMap::new(),
            types: vec![SmallVec::new(); neuron_count],
        }
    }

    /// Number of neurons covered by the index
    pub fn neuron_count(&self) -> usize {
        self.types.len()
    }

    /// Register `handle` for neuron `rank`.
    ///
    /// Fails without touching the index if `rank` is out of range or the key
    /// `(rank, handle.synapse_type)` is already taken.
    pub fn insert(&mut self, rank: usize, handle: ProjectionHandle) -> Result<()> {
        if rank >= self.types.len() {
            return Err(RuntimeError::invalid_config(format!(
                "cannot attach {} to rank {}: population has {} neurons",
                handle.id,
                rank,
                self.types.len()
            )));
        }

        let key = (rank, handle.synapse_type);
        if self.entries.contains_key(&key) {
            return Err(RuntimeError::DuplicateProjection {
                rank,
                synapse_type: handle.synapse_type,
            });
        }

        self.entries.insert(key, handle);
        let types = &mut self.types[rank];
        let pos = types.partition_point(|t| *t < handle.synapse_type);
        types.insert(pos, handle.synapse_type);
        Ok(())
    }

    /// Remove every entry whose source is `source`. Returns how many were removed.
    pub fn remove_source(&mut self, source: PopulationId) -> usize {
        let before = self.entries.len();
        let types = &mut self.types;
        self.entries.retain(|(rank, synapse_type), handle| {
            if handle.source == source {
                types[*rank].retain(|t| t != synapse_type);
                false
            } else {
                true
            }
        });
        before - self.entries.len()
    }

    /// Remove the entry for a single projection, wherever it is registered
    pub fn remove_projection(&mut self, id: ProjectionId) -> Option<ProjectionHandle> {
        let key = self
            .entries
            .iter()
            .find(|(_, handle)| handle.id == id)
            .map(|(key, _)| *key)?;
        let handle = self.entries.remove(&key)?;
        self.types[key.0].retain(|t| *t != key.1);
        Some(handle)
    }

    /// O(1) lookup
    pub fn get(&self, rank: usize, synapse_type: SynapseType) -> Option<&ProjectionHandle> {
        self.entries.get(&(rank, synapse_type))
    }

    /// Synapse types registered for `rank`, ascending. Empty for unknown ranks.
    pub fn types(&self, rank: usize) -> &[SynapseType] {
        self.types.get(rank).map(|t| t.as_slice()).unwrap_or(&[])
    }

    /// All distinct synapse types present in the index, ascending
    pub fn all_types(&self) -> Vec<SynapseType> {
        let mut all: Vec<SynapseType> = self.types.iter().flatten().copied().collect();
        all.sort_unstable();
        all.dedup();
        all
    }

    /// Every entry in rank-major, type-minor order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ProjectionHandle)> + '_ {
        self.types.iter().enumerate().flat_map(move |(rank, types)| {
            types
                .iter()
                .filter_map(move |t| self.entries.get(&(rank, *t)).map(|h| (rank, h)))
        })
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
