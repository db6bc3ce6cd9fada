//! Rate neuron models driven by the Integrating phase

use crate::{error::*, ids::SynapseType};
use core::fmt;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output of the Summing phase: one summed input per synapse type and neuron
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SynapticInput {
    neuron_count: usize,
    sums: BTreeMap<SynapseType, Vec<f64>>,
}

impl SynapticInput {
    /// Create an empty input for `neuron_count` neurons
    pub fn new(neuron_count: usize) -> Self {
        Self {
            neuron_count,
            sums: BTreeMap::new(),
        }
    }

    /// Number of neurons covered
    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    /// Store the summed input of `synapse_type` for neuron `rank`
    pub fn set(&mut self, synapse_type: SynapseType, rank: usize, value: f64) {
        let n = self.neuron_count;
        if rank < n {
            self.sums.entry(synapse_type).or_insert_with(|| vec![0.0; n])[rank] = value;
        }
    }

    /// Summed input for one neuron and type; zero if nothing was registered
    pub fn get(&self, synapse_type: SynapseType, rank: usize) -> f64 {
        self.sums
            .get(&synapse_type)
            .and_then(|v| v.get(rank))
            .copied()
            .unwrap_or(0.0)
    }

    /// Whole vector for one synapse type
    pub fn by_type(&self, synapse_type: SynapseType) -> Option<&[f64]> {
        self.sums.get(&synapse_type).map(Vec::as_slice)
    }

    /// Synapse types that received any input, ascending
    pub fn types(&self) -> impl Iterator<Item = SynapseType> + '_ {
        self.sums.keys().copied()
    }

    /// Sign-weighted sum over all types for neuron `rank`
    pub fn net(&self, rank: usize) -> f64 {
        self.sums
            .iter()
            .map(|(ty, v)| ty.sign() * v.get(rank).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Externally supplied integration step.
///
/// Implementations return a fresh rate vector; the population checks its length
/// and finiteness before committing it.
pub trait RateDynamics: fmt::Debug + Send + Sync {
    /// Compute the next rate vector from the summed input
    fn integrate(&mut self, input: &SynapticInput, rates: &[f64], dt: f64) -> Vec<f64>;
}

/// Parameters for the instantaneous linear model
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearParams {
    /// Constant offset added to the net input
    pub baseline: f64,
    /// Clamp negative rates to zero
    pub rectify: bool,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            baseline: 0.0,
            rectify: false,
        }
    }
}

impl LinearParams {
    /// Create new linear parameters with validation
    pub fn new(baseline: f64, rectify: bool) -> Result<Self> {
        if !baseline.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "baseline",
                baseline.to_string(),
                "finite",
            ));
        }
        Ok(Self { baseline, rectify })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.baseline, self.rectify)?;
        Ok(())
    }
}

/// Parameters for the leaky rate model `tau * dr/dt = -r + baseline + net`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeakyRateParams {
    /// Time constant (ms)
    pub tau: f64,
    /// Constant offset added to the net input
    pub baseline: f64,
    /// Clamp negative rates to zero
    pub rectify: bool,
}

impl Default for LeakyRateParams {
    fn default() -> Self {
        Self {
            tau: 10.0,      // 10ms time constant
            baseline: 0.0,
            rectify: true,
        }
    }
}

impl LeakyRateParams {
    /// Create new leaky rate parameters with validation
    pub fn new(tau: f64, baseline: f64, rectify: bool) -> Result<Self> {
        if !tau.is_finite() || tau <= 0.0 {
            return Err(RuntimeError::invalid_parameter(
                "tau",
                tau.to_string(),
                "> 0.0",
            ));
        }
        if !baseline.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "baseline",
                baseline.to_string(),
                "finite",
            ));
        }
        Ok(Self {
            tau,
            baseline,
            rectify,
        })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.tau, self.baseline, self.rectify)?;
        Ok(())
    }
}

/// Neuron model of a population, chosen once at construction
#[derive(Debug)]
pub enum NeuronModel {
    /// Rates are set from outside; integration keeps them unchanged
    Input,
    /// `r = baseline + net`
    Linear(LinearParams),
    /// Forward Euler on `tau * dr/dt = -r + baseline + net`
    LeakyRate(LeakyRateParams),
    /// User-provided dynamics
    Custom(Box<dyn RateDynamics>),
}

impl Default for NeuronModel {
    fn default() -> Self {
        Self::LeakyRate(LeakyRateParams::default())
    }
}

impl NeuronModel {
    /// Wrap custom dynamics
    pub fn custom(dynamics: impl RateDynamics + 'static) -> Self {
        Self::Custom(Box::new(dynamics))
    }

    /// Validate model parameters
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Input | Self::Custom(_) => Ok(()),
            Self::Linear(params) => params.validate(),
            Self::LeakyRate(params) => params.validate(),
        }
    }

    /// Short model name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Linear(_) => "linear",
            Self::LeakyRate(_) => "leaky-rate",
            Self::Custom(_) => "custom",
        }
    }

    /// Compute the next rate vector.
    ///
    /// Returns `Ok(None)` when the model keeps the current rates. Any vector
    /// returned has been checked for length and finiteness.
    pub fn integrate(
        &mut self,
        input: &SynapticInput,
        rates: &[f64],
        dt: f64,
    ) -> Result<Option<Vec<f64>>> {
        let next = match self {
            Self::Input => return Ok(None),
            Self::Linear(params) => (0..rates.len())
                .map(|i| rectify(params.baseline + input.net(i), params.rectify))
                .collect::<Vec<_>>(),
            Self::LeakyRate(params) => {
                let k = dt / params.tau;
                rates
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        let drive = params.baseline + input.net(i);
                        rectify(r + k * (drive - r), params.rectify)
                    })
                    .collect::<Vec<_>>()
            }
            Self::Custom(dynamics) => dynamics.integrate(input, rates, dt),
        };

        if next.len() != rates.len() {
            return Err(RuntimeError::RateLengthMismatch {
                expected: rates.len(),
                found: next.len(),
            });
        }
        if let Some(rank) = next.iter().position(|r| !r.is_finite()) {
            return Err(RuntimeError::numerical_error(format!(
                "{} model produced non-finite rate {} for neuron {}",
                self.name(),
                next[rank],
                rank
            )));
        }
        Ok(Some(next))
    }
}

fn rectify(value: f64, enabled: bool) -> f64 {
    if enabled {
        value.max(0.0)
    } else {
        value
    }
}

/// Population-wide reduction applied during the GlobalOps phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GlobalOperation {
    /// Leave rates as integrated
    #[default]
    None,
    /// Divide by the largest absolute rate
    NormalizeMax,
    /// Divide by the sum of absolute rates
    NormalizeSum,
}

impl GlobalOperation {
    /// Apply the reduction in place. All-zero vectors are left unchanged.
    pub fn apply(&self, rates: &mut [f64]) {
        let scale = match self {
            Self::None => return,
            Self::NormalizeMax => rates.iter().fold(0.0_f64, |m, r| m.max(r.abs())),
            Self::NormalizeSum => rates.iter().map(|r| r.abs()).sum(),
        };
        if scale > 0.0 {
            rates.iter_mut().for_each(|r| *r /= scale);
        }
    }
}
