//! Simulation engine for rate-coded networks

use crate::{
    error::*,
    ids::PopulationId,
    network::Network,
    population::RateStatistics,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 42;

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationParams {
    /// Number of ticks to run
    pub steps: u64,
    /// Record rates of these populations (None = all)
    pub record: Option<Vec<PopulationId>>,
    /// Record every n-th tick
    pub record_every: u64,
    /// Seed for stimulus noise
    pub random_seed: Option<u64>,
    /// Enable performance sampling
    pub perf_enabled: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            steps: 1000,
            record: None,
            record_every: 1,
            random_seed: None,
            perf_enabled: false,
        }
    }
}

impl SimulationParams {
    /// Create new simulation parameters with validation
    pub fn new(steps: u64) -> Result<Self> {
        if steps == 0 {
            return Err(RuntimeError::invalid_parameter(
                "steps",
                steps.to_string(),
                "> 0",
            ));
        }
        Ok(Self {
            steps,
            ..Default::default()
        })
    }

    /// Set populations to record
    pub fn with_recorded_populations(mut self, populations: Vec<PopulationId>) -> Self {
        self.record = Some(populations);
        self
    }

    /// Record every n-th tick
    pub fn with_record_every(mut self, every: u64) -> Self {
        self.record_every = every;
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Enable or disable performance sampling
    pub fn with_perf(mut self, enabled: bool) -> Self {
        self.perf_enabled = enabled;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.steps)?;
        if self.record_every == 0 {
            return Err(RuntimeError::invalid_parameter(
                "record_every",
                "0",
                "> 0",
            ));
        }
        Ok(())
    }

    fn records(&self, id: PopulationId) -> bool {
        match &self.record {
            Some(ids) => ids.contains(&id),
            None => true,
        }
    }
}

/// External drive written into a population's rates before a tick
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Stimulus {
    /// Clamp rates to a fixed vector
    Constant {
        /// Target population
        population: PopulationId,
        /// Rates, one per neuron
        rates: Vec<f64>,
        /// First tick the stimulus is active
        start_tick: u64,
        /// Number of active ticks
        duration: u64,
    },
    /// Draw every rate uniformly from `[low, high)`
    Noise {
        /// Target population
        population: PopulationId,
        /// Lower bound
        low: f64,
        /// Upper bound
        high: f64,
        /// First tick the stimulus is active
        start_tick: u64,
        /// Number of active ticks
        duration: u64,
    },
}

impl Stimulus {
    /// Target population
    pub fn population(&self) -> PopulationId {
        match self {
            Self::Constant { population, .. } | Self::Noise { population, .. } => *population,
        }
    }

    /// Whether the stimulus drives tick `tick`
    pub fn is_active(&self, tick: u64) -> bool {
        let (start, duration) = match self {
            Self::Constant {
                start_tick,
                duration,
                ..
            }
            | Self::Noise {
                start_tick,
                duration,
                ..
            } => (*start_tick, *duration),
        };
        tick >= start && tick - start < duration
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Constant { rates, .. } => {
                if let Some(bad) = rates.iter().find(|r| !r.is_finite()) {
                    return Err(RuntimeError::invalid_parameter(
                        "rates",
                        bad.to_string(),
                        "finite",
                    ));
                }
            }
            Self::Noise { low, high, .. } => {
                if !low.is_finite() || !high.is_finite() || !(high > low) {
                    return Err(RuntimeError::invalid_parameter(
                        "high",
                        format!("{} (with low={})", high, low),
                        "> low",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Recorded rate vector of one population after a tick
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RateSample {
    /// Completed tick count when the sample was taken
    pub tick: u64,
    /// Population
    pub population: PopulationId,
    /// Rates after the tick
    pub rates: Vec<f64>,
}

/// Final state of one population
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PopulationSummary {
    /// Population ID
    pub id: PopulationId,
    /// Population name
    pub name: String,
    /// Statistics of the last tick
    pub statistics: RateStatistics,
}

/// Simulation results
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationResult {
    /// Recorded rate traces
    pub samples: Vec<RateSample>,
    /// Final per-population statistics, in population ID order
    pub summaries: Vec<PopulationSummary>,
    /// Number of ticks executed
    pub ticks_executed: u64,
    /// Simulated time (ms)
    pub duration_ms: f64,
    /// Optional performance report
    pub perf: Option<PerfReport>,
}

impl SimulationResult {
    /// Samples of one population in tick order
    pub fn trace(&self, population: PopulationId) -> Vec<&RateSample> {
        self.samples
            .iter()
            .filter(|s| s.population == population)
            .collect()
    }

    /// Rates of `population` recorded after `tick`
    pub fn rates_at(&self, population: PopulationId, tick: u64) -> Option<&[f64]> {
        self.samples
            .iter()
            .find(|s| s.population == population && s.tick == tick)
            .map(|s| s.rates.as_slice())
    }

    /// Mean rate of `population` over all its samples
    pub fn mean_rate(&self, population: PopulationId) -> Option<f64> {
        let (sum, count) = self
            .trace(population)
            .iter()
            .flat_map(|s| s.rates.iter())
            .fold((0.0, 0usize), |(sum, count), r| (sum + r, count + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Final summary of `population`
    pub fn summary(&self, population: PopulationId) -> Option<&PopulationSummary> {
        self.summaries.iter().find(|s| s.id == population)
    }
}

/// Performance metrics collected during simulation steps.
/// Present when `SimulationParams::with_perf(true)` is used.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerfReport {
    /// Average step time in nanoseconds
    pub avg_step_ns: u64,
    /// Max step time in nanoseconds
    pub max_step_ns: u64,
    /// Steps sampled
    pub steps: usize,
}

impl PerfReport {
    fn from_samples(samples: &[u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let sum: u128 = samples.iter().map(|v| *v as u128).sum();
        Some(Self {
            avg_step_ns: (sum / samples.len() as u128) as u64,
            max_step_ns: samples.iter().copied().max().unwrap_or(0),
            steps: samples.len(),
        })
    }
}

/// Simulation engine
#[derive(Debug)]
pub struct SimulationEngine {
    /// Network being simulated
    network: Network,
    /// Simulation parameters
    params: SimulationParams,
    /// Input stimuli, applied in insertion order
    stimuli: Vec<Stimulus>,
    /// Generator for noise stimuli, reseeded on every run
    rng: StdRng,
}

impl SimulationEngine {
    /// Create a new simulation engine
    pub fn new(network: Network, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        if let Some(ids) = &params.record {
            for id in ids {
                network.population(*id)?;
            }
        }
        let rng = StdRng::seed_from_u64(params.random_seed.unwrap_or(DEFAULT_SEED));
        Ok(Self {
            network,
            params,
            stimuli: Vec::new(),
            rng,
        })
    }

    /// Add an input stimulus; its target must exist and constant rates must
    /// match the population size
    pub fn add_stimulus(&mut self, stimulus: Stimulus) -> Result<()> {
        stimulus.validate()?;
        let population = self.network.population(stimulus.population())?;
        if let Stimulus::Constant { rates, .. } = &stimulus {
            if rates.len() != population.neuron_count() {
                return Err(RuntimeError::RateLengthMismatch {
                    expected: population.neuron_count(),
                    found: rates.len(),
                });
            }
        }
        self.stimuli.push(stimulus);
        Ok(())
    }

    /// Run the complete simulation from a reset network
    pub fn run(&mut self) -> Result<SimulationResult> {
        log::info!(
            "Starting simulation: {} ticks of {}ms over {} populations",
            self.params.steps,
            self.network.config().dt,
            self.network.population_count()
        );

        self.network.reset();
        self.rng = StdRng::seed_from_u64(self.params.random_seed.unwrap_or(DEFAULT_SEED));

        let mut result = SimulationResult::default();
        let mut perf_samples = Vec::new();
        let steps = self.params.steps;

        for tick in 0..steps {
            let step_start = Instant::now();

            self.apply_stimuli(tick)?;
            self.network
                .step()
                .map_err(|e| RuntimeError::simulation_step(tick, e.to_string()))?;

            let completed = self.network.tick();
            if completed % self.params.record_every == 0 {
                self.record(completed, &mut result);
            }

            if self.params.perf_enabled {
                perf_samples.push(step_start.elapsed().as_nanos() as u64);
            }

            if tick % (steps / 10).max(1) == 0 {
                let progress = (tick as f64 / steps as f64) * 100.0;
                log::debug!("Simulation progress: {:.1}%", progress);
            }
        }

        result.summaries = self
            .network
            .populations()
            .map(|p| PopulationSummary {
                id: p.id(),
                name: p.name().to_string(),
                statistics: p.statistics(),
            })
            .collect();
        result.ticks_executed = self.network.tick();
        result.duration_ms = self.network.time();
        if self.params.perf_enabled {
            result.perf = PerfReport::from_samples(&perf_samples);
        }

        log::info!(
            "Simulation completed: {} ticks, {} samples recorded",
            result.ticks_executed,
            result.samples.len()
        );
        Ok(result)
    }

    fn apply_stimuli(&mut self, tick: u64) -> Result<()> {
        for stimulus in &self.stimuli {
            if !stimulus.is_active(tick) {
                continue;
            }
            let population = self
                .network
                .population_mut(stimulus.population())
                .map_err(|e| RuntimeError::simulation_step(tick, e.to_string()))?;
            match stimulus {
                Stimulus::Constant { rates, .. } => population.set_rates(rates)?,
                Stimulus::Noise { low, high, .. } => {
                    let rates: Vec<f64> = (0..population.neuron_count())
                        .map(|_| self.rng.gen_range(*low..*high))
                        .collect();
                    population.set_rates(&rates)?;
                }
            }
        }
        Ok(())
    }

    fn record(&self, tick: u64, result: &mut SimulationResult) {
        for population in self.network.populations() {
            if self.params.records(population.id()) {
                result.samples.push(RateSample {
                    tick,
                    population: population.id(),
                    rates: population.rates().to_vec(),
                });
            }
        }
    }

    /// Get reference to network
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Get mutable reference to network
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Release the network, keeping its final state
    pub fn into_network(self) -> Network {
        self.network
    }

    /// Get simulation parameters
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Registered stimuli
    pub fn stimuli(&self) -> &[Stimulus] {
        &self.stimuli
    }
}

/// Run a fixed number of ticks on `network` without stimuli
pub fn run_fixed_step(network: Network, steps: u64, seed: Option<u64>) -> Result<SimulationResult> {
    let mut params = SimulationParams::new(steps)?;
    params.random_seed = seed;
    let mut engine = SimulationEngine::new(network, params)?;
    engine.run()
}
