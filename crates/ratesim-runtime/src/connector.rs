//! Connectivity patterns that expand into one dendrite per postsynaptic neuron

use crate::{
    error::*,
    ids::SynapseType,
    plasticity::LearningRuleConfig,
    population::Population,
    projection::Dendrite,
};
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Connection pattern between a presynaptic and a postsynaptic population.
///
/// When both sides are the same population, self-connections are skipped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Connector {
    /// Every presynaptic neuron to every postsynaptic neuron
    AllToAll {
        /// Synaptic weight
        weight: f64,
        /// Delay in ticks
        delay: usize,
    },
    /// Presynaptic neuron `i` to postsynaptic neuron `i`; sizes must match
    OneToOne {
        /// Synaptic weight
        weight: f64,
        /// Delay in ticks
        delay: usize,
    },
    /// Each pair is connected independently with `probability`
    FixedProbability {
        /// Connection probability in `[0, 1]`
        probability: f64,
        /// Synaptic weight
        weight: f64,
        /// Delay in ticks
        delay: usize,
        /// Seed for reproducible wiring
        seed: u64,
    },
    /// Each postsynaptic neuron draws `number` distinct presynaptic neurons
    FixedNumberPre {
        /// Synapses per postsynaptic neuron
        number: usize,
        /// Synaptic weight
        weight: f64,
        /// Delay in ticks
        delay: usize,
        /// Seed for reproducible wiring
        seed: u64,
    },
}

impl Connector {
    /// All-to-all connector
    pub fn all_to_all(weight: f64, delay: usize) -> Self {
        Self::AllToAll { weight, delay }
    }

    /// One-to-one connector
    pub fn one_to_one(weight: f64, delay: usize) -> Self {
        Self::OneToOne { weight, delay }
    }

    fn weight(&self) -> f64 {
        match self {
            Self::AllToAll { weight, .. }
            | Self::OneToOne { weight, .. }
            | Self::FixedProbability { weight, .. }
            | Self::FixedNumberPre { weight, .. } => *weight,
        }
    }

    fn delay(&self) -> usize {
        match self {
            Self::AllToAll { delay, .. }
            | Self::OneToOne { delay, .. }
            | Self::FixedProbability { delay, .. }
            | Self::FixedNumberPre { delay, .. } => *delay,
        }
    }

    /// Validate parameters independent of population sizes
    pub fn validate(&self) -> Result<()> {
        let weight = self.weight();
        if !weight.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "weight",
                weight.to_string(),
                "finite",
            ));
        }
        if let Self::FixedProbability { probability, .. } = self {
            if !(0.0..=1.0).contains(probability) {
                return Err(RuntimeError::invalid_parameter(
                    "probability",
                    probability.to_string(),
                    "within [0.0, 1.0]",
                ));
            }
        }
        Ok(())
    }

    /// Expand into dendrites, one per postsynaptic neuron that receives at
    /// least one synapse, in ascending postsynaptic rank.
    pub fn build(
        &self,
        pre: &Population,
        post: &Population,
        synapse_type: SynapseType,
        rule: Option<&LearningRuleConfig>,
    ) -> Result<Vec<Dendrite>> {
        self.validate()?;
        if let Some(rule) = rule {
            rule.validate()?;
        }

        let recurrent = pre.id() == post.id();
        let pre_count = pre.neuron_count();
        let post_count = post.neuron_count();
        let weight = self.weight();
        let delay = self.delay();

        let seed = match self {
            Self::FixedProbability { seed, .. } | Self::FixedNumberPre { seed, .. } => *seed,
            _ => 0,
        };
        let mut rng = StdRng::seed_from_u64(seed);

        if let Self::OneToOne { .. } = self {
            if pre_count != post_count {
                return Err(RuntimeError::invalid_config(format!(
                    "one-to-one connection needs equal sizes, got {} -> {}",
                    pre_count, post_count
                )));
            }
        }
        if let Self::FixedNumberPre { number, .. } = self {
            let available = if recurrent { pre_count.saturating_sub(1) } else { pre_count };
            if *number > available {
                return Err(RuntimeError::invalid_config(format!(
                    "cannot draw {} presynaptic neurons out of {}",
                    number, available
                )));
            }
        }

        let mut dendrites = Vec::with_capacity(post_count);
        for post_rank in 0..post_count {
            let mut dendrite = Dendrite::new(pre.id(), post.id(), post_rank, synapse_type);

            match self {
                Self::AllToAll { .. } => {
                    for pre_rank in (0..pre_count).filter(|r| !recurrent || *r != post_rank) {
                        dendrite.push_synapse(pre_rank, weight, delay);
                    }
                }
                Self::OneToOne { .. } => {
                    if !recurrent {
                        dendrite.push_synapse(post_rank, weight, delay);
                    }
                }
                Self::FixedProbability { probability, .. } => {
                    for pre_rank in (0..pre_count).filter(|r| !recurrent || *r != post_rank) {
                        if rng.gen_bool(*probability) {
                            dendrite.push_synapse(pre_rank, weight, delay);
                        }
                    }
                }
                Self::FixedNumberPre { number, .. } => {
                    let mut drawn: Vec<usize> = if recurrent {
                        // Sample from the other neurons and skip over post_rank
                        index::sample(&mut rng, pre_count - 1, *number)
                            .into_iter()
                            .map(|r| if r >= post_rank { r + 1 } else { r })
                            .collect()
                    } else {
                        index::sample(&mut rng, pre_count, *number).into_vec()
                    };
                    drawn.sort_unstable();
                    for pre_rank in drawn {
                        dendrite.push_synapse(pre_rank, weight, delay);
                    }
                }
            }

            if dendrite.synapse_count() == 0 {
                continue;
            }
            if let Some(rule) = rule {
                dendrite = dendrite.with_learning(rule.build()?);
            }
            dendrites.push(dendrite);
        }

        log::debug!(
            "Connector expanded {} -> {} into {} dendrites",
            pre.name(),
            post.name(),
            dendrites.len()
        );
        Ok(dendrites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ids::PopulationId, neuron::NeuronModel, plasticity::HebbianParams, projection::Projection};

    fn pop(id: u32, n: usize) -> Population {
        Population::new(PopulationId::new(id), format!("p{}", id), n, NeuronModel::Input).unwrap()
    }

    #[test]
    fn test_all_to_all() {
        let dendrites = Connector::all_to_all(0.5, 1)
            .build(&pop(0, 3), &pop(1, 2), SynapseType::EXCITATORY, None)
            .unwrap();
        assert_eq!(dendrites.len(), 2);
        assert_eq!(dendrites[1].pre_ranks(), &[0, 1, 2]);
        assert_eq!(dendrites[1].post_rank(), 1);
        assert_eq!(dendrites[0].max_delay(), 1);
    }

    #[test]
    fn test_all_to_all_recurrent_skips_self() {
        let p = pop(0, 3);
        let dendrites = Connector::all_to_all(0.5, 0)
            .build(&p, &p, SynapseType::INHIBITORY, None)
            .unwrap();
        assert_eq!(dendrites[1].pre_ranks(), &[0, 2]);
    }

    #[test]
    fn test_one_to_one() {
        let dendrites = Connector::one_to_one(1.0, 0)
            .build(&pop(0, 3), &pop(1, 3), SynapseType::EXCITATORY, None)
            .unwrap();
        assert_eq!(dendrites.len(), 3);
        assert_eq!(dendrites[2].pre_ranks(), &[2]);

        assert!(Connector::one_to_one(1.0, 0)
            .build(&pop(0, 3), &pop(1, 2), SynapseType::EXCITATORY, None)
            .is_err());
    }

    #[test]
    fn test_fixed_probability_is_seeded() {
        let connector = Connector::FixedProbability {
            probability: 0.5,
            weight: 1.0,
            delay: 0,
            seed: 42,
        };
        let a = connector
            .build(&pop(0, 20), &pop(1, 5), SynapseType::EXCITATORY, None)
            .unwrap();
        let b = connector
            .build(&pop(0, 20), &pop(1, 5), SynapseType::EXCITATORY, None)
            .unwrap();
        let ranks_a: Vec<_> = a.iter().map(|d| d.pre_ranks().to_vec()).collect();
        let ranks_b: Vec<_> = b.iter().map(|d| d.pre_ranks().to_vec()).collect();
        assert_eq!(ranks_a, ranks_b);
    }

    #[test]
    fn test_fixed_probability_extremes() {
        let none = Connector::FixedProbability {
            probability: 0.0,
            weight: 1.0,
            delay: 0,
            seed: 1,
        };
        assert!(none
            .build(&pop(0, 4), &pop(1, 4), SynapseType::EXCITATORY, None)
            .unwrap()
            .is_empty());

        let bad = Connector::FixedProbability {
            probability: 1.5,
            weight: 1.0,
            delay: 0,
            seed: 1,
        };
        assert_eq!(bad.validate().unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_fixed_number_pre() {
        let connector = Connector::FixedNumberPre {
            number: 3,
            weight: 1.0,
            delay: 2,
            seed: 7,
        };
        let dendrites = connector
            .build(&pop(0, 10), &pop(1, 4), SynapseType::EXCITATORY, None)
            .unwrap();
        assert_eq!(dendrites.len(), 4);
        for d in &dendrites {
            assert_eq!(d.synapse_count(), 3);
            assert!(d.pre_ranks().windows(2).all(|w| w[0] < w[1]));
        }

        let p = pop(2, 4);
        let recurrent = connector.build(&p, &p, SynapseType::EXCITATORY, None).unwrap();
        for d in &recurrent {
            assert!(!d.pre_ranks().contains(&d.post_rank()));
        }

        let too_many = Connector::FixedNumberPre {
            number: 4,
            weight: 1.0,
            delay: 0,
            seed: 7,
        };
        assert!(too_many.build(&p, &p, SynapseType::EXCITATORY, None).is_err());
    }

    #[test]
    fn test_learning_rule_attached() {
        let rule = LearningRuleConfig::Hebbian(HebbianParams::default());
        let dendrites = Connector::all_to_all(0.5, 0)
            .build(&pop(0, 2), &pop(1, 1), SynapseType::EXCITATORY, Some(&rule))
            .unwrap();
        assert_eq!(dendrites.len(), 1);

        let bad = LearningRuleConfig::Hebbian(HebbianParams {
            eta: 0.0,
            ..Default::default()
        });
        assert!(Connector::all_to_all(0.5, 0)
            .build(&pop(0, 2), &pop(1, 1), SynapseType::EXCITATORY, Some(&bad))
            .is_err());
    }
}
