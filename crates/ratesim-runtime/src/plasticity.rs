//! Rate-based learning rules for projection weights

use crate::error::*;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trait for learning rules applied by projections during the Learning phase
pub trait LearningRule: fmt::Debug + Send + Sync {
    /// New weight for a synapse given pre/post rates and the step size
    fn update_weight(&self, weight: f64, pre: f64, post: f64, dt: f64) -> Result<f64>;

    /// Get learning rate
    fn learning_rate(&self) -> f64;

    /// Get weight bounds
    fn weight_bounds(&self) -> (f64, f64); // (w_min, w_max)
}

fn validate_common(eta: f64, w_min: f64, w_max: f64) -> Result<()> {
    if !eta.is_finite() || eta <= 0.0 {
        return Err(RuntimeError::invalid_parameter(
            "eta",
            eta.to_string(),
            "> 0.0",
        ));
    }
    if !(w_max > w_min) {
        return Err(RuntimeError::invalid_parameter(
            "w_max",
            format!("{} (with w_min={})", w_max, w_min),
            "> w_min",
        ));
    }
    Ok(())
}

fn bounded(weight: f64, delta: f64, w_min: f64, w_max: f64) -> Result<f64> {
    let next = weight + delta;
    if !next.is_finite() {
        return Err(RuntimeError::numerical_error(format!(
            "weight update {} + {} is not finite",
            weight, delta
        )));
    }
    Ok(next.clamp(w_min, w_max))
}

/// Parameters for the plain Hebbian rule `dw/dt = eta * pre * post`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HebbianParams {
    /// Learning rate (per ms)
    pub eta: f64,
    /// Minimum weight value
    pub w_min: f64,
    /// Maximum weight value
    pub w_max: f64,
}

impl Default for HebbianParams {
    fn default() -> Self {
        Self {
            eta: 0.001,
            w_min: 0.0,
            w_max: 1.0,
        }
    }
}

impl HebbianParams {
    /// Create new Hebbian parameters with validation
    pub fn new(eta: f64, w_min: f64, w_max: f64) -> Result<Self> {
        validate_common(eta, w_min, w_max)?;
        Ok(Self { eta, w_min, w_max })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.eta, self.w_min, self.w_max)?;
        Ok(())
    }
}

/// Hebbian learning rule
#[derive(Debug, Clone)]
pub struct HebbianRule {
    /// Hebbian parameters
    pub params: HebbianParams,
}

impl HebbianRule {
    /// Create a new Hebbian rule
    pub fn new(params: HebbianParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }
}

impl LearningRule for HebbianRule {
    fn update_weight(&self, weight: f64, pre: f64, post: f64, dt: f64) -> Result<f64> {
        let p = &self.params;
        bounded(weight, dt * p.eta * pre * post, p.w_min, p.w_max)
    }

    fn learning_rate(&self) -> f64 {
        self.params.eta
    }

    fn weight_bounds(&self) -> (f64, f64) {
        (self.params.w_min, self.params.w_max)
    }
}

/// Parameters for Oja's rule `dw/dt = eta * post * (pre - alpha * post * w)`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OjaParams {
    /// Learning rate (per ms)
    pub eta: f64,
    /// Decay coefficient of the normalizing term
    pub alpha: f64,
    /// Minimum weight value
    pub w_min: f64,
    /// Maximum weight value
    pub w_max: f64,
}

impl Default for OjaParams {
    fn default() -> Self {
        Self {
            eta: 0.001,
            alpha: 1.0,
            w_min: -1.0,
            w_max: 1.0,
        }
    }
}

impl OjaParams {
    /// Create new Oja parameters with validation
    pub fn new(eta: f64, alpha: f64, w_min: f64, w_max: f64) -> Result<Self> {
        validate_common(eta, w_min, w_max)?;
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(RuntimeError::invalid_parameter(
                "alpha",
                alpha.to_string(),
                ">= 0.0",
            ));
        }
        Ok(Self {
            eta,
            alpha,
            w_min,
            w_max,
        })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.eta, self.alpha, self.w_min, self.w_max)?;
        Ok(())
    }
}

/// Oja learning rule
#[derive(Debug, Clone)]
pub struct OjaRule {
    /// Oja parameters
    pub params: OjaParams,
}

impl OjaRule {
    /// Create a new Oja rule
    pub fn new(params: OjaParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }
}

impl LearningRule for OjaRule {
    fn update_weight(&self, weight: f64, pre: f64, post: f64, dt: f64) -> Result<f64> {
        let p = &self.params;
        let delta = dt * p.eta * post * (pre - p.alpha * post * weight);
        bounded(weight, delta, p.w_min, p.w_max)
    }

    fn learning_rate(&self) -> f64 {
        self.params.eta
    }

    fn weight_bounds(&self) -> (f64, f64) {
        (self.params.w_min, self.params.w_max)
    }
}

/// Serializable choice of learning rule, instantiated once per projection
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LearningRuleConfig {
    /// Plain Hebbian rule
    Hebbian(HebbianParams),
    /// Oja's normalized Hebbian rule
    Oja(OjaParams),
}

impl LearningRuleConfig {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Hebbian(params) => params.validate(),
            Self::Oja(params) => params.validate(),
        }
    }

    /// Create a fresh rule instance
    pub fn build(&self) -> Result<Box<dyn LearningRule>> {
        let rule: Box<dyn LearningRule> = match self {
            Self::Hebbian(params) => Box::new(HebbianRule::new(params.clone())?),
            Self::Oja(params) => Box::new(OjaRule::new(params.clone())?),
        };
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_validation() {
        assert!(HebbianParams::new(0.0, 0.0, 1.0).is_err());
        assert!(HebbianParams::new(0.1, 1.0, 1.0).is_err());
        assert!(HebbianParams::new(0.1, 0.0, 1.0).is_ok());

        assert!(OjaParams::new(0.1, -1.0, 0.0, 1.0).is_err());
        assert!(OjaParams::new(0.1, 1.0, 0.0, f64::NAN).is_err());
        assert!(OjaParams::default().validate().is_ok());
    }

    #[test]
    fn test_hebbian_potentiation() {
        let rule = HebbianRule::new(HebbianParams::new(0.1, 0.0, 1.0).unwrap()).unwrap();
        let w = rule.update_weight(0.5, 1.0, 2.0, 1.0).unwrap();
        assert!((w - 0.7).abs() < 1e-12);

        // No activity, no change
        assert_eq!(rule.update_weight(0.5, 0.0, 2.0, 1.0).unwrap(), 0.5);
    }

    #[test]
    fn test_hebbian_bounds() {
        let rule = HebbianRule::new(HebbianParams::new(1.0, 0.0, 1.0).unwrap()).unwrap();
        assert_eq!(rule.update_weight(0.9, 1.0, 1.0, 1.0).unwrap(), 1.0);
        assert_eq!(rule.weight_bounds(), (0.0, 1.0));
    }

    #[test]
    fn test_oja_decay() {
        let rule = OjaRule::new(OjaParams::new(0.1, 1.0, -1.0, 1.0).unwrap()).unwrap();
        // pre = 0: pure decay term -eta * alpha * post^2 * w
        let w = rule.update_weight(0.5, 0.0, 1.0, 1.0).unwrap();
        assert!((w - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_rule_config_build() {
        let config = LearningRuleConfig::Oja(OjaParams::default());
        let rule = config.build().unwrap();
        assert_eq!(rule.weight_bounds(), (-1.0, 1.0));

        let bad = LearningRuleConfig::Hebbian(HebbianParams {
            eta: -1.0,
            ..Default::default()
        });
        assert!(bad.validate().is_err());
        assert!(bad.build().is_err());
    }

    #[test]
    fn test_non_finite_update() {
        let rule = HebbianRule::new(HebbianParams::new(1.0, 0.0, 1.0).unwrap()).unwrap();
        let err = rule.update_weight(0.5, f64::INFINITY, 1.0, 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numerical);
    }
}
