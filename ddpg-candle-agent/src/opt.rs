//! Optimizers.
use anyhow::Result;
use candle_core::{DType, Tensor, Var};
use candle_nn::{loss::mse, AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use ddpg_core::error::DdpgError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration of optimizer for training neural networks in an RL agent.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// AdamW optimizer.
    AdamW {
        /// Learning rate.
        lr: f64,
        /// Coefficient of the first moment estimate.
        #[serde(default = "default_beta1")]
        beta1: f64,
        /// Coefficient of the second moment estimate.
        #[serde(default = "default_beta2")]
        beta2: f64,
        /// Term added to the denominator.
        #[serde(default = "default_eps")]
        eps: f64,
        /// Decoupled weight decay.
        #[serde(default = "default_weight_decay")]
        weight_decay: f64,
    },

    /// Adam optimizer.
    Adam {
        /// Learning rate.
        lr: f64,
    },
}

fn default_beta1() -> f64 {
    ParamsAdamW::default().beta1
}

fn default_beta2() -> f64 {
    ParamsAdamW::default().beta2
}

fn default_eps() -> f64 {
    ParamsAdamW::default().eps
}

fn default_weight_decay() -> f64 {
    ParamsAdamW::default().weight_decay
}

impl OptimizerConfig {
    /// Constructs an optimizer of the given variables.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        match &self {
            OptimizerConfig::AdamW {
                lr,
                beta1,
                beta2,
                eps,
                weight_decay,
            } => {
                let params = ParamsAdamW {
                    lr: *lr,
                    beta1: *beta1,
                    beta2: *beta2,
                    eps: *eps,
                    weight_decay: *weight_decay,
                };
                let opt = AdamW::new(vars, params)?;
                Ok(Optimizer::AdamW(opt))
            }
            OptimizerConfig::Adam { lr } => {
                let params = ParamsAdam {
                    lr: *lr,
                    ..ParamsAdam::default()
                };
                let opt = Adam::new(vars, params)?;
                Ok(Optimizer::Adam(opt))
            }
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 0.001 }
    }
}

/// Optimizers.
///
/// This is a thin wrapper of optimizers in [`candle_nn`] and [`candle_optimisers`].
pub enum Optimizer {
    /// AdamW optimizer.
    AdamW(AdamW),

    /// Adam optimizer.
    Adam(Adam),
}

impl Optimizer {
    /// Applies a backward step pass.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::AdamW(opt) => Ok(opt.backward_step(loss)?),
            Self::Adam(opt) => Ok(opt.backward_step(loss)?),
        }
    }
}

/// What an [`ObjectiveOptimizer`] does with the output of a network.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum Objective {
    /// Minimizes the mean squared error between the output and given targets.
    SquaredLoss,

    /// Maximizes the mean of a scalar output.
    MaxOutput,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SquaredLoss => write!(f, "squared loss"),
            Self::MaxOutput => write!(f, "max output"),
        }
    }
}

/// Gradient-based optimizer of an explicit subset of parameters, tagged with
/// the objective it optimizes.
///
/// Gradients flow into every variable of the computation graph, but only the
/// variables given at construction are updated. With an L2 strength `l2`,
/// `l2 * Σ θ²` over those variables is added to the loss.
pub struct ObjectiveOptimizer {
    objective: Objective,
    vars: Vec<Var>,
    l2: Option<f64>,
    opt: Optimizer,
}

impl ObjectiveOptimizer {
    /// Constructs an optimizer of `vars`.
    pub fn build(
        objective: Objective,
        config: &OptimizerConfig,
        vars: Vec<Var>,
        l2: Option<f64>,
    ) -> Result<Self> {
        let opt = config.build(vars.clone())?;
        Ok(Self {
            objective,
            vars,
            l2,
            opt,
        })
    }

    /// The objective.
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Strength of the L2 penalty.
    pub fn l2(&self) -> Option<f64> {
        self.l2
    }

    /// Variables updated by this optimizer.
    pub fn vars(&self) -> &[Var] {
        &self.vars
    }

    /// Returns the loss to be minimized.
    ///
    /// `targets` must be given if and only if the objective is
    /// [`Objective::SquaredLoss`]. `output` has a scalar per sample.
    pub fn loss(&self, output: &Tensor, targets: Option<&Tensor>) -> Result<Tensor> {
        let output = output.flatten_all()?;
        let loss = match (self.objective, targets) {
            (Objective::SquaredLoss, Some(targets)) => mse(&output, &targets.flatten_all()?)?,
            (Objective::MaxOutput, None) => output.mean_all()?.neg()?,
            (expected, targets) => {
                let got = match targets {
                    Some(_) => Objective::SquaredLoss,
                    None => Objective::MaxOutput,
                };
                return Err(DdpgError::ObjectiveMismatch {
                    expected: expected.to_string(),
                    got: got.to_string(),
                }
                .into());
            }
        };

        match self.l2 {
            None => Ok(loss),
            Some(l2) => Ok((loss + self.l2_norm(output.device())?.affine(l2, 0.0)?)?),
        }
    }

    /// Performs a single update step and returns the loss before the step.
    pub fn step(&mut self, output: &Tensor, targets: Option<&Tensor>) -> Result<f32> {
        let loss = self.loss(output, targets)?;
        self.opt.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }

    fn l2_norm(&self, device: &candle_core::Device) -> Result<Tensor> {
        let mut norm = Tensor::zeros((), DType::F32, device)?;
        for var in self.vars.iter() {
            norm = (norm + var.as_tensor().sqr()?.sum_all()?)?;
        }
        Ok(norm)
    }
}
