//! DDPG networks and optimizers implemented with [candle](https://crates.io/crates/candle-core).
//!
//! [`build_ddpg`] wires an [`Actor`], a [`Critic`], their composition
//! ([`ActorCritic`]) and two objective-tagged optimizers into a
//! [`ddpg_core::Ddpg`] trainer.
//!
//! ```no_run
//! use ddpg_candle_agent::{
//!     build_ddpg, mlp::{Mlp, MlpConfig}, ActorConfig, CriticConfig, DdpgAgentConfig, Device,
//!     Activation,
//! };
//! use ddpg_core::{DdpgConfig, TransitionBatch};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = DdpgAgentConfig::<MlpConfig, MlpConfig>::default()
//!     .ddpg_config(DdpgConfig::default().discount_factor(0.99))
//!     .actor_config(ActorConfig::default().pi_config(MlpConfig::new(3, vec![64, 64], 1, Activation::Tanh)))
//!     .critic_config(
//!         CriticConfig::default()
//!             .q_config(MlpConfig::new(4, vec![64, 64], 1, Activation::None))
//!             .action_dim(1),
//!     )
//!     .device(Device::Cpu);
//! let mut ddpg = build_ddpg::<Mlp, Mlp>(config)?;
//!
//! let batch = TransitionBatch::from_transitions(vec![
//!     (vec![0.1, 0.2, 0.3], vec![0.5], 1.0, vec![0.2, 0.2, 0.3], false),
//! ]);
//! let record = ddpg.train(&batch)?;
//! let action = ddpg.action(&[0.1, 0.2, 0.3])?;
//! # Ok(())
//! # }
//! ```
mod actor;
mod actor_critic;
mod critic;
mod ddpg;
pub mod mlp;
pub mod model;
pub mod opt;
mod updater;
pub mod util;
pub use actor::{Actor, ActorConfig};
pub use actor_critic::{create_actor_critic_network, ActorCritic};
pub use critic::{Critic, CriticConfig};
pub use ddpg::{build_ddpg, CandleDdpg, DdpgAgentConfig};
use serde::{Deserialize, Serialize};
pub use updater::{ActorTrainer, CriticTrainer};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}

/// Activation function applied to the output layer of a network.
#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
pub enum Activation {
    /// Identity.
    None,

    /// Rectified linear unit.
    ReLU,

    /// Hyperbolic tangent, for actions bounded in `[-1, 1]`.
    Tanh,
}

impl Activation {
    /// Applies the activation function.
    pub fn forward(&self, xs: &candle_core::Tensor) -> candle_core::Result<candle_core::Tensor> {
        match self {
            Self::None => Ok(xs.clone()),
            Self::ReLU => xs.relu(),
            Self::Tanh => xs.tanh(),
        }
    }
}
