//! Deep deterministic policy gradient (DDPG) trainer.
mod base;
mod bellman;
mod config;
pub use base::Ddpg;
pub use bellman::{bellman_targets, td_errors};
pub use config::DdpgConfig;
