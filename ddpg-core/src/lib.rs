#![warn(missing_docs)]
//! Deep deterministic policy gradient (DDPG) for continuous control.
//!
//! This crate holds the part of DDPG that does not depend on a numeric
//! backend: target networks ([`TargetTracker`]), Bellman targets and TD errors
//! ([`bellman_targets`], [`td_errors`]) and the trainer ([`Ddpg`]) orchestrating
//! them. Function approximators and optimizers are reached through the
//! [`Network`], [`TrackableNetwork`], [`CriticUpdater`] and [`ActorUpdater`]
//! traits; `ddpg-candle-agent` implements them with candle.
pub mod error;
pub mod record;
pub mod dummy;

mod base;
pub use base::{
    l2_distance, ActorUpdater, CriticUpdater, Network, TrackableNetwork, TransitionBatch,
};

mod target;
pub use target::TargetTracker;

mod ddpg;
pub use ddpg::{bellman_targets, td_errors, Ddpg, DdpgConfig};
