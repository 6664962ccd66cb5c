//! Core functionalities.
mod batch;
mod network;
mod updater;
pub use batch::TransitionBatch;
pub use network::{l2_distance, Network, TrackableNetwork};
pub use updater::{ActorUpdater, CriticUpdater};
