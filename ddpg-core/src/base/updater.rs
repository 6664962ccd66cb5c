//! Parameter updaters of the critic and the actor.
use anyhow::Result;

/// Performs squared-loss regression steps on a live critic.
pub trait CriticUpdater {
    /// Performs one gradient step moving `Q(state, action)` toward `targets`.
    ///
    /// Returns the loss before the step. Target networks are never touched.
    fn train(&mut self, state: &[Vec<f32>], action: &[Vec<f32>], targets: &[f32]) -> Result<f32>;
}

/// Performs deterministic policy gradient steps on a live actor.
pub trait ActorUpdater {
    /// Performs one gradient step increasing `Q(state, actor(state))` with
    /// respect to the actor parameters only.
    ///
    /// Returns the actor loss, `-mean(Q)`, before the step.
    fn train(&mut self, state: &[Vec<f32>]) -> Result<f32>;
}
