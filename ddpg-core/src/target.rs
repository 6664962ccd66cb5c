//! Target networks.
//!
//! A target network is a time-lagged copy of a live (source) network. Its
//! parameters are never written by an optimizer; they only move toward the
//! source by exponential smoothing:
//!
//! ```text
//! θ_target ← τ θ_source + (1 - τ) θ_target
//! ```
//!
//! Bootstrapped targets computed from the lagged copy do not chase the
//! parameters being optimized in the same step.
use crate::base::{l2_distance, Network, TrackableNetwork};
use anyhow::Result;
use log::trace;

/// Maintains a target copy of a source network.
pub struct TargetTracker<N: TrackableNetwork> {
    name: String,
    tau: f64,
    source: N::Params,
    target: N,
    n_approaches: usize,
}

impl<N: TrackableNetwork> TargetTracker<N> {
    /// Creates a tracker bound to `source`.
    ///
    /// The target parameters are equal to those of the source right after
    /// construction. `tau` is not validated; it is expected to be in `(0, 1)`.
    pub fn new(name: impl Into<String>, source: &N, tau: f64) -> Result<Self> {
        let name = name.into();
        let target = source.detached_copy(&name)?;

        Ok(Self {
            name,
            tau,
            source: source.params(),
            target,
            n_approaches: 0,
        })
    }

    /// Moves every target parameter toward the current value of the source.
    ///
    /// Must be called exactly once per training step of the tracked network;
    /// the effective smoothing rate depends on the call frequency.
    pub fn approach_source_parameters(&mut self) -> Result<()> {
        trace!("{}: approach source parameters (tau = {})", self.name, self.tau);
        self.target.soft_update(&self.source, self.tau)?;
        self.n_approaches += 1;
        Ok(())
    }

    /// Smoothing rate.
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Number of calls to [`TargetTracker::approach_source_parameters`].
    pub fn n_approaches(&self) -> usize {
        self.n_approaches
    }

    /// The lagged network.
    pub fn target(&self) -> &N {
        &self.target
    }

    /// Returns the L2 distance between the target and the source parameters.
    ///
    /// `source` must be the network this tracker was created from.
    pub fn distance_to_source(&self, source: &N) -> Result<f64> {
        Ok(l2_distance(
            &self.target.parameter_values()?,
            &source.parameter_values()?,
        ))
    }
}

impl<N: TrackableNetwork> Network for TargetTracker<N> {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_dims(&self) -> &[usize] {
        self.target.input_dims()
    }

    fn output_dim(&self) -> usize {
        self.target.output_dim()
    }

    fn predict_batch(&self, inputs: &[&[Vec<f32>]]) -> Result<Vec<Vec<f32>>> {
        self.target.predict_batch(inputs)
    }

    fn predict(&self, input: &[Vec<f32>]) -> Result<Vec<f32>> {
        self.target.predict(input)
    }
}
