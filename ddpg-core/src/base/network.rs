//! Function approximators.
use anyhow::Result;

/// A function approximator with one or more input slots and a vector output.
///
/// Inputs are given per slot. For an actor the only slot is the state; for a
/// critic the slots are the state and the action. Batched inputs are
/// slot-major: `inputs[slot][sample]`.
pub trait Network {
    /// Name of the network.
    fn name(&self) -> &str;

    /// Dimension of each input slot.
    fn input_dims(&self) -> &[usize];

    /// Dimension of the output vector.
    fn output_dim(&self) -> usize;

    /// Evaluates the network on a batch.
    ///
    /// Returns one output vector per sample, in the order of the inputs.
    fn predict_batch(&self, inputs: &[&[Vec<f32>]]) -> Result<Vec<Vec<f32>>>;

    /// Evaluates the network on a single sample, one vector per input slot.
    fn predict(&self, input: &[Vec<f32>]) -> Result<Vec<f32>> {
        let slots = input
            .iter()
            .map(std::slice::from_ref)
            .collect::<Vec<&[Vec<f32>]>>();
        let mut out = self.predict_batch(&slots)?;
        Ok(out.swap_remove(0))
    }
}

/// A network whose parameters can be copied into, and blended toward, another
/// network of the same architecture.
///
/// This is what [`TargetTracker`](crate::TargetTracker) needs from a network.
pub trait TrackableNetwork: Network + Sized {
    /// Handle to the parameter storage of a network.
    ///
    /// The handle does not own the parameters: values written by an optimizer
    /// into the network are visible through handles obtained before the write.
    type Params: Clone;

    /// Returns a handle to the parameters of this network.
    fn params(&self) -> Self::Params;

    /// Creates a network with the same architecture and parameter values but
    /// its own parameter storage.
    fn detached_copy(&self, name: &str) -> Result<Self>;

    /// Applies `self = tau * src + (1 - tau) * self` to every parameter, elementwise.
    fn soft_update(&mut self, src: &Self::Params, tau: f64) -> Result<()>;

    /// Returns the values of the parameters in a fixed order, each flattened.
    fn parameter_values(&self) -> Result<Vec<Vec<f32>>>;
}

/// Returns the L2 distance between two parameter sets given in the same order.
pub fn l2_distance(p1: &[Vec<f32>], p2: &[Vec<f32>]) -> f64 {
    debug_assert_eq!(p1.len(), p2.len());
    p1.iter()
        .zip(p2)
        .flat_map(|(t1, t2)| t1.iter().zip(t2))
        .map(|(x1, x2)| {
            let d = (*x1 as f64) - (*x2 as f64);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
