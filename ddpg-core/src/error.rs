//! Errors in the library.
use thiserror::Error;

/// Errors raised by the DDPG trainer and its collaborators.
#[derive(Error, Debug)]
pub enum DdpgError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A network received a different number of input slots than it declares.
    #[error("Network {name} expects {expected} input slot(s), got {got}")]
    InputSlotError {
        /// Name of the network.
        name: String,

        /// Number of input slots declared by the network.
        expected: usize,

        /// Number of input slots given.
        got: usize,
    },

    /// An optimizer was asked to train with an objective it was not built for.
    #[error("Optimizer built for {expected} cannot be used for {got}")]
    ObjectiveMismatch {
        /// Objective the optimizer was built for.
        expected: String,

        /// Objective requested by the caller.
        got: String,
    },
}
