//! Records of diagnostic values produced during training.
//!
//! [`Ddpg::train`](crate::Ddpg::train) returns a [`Record`] holding the losses of
//! the critic and actor updates of the step, so that the outer training loop can
//! log or aggregate them without knowing the numeric backend.
//!
//! ```rust
//! use ddpg_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("loss_critic", 0.25);
//! record.insert("td_errors", RecordValue::Array1(vec![0.1, -0.2]));
//! assert_eq!(record.get_scalar("loss_critic").unwrap(), 0.25);
//! ```
mod base;

pub use base::{Record, RecordValue};
