//! Test doubles for the trainer.
//!
//! [`LinearNetwork`] is a deterministic linear function of the concatenated
//! input slots. Its clones share parameter storage, like the live and composite
//! networks of a real backend. The recording updaters log every call and apply
//! a fixed shift to the bias of the network they are bound to, which makes the
//! order of updates and target steps observable through [`EventLog`].
use crate::{
    base::{ActorUpdater, CriticUpdater, Network, TrackableNetwork},
    error::DdpgError,
};
use anyhow::Result;
use std::{cell::RefCell, rc::Rc};

/// Shared, ordered log of events.
#[derive(Clone, Default, Debug)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    /// Returns a copy of the events.
    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Removes all events.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Parameters of [`LinearNetwork`].
#[derive(Debug, Clone)]
pub struct LinearParams {
    weights: Vec<f64>,
    bias: f64,
}

/// `y = w · concat(inputs) + b`, with a scalar output.
#[derive(Clone, Debug)]
pub struct LinearNetwork {
    name: String,
    input_dims: Vec<usize>,
    params: Rc<RefCell<LinearParams>>,
    log: Option<EventLog>,
}

impl LinearNetwork {
    /// Creates a network. `weights.len()` must equal the sum of `input_dims`.
    pub fn new(name: &str, input_dims: Vec<usize>, weights: Vec<f32>, bias: f32) -> Self {
        debug_assert_eq!(weights.len(), input_dims.iter().sum::<usize>());
        Self {
            name: name.to_string(),
            input_dims,
            params: Rc::new(RefCell::new(LinearParams {
                weights: weights.into_iter().map(|w| w as f64).collect(),
                bias: bias as f64,
            })),
            log: None,
        }
    }

    /// Logs target steps applied to this network and its copies.
    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Overwrites the parameters, visible through every clone.
    pub fn set_parameters(&self, weights: Vec<f32>, bias: f32) {
        let mut p = self.params.borrow_mut();
        p.weights = weights.into_iter().map(|w| w as f64).collect();
        p.bias = bias as f64;
    }

    /// Adds `delta` to the bias, visible through every clone.
    pub fn shift_bias(&self, delta: f64) {
        self.params.borrow_mut().bias += delta;
    }

    /// Returns the bias.
    pub fn bias(&self) -> f64 {
        self.params.borrow().bias
    }

    fn forward(&self, x: &[f32]) -> f32 {
        let p = self.params.borrow();
        let y = p
            .weights
            .iter()
            .zip(x)
            .map(|(w, x)| w * (*x as f64))
            .sum::<f64>()
            + p.bias;
        y as f32
    }
}

impl Network for LinearNetwork {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_dims(&self) -> &[usize] {
        &self.input_dims
    }

    fn output_dim(&self) -> usize {
        1
    }

    fn predict_batch(&self, inputs: &[&[Vec<f32>]]) -> Result<Vec<Vec<f32>>> {
        if inputs.len() != self.input_dims.len() {
            return Err(DdpgError::InputSlotError {
                name: self.name.clone(),
                expected: self.input_dims.len(),
                got: inputs.len(),
            }
            .into());
        }
        let batch_size = inputs[0].len();

        Ok((0..batch_size)
            .map(|i| {
                let x = inputs
                    .iter()
                    .flat_map(|slot| slot[i].iter().copied())
                    .collect::<Vec<_>>();
                vec![self.forward(&x)]
            })
            .collect())
    }
}

impl TrackableNetwork for LinearNetwork {
    type Params = Rc<RefCell<LinearParams>>;

    fn params(&self) -> Self::Params {
        self.params.clone()
    }

    fn detached_copy(&self, name: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            input_dims: self.input_dims.clone(),
            params: Rc::new(RefCell::new(self.params.borrow().clone())),
            log: self.log.clone(),
        })
    }

    fn soft_update(&mut self, src: &Self::Params, tau: f64) -> Result<()> {
        let src = src.borrow();
        let mut dest = self.params.borrow_mut();
        for (d, s) in dest.weights.iter_mut().zip(&src.weights) {
            *d = tau * s + (1.0 - tau) * *d;
        }
        dest.bias = tau * src.bias + (1.0 - tau) * dest.bias;
        if let Some(log) = &self.log {
            log.push(format!("approach:{}", self.name));
        }
        Ok(())
    }

    fn parameter_values(&self) -> Result<Vec<Vec<f32>>> {
        let p = self.params.borrow();
        Ok(vec![
            p.weights.iter().map(|w| *w as f32).collect(),
            vec![p.bias as f32],
        ])
    }
}

/// Arguments of one call to a recording updater.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticCall {
    /// States.
    pub state: Vec<Vec<f32>>,

    /// Actions.
    pub action: Vec<Vec<f32>>,

    /// Regression targets.
    pub targets: Vec<f32>,
}

/// Critic updater recording its inputs and shifting the critic bias by `step`.
pub struct RecordingCriticUpdater {
    critic: LinearNetwork,
    step: f64,
    log: EventLog,
    calls: Rc<RefCell<Vec<CriticCall>>>,
}

impl RecordingCriticUpdater {
    /// Binds the updater to `critic`, sharing its parameters.
    pub fn new(critic: &LinearNetwork, step: f64, log: EventLog) -> Self {
        Self {
            critic: critic.clone(),
            step,
            log,
            calls: Rc::new(RefCell::new(vec![])),
        }
    }

    /// Handle to the recorded calls.
    pub fn calls(&self) -> Rc<RefCell<Vec<CriticCall>>> {
        self.calls.clone()
    }
}

impl CriticUpdater for RecordingCriticUpdater {
    fn train(&mut self, state: &[Vec<f32>], action: &[Vec<f32>], targets: &[f32]) -> Result<f32> {
        let preds = self.critic.predict_batch(&[state, action])?;
        let loss = preds
            .iter()
            .zip(targets)
            .map(|(p, t)| (p[0] - t).powi(2))
            .sum::<f32>()
            / targets.len() as f32;

        self.calls.borrow_mut().push(CriticCall {
            state: state.to_vec(),
            action: action.to_vec(),
            targets: targets.to_vec(),
        });
        self.log.push(format!("train:{}", self.critic.name()));
        self.critic.shift_bias(self.step);

        Ok(loss)
    }
}

/// Actor updater recording its calls and shifting the actor bias by `step`.
pub struct RecordingActorUpdater {
    actor: LinearNetwork,
    critic: LinearNetwork,
    step: f64,
    log: EventLog,
    n_calls: usize,
}

impl RecordingActorUpdater {
    /// Binds the updater to `actor` composed with `critic`, sharing parameters.
    pub fn new(actor: &LinearNetwork, critic: &LinearNetwork, step: f64, log: EventLog) -> Self {
        Self {
            actor: actor.clone(),
            critic: critic.clone(),
            step,
            log,
            n_calls: 0,
        }
    }

    /// Number of calls to [`ActorUpdater::train`].
    pub fn n_calls(&self) -> usize {
        self.n_calls
    }
}

impl ActorUpdater for RecordingActorUpdater {
    fn train(&mut self, state: &[Vec<f32>]) -> Result<f32> {
        let action = self.actor.predict_batch(&[state])?;
        let q = self.critic.predict_batch(&[state, &action[..]])?;
        let loss = -q.iter().map(|q| q[0]).sum::<f32>() / q.len() as f32;

        self.log.push(format!("train:{}", self.actor.name()));
        self.actor.shift_bias(self.step);
        self.n_calls += 1;

        Ok(loss)
    }
}
