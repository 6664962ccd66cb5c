//! DDPG trainer.
use super::{bellman_targets, td_errors, DdpgConfig};
use crate::{
    base::{ActorUpdater, CriticUpdater, Network, TrackableNetwork, TransitionBatch},
    record::{Record, RecordValue},
    TargetTracker,
};
use anyhow::{anyhow, Result};
use log::{debug, info, trace};

/// Takes the scalar output of each sample.
fn scalars(outputs: Vec<Vec<f32>>) -> Result<Vec<f32>> {
    outputs
        .into_iter()
        .map(|v| match v[..] {
            [q] => Ok(q),
            _ => Err(anyhow!(
                "Critic must return a scalar per sample, got {} values",
                v.len()
            )),
        })
        .collect()
}

/// DDPG trainer.
///
/// Owns a live actor and critic, their target trackers and the updaters of
/// the live networks. Each call to [`Ddpg::train`] performs, in this order:
///
/// 1. a critic regression step toward Bellman targets computed with the
///    target actor and the target critic,
/// 2. one step of the target critic,
/// 3. a deterministic policy gradient step of the actor through the updated
///    live critic,
/// 4. one step of the target actor.
///
/// The trainer is not reentrant; calls must be serialized by the owner.
pub struct Ddpg<A, Q, CU, AU>
where
    A: TrackableNetwork,
    Q: TrackableNetwork,
    CU: CriticUpdater,
    AU: ActorUpdater,
{
    actor: A,
    actor_tgt: TargetTracker<A>,
    critic: Q,
    critic_tgt: TargetTracker<Q>,
    critic_updater: CU,
    actor_updater: AU,
    gamma: f64,
    n_opts: usize,
}

impl<A, Q, CU, AU> Ddpg<A, Q, CU, AU>
where
    A: TrackableNetwork,
    Q: TrackableNetwork,
    CU: CriticUpdater,
    AU: ActorUpdater,
{
    /// Constructs the trainer.
    ///
    /// `critic_updater` and `actor_updater` must be bound to `critic` and to
    /// the composition of `actor` and `critic`, respectively. Target networks
    /// are created here as copies of the live networks.
    pub fn build(
        config: &DdpgConfig,
        actor: A,
        critic: Q,
        critic_updater: CU,
        actor_updater: AU,
    ) -> Result<Self> {
        let actor_tgt = TargetTracker::new(
            format!("{}_target", actor.name()),
            &actor,
            config.actor_target_approach_rate,
        )?;
        let critic_tgt = TargetTracker::new(
            format!("{}_target", critic.name()),
            &critic,
            config.q_target_approach_rate,
        )?;
        info!(
            "Build DDPG: actor = {}, critic = {}, gamma = {}",
            actor.name(),
            critic.name(),
            config.discount_factor
        );

        Ok(Self {
            actor,
            actor_tgt,
            critic,
            critic_tgt,
            critic_updater,
            actor_updater,
            gamma: config.discount_factor,
            n_opts: 0,
        })
    }

    /// Performs one training step on a batch of transitions.
    ///
    /// The returned record has `loss_critic` and `loss_actor`. An empty batch
    /// is not rejected: both losses are NaN and both targets still step once.
    pub fn train(&mut self, batch: &TransitionBatch) -> Result<Record> {
        trace!("Ddpg::train(), batch size = {}", batch.len());

        let loss_critic = self.train_q(
            &batch.state,
            &batch.action,
            &batch.reward,
            &batch.next_state,
            &batch.done,
        )?;
        let loss_actor = self.train_actor(&batch.state)?;
        self.n_opts += 1;
        debug!(
            "opt {}: loss_critic = {}, loss_actor = {}",
            self.n_opts, loss_critic, loss_actor
        );

        Ok(Record::from_slice(&[
            ("loss_critic", RecordValue::Scalar(loss_critic)),
            ("loss_actor", RecordValue::Scalar(loss_actor)),
        ]))
    }

    /// Updates the critic toward Bellman targets, then steps the target critic.
    ///
    /// Returns the critic loss.
    pub fn train_q(
        &mut self,
        state: &[Vec<f32>],
        action: &[Vec<f32>],
        reward: &[f32],
        next_state: &[Vec<f32>],
        done: &[bool],
    ) -> Result<f32> {
        trace!("Ddpg::train_q()");

        let next_action = self.actor_tgt.predict_batch(&[next_state])?;
        let next_q = scalars(self.critic_tgt.predict_batch(&[next_state, &next_action[..]])?)?;
        let targets = bellman_targets(reward, done, &next_q, self.gamma);

        let loss = self.critic_updater.train(state, action, &targets)?;
        self.critic_tgt.approach_source_parameters()?;

        Ok(loss)
    }

    /// Updates the actor through the live critic, then steps the target actor.
    ///
    /// Returns the actor loss.
    pub fn train_actor(&mut self, state: &[Vec<f32>]) -> Result<f32> {
        trace!("Ddpg::train_actor()");

        let loss = self.actor_updater.train(state)?;
        self.actor_tgt.approach_source_parameters()?;

        Ok(loss)
    }

    /// Returns the output of the live actor for a single state.
    ///
    /// No exploration noise is added.
    pub fn action(&self, state: &[f32]) -> Result<Vec<f32>> {
        self.actor.predict(&[state.to_vec()])
    }

    /// Returns the TD error of a single transition.
    ///
    /// See [`Ddpg::get_td_error_batch`].
    pub fn get_td_error(
        &self,
        state: &[f32],
        action: &[f32],
        reward: f32,
        next_state: &[f32],
        done: bool,
    ) -> Result<f32> {
        let td = self.get_td_error_batch(
            &[state.to_vec()],
            &[action.to_vec()],
            &[reward],
            &[next_state.to_vec()],
            &[done],
        )?;
        Ok(td[0])
    }

    /// Returns `r + gamma * Q'(s', pi'(s')) - Q'(s, a)` for each transition,
    /// where `Q'` and `pi'` are the target critic and the target actor.
    ///
    /// `done` is accepted for symmetry with [`Ddpg::train_q`] but not used:
    /// the bootstrap term is added for terminal transitions as well.
    pub fn get_td_error_batch(
        &self,
        state: &[Vec<f32>],
        action: &[Vec<f32>],
        reward: &[f32],
        next_state: &[Vec<f32>],
        _done: &[bool],
    ) -> Result<Vec<f32>> {
        let batch_size = state.len();
        let next_action = self.actor_tgt.predict_batch(&[next_state])?;

        // Q(s, a) and Q(s', a') in a single evaluation
        let q_state = state
            .iter()
            .chain(next_state)
            .cloned()
            .collect::<Vec<_>>();
        let q_action = action
            .iter()
            .chain(&next_action)
            .cloned()
            .collect::<Vec<_>>();
        let qs = scalars(self.critic_tgt.predict_batch(&[&q_state[..], &q_action[..]])?)?;
        let (q, next_q) = qs.split_at(batch_size);

        Ok(td_errors(reward, q, next_q, self.gamma))
    }

    /// The live actor.
    pub fn actor(&self) -> &A {
        &self.actor
    }

    /// The live critic.
    pub fn critic(&self) -> &Q {
        &self.critic
    }

    /// Tracker of the target actor.
    pub fn actor_target(&self) -> &TargetTracker<A> {
        &self.actor_tgt
    }

    /// Tracker of the target critic.
    pub fn critic_target(&self) -> &TargetTracker<Q> {
        &self.critic_tgt
    }

    /// Updater of the critic.
    pub fn critic_updater(&self) -> &CU {
        &self.critic_updater
    }

    /// Updater of the actor.
    pub fn actor_updater(&self) -> &AU {
        &self.actor_updater
    }

    /// Discount factor.
    pub fn discount_factor(&self) -> f64 {
        self.gamma
    }

    /// Number of completed calls to [`Ddpg::train`].
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }
}
