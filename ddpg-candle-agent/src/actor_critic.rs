//! Composition of an actor and a critic.
use crate::{
    model::{SubModel1, SubModel2},
    util::{tensor_to_vecs, vecs_to_tensor, InDim, OutDim},
    Actor, Critic,
};
use anyhow::{anyhow, Result};
use candle_core::Tensor;
use ddpg_core::{error::DdpgError, Network};
use serde::{de::DeserializeOwned, Serialize};

/// Network computing `critic(s, actor(s))` from a state `s`.
///
/// Parameters are shared with the actor and the critic it was created from.
/// Gradients of its output flow into both, see
/// [`ActorTrainer`](crate::ActorTrainer) for updating the actor only.
pub struct ActorCritic<P, Q>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
{
    name: String,
    actor: Actor<P>,
    critic: Critic<Q>,
}

/// Creates the composite network of `actor` and `critic`.
///
/// Fails if the action dimension of the actor differs from that of the critic,
/// if the state dimensions differ, or if the critic output is not a scalar.
pub fn create_actor_critic_network<P, Q>(
    name: &str,
    actor: &Actor<P>,
    critic: &Critic<Q>,
) -> Result<ActorCritic<P, Q>>
where
    P: SubModel1<Input = Tensor, Output = Tensor> + Clone,
    P::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor> + Clone,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    if actor.input_dims()[0] != critic.input_dims()[0]
        || actor.output_dim() != critic.input_dims()[1]
        || critic.output_dim() != 1
    {
        return Err(anyhow!(
            "Actor {} ({:?} -> {}) does not fit critic {} ({:?})",
            actor.name(),
            actor.input_dims(),
            actor.output_dim(),
            critic.name(),
            critic.input_dims()
        ));
    }

    Ok(ActorCritic {
        name: name.to_string(),
        actor: actor.clone(),
        critic: critic.clone(),
    })
}

impl<P, Q> ActorCritic<P, Q>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    /// Outputs action values of the actions taken by the actor.
    pub fn forward(&self, state: &Tensor) -> Result<Tensor> {
        let action = self.actor.forward(state)?;
        self.critic.forward(state, &action)
    }

    /// The actor.
    pub fn actor(&self) -> &Actor<P> {
        &self.actor
    }

    /// The critic.
    pub fn critic(&self) -> &Critic<Q> {
        &self.critic
    }
}

impl<P, Q> Network for ActorCritic<P, Q>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn input_dims(&self) -> &[usize] {
        self.actor.input_dims()
    }

    fn output_dim(&self) -> usize {
        self.critic.output_dim()
    }

    fn predict_batch(&self, inputs: &[&[Vec<f32>]]) -> Result<Vec<Vec<f32>>> {
        if inputs.len() != 1 {
            return Err(DdpgError::InputSlotError {
                name: self.name.clone(),
                expected: 1,
                got: inputs.len(),
            }
            .into());
        }
        let xs = vecs_to_tensor(inputs[0], self.input_dims()[0], self.actor.device())?;
        tensor_to_vecs(&self.forward(&xs)?)
    }
}
