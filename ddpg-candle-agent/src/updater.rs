//! Updaters of the critic and the actor.
use crate::{
    model::{SubModel1, SubModel2},
    opt::{Objective, ObjectiveOptimizer, OptimizerConfig},
    util::{vecs_to_tensor, InDim, OutDim},
    ActorCritic, Critic,
};
use anyhow::Result;
use candle_core::Tensor;
use ddpg_core::{ActorUpdater, CriticUpdater, Network};
use log::trace;
use serde::{de::DeserializeOwned, Serialize};

/// Regresses a critic toward given targets.
pub struct CriticTrainer<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
{
    critic: Critic<Q>,
    opt: ObjectiveOptimizer,
}

impl<Q> CriticTrainer<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor> + Clone,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    /// Binds a squared loss optimizer to all parameters of `critic`.
    pub fn build(critic: &Critic<Q>, opt_config: &OptimizerConfig, l2: Option<f64>) -> Result<Self> {
        let opt = ObjectiveOptimizer::build(
            Objective::SquaredLoss,
            opt_config,
            critic.varmap().all_vars(),
            l2,
        )?;

        Ok(Self {
            critic: critic.clone(),
            opt,
        })
    }

    /// The optimizer.
    pub fn optimizer(&self) -> &ObjectiveOptimizer {
        &self.opt
    }
}

impl<Q> CriticUpdater for CriticTrainer<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    fn train(&mut self, state: &[Vec<f32>], action: &[Vec<f32>], targets: &[f32]) -> Result<f32> {
        trace!("CriticTrainer::train(), critic = {}", self.critic.name());
        let device = self.critic.device();
        let dims = self.critic.input_dims();
        let obs = vecs_to_tensor(state, dims[0], device)?;
        let act = vecs_to_tensor(action, dims[1], device)?;
        let targets = Tensor::from_slice(targets, (targets.len(),), device)?;

        let q = self.critic.forward(&obs, &act)?;
        self.opt.step(&q, Some(&targets))
    }
}

/// Updates an actor by ascending the output of the critic composed with it.
///
/// Only the parameters of the actor move.
pub struct ActorTrainer<P, Q>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
{
    network: ActorCritic<P, Q>,
    opt: ObjectiveOptimizer,
}

impl<P, Q> ActorTrainer<P, Q>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    /// Binds a max output optimizer to the actor parameters of `network`.
    pub fn build(
        network: ActorCritic<P, Q>,
        opt_config: &OptimizerConfig,
        l2: Option<f64>,
    ) -> Result<Self> {
        let opt = ObjectiveOptimizer::build(
            Objective::MaxOutput,
            opt_config,
            network.actor().varmap().all_vars(),
            l2,
        )?;

        Ok(Self { network, opt })
    }

    /// The composite network.
    pub fn network(&self) -> &ActorCritic<P, Q> {
        &self.network
    }

    /// The optimizer.
    pub fn optimizer(&self) -> &ObjectiveOptimizer {
        &self.opt
    }
}

impl<P, Q> ActorUpdater for ActorTrainer<P, Q>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    fn train(&mut self, state: &[Vec<f32>]) -> Result<f32> {
        trace!("ActorTrainer::train(), network = {}", self.network.name());
        let actor = self.network.actor();
        let obs = vecs_to_tensor(state, actor.input_dims()[0], actor.device())?;

        let q = self.network.forward(&obs)?;
        self.opt.step(&q, None)
    }
}
