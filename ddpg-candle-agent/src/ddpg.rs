//! DDPG trainer with candle networks.
use crate::{
    create_actor_critic_network,
    model::{SubModel1, SubModel2},
    util::{InDim, OutDim},
    Actor, ActorConfig, ActorTrainer, Critic, CriticConfig, CriticTrainer, Device,
};
use anyhow::{Context, Result};
use candle_core::Tensor;
use ddpg_core::{Ddpg, DdpgConfig};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// [`Ddpg`] with candle networks.
pub type CandleDdpg<P, Q> = Ddpg<Actor<P>, Critic<Q>, CriticTrainer<Q>, ActorTrainer<P, Q>>;

/// Configuration of [`CandleDdpg`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DdpgAgentConfig<P, Q> {
    /// Configuration of the trainer.
    pub ddpg_config: DdpgConfig,

    /// Configuration of the actor.
    pub actor_config: ActorConfig<P>,

    /// Configuration of the critic.
    pub critic_config: CriticConfig<Q>,

    /// Device on which the networks are.
    pub device: Option<Device>,
}

impl<P, Q> Default for DdpgAgentConfig<P, Q> {
    fn default() -> Self {
        Self {
            ddpg_config: DdpgConfig::default(),
            actor_config: ActorConfig::default(),
            critic_config: CriticConfig::default(),
            device: None,
        }
    }
}

impl<P, Q> DdpgAgentConfig<P, Q>
where
    P: DeserializeOwned + Serialize,
    Q: DeserializeOwned + Serialize,
{
    /// Sets the configuration of the trainer.
    pub fn ddpg_config(mut self, v: DdpgConfig) -> Self {
        self.ddpg_config = v;
        self
    }

    /// Sets the configuration of the actor.
    pub fn actor_config(mut self, v: ActorConfig<P>) -> Self {
        self.actor_config = v;
        self
    }

    /// Sets the configuration of the critic.
    pub fn critic_config(mut self, v: CriticConfig<Q>) -> Self {
        self.critic_config = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Constructs [`DdpgAgentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DdpgAgentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Constructs the actor, the critic, their updaters and the trainer.
///
/// The actor and the critic are named `Actor` and `Q`; their targets
/// `Actor_target` and `Q_target`.
pub fn build_ddpg<P, Q>(config: DdpgAgentConfig<P::Config, Q::Config>) -> Result<CandleDdpg<P, Q>>
where
    P: SubModel1<Input = Tensor, Output = Tensor> + Clone,
    P::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor> + Clone,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    let device: candle_core::Device = config
        .device
        .context("No device is given for DDPG agent")?
        .try_into()?;
    let actor = Actor::<P>::build("Actor", &config.actor_config, device.clone())?;
    let critic = Critic::<Q>::build("Q", &config.critic_config, device)?;

    let critic_trainer = CriticTrainer::build(
        &critic,
        &config.critic_config.opt_config,
        config.ddpg_config.q_l2,
    )?;
    let actor_critic = create_actor_critic_network("ActorCritic", &actor, &critic)?;
    let actor_trainer = ActorTrainer::build(
        actor_critic,
        &config.actor_config.opt_config,
        config.ddpg_config.actor_l2,
    )?;

    Ddpg::build(
        &config.ddpg_config,
        actor,
        critic,
        critic_trainer,
        actor_trainer,
    )
}
