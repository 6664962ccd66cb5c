//! Action-value function.
use crate::{
    model::SubModel2,
    opt::OptimizerConfig,
    util::{parameter_values, tensor_to_vecs, track, vecs_to_tensor, InDim, OutDim},
};
use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use ddpg_core::{error::DdpgError, Network, TrackableNetwork};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Critic`].
pub struct CriticConfig<Q> {
    /// Configuration of the action-value model.
    ///
    /// Its input dimension is the sum of the state and the action dimensions.
    pub q_config: Option<Q>,

    /// Configuration of the optimizer of the critic, Adam with lr 1e-3 by default.
    ///
    /// It drives the critic step only, see [`ActorConfig::opt_config`](crate::ActorConfig).
    pub opt_config: OptimizerConfig,

    /// Dimension of the action.
    pub action_dim: Option<usize>,
}

impl<Q> Default for CriticConfig<Q> {
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::Adam { lr: 0.001 },
            action_dim: None,
        }
    }
}

impl<Q> CriticConfig<Q>
where
    Q: DeserializeOwned + Serialize,
{
    /// Sets configurations for action-value function.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the dimension of the action.
    pub fn action_dim(mut self, v: usize) -> Self {
        self.action_dim = Some(v);
        self
    }

    /// Constructs [CriticConfig] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [CriticConfig].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Represents a critic.
///
/// It takes states and actions as inputs and outputs action values.
/// Clones share the parameters.
pub struct Critic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
{
    name: String,
    device: Device,
    varmap: VarMap,

    // Dimensions of the state and the action.
    input_dims: Vec<usize>,
    out_dim: usize,

    q_config: Q::Config,
    q: Q,
}

impl<Q> Critic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    /// Constructs [`Critic`].
    pub fn build(name: &str, config: &CriticConfig<Q::Config>, device: Device) -> Result<Self> {
        let q_config = config.q_config.clone().context("q_config is not set.")?;
        let action_dim = config.action_dim.context("action_dim is not set.")?;
        let in_dim = q_config.get_in_dim();
        if action_dim > in_dim {
            return Err(anyhow!(
                "action_dim ({}) exceeds the input dimension of the critic ({})",
                action_dim,
                in_dim
            ));
        }
        if q_config.get_out_dim() != 1 {
            return Err(anyhow!(
                "Critic must output a scalar, got output dimension {}",
                q_config.get_out_dim()
            ));
        }
        let input_dims = vec![in_dim - action_dim, action_dim];
        let critic = Self::_build(name, q_config, input_dims, device, VarMap::new())?;
        info!(
            "Build critic {}: state dim = {}, action dim = {}",
            name, critic.input_dims[0], critic.input_dims[1]
        );
        Ok(critic)
    }

    fn _build(
        name: &str,
        q_config: Q::Config,
        input_dims: Vec<usize>,
        device: Device,
        varmap: VarMap,
    ) -> Result<Self> {
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device).set_prefix("critic");
            Q::build(vb, q_config.clone())?
        };

        Ok(Self {
            name: name.to_string(),
            device,
            varmap,
            input_dims,
            out_dim: q_config.get_out_dim(),
            q_config,
            q,
        })
    }

    /// Outputs the action-value given observations and actions.
    pub fn forward(&self, obs: &Tensor, act: &Tensor) -> Result<Tensor> {
        self.q.forward(obs, act)
    }

    /// Parameters of the critic.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Device on which the parameters are.
    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl<Q> Clone for Critic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor> + Clone,
    Q::Config: Clone,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            device: self.device.clone(),
            varmap: self.varmap.clone(),
            input_dims: self.input_dims.clone(),
            out_dim: self.out_dim,
            q_config: self.q_config.clone(),
            q: self.q.clone(),
        }
    }
}

impl<Q> Network for Critic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn input_dims(&self) -> &[usize] {
        &self.input_dims
    }

    fn output_dim(&self) -> usize {
        self.out_dim
    }

    fn predict_batch(&self, inputs: &[&[Vec<f32>]]) -> Result<Vec<Vec<f32>>> {
        if inputs.len() != 2 {
            return Err(DdpgError::InputSlotError {
                name: self.name.clone(),
                expected: 2,
                got: inputs.len(),
            }
            .into());
        }
        let obs = vecs_to_tensor(inputs[0], self.input_dims[0], &self.device)?;
        let act = vecs_to_tensor(inputs[1], self.input_dims[1], &self.device)?;
        tensor_to_vecs(&self.forward(&obs, &act)?)
    }
}

impl<Q> TrackableNetwork for Critic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    type Params = VarMap;

    fn params(&self) -> VarMap {
        self.varmap.clone()
    }

    fn detached_copy(&self, name: &str) -> Result<Self> {
        let copy = Self::_build(
            name,
            self.q_config.clone(),
            self.input_dims.clone(),
            self.device.clone(),
            VarMap::new(),
        )?;
        track(&copy.varmap, &self.varmap, 1.0)?;
        Ok(copy)
    }

    fn soft_update(&mut self, src: &VarMap, tau: f64) -> Result<()> {
        track(&self.varmap, src, tau)
    }

    fn parameter_values(&self) -> Result<Vec<Vec<f32>>> {
        parameter_values(&self.varmap)
    }
}
