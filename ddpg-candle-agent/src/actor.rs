//! Deterministic actor.
use crate::{
    model::SubModel1,
    opt::OptimizerConfig,
    util::{parameter_values, tensor_to_vecs, track, vecs_to_tensor, InDim, OutDim},
};
use anyhow::{Context, Result};
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
/// Configuration of [`Actor`].
pub struct ActorConfig<P> {
    /// Configuration of the policy model.
    pub pi_config: Option<P>,

    /// Configuration of the optimizer of the actor, Adam with lr 1e-4 by default.
    ///
    /// It drives the actor step only. Setups that fed the actor's optimizer to
    /// the critic and vice versa should swap their learning rates when moving
    /// to this configuration.
    pub opt_config: OptimizerConfig,
}

impl<P> Default for ActorConfig<P> {
    fn default() -> Self {
        Self {
            pi_config: None,
            opt_config: OptimizerConfig::Adam { lr: 0.0001 },
        }
    }
}

impl<P> ActorConfig<P>
where
    P: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations for the policy model.
    pub fn pi_config(mut self, v: P) -> Self {
        self.pi_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`ActorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ActorConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Deterministic policy mapping a state to an action.
///
/// Clones share the parameters, see [`TrackableNetwork::detached_copy`] for
/// an independent copy.
pub struct Actor<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
{
    name: String,
    device: Device,
    varmap: VarMap,

    // Dimension of the state and the action.
    input_dims: Vec<usize>,
    out_dim: usize,

    pi_config: P::Config,
    pi: P,
}

impl<P> Actor<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    /// Constructs [`Actor`].
    pub fn build(name: &str, config: &ActorConfig<P::Config>, device: Device) -> Result<Self> {
        let pi_config = config
            .pi_config
            .clone()
            .context("pi_config is not set.")?;
        let actor = Self::_build(name, pi_config, device, VarMap::new())?;
        info!(
            "Build actor {}: state dim = {}, action dim = {}",
            name, actor.input_dims[0], actor.out_dim
        );
        Ok(actor)
    }

    fn _build(name: &str, pi_config: P::Config, device: Device, varmap: VarMap) -> Result<Self> {
        let pi = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device).set_prefix("actor");
            P::build(vb, pi_config.clone())?
        };

        Ok(Self {
            name: name.to_string(),
            device,
            varmap,
            input_dims: vec![pi_config.get_in_dim()],
            out_dim: pi_config.get_out_dim(),
            pi_config,
            pi,
        })
    }

    /// Outputs actions given states of shape `(batch_size, state_dim)`.
    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let a = self.pi.forward(x)?;
        debug_assert_eq!(a.dims()[1], self.out_dim);
        Ok(a)
    }

    /// Parameters of the actor.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Device on which the parameters are.
    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl<P> Clone for Actor<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor> + Clone,
    P::Config: Clone,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            device: self.device.clone(),
            varmap: self.varmap.clone(),
            input_dims: self.input_dims.clone(),
            out_dim: self.out_dim,
            pi_config: self.pi_config.clone(),
            pi: self.pi.clone(),
        }
    }
}

impl<P> Network for Actor<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
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
        if inputs.len() != 1 {
            return Err(DdpgError::InputSlotError {
                name: self.name.clone(),
                expected: 1,
                got: inputs.len(),
            }
            .into());
        }
        let xs = vecs_to_tensor(inputs[0], self.input_dims[0], &self.device)?;
        tensor_to_vecs(&self.forward(&xs)?)
    }
}

impl<P> TrackableNetwork for Actor<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + InDim + OutDim + Clone,
{
    type Params = VarMap;

    fn params(&self) -> VarMap {
        self.varmap.clone()
    }

    fn detached_copy(&self, name: &str) -> Result<Self> {
        let copy = Self::_build(
            name,
            self.pi_config.clone(),
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
