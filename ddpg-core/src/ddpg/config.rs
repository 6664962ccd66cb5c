//! Configuration of [`Ddpg`](super::Ddpg).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Ddpg`](super::Ddpg).
///
/// Values are not validated. The smoothing rates are expected to be in
/// `(0, 1)` and the discount factor in `[0, 1)`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DdpgConfig {
    /// Discount factor of future rewards.
    pub discount_factor: f64,

    /// Smoothing rate of the target actor.
    pub actor_target_approach_rate: f64,

    /// Smoothing rate of the target critic.
    pub q_target_approach_rate: f64,

    /// Strength of the L2 penalty on actor parameters.
    #[serde(default)]
    pub actor_l2: Option<f64>,

    /// Strength of the L2 penalty on critic parameters.
    #[serde(default)]
    pub q_l2: Option<f64>,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.9,
            actor_target_approach_rate: 0.99,
            q_target_approach_rate: 0.99,
            actor_l2: None,
            q_l2: None,
        }
    }
}

impl DdpgConfig {
    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the smoothing rate of the target actor.
    pub fn actor_target_approach_rate(mut self, v: f64) -> Self {
        self.actor_target_approach_rate = v;
        self
    }

    /// Sets the smoothing rate of the target critic.
    pub fn q_target_approach_rate(mut self, v: f64) -> Self {
        self.q_target_approach_rate = v;
        self
    }

    /// Sets the L2 penalty of the actor.
    pub fn actor_l2(mut self, v: f64) -> Self {
        self.actor_l2 = Some(v);
        self
    }

    /// Sets the L2 penalty of the critic.
    pub fn q_l2(mut self, v: f64) -> Self {
        self.q_l2 = Some(v);
        self
    }

    /// Constructs [`DdpgConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DdpgConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
