use anyhow::Result;
use candle_core::{DType, Tensor};
use ddpg_candle_agent::{
    build_ddpg,
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    Activation, Actor, ActorConfig, CandleDdpg, CriticConfig, DdpgAgentConfig, Device,
};
use ddpg_core::{DdpgConfig, Network, TargetTracker, TrackableNetwork, TransitionBatch};
use tempdir::TempDir;

const STATE_DIM: usize = 3;
const ACTION_DIM: usize = 1;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config() -> DdpgAgentConfig<MlpConfig, MlpConfig> {
    DdpgAgentConfig::default()
        .ddpg_config(
            DdpgConfig::default()
                .discount_factor(0.99)
                .actor_target_approach_rate(0.01)
                .q_target_approach_rate(0.01),
        )
        .actor_config(ActorConfig::default().pi_config(MlpConfig::new(
            STATE_DIM,
            vec![32, 32],
            ACTION_DIM,
            Activation::Tanh,
        )))
        .critic_config(
            CriticConfig::default()
                .q_config(MlpConfig::new(
                    STATE_DIM + ACTION_DIM,
                    vec![32, 32],
                    1,
                    Activation::None,
                ))
                .action_dim(ACTION_DIM),
        )
        .device(Device::Cpu)
}

fn batch() -> TransitionBatch {
    TransitionBatch::from_transitions(vec![
        (vec![0.1, 0.2, 0.3], vec![0.5], 1.0, vec![0.2, 0.2, 0.3], false),
        (vec![-0.4, 0.0, 0.9], vec![-0.2], 0.0, vec![-0.3, 0.1, 0.8], false),
        (vec![0.7, -0.6, 0.1], vec![0.9], -1.0, vec![0.0, 0.0, 0.0], true),
        (vec![0.0, 0.5, -0.5], vec![0.0], 0.5, vec![0.1, 0.4, -0.4], false),
    ])
}

fn build() -> Result<CandleDdpg<Mlp, Mlp>> {
    build_ddpg::<Mlp, Mlp>(config())
}

#[test]
fn test_train() -> Result<()> {
    init_logger();
    let mut ddpg = build()?;

    // Targets start equal to the live networks.
    assert_eq!(ddpg.critic_target().distance_to_source(ddpg.critic())?, 0.0);
    assert_eq!(ddpg.actor_target().distance_to_source(ddpg.actor())?, 0.0);

    for _ in 0..5 {
        let record = ddpg.train(&batch())?;
        assert!(record.get_scalar("loss_critic")?.is_finite());
        assert!(record.get_scalar("loss_actor")?.is_finite());
    }

    assert_eq!(ddpg.n_opts(), 5);
    assert_eq!(ddpg.critic_target().n_approaches(), 5);
    assert_eq!(ddpg.actor_target().n_approaches(), 5);

    // The live networks moved away from the lagged ones.
    assert!(ddpg.critic_target().distance_to_source(ddpg.critic())? > 0.0);
    assert!(ddpg.actor_target().distance_to_source(ddpg.actor())? > 0.0);
    Ok(())
}

#[test]
fn test_critic_loss_decreases() -> Result<()> {
    let config = config().critic_config(
        CriticConfig::default()
            .q_config(MlpConfig::new(
                STATE_DIM + ACTION_DIM,
                vec![32, 32],
                1,
                Activation::None,
            ))
            .opt_config(OptimizerConfig::Adam { lr: 0.01 })
            .action_dim(ACTION_DIM),
    );
    let mut ddpg = build_ddpg::<Mlp, Mlp>(config)?;

    // All transitions terminal: the regression targets are the rewards.
    let b = batch();
    let done = vec![true; b.len()];
    let loss_first = ddpg.train_q(&b.state, &b.action, &b.reward, &b.next_state, &done)?;
    let mut loss_last = loss_first;
    for _ in 0..100 {
        loss_last = ddpg.train_q(&b.state, &b.action, &b.reward, &b.next_state, &done)?;
    }
    assert!(loss_last < loss_first);
    Ok(())
}

#[test]
fn test_actor_step_leaves_critic_unchanged() -> Result<()> {
    let mut ddpg = build()?;
    let critic_before = ddpg.critic().parameter_values()?;
    let actor_before = ddpg.actor().parameter_values()?;

    ddpg.train_actor(&batch().state)?;

    assert_eq!(ddpg.critic().parameter_values()?, critic_before);
    assert_ne!(ddpg.actor().parameter_values()?, actor_before);
    assert_eq!(ddpg.actor_target().n_approaches(), 1);
    assert_eq!(ddpg.critic_target().n_approaches(), 0);
    Ok(())
}

#[test]
fn test_action() -> Result<()> {
    let mut ddpg = build()?;
    let state = [0.1, -0.2, 0.3];

    let a1 = ddpg.action(&state)?;
    let a2 = ddpg.action(&state)?;
    assert_eq!(a1, a2);
    assert_eq!(a1.len(), ACTION_DIM);
    assert!(a1[0].abs() <= 1.0);

    ddpg.train(&batch())?;
    assert_eq!(ddpg.action(&state)?, ddpg.actor().predict(&[state.to_vec()])?);
    Ok(())
}

#[test]
fn test_td_error_batch_equivalence() -> Result<()> {
    let mut ddpg = build()?;
    ddpg.train(&batch())?;

    let b = batch();
    let td_batch = ddpg.get_td_error_batch(&b.state, &b.action, &b.reward, &b.next_state, &b.done)?;
    assert_eq!(td_batch.len(), b.len());

    for i in 0..b.len() {
        let td = ddpg.get_td_error(
            &b.state[i],
            &b.action[i],
            b.reward[i],
            &b.next_state[i],
            b.done[i],
        )?;
        assert!((td - td_batch[i]).abs() < 1e-5);
    }
    Ok(())
}

#[test]
fn test_tracker_convergence() -> Result<()> {
    let config = config();
    let actor = Actor::<Mlp>::build("actor", &config.actor_config, candle_core::Device::Cpu)?;
    let tau = 0.2;
    let mut tracker = TargetTracker::new("actor_target", &actor, tau)?;

    // Move the source away from the target.
    for var in actor.varmap().all_vars() {
        var.set(&var.as_tensor().affine(1.0, 1.0)?)?;
    }

    let mut dist = tracker.distance_to_source(&actor)?;
    assert!(dist > 0.0);
    for _ in 0..10 {
        tracker.approach_source_parameters()?;
        let d = tracker.distance_to_source(&actor)?;
        assert!((d / dist - (1.0 - tau)).abs() < 1e-3);
        dist = d;
    }

    // Predictions come from the lagged copy.
    let state = vec![vec![0.1, 0.2, 0.3]];
    assert_ne!(
        tracker.predict_batch(&[&state[..]])?,
        actor.predict_batch(&[&state[..]])?
    );
    Ok(())
}

fn sum_of_squares(values: &[Vec<f32>]) -> f64 {
    values.iter().flatten().map(|v| (*v as f64).powi(2)).sum()
}

#[test]
fn test_l2_penalties() -> Result<()> {
    let (actor_l2, q_l2) = (0.01, 0.5);
    let mut config = config();
    config.ddpg_config = config.ddpg_config.actor_l2(actor_l2).q_l2(q_l2);
    let ddpg = build_ddpg::<Mlp, Mlp>(config)?;

    let critic_opt = ddpg.critic_updater().optimizer();
    let actor_opt = ddpg.actor_updater().optimizer();
    assert_eq!(critic_opt.l2(), Some(q_l2));
    assert_eq!(actor_opt.l2(), Some(actor_l2));

    // With a zero output and zero targets, the loss is the penalty alone.
    let zeros = Tensor::zeros((2, 1), DType::F32, &candle_core::Device::Cpu)?;
    let targets = Tensor::zeros((2,), DType::F32, &candle_core::Device::Cpu)?;
    let critic_loss = critic_opt.loss(&zeros, Some(&targets))?.to_scalar::<f32>()? as f64;
    let critic_penalty = q_l2 * sum_of_squares(&ddpg.critic().parameter_values()?);
    assert!(critic_penalty > 0.0);
    assert!((critic_loss - critic_penalty).abs() < 1e-3 * critic_penalty);

    let actor_loss = actor_opt.loss(&zeros, None)?.to_scalar::<f32>()? as f64;
    let actor_penalty = actor_l2 * sum_of_squares(&ddpg.actor().parameter_values()?);
    assert!(actor_penalty > 0.0);
    assert!((actor_loss - actor_penalty).abs() < 1e-3 * actor_penalty);

    // Without L2 the same losses vanish.
    let ddpg = build()?;
    assert_eq!(ddpg.critic_updater().optimizer().l2(), None);
    let loss = ddpg
        .critic_updater()
        .optimizer()
        .loss(&zeros, Some(&targets))?
        .to_scalar::<f32>()?;
    assert_eq!(loss, 0.0);
    Ok(())
}

#[test]
fn test_non_scalar_critic() {
    let config = config().critic_config(
        CriticConfig::default()
            .q_config(MlpConfig::new(STATE_DIM + ACTION_DIM, vec![8], 2, Activation::None))
            .action_dim(ACTION_DIM),
    );
    assert!(build_ddpg::<Mlp, Mlp>(config).is_err());
}

#[test]
fn test_missing_device() {
    let mut config = config();
    config.device = None;
    assert!(build_ddpg::<Mlp, Mlp>(config).is_err());
}

#[test]
fn test_config_serde() -> Result<()> {
    let config = config();
    let dir = TempDir::new("ddpg_agent_config")?;
    let path = dir.path().join("ddpg_agent_config.yaml");
    config.save(&path)?;
    let loaded = DdpgAgentConfig::<MlpConfig, MlpConfig>::load(&path)?;
    assert_eq!(loaded, config);
    Ok(())
}
