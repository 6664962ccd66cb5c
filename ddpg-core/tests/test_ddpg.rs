use anyhow::Result;
use ddpg_core::{
    dummy::{EventLog, LinearNetwork, RecordingActorUpdater, RecordingCriticUpdater},
    Ddpg, DdpgConfig, Network, TransitionBatch,
};

type Trainer = Ddpg<LinearNetwork, LinearNetwork, RecordingCriticUpdater, RecordingActorUpdater>;

const CRITIC_STEP: f64 = 1.0;
const ACTOR_STEP: f64 = 0.25;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Actor `a = s`, critic `q = s + a`.
fn create_trainer(config: &DdpgConfig, log: &EventLog) -> Result<Trainer> {
    let actor = LinearNetwork::new("Actor", vec![1], vec![1.0], 0.0).with_log(log.clone());
    let critic = LinearNetwork::new("Q", vec![1, 1], vec![1.0, 1.0], 0.0).with_log(log.clone());
    let critic_updater = RecordingCriticUpdater::new(&critic, CRITIC_STEP, log.clone());
    let actor_updater = RecordingActorUpdater::new(&actor, &critic, ACTOR_STEP, log.clone());
    Ddpg::build(config, actor, critic, critic_updater, actor_updater)
}

fn batch() -> TransitionBatch {
    TransitionBatch::from_transitions(vec![
        (vec![1.0], vec![2.0], 2.0, vec![2.0], false),
        (vec![0.5], vec![-1.0], 5.0, vec![3.0], true),
        (vec![-1.0], vec![0.0], 1.0, vec![1.0], false),
    ])
}

#[test]
fn test_training_order() -> Result<()> {
    init_logger();
    let log = EventLog::new();
    let mut trainer = create_trainer(&DdpgConfig::default(), &log)?;

    trainer.train(&batch())?;
    assert_eq!(
        log.events(),
        vec![
            "train:Q",
            "approach:Q_target",
            "train:Actor",
            "approach:Actor_target"
        ]
    );
    assert_eq!(trainer.critic_target().n_approaches(), 1);
    assert_eq!(trainer.actor_target().n_approaches(), 1);

    trainer.train(&batch())?;
    trainer.train(&batch())?;
    assert_eq!(trainer.critic_target().n_approaches(), 3);
    assert_eq!(trainer.actor_target().n_approaches(), 3);
    assert_eq!(trainer.actor_updater().n_calls(), 3);
    assert_eq!(trainer.n_opts(), 3);
    Ok(())
}

#[test]
fn test_targets_step_after_live_updates() -> Result<()> {
    let config = DdpgConfig::default()
        .q_target_approach_rate(0.5)
        .actor_target_approach_rate(0.5);
    let log = EventLog::new();
    let mut trainer = create_trainer(&config, &log)?;

    let record = trainer.train(&TransitionBatch::from_transitions(vec![(
        vec![1.0],
        vec![0.0],
        0.0,
        vec![0.0],
        true,
    )]))?;

    // Live biases moved by the updaters, targets moved halfway toward them.
    assert_eq!(trainer.critic().bias(), CRITIC_STEP);
    assert_eq!(trainer.critic_target().target().bias(), 0.5 * CRITIC_STEP);
    assert_eq!(trainer.actor().bias(), ACTOR_STEP);
    assert_eq!(trainer.actor_target().target().bias(), 0.5 * ACTOR_STEP);

    // The actor step sees the already updated critic: q = 1 + 1 + CRITIC_STEP.
    assert_eq!(record.get_scalar("loss_actor")?, -3.0);
    Ok(())
}

#[test]
fn test_bellman_targets_given_to_critic() -> Result<()> {
    let log = EventLog::new();
    let mut trainer = create_trainer(&DdpgConfig::default().discount_factor(0.9), &log)?;
    let calls = trainer.critic_updater().calls();

    trainer.train(&batch())?;

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].state, batch().state);
    assert_eq!(calls[0].action, batch().action);

    // next_q = 2 * s'
    let targets = &calls[0].targets;
    assert!((targets[0] - (2.0 + 0.9 * 4.0)).abs() < 1e-6);
    assert_eq!(targets[1], 5.0);
    assert!((targets[2] - (1.0 + 0.9 * 2.0)).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_terminal_targets_ignore_non_finite_next_q() -> Result<()> {
    let log = EventLog::new();
    let actor = LinearNetwork::new("Actor", vec![1], vec![1.0], 0.0);
    let critic = LinearNetwork::new("Q", vec![1, 1], vec![1.0, 1.0], f32::NAN);
    let critic_updater = RecordingCriticUpdater::new(&critic, 0.0, log.clone());
    let actor_updater = RecordingActorUpdater::new(&actor, &critic, 0.0, log.clone());
    let mut trainer = Ddpg::build(
        &DdpgConfig::default(),
        actor,
        critic,
        critic_updater,
        actor_updater,
    )?;
    let calls = trainer.critic_updater().calls();

    trainer.train_q(
        &[vec![1.0], vec![2.0]],
        &[vec![0.0], vec![0.0]],
        &[5.0, -1.0],
        &[vec![1.0], vec![2.0]],
        &[true, true],
    )?;
    assert_eq!(calls.borrow()[0].targets, vec![5.0, -1.0]);

    trainer.train_q(&[vec![1.0]], &[vec![0.0]], &[5.0], &[vec![1.0]], &[false])?;
    assert!(calls.borrow()[1].targets[0].is_nan());
    Ok(())
}

#[test]
fn test_td_error_ignores_done() -> Result<()> {
    let log = EventLog::new();
    let trainer = create_trainer(&DdpgConfig::default().discount_factor(0.9), &log)?;

    // q = 1 + 2 = 3, next_q = 2 + 2 = 4
    let td = trainer.get_td_error(&[1.0], &[2.0], 2.0, &[2.0], false)?;
    assert!((td - 2.6).abs() < 1e-6);
    let td_done = trainer.get_td_error(&[1.0], &[2.0], 2.0, &[2.0], true)?;
    assert_eq!(td, td_done);
    Ok(())
}

#[test]
fn test_td_error_batch_equivalence() -> Result<()> {
    let log = EventLog::new();
    let mut trainer = create_trainer(&DdpgConfig::default().q_target_approach_rate(0.3), &log)?;

    // Make the target networks differ from the live ones.
    trainer.train(&batch())?;

    let b = batch();
    let td_batch =
        trainer.get_td_error_batch(&b.state, &b.action, &b.reward, &b.next_state, &b.done)?;
    assert_eq!(td_batch.len(), b.len());

    for i in 0..b.len() {
        let td = trainer.get_td_error(
            &b.state[i],
            &b.action[i],
            b.reward[i],
            &b.next_state[i],
            b.done[i],
        )?;
        assert_eq!(td, td_batch[i]);
    }

    // Reversing the batch reverses the errors.
    let td_rev = trainer.get_td_error_batch(
        &b.state.iter().rev().cloned().collect::<Vec<_>>(),
        &b.action.iter().rev().cloned().collect::<Vec<_>>(),
        &b.reward.iter().rev().cloned().collect::<Vec<_>>(),
        &b.next_state.iter().rev().cloned().collect::<Vec<_>>(),
        &b.done.iter().rev().cloned().collect::<Vec<_>>(),
    )?;
    assert_eq!(td_rev, td_batch.iter().rev().cloned().collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_td_error_uses_target_critic() -> Result<()> {
    let log = EventLog::new();
    let config = DdpgConfig::default()
        .discount_factor(0.0)
        .q_target_approach_rate(0.5);
    let mut trainer = create_trainer(&config, &log)?;

    trainer.train(&batch())?;

    // With gamma = 0, td = r - Q_target(s, a); Q_target bias is 0.5 * CRITIC_STEP.
    let td = trainer.get_td_error(&[1.0], &[1.0], 0.0, &[0.0], false)?;
    let q_tgt = trainer.critic_target().predict(&[vec![1.0], vec![1.0]])?[0];
    assert_eq!(q_tgt, 2.5);
    assert_eq!(td, -2.5);
    Ok(())
}

#[test]
fn test_action_is_deterministic() -> Result<()> {
    let log = EventLog::new();
    let mut trainer = create_trainer(&DdpgConfig::default(), &log)?;

    let a1 = trainer.action(&[0.7])?;
    let a2 = trainer.action(&[0.7])?;
    assert_eq!(a1, a2);
    assert_eq!(a1.len(), 1);

    // The live actor is used, not the lagged one.
    trainer.train(&batch())?;
    let a3 = trainer.action(&[0.7])?;
    assert_eq!(a3, vec![(0.7f32 as f64 + ACTOR_STEP) as f32]);
    Ok(())
}

#[test]
fn test_wrong_number_of_input_slots() {
    let critic = LinearNetwork::new("Q", vec![1, 1], vec![1.0, 1.0], 0.0);
    let states = vec![vec![1.0]];
    assert!(critic.predict_batch(&[&states[..]]).is_err());
}

#[test]
fn test_empty_batch() -> Result<()> {
    let log = EventLog::new();
    let mut trainer = create_trainer(&DdpgConfig::default(), &log)?;

    let record = trainer.train(&TransitionBatch::from_transitions(vec![]))?;
    assert!(record.get_scalar("loss_critic")?.is_nan());
    assert!(record.get_scalar("loss_actor")?.is_nan());
    assert_eq!(trainer.critic_target().n_approaches(), 1);
    assert_eq!(trainer.actor_target().n_approaches(), 1);
    Ok(())
}
