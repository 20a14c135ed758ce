use ndarray::array;

use crate::config::DqnConfig;
use crate::error::DqnError;
use crate::metrics::EpisodeOutcome;
use crate::telemetry::{MemorySink, NullSink};
use crate::trainer::{Trainer, TrainerBuilder};
use super::support::{ConstantQ, ScriptedEnv};

fn config(batch_size: usize, sync_interval: usize, steps_per_episode: usize, episodes: usize) -> DqnConfig {
    DqnConfig {
        batch_size,
        target_sync_interval: sync_interval,
        steps_per_episode,
        episodes,
        replay_capacity: 100,
        epsilon: 1.0,
        min_epsilon: 0.01,
        epsilon_decay: 0.5,
        seed: Some(3),
        ..Default::default()
    }
}

fn trainer(env: ScriptedEnv, config: DqnConfig) -> Trainer<ScriptedEnv, ConstantQ, MemorySink> {
    let online = ConstantQ::new(array![0.0, 1.0], 1);
    let target = ConstantQ::new(array![0.0, 0.0], 1);
    Trainer::new(env, online, target, config, MemorySink::new()).unwrap()
}

#[test]
fn test_terminal_step_skips_learning_and_sync() {
    // Every episode ends on its first step, so nothing past the append may run.
    let mut trainer = trainer(ScriptedEnv::terminating(1), config(1, 1, 50, 10));
    let report = trainer.train().unwrap();

    assert_eq!(report.episodes, 10);
    assert_eq!(report.total_steps, 10);
    assert_eq!(trainer.buffer().len(), 10);
    assert_eq!(report.updates, 0);
    assert_eq!(report.syncs, 0);
    assert_eq!(trainer.steps_since_sync(), 0);
    assert_eq!(report.final_epsilon, 1.0);
    assert!(trainer.online().fit_calls.is_empty());
    assert!(report.history.episodes.iter().all(|e| e.outcome == EpisodeOutcome::Terminated && e.steps == 1));
}

#[test]
fn test_truncation_after_step_cap() {
    let mut trainer = trainer(ScriptedEnv::endless(), config(50, 1000, 5, 3));
    let summary = trainer.run_episode(1).unwrap();

    assert_eq!(summary.outcome, EpisodeOutcome::Truncated);
    assert_eq!(summary.steps, 4);
    assert_eq!(summary.reward, 4.0);
    assert_eq!(summary.updates, 0);
}

#[test]
fn test_learning_starts_after_warm_up() {
    let mut trainer = trainer(ScriptedEnv::endless(), config(3, 1000, 11, 1));
    let summary = trainer.run_episode(1).unwrap();

    // 10 steps; the buffer first exceeds the batch size on the 4th
    assert_eq!(summary.steps, 10);
    assert_eq!(summary.updates, 7);
    assert_eq!(trainer.updates(), 7);
    assert_eq!(trainer.online().fit_calls.len(), 7);
    assert_eq!(trainer.epsilon(), 0.5f32.powi(7).max(0.01));

    // fit receives the running step count as its epoch index
    let epochs: Vec<usize> = trainer.online().fit_calls.iter().map(|c| c.epoch).collect();
    assert_eq!(epochs, vec![4, 5, 6, 7, 8, 9, 10]);
}

#[test]
fn test_sync_independent_of_updates() {
    let mut trainer = trainer(ScriptedEnv::endless(), config(8, 2, 6, 1));
    trainer.run_episode(1).unwrap();

    assert_eq!(trainer.updates(), 0);
    assert_eq!(trainer.syncs(), 2);
    assert_eq!(trainer.steps_since_sync(), 1);
    assert_eq!(trainer.target().values, array![0.0, 1.0]);
}

#[test]
fn test_terminal_step_counts_towards_total_steps_only() {
    let mut trainer = trainer(ScriptedEnv::terminating(3), config(50, 100, 20, 2));
    trainer.train().unwrap();

    assert_eq!(trainer.total_steps(), 6);
    // two non-terminal steps per episode tick the synchronizer
    assert_eq!(trainer.steps_since_sync(), 4);
}

#[test]
fn test_reward_telemetry_keyed_by_episode() {
    let mut trainer = trainer(ScriptedEnv::terminating(2), config(1, 100, 20, 3));
    let report = trainer.train().unwrap();

    assert_eq!(trainer.telemetry().series("reward"), vec![(1, 2.0), (2, 2.0), (3, 2.0)]);
    assert_eq!(trainer.telemetry().series("reward_mean_100").len(), 3);
    assert_eq!(report.mean_reward_last_100, Some(2.0));
    assert_eq!(trainer.telemetry().series("loss").len(), report.updates);
}

#[test]
fn test_rejects_mismatched_approximator() {
    let online = ConstantQ::new(array![0.0, 0.0, 0.0], 1);
    let target = online.clone();
    let result = Trainer::new(ScriptedEnv::endless(), online, target, config(4, 4, 10, 1), NullSink);
    assert!(matches!(result, Err(DqnError::DimensionMismatch { .. })));
}

#[test]
fn test_rejects_invalid_config() {
    let online = ConstantQ::new(array![0.0, 0.0], 1);
    let target = online.clone();
    let bad = DqnConfig { episodes: 0, ..config(4, 4, 10, 1) };
    let result = Trainer::new(ScriptedEnv::endless(), online, target, bad, NullSink);
    assert!(matches!(result, Err(DqnError::InvalidConfiguration { .. })));
}

#[test]
fn test_malformed_state_is_fatal() {
    let env = ScriptedEnv { emitted_width: 2, ..ScriptedEnv::endless() };
    let mut trainer = trainer(env, config(4, 4, 10, 1));
    assert!(matches!(trainer.train(), Err(DqnError::EnvironmentContract(_))));
}

#[test]
fn test_builder_starts_target_as_copy() {
    let trainer = TrainerBuilder::new(ScriptedEnv::endless())
        .config(config(4, 4, 10, 1))
        .build()
        .unwrap();
    assert_eq!(trainer.online().parameters(), trainer.target().parameters());
    assert_eq!(trainer.online().layers.len(), 5);
}
