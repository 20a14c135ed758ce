//! Episode loop tying the replay buffer, exploration, learner and target
//! synchronizer together.
//!
//! Per step the order is fixed: select an action, step the environment, append the
//! transition, count the step, then either stop (terminal step, no learning) or run
//! one learner update followed by one synchronizer tick.

use log::{debug, info, warn};
use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::approximator::QFunction;
use crate::config::DqnConfig;
use crate::environment::{check_action, check_state, Environment};
use crate::error::{DqnError, Result};
use crate::exploration::EpsilonGreedy;
use crate::learner::{Learner, UpdateOutcome};
use crate::metrics::{EpisodeOutcome, EpisodeRecord, RewardWindow, TrainingHistory};
use crate::network::NeuralNetwork;
use crate::optimizer::{Adam, OptimizerWrapper};
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::sync::TargetSynchronizer;
use crate::telemetry::{NullSink, TelemetrySink};

/// Result of one training episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub index: usize,
    pub reward: f32,
    pub steps: usize,
    pub outcome: EpisodeOutcome,
    /// Learner updates performed during the episode
    pub updates: usize,
}

/// Result of a full [`Trainer::train`] run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub episodes: usize,
    pub total_steps: usize,
    pub updates: usize,
    pub syncs: usize,
    pub final_epsilon: f32,
    pub mean_reward_last_100: Option<f32>,
    pub history: TrainingHistory,
}

/// Owns one training run: the environment, both approximators and all learning state.
pub struct Trainer<E, Q, S = NullSink>
where
    E: Environment,
    Q: QFunction,
    S: TelemetrySink,
{
    env: E,
    online: Q,
    target: Q,
    buffer: ReplayBuffer,
    policy: EpsilonGreedy,
    learner: Learner,
    synchronizer: TargetSynchronizer,
    config: DqnConfig,
    rewards: RewardWindow,
    history: TrainingHistory,
    total_steps: usize,
    episodes_run: usize,
    rng: StdRng,
    telemetry: S,
}

impl<E, Q, S> Trainer<E, Q, S>
where
    E: Environment,
    Q: QFunction,
    S: TelemetrySink,
{
    /// Assemble a run from parts. `online` and `target` must share the environment's shape.
    pub fn new(env: E, online: Q, target: Q, config: DqnConfig, telemetry: S) -> Result<Self> {
        config.validate()?;
        for (role, approximator) in [("online", &online), ("target", &target)] {
            if approximator.state_dimension() != env.state_dimension()
                || approximator.num_actions() != env.num_actions()
            {
                return Err(DqnError::dimension_mismatch(
                    format!("{} -> {}", env.state_dimension(), env.num_actions()),
                    format!(
                        "{} approximator {} -> {}",
                        role,
                        approximator.state_dimension(),
                        approximator.num_actions()
                    ),
                ));
            }
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Trainer {
            buffer: ReplayBuffer::new(config.replay_capacity)?,
            policy: EpsilonGreedy::new(config.epsilon, config.min_epsilon, config.epsilon_decay)?,
            learner: Learner::new(config.gamma, config.batch_size)?,
            synchronizer: TargetSynchronizer::new(config.target_sync_interval)?,
            rewards: RewardWindow::default(),
            history: TrainingHistory::new(),
            total_steps: 0,
            episodes_run: 0,
            env,
            online,
            target,
            config,
            rng,
            telemetry,
        })
    }

    /// Run the configured number of episodes.
    pub fn train(&mut self) -> Result<TrainingReport> {
        for _ in 0..self.config.episodes {
            let index = self.episodes_run + 1;
            self.run_episode(index)?;
        }
        self.telemetry.flush()?;

        Ok(TrainingReport {
            episodes: self.episodes_run,
            total_steps: self.total_steps,
            updates: self.learner.updates(),
            syncs: self.synchronizer.syncs(),
            final_epsilon: self.policy.epsilon(),
            mean_reward_last_100: self.rewards.mean(),
            history: self.history.clone(),
        })
    }

    /// Play one episode, learning along the way. `index` keys the episode's telemetry.
    pub fn run_episode(&mut self, index: usize) -> Result<EpisodeSummary> {
        let state_dimension = self.env.state_dimension();
        let num_actions = self.env.num_actions();

        let mut state: Array1<f32> = self.env.reset()?;
        check_state(state.view(), state_dimension)?;

        let mut reward_in_episode = 0.0f32;
        let mut steps = 0;
        let mut updates = 0;
        let mut outcome = EpisodeOutcome::Truncated;

        for _ in 1..self.config.steps_per_episode {
            let action = self.policy.select_action(state.view(), &self.online, &mut self.env, &mut self.rng)?;
            check_action(action, num_actions)?;

            let step = self.env.step(action)?;
            check_state(step.next_state.view(), state_dimension)?;
            reward_in_episode += step.reward;
            steps += 1;

            let next_state = step.next_state;
            self.buffer.append(Transition {
                state,
                action,
                reward: step.reward,
                next_state: next_state.clone(),
                done: step.done,
            });
            self.total_steps += 1;
            state = next_state;

            // A terminal step ends the episode before any learning or sync tick.
            let terminal_step = step.done;
            if terminal_step {
                outcome = EpisodeOutcome::Terminated;
                break;
            }

            let update = self.learner.maybe_update(
                &self.buffer,
                &mut self.online,
                &self.target,
                &mut self.policy,
                self.total_steps,
                &mut self.rng,
            )?;
            if let UpdateOutcome::Updated { loss } = update {
                updates += 1;
                self.history.record_loss(loss);
                self.telemetry.record_scalar("loss", self.total_steps, loss)?;
                self.telemetry.record_scalar("epsilon", self.total_steps, self.policy.epsilon())?;
            }

            if self.synchronizer.maybe_sync(&self.online, &mut self.target)? {
                debug!("target network updated at step {}", self.total_steps);
            }
        }

        self.finish_episode(index, reward_in_episode, steps, outcome)?;

        Ok(EpisodeSummary { index, reward: reward_in_episode, steps, outcome, updates })
    }

    fn finish_episode(&mut self, index: usize, reward: f32, steps: usize, outcome: EpisodeOutcome) -> Result<()> {
        if !reward.is_finite() {
            warn!("episode {} finished with non-finite reward {}", index, reward);
        }

        self.episodes_run += 1;
        self.rewards.push(reward);
        let mean = self.rewards.mean().unwrap_or(reward);

        self.history.record_episode(EpisodeRecord {
            index,
            reward,
            steps,
            outcome,
            epsilon: self.policy.epsilon(),
        });
        self.telemetry.record_scalar("reward", index, reward)?;
        self.telemetry.record_scalar("reward_mean_100", index, mean)?;

        info!(
            "episode {}: reward {:.2}, mean of last {} episodes {:.2}, epsilon {:.4}, {:?} after {} steps",
            index,
            reward,
            self.rewards.len(),
            mean,
            self.policy.epsilon(),
            outcome,
            steps
        );
        Ok(())
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn online(&self) -> &Q {
        &self.online
    }

    pub fn target(&self) -> &Q {
        &self.target
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    pub fn epsilon(&self) -> f32 {
        self.policy.epsilon()
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn steps_since_sync(&self) -> usize {
        self.synchronizer.steps_since_sync()
    }

    pub fn updates(&self) -> usize {
        self.learner.updates()
    }

    pub fn syncs(&self) -> usize {
        self.synchronizer.syncs()
    }

    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    pub fn mean_reward(&self) -> Option<f32> {
        self.rewards.mean()
    }

    pub fn telemetry(&self) -> &S {
        &self.telemetry
    }

    /// End the run, handing back the environment and the trained online approximator.
    pub fn into_parts(self) -> (E, Q) {
        (self.env, self.online)
    }
}

/// Builder for a [`Trainer`] backed by the bundled [`NeuralNetwork`].
pub struct TrainerBuilder<E: Environment, S: TelemetrySink = NullSink> {
    env: E,
    config: DqnConfig,
    telemetry: S,
}

impl<E: Environment> TrainerBuilder<E, NullSink> {
    pub fn new(env: E) -> Self {
        TrainerBuilder {
            env,
            config: DqnConfig::default(),
            telemetry: NullSink,
        }
    }
}

impl<E: Environment, S: TelemetrySink> TrainerBuilder<E, S> {
    pub fn config(mut self, config: DqnConfig) -> Self {
        self.config = config;
        self
    }

    pub fn episodes(mut self, episodes: usize) -> Self {
        self.config.episodes = episodes;
        self
    }

    pub fn steps_per_episode(mut self, steps: usize) -> Self {
        self.config.steps_per_episode = steps;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn telemetry<T: TelemetrySink>(self, telemetry: T) -> TrainerBuilder<E, T> {
        TrainerBuilder {
            env: self.env,
            config: self.config,
            telemetry,
        }
    }

    /// Use a caller-built online approximator; the target starts as a copy of it.
    pub fn build_with<Q: QFunction + Clone>(self, online: Q) -> Result<Trainer<E, Q, S>> {
        let target = online.clone();
        Trainer::new(self.env, online, target, self.config, self.telemetry)
    }

    /// Build a ReLU Q-network of the configured depth with an Adam optimizer.
    pub fn build(self) -> Result<Trainer<E, NeuralNetwork, S>> {
        self.config.validate()?;
        // Offset from the trainer's own seed so initialization and exploration draw different streams.
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(0x9E37_79B9)),
            None => StdRng::from_entropy(),
        };
        let online = NeuralNetwork::q_network(
            self.env.state_dimension(),
            self.env.num_actions(),
            self.config.depth.hidden_layers(),
            self.config.hidden_units,
            OptimizerWrapper::Adam(Adam::default()),
            self.config.learning_rate,
            &mut rng,
        )?;
        self.build_with(online)
    }
}
