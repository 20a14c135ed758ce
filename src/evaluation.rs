use log::{debug, warn};
use ndarray::ArrayView1;

use crate::approximator::QFunction;
use crate::environment::{check_action, check_state, Environment};
use crate::error::Result;
use crate::exploration::EpsilonGreedy;

/// Plays greedy episodes with the online approximator. Nothing is learned, stored or decayed.
///
/// Episodes run until the environment reports `done`; there is no step cap, so an
/// environment that never terminates keeps the evaluator running.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    render: bool,
}

impl Evaluator {
    pub fn new(render: bool) -> Self {
        Evaluator { render }
    }

    /// Greedy action for one state.
    pub fn greedy_action<Q: QFunction>(online: &Q, state: ArrayView1<f32>) -> Result<usize> {
        EpsilonGreedy::exploit(state, online)
    }

    /// Play one greedy episode and return its total reward.
    pub fn run_episode<E, Q>(&self, env: &mut E, online: &Q) -> Result<f32>
    where
        E: Environment + ?Sized,
        Q: QFunction,
    {
        let state_dimension = env.state_dimension();
        let num_actions = env.num_actions();
        let mut state = env.reset()?;
        let mut reward_in_episode = 0.0f32;

        loop {
            check_state(state.view(), state_dimension)?;
            let action = Self::greedy_action(online, state.view())?;
            check_action(action, num_actions)?;

            let step = env.step(action)?;
            reward_in_episode += step.reward;
            if self.render {
                env.render();
            }
            if step.done {
                break;
            }
            state = step.next_state;
        }

        Ok(reward_in_episode)
    }

    /// Play `episodes` greedy episodes, then close the environment.
    pub fn evaluate<E, Q>(&self, env: &mut E, online: &Q, episodes: usize) -> Result<Vec<f32>>
    where
        E: Environment + ?Sized,
        Q: QFunction,
    {
        let mut rewards = Vec::with_capacity(episodes);
        for episode in 1..=episodes {
            let reward = self.run_episode(env, online)?;
            if !reward.is_finite() {
                warn!("evaluation episode {} finished with non-finite reward {}", episode, reward);
            }
            debug!("evaluation episode {}: reward {:.2}", episode, reward);
            rewards.push(reward);
        }
        env.close();
        Ok(rewards)
    }
}
