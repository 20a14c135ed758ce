use ndarray::{array, Array1};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};

use crate::environment::{check_action, Environment, Step};
use crate::error::{DqnError, Result};

const GRAVITY: f32 = 9.8;
const MASS_CART: f32 = 1.0;
const MASS_POLE: f32 = 0.1;
const HALF_POLE_LENGTH: f32 = 0.5;
const FORCE_MAG: f32 = 10.0;
const DT: f32 = 0.02;
const X_THRESHOLD: f32 = 2.4;
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * std::f32::consts::PI / 360.0;

/// Classic cart-pole balancing task.
///
/// State is `[x, x_dot, theta, theta_dot]`, action 0 pushes left and 1 pushes right.
/// Every step earns a reward of 1; the episode ends when the pole tips past 12 degrees
/// or the cart leaves the track.
pub struct CartPole {
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,
    done: bool,
    rng: StdRng,
}

impl CartPole {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        CartPole {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            done: true,
            rng,
        }
    }

    fn state(&self) -> Array1<f32> {
        array![self.x, self.x_dot, self.theta, self.theta_dot]
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    fn state_dimension(&self) -> usize {
        4
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<Array1<f32>> {
        let init = Uniform::new_inclusive(-0.05f32, 0.05);
        self.x = init.sample(&mut self.rng);
        self.x_dot = init.sample(&mut self.rng);
        self.theta = init.sample(&mut self.rng);
        self.theta_dot = init.sample(&mut self.rng);
        self.done = false;
        Ok(self.state())
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        check_action(action, 2)?;
        if self.done {
            return Err(DqnError::EnvironmentContract(
                "step() called on a finished episode; call reset() first".to_string(),
            ));
        }

        let force = if action == 1 { FORCE_MAG } else { -FORCE_MAG };
        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();
        let total_mass = MASS_CART + MASS_POLE;
        let pole_mass_length = MASS_POLE * HALF_POLE_LENGTH;

        let temp = (force + pole_mass_length * self.theta_dot * self.theta_dot * sin_theta) / total_mass;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (HALF_POLE_LENGTH * (4.0 / 3.0 - MASS_POLE * cos_theta * cos_theta / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        self.x += DT * self.x_dot;
        self.x_dot += DT * x_acc;
        self.theta += DT * self.theta_dot;
        self.theta_dot += DT * theta_acc;

        self.done = self.x.abs() > X_THRESHOLD || self.theta.abs() > THETA_THRESHOLD;

        Ok(Step::new(self.state(), 1.0, self.done))
    }

    fn render(&self) {
        println!(
            "x={:+.3} x_dot={:+.3} theta={:+.3} theta_dot={:+.3}",
            self.x, self.x_dot, self.theta, self.theta_dot
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_is_small_and_seeded() {
        let mut a = CartPole::with_seed(5);
        let mut b = CartPole::with_seed(5);
        let s = a.reset().unwrap();
        assert_eq!(s, b.reset().unwrap());
        assert!(s.iter().all(|v| v.abs() <= 0.05));
    }

    #[test]
    fn test_constant_push_terminates() {
        let mut env = CartPole::with_seed(1);
        env.reset().unwrap();
        let mut steps = 0;
        loop {
            let step = env.step(1).unwrap();
            steps += 1;
            assert_eq!(step.reward, 1.0);
            if step.done {
                break;
            }
            assert!(steps < 500);
        }
        assert!(env.step(1).is_err());
    }
}
