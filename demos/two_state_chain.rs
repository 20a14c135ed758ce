/***
# Two-State Chain

* The smallest task where bootstrapping matters: advancing from the first state pays
  nothing now but leads to a state where advancing again pays 1.
* A linear Q-network over one-hot states learns to advance in both.
***/

use deepq::{
    approximator::QFunction,
    config::DqnConfig,
    envs::TwoStateChain,
    evaluation::Evaluator,
    network::NeuralNetwork,
    optimizer::{Adam, OptimizerWrapper},
    trainer::TrainerBuilder,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> deepq::Result<()> {
    env_logger::init();

    let config = DqnConfig {
        min_epsilon: 0.05,
        epsilon_decay: 0.98,
        learning_rate: 0.05,
        replay_capacity: 1000,
        target_sync_interval: 5,
        episodes: 600,
        steps_per_episode: 10,
        batch_size: 16,
        seed: Some(7),
        ..Default::default()
    };

    let mut rng = StdRng::seed_from_u64(7);
    let online = NeuralNetwork::q_network(2, 2, 0, 1, OptimizerWrapper::Adam(Adam::default()), config.learning_rate, &mut rng)?;
    let mut trainer = TrainerBuilder::new(TwoStateChain::new())
        .config(config)
        .build_with(online)?;
    let report = trainer.train()?;
    println!("updates: {}, syncs: {}, final epsilon: {:.3}", report.updates, report.syncs, report.final_epsilon);

    let (mut env, online) = trainer.into_parts();
    for position in 0..2 {
        let state = TwoStateChain::encode(position);
        let values = online.predict(state.view())?;
        let action = Evaluator::greedy_action(&online, state.view())?;
        println!("state {}: Q = {:?} -> action {}", position, values, action);
    }

    let rewards = Evaluator::new(false).evaluate(&mut env, &online, 3)?;
    println!("greedy rewards: {:?}", rewards);
    Ok(())
}
