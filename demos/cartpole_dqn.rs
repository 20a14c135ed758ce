/***
# CartPole DQN

* Trains a Q-network on CartPole, streams scalars to `runs/cartpole/scalars.csv`
  and finishes with a few greedy evaluation episodes.
* Pass a JSON config path as the first argument to override the defaults.
* Set `RUST_LOG=info` to see per-episode progress, `RUST_LOG=debug` for updates and syncs.
***/

use deepq::{
    config::DqnConfig,
    envs::CartPole,
    evaluation::Evaluator,
    telemetry::CsvScalarWriter,
    trainer::TrainerBuilder,
};

fn main() -> deepq::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => DqnConfig::from_json_file(path)?,
        None => DqnConfig {
            episodes: 300,
            steps_per_episode: 500,
            seed: Some(42),
            ..Default::default()
        },
    };
    println!("=== CartPole DQN ===");
    println!("{}", config.to_json()?);

    let writer = CsvScalarWriter::new("runs", "cartpole")?;
    let mut trainer = TrainerBuilder::new(CartPole::with_seed(42))
        .config(config)
        .telemetry(writer)
        .build()?;
    let report = trainer.train()?;

    println!("\nEpisodes:      {}", report.episodes);
    println!("Total steps:   {}", report.total_steps);
    println!("Updates:       {}", report.updates);
    println!("Target syncs:  {}", report.syncs);
    println!("Final epsilon: {:.4}", report.final_epsilon);
    if let Some(mean) = report.mean_reward_last_100 {
        println!("Mean reward (last 100): {:.2}", mean);
    }
    println!("Scalars written to {}", trainer.telemetry().log_dir().display());

    let (mut env, online) = trainer.into_parts();
    let rewards = Evaluator::new(false).evaluate(&mut env, &online, 5)?;
    println!("\nGreedy evaluation rewards: {:?}", rewards);
    Ok(())
}
