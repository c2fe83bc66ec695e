use anyhow::Result;
use cem_api::{
    builders::{
        cross_entropy::CrossEntropyBuilder, env::FrozenLakeBuilder,
        learning_module::LearningModuleBuilder,
    },
    sinks::{ScalarSinkKind, TensorboardSink, TracingSink},
    utils::evaluator::{evaluate, run_episode},
};
use cem_core::{Algorithm, cross_entropy_method::LearningSchedule};
use cem_gym::LakeMap;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(about = "Train a FrozenLake policy with the cross-entropy method")]
struct Args {
    #[arg(short = 'v', long, action = clap::ArgAction::Count, help = "Increase verbosity (-v = DEBUG, -vv = TRACE)")]
    verbose: u8,

    #[arg(long, default_value = "4x4", help = "Built-in lake map: 4x4 or 8x8")]
    map: LakeMap,

    #[arg(long, help = "Disable slippery ice")]
    non_slippery: bool,

    #[arg(long, default_value_t = 16, help = "Episodes per training batch")]
    batch_size: usize,

    #[arg(long, default_value_t = 70., help = "Reward percentile an episode must reach to be trained on")]
    percentile: f32,

    #[arg(long, default_value_t = 128)]
    hidden_size: usize,

    #[arg(long, default_value_t = 0.01)]
    learning_rate: f64,

    #[arg(long)]
    max_grad_norm: Option<f32>,

    #[arg(long, default_value_t = 0.8, help = "Stop once the mean batch reward exceeds this")]
    solved_reward: f32,

    #[arg(long, help = "Stop after this many iterations even if unsolved")]
    max_iterations: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "runs", help = "Directory for tensorboard event files")]
    logdir: PathBuf,

    #[arg(long, help = "Log scalars as tracing events instead of tensorboard files")]
    no_tensorboard: bool,

    #[arg(long, default_value = "frozenlake-naive")]
    run_name: String,

    #[arg(long, default_value_t = 0, help = "Episodes to evaluate the policy on after training")]
    eval_episodes: usize,

    #[arg(long, help = "Print one episode of the trained policy step by step")]
    render: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(level)
        .init();
}

fn scalar_sink(args: &Args) -> Result<ScalarSinkKind> {
    if args.no_tensorboard {
        return Ok(ScalarSinkKind::from(TracingSink));
    }
    let sink = TensorboardSink::new(&args.logdir, &args.run_name)?;
    info!(logdir = %sink.logdir().display(), "writing tensorboard scalars");
    Ok(ScalarSinkKind::from(sink))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let scalar_sink = scalar_sink(&args)?;
    let env_builder = FrozenLakeBuilder {
        map: args.map.clone(),
        slippery: !args.non_slippery,
        max_episode_steps: None,
    };
    let builder = CrossEntropyBuilder {
        batch_size: args.batch_size,
        percentile: args.percentile,
        learning_module: LearningModuleBuilder {
            hidden_layers: vec![args.hidden_size],
            learning_rate: args.learning_rate,
            max_grad_norm: args.max_grad_norm,
        },
        learning_schedule: LearningSchedule {
            solved_reward: args.solved_reward,
            max_iterations: args.max_iterations,
        },
        seed: args.seed,
        scalar_sink,
        ..Default::default()
    };
    let mut algo = builder.build_frozen_lake(&env_builder)?;
    algo.train()?;

    let env = algo.sampler.env_mut();
    let distribution = algo.learner.distribution();
    if args.eval_episodes > 0 {
        let rewards = evaluate(env, distribution, args.eval_episodes)?;
        let solved = rewards.iter().filter(|r| **r > 0.).count();
        info!(
            "reached the goal in {solved} of {} evaluation episodes",
            rewards.len()
        );
    }
    if args.render {
        let reward = run_episode(env, distribution, |env| {
            println!("{}", env.inner().render());
        })?;
        info!(reward, "rendered episode finished");
    }
    Ok(())
}
