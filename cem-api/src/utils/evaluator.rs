use candle_core::{Result, Tensor};
use cem_core::{distributions::Distribution, env::Env, rng::RNG};
use rand::Rng;
use tracing::info;

/// Plays a single episode with `distribution`, calling `on_step` after the reset and after every
/// step. Returns the episode reward.
pub fn run_episode<E, D>(
    env: &mut E,
    distribution: &D,
    mut on_step: impl FnMut(&E),
) -> Result<f32>
where
    E: Env<Observation = Tensor, Action = usize>,
    D: Distribution,
{
    let seed = RNG.with_borrow_mut(|rng| rng.random::<u64>());
    let mut state = env.reset(seed)?;
    on_step(env);
    let mut total_reward = 0.;
    loop {
        let action = distribution.get_action(&state)?;
        let snapshot = env.step(action)?;
        total_reward += snapshot.reward;
        on_step(env);
        if snapshot.done() {
            return Ok(total_reward);
        }
        state = snapshot.state;
    }
}

/// Per-episode rewards of `episodes` runs of the current policy.
pub fn evaluate<E, D>(env: &mut E, distribution: &D, episodes: usize) -> Result<Vec<f32>>
where
    E: Env<Observation = Tensor, Action = usize>,
    D: Distribution,
{
    let rewards = (0..episodes)
        .map(|_| run_episode(env, distribution, |_| {}))
        .collect::<Result<Vec<_>>>()?;
    if !rewards.is_empty() {
        let avg_reward = rewards.iter().sum::<f32>() / rewards.len() as f32;
        info!(episodes, avg_reward, "evaluation finished");
    }
    Ok(rewards)
}
