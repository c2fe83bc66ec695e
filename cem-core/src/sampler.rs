use crate::{
    distributions::Distribution,
    env::{Env, EnvironmentDescription, SnapShot},
    episode::{Batch, Episode, EpisodeStep},
    rng::RNG,
};
use candle_core::{Result, Tensor, bail};
use rand::Rng;

/// Drives a single environment with the current policy and groups finished episodes into
/// batches of a fixed size.
pub struct EpisodeSampler<E: Env> {
    env: E,
    batch_size: usize,
    state: Option<E::Observation>,
}

impl<E: Env<Observation = Tensor, Action = usize>> EpisodeSampler<E> {
    pub fn new(env: E, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            bail!("batch size must be at least one episode");
        }
        Ok(Self {
            env,
            batch_size,
            state: None,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn env_description(&self) -> EnvironmentDescription {
        self.env.env_description()
    }

    fn reset(&mut self) -> Result<Tensor> {
        let seed = RNG.with_borrow_mut(|rng| rng.random::<u64>());
        self.env.reset(seed)
    }

    /// Steps the environment until exactly `batch_size` episodes have finished.
    pub fn collect_batch<D: Distribution>(&mut self, distribution: &D) -> Result<Batch> {
        let mut episodes = Vec::with_capacity(self.batch_size);
        let mut episode_reward = 0.;
        let mut episode_steps = vec![];
        let mut state = match self.state.take() {
            Some(state) => state,
            None => self.reset()?,
        };
        while episodes.len() < self.batch_size {
            let action = distribution.get_action(&state)?;
            let snapshot = self.env.step(action)?;
            let done = snapshot.done();
            let SnapShot {
                state: next_state,
                reward,
                ..
            } = snapshot;
            episode_reward += reward;
            episode_steps.push(EpisodeStep {
                observation: state,
                action,
            });
            state = if done {
                episodes.push(Episode::new(
                    episode_reward,
                    std::mem::take(&mut episode_steps),
                ));
                episode_reward = 0.;
                self.reset()?
            } else {
                next_state
            };
        }
        self.state = Some(state);
        Ok(Batch(episodes))
    }
}
