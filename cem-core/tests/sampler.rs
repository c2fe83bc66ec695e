use candle_core::{Device, Result, Tensor};
use cem_core::{
    distributions::Distribution,
    env::{Env, EnvironmentDescription, SnapShot, Space, StepInfo, one_hot::DiscreteOneHot},
    rng::set_seed,
    sampler::EpisodeSampler,
};

const CORRIDOR_LENGTH: usize = 4;

// Walks right one cell per step. Episode `n` (counting resets from zero) lasts `n % 3 + 1` steps
// and pays 1.0 on its last step.
struct CorridorEnv {
    position: usize,
    resets: usize,
    episode_length: usize,
}

impl CorridorEnv {
    fn new() -> Self {
        Self {
            position: 0,
            resets: 0,
            episode_length: 0,
        }
    }
}

impl Env for CorridorEnv {
    type Observation = usize;
    type Action = usize;

    fn reset(&mut self, _seed: u64) -> Result<usize> {
        self.episode_length = self.resets % 3 + 1;
        self.resets += 1;
        self.position = 0;
        Ok(self.position)
    }

    fn step(&mut self, _action: usize) -> Result<SnapShot<usize>> {
        self.position += 1;
        let terminated = self.position == self.episode_length;
        Ok(SnapShot {
            state: self.position,
            reward: if terminated { 1. } else { 0. },
            terminated,
            truncated: false,
            info: StepInfo::default(),
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(Space::Discrete(CORRIDOR_LENGTH), Space::Discrete(2))
    }
}

struct AlwaysFirstAction;

impl Distribution for AlwaysFirstAction {
    fn logits(&self, observations: &Tensor) -> Result<Tensor> {
        let n = observations.dims()[0];
        Tensor::zeros((n, 2), observations.dtype(), observations.device())
    }

    fn action_probs(&self, _observation: &Tensor) -> Result<Vec<f32>> {
        Ok(vec![1., 0.])
    }

    fn get_action(&self, _observation: &Tensor) -> Result<usize> {
        Ok(0)
    }
}

fn sampler(batch_size: usize) -> Result<EpisodeSampler<DiscreteOneHot<CorridorEnv>>> {
    let env = DiscreteOneHot::new(CorridorEnv::new(), Device::Cpu)?;
    EpisodeSampler::new(env, batch_size)
}

#[test]
fn batches_have_exactly_the_configured_size() -> Result<()> {
    set_seed(0);
    for batch_size in [1, 2, 5, 16] {
        let mut sampler = sampler(batch_size)?;
        for _ in 0..3 {
            let batch = sampler.collect_batch(&AlwaysFirstAction)?;
            assert_eq!(batch.len(), batch_size);
        }
    }
    Ok(())
}

#[test]
fn episodes_record_every_step_and_their_reward() -> Result<()> {
    let mut sampler = sampler(6)?;
    let batch = sampler.collect_batch(&AlwaysFirstAction)?;
    let lengths: Vec<usize> = batch.iter().map(|episode| episode.len()).collect();
    assert_eq!(lengths, vec![1, 2, 3, 1, 2, 3]);
    assert!(batch.iter().all(|episode| episode.reward == 1.));
    assert_eq!(batch.total_steps(), 12);

    let third = &batch[2];
    let positions: Vec<usize> = third
        .steps
        .iter()
        .map(|step| {
            let observation: Vec<f32> = step.observation.to_vec1().unwrap();
            observation.iter().position(|v| *v == 1.).unwrap()
        })
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert!(third.steps.iter().all(|step| step.action == 0));
    Ok(())
}

#[test]
fn reset_state_carries_over_between_batches() -> Result<()> {
    let mut sampler = sampler(5)?;
    sampler.collect_batch(&AlwaysFirstAction)?;
    // one reset to start plus one after each finished episode
    assert_eq!(sampler.env().inner().resets, 6);
    let batch = sampler.collect_batch(&AlwaysFirstAction)?;
    assert_eq!(sampler.env().inner().resets, 11);
    let lengths: Vec<usize> = batch.iter().map(|episode| episode.len()).collect();
    assert_eq!(lengths, vec![3, 1, 2, 3, 1]);
    Ok(())
}

#[test]
fn zero_batch_size_is_rejected() -> Result<()> {
    let env = DiscreteOneHot::new(CorridorEnv::new(), Device::Cpu)?;
    assert!(EpisodeSampler::new(env, 0).is_err());
    Ok(())
}
