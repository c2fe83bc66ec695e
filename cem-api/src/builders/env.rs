use candle_core::{Device, Result};
use cem_core::env::{Env, one_hot::DiscreteOneHot};
use cem_gym::{FrozenLake, LakeMap};

pub trait EnvBuilderTrait {
    type Env: Env;

    fn build_env(&self, device: &Device) -> Result<Self::Env>;
}

impl<E: Env, F> EnvBuilderTrait for F
where
    F: Fn(&Device) -> Result<E>,
{
    type Env = E;

    fn build_env(&self, device: &Device) -> Result<Self::Env> {
        (self)(device)
    }
}

/// FrozenLake with one-hot encoded observations.
#[derive(Debug, Clone)]
pub struct FrozenLakeBuilder {
    pub map: LakeMap,
    pub slippery: bool,
    pub max_episode_steps: Option<usize>,
}

impl Default for FrozenLakeBuilder {
    fn default() -> Self {
        Self {
            map: LakeMap::four_by_four(),
            slippery: true,
            max_episode_steps: None,
        }
    }
}

impl EnvBuilderTrait for FrozenLakeBuilder {
    type Env = DiscreteOneHot<FrozenLake>;

    fn build_env(&self, device: &Device) -> Result<Self::Env> {
        let mut env = FrozenLake::new(self.map.clone(), self.slippery);
        if let Some(max_episode_steps) = self.max_episode_steps {
            env = env.with_max_episode_steps(max_episode_steps);
        }
        DiscreteOneHot::new(env, device.clone())
    }
}
