use candle_core::Result;
use cem_core::env::{Env, EnvironmentDescription, SnapShot, Space, StepInfo};

/// One-step episodes with a single state: action 1 pays 1.0, action 0 pays nothing.
#[derive(Debug, Default)]
pub struct TwoArmedBandit {
    pub pulls: usize,
}

impl Env for TwoArmedBandit {
    type Observation = usize;
    type Action = usize;

    fn reset(&mut self, _seed: u64) -> Result<usize> {
        Ok(0)
    }

    fn step(&mut self, action: usize) -> Result<SnapShot<usize>> {
        self.pulls += 1;
        Ok(SnapShot {
            state: 0,
            reward: if action == 1 { 1. } else { 0. },
            terminated: true,
            truncated: false,
            info: StepInfo::default(),
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(Space::Discrete(1), Space::Discrete(2))
    }
}
