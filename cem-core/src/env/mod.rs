pub mod one_hot;

use candle_core::Result;
use derive_more::{Deref, DerefMut};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Space {
    Discrete(usize),
    Continuous { low: f32, high: f32, size: usize },
}

impl Space {
    pub fn size(&self) -> usize {
        match &self {
            Self::Discrete(size) => *size,
            Self::Continuous { size, .. } => *size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentDescription {
    pub observation_space: Space,
    pub action_space: Space,
}

impl EnvironmentDescription {
    pub fn new(observation_space: Space, action_space: Space) -> Self {
        Self {
            observation_space,
            action_space,
        }
    }

    pub fn action_size(&self) -> usize {
        self.action_space.size()
    }

    pub fn observation_size(&self) -> usize {
        self.observation_space.size()
    }
}

/// Diagnostics reported by an environment alongside a step. Never read by training.
#[derive(Deref, DerefMut, Debug, Clone, Default)]
pub struct StepInfo(pub BTreeMap<String, f32>);

#[derive(Debug, Clone)]
pub struct SnapShot<T> {
    pub state: T,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub info: StepInfo,
}

impl<T> SnapShot<T> {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }

    pub fn map_state<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<SnapShot<U>> {
        Ok(SnapShot {
            state: f(self.state)?,
            reward: self.reward,
            terminated: self.terminated,
            truncated: self.truncated,
            info: self.info,
        })
    }
}

pub trait Env {
    type Observation: Clone;
    type Action;

    fn reset(&mut self, seed: u64) -> Result<Self::Observation>;
    fn step(&mut self, action: Self::Action) -> Result<SnapShot<Self::Observation>>;
    fn env_description(&self) -> EnvironmentDescription;
}
