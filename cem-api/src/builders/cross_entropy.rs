use crate::{
    builders::{
        env::{EnvBuilderTrait, FrozenLakeBuilder},
        learning_module::LearningModuleBuilder,
    },
    hooks::scalar_logging::ScalarLoggingHooks,
    sinks::ScalarSinkKind,
};
use candle_core::{Device, Result, Tensor, bail};
use cem_core::{
    cross_entropy_method::{CrossEntropyMethod, LearningSchedule},
    distributions::categorical_distribution::CategoricalDistribution,
    env::{Env, one_hot::DiscreteOneHot},
    rng::set_seed,
    sampler::EpisodeSampler,
};
use cem_gym::FrozenLake;
use tracing::debug;

pub type CrossEntropyAlgorithm<E> =
    CrossEntropyMethod<E, CategoricalDistribution, ScalarLoggingHooks>;

pub struct CrossEntropyBuilder {
    pub device: Device,
    pub batch_size: usize,
    pub percentile: f32,
    pub learning_module: LearningModuleBuilder,
    pub learning_schedule: LearningSchedule,
    pub seed: Option<u64>,
    pub scalar_sink: ScalarSinkKind,
}

impl Default for CrossEntropyBuilder {
    fn default() -> Self {
        Self {
            device: Device::Cpu,
            batch_size: 16,
            percentile: 70.,
            learning_module: LearningModuleBuilder::default(),
            learning_schedule: LearningSchedule::default(),
            seed: None,
            scalar_sink: ScalarSinkKind::default(),
        }
    }
}

impl CrossEntropyBuilder {
    pub fn set_learning_schedule(&mut self, learning_schedule: LearningSchedule) {
        self.learning_schedule = learning_schedule;
    }

    pub fn set_scalar_sink(&mut self, scalar_sink: impl Into<ScalarSinkKind>) {
        self.scalar_sink = scalar_sink.into();
    }

    pub fn build<E>(self, env: E) -> Result<CrossEntropyAlgorithm<E>>
    where
        E: Env<Observation = Tensor, Action = usize>,
    {
        if !(0.0..=100.0).contains(&self.percentile) {
            bail!("percentile must be within [0, 100], got {}", self.percentile);
        }
        if let Some(seed) = self.seed {
            set_seed(seed);
        }
        let sampler = EpisodeSampler::new(env, self.batch_size)?;
        let env_description = sampler.env_description();
        debug!(?env_description, batch_size = self.batch_size, "building cross-entropy method");
        let learner = self.learning_module.build(&env_description, &self.device)?;
        let hooks = ScalarLoggingHooks::new(self.learning_schedule, self.scalar_sink);
        Ok(CrossEntropyMethod {
            sampler,
            learner,
            hooks,
            percentile: self.percentile,
        })
    }

    pub fn build_with_builder<EB>(self, env_builder: &EB) -> Result<CrossEntropyAlgorithm<EB::Env>>
    where
        EB: EnvBuilderTrait,
        EB::Env: Env<Observation = Tensor, Action = usize>,
    {
        let env = env_builder.build_env(&self.device)?;
        self.build(env)
    }

    pub fn build_frozen_lake(
        self,
        env_builder: &FrozenLakeBuilder,
    ) -> Result<CrossEntropyAlgorithm<DiscreteOneHot<FrozenLake>>> {
        self.build_with_builder(env_builder)
    }
}
