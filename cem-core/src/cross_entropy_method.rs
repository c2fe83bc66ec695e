use crate::{
    Algorithm,
    distributions::Distribution,
    elite::filter_batch,
    env::Env,
    learning_module::CrossEntropyLearner,
    sampler::EpisodeSampler,
};
use candle_core::{Result, Tensor};
use tracing::info;

macro_rules! break_on_hook_res {
    ($hook_res:expr) => {
        if $hook_res {
            break;
        }
    };
}

/// When training stops: once the mean batch reward exceeds `solved_reward`, or after
/// `max_iterations` iterations if a cap is set. Without a cap a run that never solves the
/// environment does not terminate.
#[derive(Debug, Clone, Copy)]
pub struct LearningSchedule {
    pub solved_reward: f32,
    pub max_iterations: Option<usize>,
}

impl Default for LearningSchedule {
    fn default() -> Self {
        Self {
            solved_reward: 0.8,
            max_iterations: None,
        }
    }
}

impl LearningSchedule {
    pub fn reward_bound(solved_reward: f32) -> Self {
        Self {
            solved_reward,
            max_iterations: None,
        }
    }

    pub fn is_solved(&self, report: &IterationReport) -> bool {
        report.reward_mean > self.solved_reward
    }

    pub fn is_exhausted(&self, report: &IterationReport) -> bool {
        self.max_iterations
            .is_some_and(|max_iterations| report.iteration + 1 >= max_iterations)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    pub iteration: usize,
    pub loss: f32,
    pub reward_bound: f32,
    pub reward_mean: f32,
    pub elite_episodes: usize,
    pub elite_steps: usize,
}

pub trait CrossEntropyHooks {
    fn init_hook(&mut self) -> bool {
        false
    }

    /// Called after every gradient step. Returning `true` stops training.
    fn post_training_hook(&mut self, report: &IterationReport) -> Result<bool>;

    fn shutdown_hook(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DefaultCrossEntropyHooks {
    learning_schedule: LearningSchedule,
}

impl DefaultCrossEntropyHooks {
    pub fn new(learning_schedule: LearningSchedule) -> Self {
        Self { learning_schedule }
    }

    pub fn learning_schedule(&self) -> &LearningSchedule {
        &self.learning_schedule
    }
}

impl CrossEntropyHooks for DefaultCrossEntropyHooks {
    fn post_training_hook(&mut self, report: &IterationReport) -> Result<bool> {
        info!(
            "{}: loss={:.3}, reward_mean={:.1}, reward_bound={:.1}",
            report.iteration, report.loss, report.reward_mean, report.reward_bound
        );
        if self.learning_schedule.is_solved(report) {
            info!(iteration = report.iteration, "Solved!");
            return Ok(true);
        }
        Ok(self.learning_schedule.is_exhausted(report))
    }
}

pub struct CrossEntropyMethod<E, D, H>
where
    E: Env<Observation = Tensor, Action = usize>,
    D: Distribution,
    H: CrossEntropyHooks,
{
    pub sampler: EpisodeSampler<E>,
    pub learner: CrossEntropyLearner<D>,
    pub hooks: H,
    pub percentile: f32,
}

impl<E, D, H> CrossEntropyMethod<E, D, H>
where
    E: Env<Observation = Tensor, Action = usize>,
    D: Distribution,
    H: CrossEntropyHooks,
{
    /// Samples one batch, keeps its elite episodes and takes a single gradient step on them.
    pub fn train_iteration(&mut self, iteration: usize) -> Result<IterationReport> {
        let batch = self.sampler.collect_batch(self.learner.distribution())?;
        let elite = filter_batch(&batch, self.percentile)?;
        let loss = self.learner.update(&elite)?;
        Ok(IterationReport {
            iteration,
            loss,
            reward_bound: elite.reward_bound,
            reward_mean: elite.reward_mean,
            elite_episodes: elite.elite_episodes,
            elite_steps: elite.len(),
        })
    }
}

impl<E, D, H> Algorithm for CrossEntropyMethod<E, D, H>
where
    E: Env<Observation = Tensor, Action = usize>,
    D: Distribution,
    H: CrossEntropyHooks,
{
    fn train(&mut self) -> Result<()> {
        if self.hooks.init_hook() {
            return Ok(());
        }
        let mut iteration = 0;
        loop {
            let report = self.train_iteration(iteration)?;
            break_on_hook_res!(self.hooks.post_training_hook(&report)?);
            iteration += 1;
        }
        self.hooks.shutdown_hook()
    }
}
