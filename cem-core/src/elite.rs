use crate::{
    episode::Batch,
    tensors::{EliteActions, EliteObservations},
    utils::percentile::{mean, percentile},
};
use candle_core::{Result, Tensor, bail};

/// Training pairs taken from the best episodes of a batch.
#[derive(Debug)]
pub struct EliteBatch {
    pub observations: EliteObservations,
    pub actions: EliteActions,
    pub reward_bound: f32,
    pub reward_mean: f32,
    pub elite_episodes: usize,
}

impl EliteBatch {
    pub fn len(&self) -> usize {
        self.actions.dims().first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps the episodes whose reward reaches the `percentile`-th percentile of the batch rewards
/// and flattens their steps, in episode order, into training tensors.
pub fn filter_batch(batch: &Batch, percentile_threshold: f32) -> Result<EliteBatch> {
    if batch.is_empty() {
        bail!("cannot filter an empty batch");
    }
    let rewards = batch.rewards();
    let reward_bound = percentile(&rewards, percentile_threshold)?;
    let reward_mean = mean(&rewards);

    let elite: Vec<_> = batch
        .iter()
        .filter(|episode| episode.reward >= reward_bound)
        .collect();
    let (observations, actions): (Vec<&Tensor>, Vec<u32>) = elite
        .iter()
        .flat_map(|episode| episode.steps.iter())
        .map(|step| (&step.observation, step.action as u32))
        .unzip();
    let observations = Tensor::stack(&observations, 0)?;
    let steps = actions.len();
    let actions = Tensor::from_vec(actions, steps, observations.device())?;
    Ok(EliteBatch {
        observations: EliteObservations(observations),
        actions: EliteActions(actions),
        reward_bound,
        reward_mean,
        elite_episodes: elite.len(),
    })
}
