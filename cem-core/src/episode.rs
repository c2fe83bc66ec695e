use candle_core::Tensor;
use derive_more::{Deref, IntoIterator};

#[derive(Debug, Clone)]
pub struct EpisodeStep {
    pub observation: Tensor,
    pub action: usize,
}

/// One full run of an environment, from reset to termination or truncation.
#[derive(Debug, Clone)]
pub struct Episode {
    pub reward: f32,
    pub steps: Vec<EpisodeStep>,
}

impl Episode {
    pub fn new(reward: f32, steps: Vec<EpisodeStep>) -> Self {
        Self { reward, steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Deref, IntoIterator, Debug, Clone, Default)]
pub struct Batch(#[into_iterator(owned, ref)] pub Vec<Episode>);

impl Batch {
    pub fn rewards(&self) -> Vec<f32> {
        self.iter().map(|episode| episode.reward).collect()
    }

    pub fn total_steps(&self) -> usize {
        self.iter().map(Episode::len).sum()
    }
}
