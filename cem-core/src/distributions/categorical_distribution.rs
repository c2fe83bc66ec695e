use super::Distribution;
use crate::{rng::RNG, utils::build_sequential::build_sequential};
use candle_core::{Error, Result, Tensor, bail};
use candle_nn::{Module, Sequential, VarBuilder, ops::softmax};
use rand::distr::Distribution as RandDistribution;
use rand::distr::weighted::WeightedIndex;
use std::fmt::Debug;

pub struct CategoricalDistribution {
    action_size: usize,
    logits: Sequential,
}

impl Debug for CategoricalDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoricalDistribution")
            .field("action_size", &self.action_size)
            .finish()
    }
}

impl CategoricalDistribution {
    pub fn new(action_size: usize, logits: Sequential) -> Self {
        Self {
            action_size,
            logits,
        }
    }

    /// `layers` lists the hidden sizes followed by the action size.
    pub fn build(
        input_dim: usize,
        layers: &[usize],
        vb: &VarBuilder,
        prefix: &str,
    ) -> Result<Self> {
        let (logits, action_size) = build_sequential(input_dim, layers, vb, prefix)?;
        Ok(Self {
            action_size,
            logits,
        })
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }
}

impl Distribution for CategoricalDistribution {
    fn logits(&self, observations: &Tensor) -> Result<Tensor> {
        self.logits.forward(observations)
    }

    fn action_probs(&self, observation: &Tensor) -> Result<Vec<f32>> {
        if observation.rank() != 1 {
            bail!(
                "observation should be a flattened tensor, got shape {:?}",
                observation.shape()
            );
        }
        let logits = self.logits(&observation.unsqueeze(0)?)?;
        softmax(&logits, 1)?.squeeze(0)?.to_vec1()
    }

    fn get_action(&self, observation: &Tensor) -> Result<usize> {
        let action_probs = self.action_probs(observation)?;
        let distribution = WeightedIndex::new(&action_probs).map_err(Error::wrap)?;
        Ok(RNG.with_borrow_mut(|rng| distribution.sample(rng)))
    }
}
