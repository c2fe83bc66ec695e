use crate::{
    distributions::Distribution, elite::EliteBatch, tensors::CrossEntropyLoss,
    utils::clip_grad::clip_grad,
};
use candle_core::{Result, Tensor};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarMap, loss::cross_entropy};
use std::fmt::Debug;

pub struct OptimizerWithMaxGrad {
    pub optimizer: AdamW,
    pub max_grad_norm: Option<f32>,
    pub varmap: VarMap,
}

impl Debug for OptimizerWithMaxGrad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizerWithMaxGrad")
            .field("learning_rate", &self.optimizer.learning_rate())
            .field("max_grad_norm", &self.max_grad_norm)
            .finish()
    }
}

impl OptimizerWithMaxGrad {
    pub fn new(optimizer: AdamW, max_grad_norm: Option<f32>, varmap: VarMap) -> Self {
        Self {
            optimizer,
            max_grad_norm,
            varmap,
        }
    }

    /// Plain Adam: AdamW without weight decay.
    pub fn adam(varmap: VarMap, learning_rate: f64, max_grad_norm: Option<f32>) -> Result<Self> {
        let params = ParamsAdamW {
            lr: learning_rate,
            weight_decay: 0.,
            ..Default::default()
        };
        let optimizer = AdamW::new(varmap.all_vars(), params)?;
        Ok(Self::new(optimizer, max_grad_norm, varmap))
    }

    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        let grads = if let Some(max_norm) = self.max_grad_norm {
            clip_grad(loss, &self.varmap, max_norm)?
        } else {
            loss.backward()?
        };
        self.optimizer.step(&grads)
    }
}

/// Fits the policy to imitate the actions of the elite episodes.
#[derive(Debug)]
pub struct CrossEntropyLearner<D: Distribution> {
    distribution: D,
    optimizer_with_grad: OptimizerWithMaxGrad,
}

impl<D: Distribution> CrossEntropyLearner<D> {
    pub fn new(distribution: D, optimizer_with_grad: OptimizerWithMaxGrad) -> Self {
        Self {
            distribution,
            optimizer_with_grad,
        }
    }

    pub fn distribution(&self) -> &D {
        &self.distribution
    }

    pub fn loss(&self, elite: &EliteBatch) -> Result<CrossEntropyLoss> {
        let action_scores = self.distribution.logits(&elite.observations)?;
        let loss = cross_entropy(&action_scores, &elite.actions)?;
        Ok(CrossEntropyLoss(loss))
    }

    /// A single gradient step on the elite pairs. Returns the loss before the step.
    pub fn update(&mut self, elite: &EliteBatch) -> Result<f32> {
        let loss = self.loss(elite)?;
        self.optimizer_with_grad.backward_step(&loss)?;
        loss.to_scalar::<f32>()
    }
}
