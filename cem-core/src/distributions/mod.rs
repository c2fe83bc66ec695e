pub mod categorical_distribution;

use candle_core::{Result, Tensor};

pub trait Distribution {
    /// Unnormalized action scores for a batch of observations, `[N, action_size]`.
    fn logits(&self, observations: &Tensor) -> Result<Tensor>;

    /// Action probabilities for a single flattened observation.
    fn action_probs(&self, observation: &Tensor) -> Result<Vec<f32>>;

    /// Samples an action index for a single flattened observation.
    fn get_action(&self, observation: &Tensor) -> Result<usize>;
}
