use candle_core::{DType, Device, Result, bail};
use candle_nn::{VarBuilder, VarMap};
use cem_core::{
    distributions::categorical_distribution::CategoricalDistribution,
    env::{EnvironmentDescription, Space},
    learning_module::{CrossEntropyLearner, OptimizerWithMaxGrad},
};

pub struct LearningModuleBuilder {
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f64,
    pub max_grad_norm: Option<f32>,
}

impl Default for LearningModuleBuilder {
    fn default() -> Self {
        Self {
            hidden_layers: vec![128],
            learning_rate: 0.01,
            max_grad_norm: None,
        }
    }
}

impl LearningModuleBuilder {
    pub fn build(
        &self,
        env_description: &EnvironmentDescription,
        device: &Device,
    ) -> Result<CrossEntropyLearner<CategoricalDistribution>> {
        let Space::Discrete(action_size) = env_description.action_space else {
            bail!("the cross-entropy method needs a discrete action space");
        };
        if !(self.learning_rate > 0.) {
            bail!("learning rate must be positive, got {}", self.learning_rate);
        }
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let layers = &[&self.hidden_layers[..], &[action_size]].concat();
        let distribution = CategoricalDistribution::build(
            env_description.observation_size(),
            layers,
            &vb,
            "policy",
        )?;
        let optimizer_with_grad =
            OptimizerWithMaxGrad::adam(varmap, self.learning_rate, self.max_grad_norm)?;
        Ok(CrossEntropyLearner::new(distribution, optimizer_with_grad))
    }
}
