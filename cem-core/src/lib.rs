pub mod cross_entropy_method;
pub mod distributions;
pub mod elite;
pub mod env;
pub mod episode;
pub mod learning_module;
pub mod rng;
pub mod sampler;
pub mod tensors;
pub mod utils;

use candle_core::Result;

pub trait Algorithm {
    fn train(&mut self) -> Result<()>;
}
