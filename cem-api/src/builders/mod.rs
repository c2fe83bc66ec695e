pub mod cross_entropy;
pub mod env;
pub mod learning_module;
