use candle_core::Tensor;
use derive_more::{Deref, DerefMut, Display};

/// Flattened observations of the elite episodes, `[steps, observation_size]`.
#[derive(Deref, DerefMut, Debug, Display)]
pub struct EliteObservations(pub Tensor);

/// Flattened actions of the elite episodes, `[steps]` of `u32`.
#[derive(Deref, DerefMut, Debug, Display)]
pub struct EliteActions(pub Tensor);

#[derive(Deref, DerefMut, Debug, Display)]
pub struct CrossEntropyLoss(pub Tensor);
