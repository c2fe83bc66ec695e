use super::{Env, EnvironmentDescription, SnapShot, Space};
use candle_core::{Device, Result, Tensor, bail};

/// Encodes a discrete state index as a vector with a single `1.0` at `index`.
pub fn one_hot(index: usize, size: usize) -> Result<Vec<f32>> {
    if index >= size {
        bail!("state index {index} is out of range for a space of size {size}");
    }
    let mut encoded = vec![0.0; size];
    encoded[index] = 1.0;
    Ok(encoded)
}

/// Wraps an environment with a discrete observation space so that it hands out one-hot encoded
/// observation tensors instead of raw state indices.
pub struct DiscreteOneHot<E: Env<Observation = usize>> {
    env: E,
    size: usize,
    device: Device,
}

impl<E: Env<Observation = usize>> DiscreteOneHot<E> {
    pub fn new(env: E, device: Device) -> Result<Self> {
        let Space::Discrete(size) = env.env_description().observation_space else {
            bail!("one-hot encoding requires a discrete observation space");
        };
        Ok(Self { env, size, device })
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn into_inner(self) -> E {
        self.env
    }

    fn encode(&self, state: usize) -> Result<Tensor> {
        let encoded = one_hot(state, self.size)?;
        Tensor::from_vec(encoded, self.size, &self.device)
    }
}

impl<E: Env<Observation = usize>> Env for DiscreteOneHot<E> {
    type Observation = Tensor;
    type Action = E::Action;

    fn reset(&mut self, seed: u64) -> Result<Tensor> {
        let state = self.env.reset(seed)?;
        self.encode(state)
    }

    fn step(&mut self, action: Self::Action) -> Result<SnapShot<Tensor>> {
        let snapshot = self.env.step(action)?;
        snapshot.map_state(|state| self.encode(state))
    }

    fn env_description(&self) -> EnvironmentDescription {
        let inner = self.env.env_description();
        EnvironmentDescription::new(
            Space::Continuous {
                low: 0.,
                high: 1.,
                size: self.size,
            },
            inner.action_space,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::one_hot;

    #[test]
    fn one_hot_sets_a_single_entry() {
        for index in 0..16 {
            let encoded = one_hot(index, 16).unwrap();
            assert_eq!(encoded.len(), 16);
            assert_eq!(encoded.iter().filter(|v| **v == 1.0).count(), 1);
            assert_eq!(encoded.iter().filter(|v| **v == 0.0).count(), 15);
            assert_eq!(encoded[index], 1.0);
        }
    }

    #[test]
    fn one_hot_rejects_out_of_range_index() {
        assert!(one_hot(4, 4).is_err());
    }
}
