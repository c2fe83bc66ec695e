use candle_core::{Device, Result, Tensor};
use cem_core::{
    elite::filter_batch,
    env::one_hot::one_hot,
    episode::{Batch, Episode, EpisodeStep},
    rng::set_seed,
};

const OBSERVATION_SIZE: usize = 4;

// Episode `idx` has `idx + 1` steps, every one of them taking action `idx`.
fn synthetic_batch(rewards: &[f32]) -> Result<Batch> {
    let episodes = rewards
        .iter()
        .enumerate()
        .map(|(idx, reward)| {
            let steps = (0..=idx)
                .map(|step| {
                    let observation = one_hot(step % OBSERVATION_SIZE, OBSERVATION_SIZE)?;
                    Ok(EpisodeStep {
                        observation: Tensor::from_vec(observation, OBSERVATION_SIZE, &Device::Cpu)?,
                        action: idx,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Episode::new(*reward, steps))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Batch(episodes))
}

#[test]
fn keeps_only_rewarded_episodes_at_70th_percentile() -> Result<()> {
    set_seed(42);
    let batch = synthetic_batch(&[0., 0., 1., 1.])?;
    let elite = filter_batch(&batch, 70.)?;
    assert_eq!(elite.reward_bound, 1.);
    assert_eq!(elite.reward_mean, 0.5);
    assert_eq!(elite.elite_episodes, 2);
    let actions: Vec<u32> = elite.actions.to_vec1()?;
    assert_eq!(actions, vec![2, 2, 2, 3, 3, 3, 3]);
    assert_eq!(elite.observations.dims(), &[7, OBSERVATION_SIZE]);
    Ok(())
}

#[test]
fn preserves_step_order_within_episodes() -> Result<()> {
    let batch = synthetic_batch(&[0., 0., 0., 1.])?;
    let elite = filter_batch(&batch, 70.)?;
    let observations: Vec<Vec<f32>> = elite.observations.to_vec2()?;
    let hot_positions: Vec<usize> = observations
        .iter()
        .map(|row| row.iter().position(|v| *v == 1.).unwrap())
        .collect();
    assert_eq!(hot_positions, vec![0, 1, 2, 3]);
    Ok(())
}

#[test]
fn identical_rewards_keep_every_episode() -> Result<()> {
    let batch = synthetic_batch(&[0.; 5])?;
    let elite = filter_batch(&batch, 70.)?;
    assert_eq!(elite.reward_bound, 0.);
    assert_eq!(elite.elite_episodes, batch.len());
    assert_eq!(elite.len(), batch.total_steps());
    Ok(())
}

#[test]
fn never_returns_more_pairs_than_the_batch_holds() -> Result<()> {
    let rewards = [0.3, 0.9, 0.1, 0.5, 0.5, 0.7, 0.2, 1.0];
    let batch = synthetic_batch(&rewards)?;
    for percentile in [0., 10., 50., 70., 90., 100.] {
        let elite = filter_batch(&batch, percentile)?;
        assert!(elite.len() <= batch.total_steps());
        assert!(elite.elite_episodes >= 1);
        assert!(elite.elite_episodes <= batch.len());
    }
    Ok(())
}

#[test]
fn empty_batch_is_an_error() {
    assert!(filter_batch(&Batch::default(), 70.).is_err());
}
