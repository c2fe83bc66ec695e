use candle_core::{Result, bail};

/// The `q`-th percentile of `values`, interpolating linearly between the two closest ranks.
pub fn percentile(values: &[f32], q: f32) -> Result<f32> {
    if values.is_empty() {
        bail!("cannot take the percentile of an empty set of values");
    }
    if !(0.0..=100.0).contains(&q) {
        bail!("percentile must be within [0, 100], got {q}");
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let rank = q as f64 / 100. * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    let (lower, upper) = (sorted[lower] as f64, sorted[upper] as f64);
    Ok((lower + (upper - lower) * fraction) as f32)
}

pub fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::percentile;

    #[test]
    fn interpolates_between_ranks() {
        let values = [0., 0., 1., 1.];
        assert_eq!(percentile(&values, 70.).unwrap(), 1.);
        assert_eq!(percentile(&values, 50.).unwrap(), 0.5);
        assert_eq!(percentile(&values, 0.).unwrap(), 0.);
        assert_eq!(percentile(&values, 100.).unwrap(), 1.);
    }

    #[test]
    fn ignores_input_order() {
        let values = [4., 1., 3., 2., 5.];
        assert_eq!(percentile(&values, 25.).unwrap(), 2.);
        assert!((percentile(&values, 70.).unwrap() - 3.8).abs() < 1e-6);
    }

    #[test]
    fn identical_values_give_that_value() {
        let values = [0.25; 7];
        for q in [0., 30., 70., 99.9, 100.] {
            assert_eq!(percentile(&values, q).unwrap(), 0.25);
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(percentile(&[], 50.).is_err());
        assert!(percentile(&[1.], 100.5).is_err());
        assert!(percentile(&[1.], -1.).is_err());
    }
}
