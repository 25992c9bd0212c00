pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Mean of consecutive differences, `None` below two values.
    pub fn mean_step(values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }
        let steps: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        Self::mean(&steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_sequence_is_none() {
        assert_eq!(StatsHelper::mean(&[]), None);
        assert_eq!(StatsHelper::mean(&[-70.0, -90.0]), Some(-80.0));
    }

    #[test]
    fn mean_step_needs_two_values() {
        assert_eq!(StatsHelper::mean_step(&[4.0]), None);
        assert_eq!(StatsHelper::mean_step(&[1.0, 2.0, 4.0]), Some(1.5));
    }
}
