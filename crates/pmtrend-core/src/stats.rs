use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub count: usize,
    pub mean: f64,
    pub five_number: FiveNumber,
    pub negative: usize,
}

impl Description {
    pub fn negative_rate(&self) -> f64 {
        self.negative as f64 / self.count as f64
    }
}

/// Linear interpolation between order statistics (`h = (n - 1) * p`), the default
/// quantile definition of most statistics packages. `sorted` must be ascending.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Summary of present values; `None` when there are none.
pub fn describe(values: &[f64]) -> Option<Description> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let negative = sorted.iter().filter(|value| **value < 0.0).count();

    Some(Description {
        count,
        mean,
        five_number: FiveNumber {
            min: sorted[0],
            q1: quantile(&sorted, 0.25)?,
            median: quantile(&sorted, 0.5)?,
            q3: quantile(&sorted, 0.75)?,
            max: sorted[count - 1],
        },
        negative,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_between_order_statistics() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.75), Some(3.25));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&sorted, 1.5), None);
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn describe_keeps_negative_values() {
        let description = describe(&[3.0, -1.0, 2.0]).expect("non-empty");
        assert_eq!(description.count, 3);
        assert_eq!(description.negative, 1);
        assert!((description.mean - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(description.five_number.min, -1.0);
        assert_eq!(description.five_number.median, 2.0);
        assert_eq!(description.five_number.max, 3.0);
        assert!((description.negative_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn describe_of_nothing_is_undefined() {
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn single_value_collapses_five_numbers() {
        let five = describe(&[7.5]).unwrap().five_number;
        assert_eq!(
            five,
            FiveNumber {
                min: 7.5,
                q1: 7.5,
                median: 7.5,
                q3: 7.5,
                max: 7.5
            }
        );
    }
}
