//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Limit a value to the inclusive range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: PartialOrd + Copy
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Arithmetic mean of the given values, or `None` if there are none.
///
/// The mean is updated incrementally, so a set of identical values has
/// exactly that value as its mean.
pub fn mean<T, I>(values: I) -> Option<T>
where
    T: Float,
    I: IntoIterator<Item = T>
{
    let mut mean = T::zero();
    let mut count = 0usize;

    for v in values {
        count += 1;
        mean = mean + (v - mean) / T::from(count)?;
    }

    if count == 0 {
        None
    }
    else {
        Some(mean)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 180f64), (1000f64, 2000f64), 90f64), 1500f64);
        assert_eq!(lin_map((0f64, 95f64), (0f64, 255f64), 0f64), 0f64);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 10f64), 1f64), 10f64);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&5, &0, &3), 3);
        assert_eq!(clamp(&-5, &0, &3), 0);
        assert_eq!(clamp(&1.5f64, &0.0, &3.0), 1.5);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean(vec![-0.8f64, -0.8, -0.8]), Some(-0.8));
        assert_eq!(mean(vec![1f64, 2.0, 6.0]), Some(3.0));
        assert_eq!(mean(vec![0.1f64; 7]), Some(0.1));

        // Differing values agree with sum / n to within rounding
        let m = mean(vec![0.1f64, 0.2, 0.3]).unwrap();
        assert!((m - 0.6 / 3.0).abs() < 1e-15);
    }
}
