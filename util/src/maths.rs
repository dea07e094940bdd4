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

/// Clamp a value into the range [min, max].
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::AddAssign
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

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&150.0f64, &0.0, &100.0), 100.0);
        assert_eq!(clamp(&-3.0f64, &0.0, &100.0), 0.0);
        assert_eq!(clamp(&42.0f64, &0.0, &100.0), 42.0);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0f64, 1.0), (0.0, 100.0), 0.5), 50.0);
        assert_eq!(lin_map((0.0f64, 10.0), (10.0, 0.0), 2.5), 7.5);
    }
}
