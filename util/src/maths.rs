//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Limit a value to the given range.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
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

/// Zero a value which lies within the given half-width of zero.
///
/// Used to suppress stick drift and control noise around the neutral
/// position. Values on the boundary are treated as inside the deadzone.
pub fn apply_deadzone<T>(value: T, half_width: T) -> T
where
    T: Float,
{
    if value.abs() <= half_width {
        T::zero()
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        // Trigger normalisation case, [-1, 1] raw into [0, 100] rpm
        assert_eq!(lin_map((0f64, 1f64), (0f64, 100f64), 0.5), 50.0);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 1f64), -1.0), 0.0);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 1f64), 1.0), 1.0);

        // Inverted target range
        assert_eq!(lin_map((0f64, 1f64), (1f64, -1f64), 1.0), -1.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2f64, &0f64, &1f64), 1.0);
        assert_eq!(clamp(&-2f64, &0f64, &1f64), 0.0);
        assert_eq!(clamp(&0.5f64, &0f64, &1f64), 0.5);
    }

    #[test]
    fn test_apply_deadzone() {
        assert_eq!(apply_deadzone(0.05f64, 0.1), 0.0);
        assert_eq!(apply_deadzone(-0.1f64, 0.1), 0.0);
        assert_eq!(apply_deadzone(0.5f64, 0.1), 0.5);
        assert_eq!(apply_deadzone(-0.5f64, 0.1), -0.5);
    }
}
