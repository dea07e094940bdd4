//! Time conversion helpers

/// Convert a chrono duration into fractional seconds.
///
/// Returns `None` when the duration cannot be represented in nanoseconds,
/// which for session-elapsed times would take centuries.
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration.num_nanoseconds().map(|ns| ns as f64 * 1e-9)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_duration_to_seconds() {
        let d = chrono::Duration::milliseconds(1500);
        assert_eq!(duration_to_seconds(d), Some(1.5));

        let d = chrono::Duration::zero();
        assert_eq!(duration_to_seconds(d), Some(0.0));
    }
}
