//! Plausibility checks applied to sensor readings before they are stored.
//!
//! Pure logic. Only heart rate and SpO2 are checked; temperature and step
//! count pass through untouched.

use std::fmt;

/// Heart rate must be strictly above this (bpm).
pub const HEART_RATE_MIN_EXCLUSIVE: f64 = 20.0;
/// Heart rate must be strictly below this (bpm).
pub const HEART_RATE_MAX_EXCLUSIVE: f64 = 220.0;
/// SpO2 must be strictly above this (percent).
pub const SPO2_MIN_EXCLUSIVE: f64 = 70.0;
/// SpO2 may equal but not exceed this (percent).
pub const SPO2_MAX_INCLUSIVE: f64 = 100.0;

/// Why a reading was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    HeartRateOutOfRange,
    Spo2OutOfRange,
}

impl Rejection {
    /// Stable identifier used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::HeartRateOutOfRange => "heart_rate_out_of_range",
            Rejection::Spo2OutOfRange => "spo2_out_of_range",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a reading, reporting the first failed bound.
///
/// NaN fails every comparison and is therefore rejected.
pub fn check(heart_rate: f64, spo2: f64) -> Result<(), Rejection> {
    if !(heart_rate > HEART_RATE_MIN_EXCLUSIVE && heart_rate < HEART_RATE_MAX_EXCLUSIVE) {
        return Err(Rejection::HeartRateOutOfRange);
    }
    if !(spo2 > SPO2_MIN_EXCLUSIVE && spo2 <= SPO2_MAX_INCLUSIVE) {
        return Err(Rejection::Spo2OutOfRange);
    }
    Ok(())
}

/// `true` iff `20 < heart_rate < 220` and `70 < spo2 <= 100`.
pub fn is_valid(heart_rate: f64, spo2: f64) -> bool {
    check(heart_rate, spo2).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typical_resting_reading_is_valid() {
        assert!(is_valid(72.0, 98.0));
    }

    #[test]
    fn heart_rate_lower_bound_is_exclusive() {
        assert!(!is_valid(20.0, 98.0));
        assert!(is_valid(20.0001, 98.0));
    }

    #[test]
    fn heart_rate_upper_bound_is_exclusive() {
        assert!(!is_valid(220.0, 98.0));
        assert!(is_valid(219.999, 98.0));
    }

    #[test]
    fn spo2_upper_bound_is_inclusive() {
        assert!(is_valid(72.0, 100.0));
        assert!(!is_valid(72.0, 100.0001));
    }

    #[test]
    fn spo2_lower_bound_is_exclusive() {
        assert!(!is_valid(72.0, 70.0));
        assert!(is_valid(72.0, 70.0001));
    }

    #[test]
    fn zeroes_from_missing_fields_are_rejected() {
        assert_eq!(check(0.0, 0.0), Err(Rejection::HeartRateOutOfRange));
        assert_eq!(check(72.0, 0.0), Err(Rejection::Spo2OutOfRange));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(!is_valid(f64::NAN, 98.0));
        assert!(!is_valid(72.0, f64::NAN));
        assert!(!is_valid(f64::INFINITY, 98.0));
        assert!(!is_valid(72.0, f64::NEG_INFINITY));
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(!is_valid(-72.0, 98.0));
        assert!(!is_valid(72.0, -98.0));
    }

    #[test]
    fn heart_rate_is_reported_before_spo2() {
        assert_eq!(check(5.0, 150.0), Err(Rejection::HeartRateOutOfRange));
    }

    #[test]
    fn validity_matches_ranges_over_a_grid() {
        for hr_tenths in 0..2500 {
            let hr = f64::from(hr_tenths) / 10.0;
            for spo2_tenths in (600..1100).step_by(7) {
                let spo2 = f64::from(spo2_tenths) / 10.0;
                let expected = hr > 20.0 && hr < 220.0 && spo2 > 70.0 && spo2 <= 100.0;
                assert_eq!(is_valid(hr, spo2), expected, "hr={hr} spo2={spo2}");
            }
        }
    }

    #[test]
    fn rejection_display_uses_stable_identifier() {
        assert_eq!(
            Rejection::Spo2OutOfRange.to_string(),
            "spo2_out_of_range"
        );
    }
}
