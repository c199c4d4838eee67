use fixed::types::I32F32;

/// Q32.32 fixed-point seconds of logical game time.
///
/// All delays, timer deadlines and the combo window use this type so that
/// ordering and arithmetic are exact and identical on every platform.
pub type Seconds = I32F32;

/// Convert an f64 to Seconds. Use only for configuration and tests.
#[inline]
pub fn secs(v: f64) -> Seconds {
    Seconds::from_num(v)
}

/// Convert Seconds to f64. Use only for display.
#[inline]
pub fn secs_to_f64(v: Seconds) -> f64 {
    v.to_num::<f64>()
}

/// Saturating subtraction that never goes below zero.
#[inline]
pub fn saturating_elapsed(later: Seconds, earlier: Seconds) -> Seconds {
    if later > earlier {
        later - earlier
    } else {
        Seconds::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_basic_arithmetic() {
        let a = secs(0.5);
        let b = secs(0.1);
        let sum = a + b;
        assert!((secs_to_f64(sum) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn repeated_ticks_are_exact() {
        let step = secs(0.25);
        let mut total = Seconds::ZERO;
        for _ in 0..12 {
            total += step;
        }
        assert_eq!(total, secs(3.0));
    }

    #[test]
    fn elapsed_never_negative() {
        assert_eq!(saturating_elapsed(secs(1.0), secs(2.0)), Seconds::ZERO);
        assert_eq!(saturating_elapsed(secs(2.0), secs(1.0)), secs(1.0));
    }
}
