//! Calorie ledger — applies classifier detections to the running daily total.

use chrono::{DateTime, Utc};

use crate::profile::Profile;

/// Apply a detection to the profile's daily ledger.
///
/// Non-positive detections (non-food or null classification) leave the
/// record untouched, including `last_active_at`. Positive detections add to
/// the running total with no upper clamp. Returns whether a mutation
/// happened, so the caller knows if a save is due.
pub fn apply_detection(profile: &mut Profile, calories_detected: i32, now: DateTime<Utc>) -> bool {
    if calories_detected <= 0 {
        return false;
    }
    profile.calories_consumed_today += calories_detected;
    profile.last_active_at = now;
    true
}

/// Display-only progress toward the daily target, capped at 100.
///
/// Never fed back into the stored ledger value.
pub fn progress_percent(consumed: i32, target: i32) -> u32 {
    if target <= 0 {
        return 0;
    }
    let pct = (100.0 * f64::from(consumed) / f64::from(target)).round() as u32;
    pct.min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile() -> Profile {
        Profile::seed("628123", "Ayu", Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap())
    }

    #[test]
    fn zero_detection_is_a_noop() {
        let mut p = profile();
        let before = p.last_active_at;
        assert!(!apply_detection(&mut p, 0, Utc::now()));
        assert_eq!(p.calories_consumed_today, 0);
        assert_eq!(p.last_active_at, before);
    }

    #[test]
    fn negative_detection_is_a_noop() {
        let mut p = profile();
        let before = p.last_active_at;
        assert!(!apply_detection(&mut p, -5, Utc::now()));
        assert_eq!(p.calories_consumed_today, 0);
        assert_eq!(p.last_active_at, before);
    }

    #[test]
    fn sequential_detections_accumulate() {
        let mut p = profile();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        for cal in [300, 450, 120] {
            assert!(apply_detection(&mut p, cal, now));
        }
        assert_eq!(p.calories_consumed_today, 870);
        assert_eq!(p.last_active_at, now);
    }

    #[test]
    fn progress_caps_at_100() {
        assert_eq!(progress_percent(0, 2000), 0);
        assert_eq!(progress_percent(500, 2000), 25);
        assert_eq!(progress_percent(870, 1968), 44);
        assert_eq!(progress_percent(2500, 2000), 100);
        assert_eq!(progress_percent(100, 0), 0);
    }
}
