//! Time and progress formatting for display

/// Format whole seconds as `M:SS`
///
/// Minutes are not padded, seconds always have two digits:
/// `0` → `0:00`, `65` → `1:05`, `3600` → `60:00`.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Format a fractional elapsed position, truncating to whole seconds
pub fn format_elapsed(seconds: f64) -> String {
    if seconds.is_finite() && seconds > 0.0 {
        format_time(seconds.floor() as u64)
    } else {
        format_time(0)
    }
}

/// Parse `M:SS` (or plain seconds) back into whole seconds
pub fn parse_time(input: &str) -> Option<u64> {
    let input = input.trim();
    match input.split_once(':') {
        Some((minutes, seconds)) => {
            if seconds.len() != 2 {
                return None;
            }
            let minutes: u64 = minutes.parse().ok()?;
            let seconds: u64 = seconds.parse().ok()?;
            if seconds >= 60 {
                return None;
            }
            minutes.checked_mul(60)?.checked_add(seconds)
        }
        None => input.parse().ok(),
    }
}

/// Progress as a percentage of the track duration
///
/// Returns 0 when the duration is unknown or zero.
pub fn progress_percent(elapsed: f64, duration_secs: Option<u32>) -> f64 {
    match duration_secs {
        Some(duration) if duration > 0 => (elapsed / f64::from(duration) * 100.0).clamp(0.0, 100.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_seconds_only() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(5), "0:05");
        assert_eq!(format_time(65), "1:05");
        assert_eq!(format_time(599), "9:59");
        assert_eq!(format_time(3600), "60:00");
    }

    #[test]
    fn elapsed_truncates() {
        assert_eq!(format_elapsed(59.99), "0:59");
        assert_eq!(format_elapsed(-1.0), "0:00");
        assert_eq!(format_elapsed(f64::NAN), "0:00");
    }

    #[test]
    fn parse_accepts_both_forms() {
        assert_eq!(parse_time("1:05"), Some(65));
        assert_eq!(parse_time("90"), Some(90));
        assert_eq!(parse_time(" 2:00 "), Some(120));
        assert_eq!(parse_time("1:5"), None);
        assert_eq!(parse_time("1:75"), None);
        assert_eq!(parse_time("abc"), None);
    }

    #[test]
    fn progress_guards_division() {
        assert_eq!(progress_percent(10.0, None), 0.0);
        assert_eq!(progress_percent(10.0, Some(0)), 0.0);
        assert_eq!(progress_percent(50.0, Some(200)), 25.0);
        assert_eq!(progress_percent(200.0, Some(200)), 100.0);
    }
}
