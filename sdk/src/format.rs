//! Human-friendly rendering of counters and durations.

const UNITS: [&str; 5] = ["", "K", "M", "B", "T"];

/// Formats a counter in compact notation with at most one fraction digit (`1234` → `1.2K`).
pub fn compact_number(value: u64) -> String {
    compact(value as f64)
}

/// Like [`compact_number`], for counters that arrive as (possibly missing) strings.
///
/// Anything that isn't a number renders as `0`.
pub fn compact_number_str(raw: Option<&str>) -> String {
    match raw.map(str::trim).and_then(|s| s.parse::<f64>().ok()) {
        Some(value) if value.is_finite() => compact(value),
        _ => "0".to_string(),
    }
}

fn compact(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    let mut unit = 0;
    let mut scaled = round_to_tenth(magnitude);
    // a value like 999_990 rounds up to 1000K, which should read as 1M
    while scaled >= 1000.0 && unit + 1 < UNITS.len() {
        unit += 1;
        scaled = round_to_tenth(magnitude / 1000f64.powi(unit as i32));
    }

    if scaled.fract() == 0.0 {
        format!("{sign}{scaled:.0}{}", UNITS[unit])
    } else {
        format!("{sign}{scaled:.1}{}", UNITS[unit])
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Formats a duration in seconds as `m:ss`.
pub fn format_duration(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => return "0:00".to_string(),
    };
    let minutes = (seconds / 60.0).floor() as u64;
    let rest = (seconds % 60.0).floor() as u64;
    format!("{minutes}:{rest:02}")
}
