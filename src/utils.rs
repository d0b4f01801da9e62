/// Utility helpers for PocketWave

/// Format a playback offset as `m:ss`. Unknown or negative values read `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Percentage of `value` within `total`, clamped to `0..=100`.
pub fn percent_of(value: f64, total: f64) -> f64 {
    if !value.is_finite() || !total.is_finite() || total <= 0.0 {
        return 0.0;
    }
    (value / total * 100.0).clamp(0.0, 100.0)
}
