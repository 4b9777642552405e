use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Reading time as `"42 min"` or `"2 h 05 min"`.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes} min");
    }
    format!("{} h {:02} min", minutes / 60, minutes % 60)
}

/// Whole-number percentage label, rounded half away from zero.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{:.0}%", clamp_percent(value).round())
}

/// Percentage label with one decimal.
#[must_use]
pub fn format_percent_precise(value: f64) -> String {
    format!("{:.1}%", (clamp_percent(value) * 10.0).round() / 10.0)
}

/// CSS width value for a progress fill.
#[must_use]
pub fn fill_width(value: f64) -> String {
    format!("{:.1}%", clamp_percent(value))
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}
