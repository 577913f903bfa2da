//! Plain-text rendering of dashboard panels.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use std::fmt::Write;
use weather_core::{
    HealthState, HealthStatus, Location, RecentSearchEntry, SearchStatus, WeatherResponse,
    WeatherSearch, conditions::{ConditionIcon, describe_code},
};

pub fn format_temperature(value: f64) -> String {
    format!("{value:.1}°C")
}

/// `2026-10-19` → `Mon, Oct 19`. Unparseable input is returned as is.
pub fn format_date(value: &str) -> String {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.format("%a, %b %-d").to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// Hours and minutes of an API timestamp (`2026-10-19T12:00` or RFC 3339).
pub fn format_time(value: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format("%H:%M").to_string();
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| value.to_string())
}

pub fn health_badge(state: &HealthState) -> String {
    let label = match state.status {
        HealthStatus::Healthy => "● Healthy",
        HealthStatus::Degraded => "● Degraded",
        HealthStatus::Unknown => "● Checking…",
    };

    let mut out = label.to_string();
    if let Some(checked) = state.last_checked {
        let local: DateTime<Local> = checked.into();
        let _ = write!(out, " (checked {})", local.format("%H:%M:%S"));
    }
    if let Some(details) = &state.details {
        let _ = write!(out, " · {} v{}", details.service, details.version);
    }
    out
}

pub fn status_banner(search: &WeatherSearch) -> Option<String> {
    let message = search.status_message()?;
    let prefix = match search.status() {
        SearchStatus::Error => {
            let code = search.error().map(|err| err.code()).unwrap_or("ERROR");
            format!("[error {code}]")
        }
        SearchStatus::Pending => "[…]".to_string(),
        SearchStatus::Success => "[ok]".to_string(),
        SearchStatus::Idle => return None,
    };
    Some(format!("{prefix} {message}"))
}

/// Coordinate lookups can come back without a place name or country.
fn location_heading(location: &Location) -> String {
    let name = location.name.trim();
    let country = location.country.trim();

    let label = if name.is_empty() {
        format!(
            "Selected location ({:.2}, {:.2})",
            location.latitude, location.longitude
        )
    } else {
        name.to_string()
    };

    if country.is_empty() {
        label
    } else {
        format!("{label}, {country}")
    }
}

pub fn current_card(weather: &WeatherResponse) -> String {
    let location = &weather.location;
    let current = &weather.current;
    let icon = ConditionIcon::from_code(current.weather_code);

    let mut out = String::new();
    let _ = writeln!(out, "{}", location_heading(location));
    let _ = writeln!(
        out,
        "  {} {}  {}",
        icon.glyph(),
        format_temperature(current.temperature),
        if current.condition.is_empty() {
            describe_code(current.weather_code)
        } else {
            current.condition.as_str()
        }
    );
    let _ = writeln!(
        out,
        "  Wind {:.1} km/h from {}°",
        current.wind_speed, current.wind_direction
    );
    let _ = write!(out, "  Observed at {}", format_time(&current.time));
    out
}

pub fn forecast_grid(weather: &WeatherResponse) -> String {
    let mut out = String::from("Forecast:");
    if weather.forecast.is_empty() {
        out.push_str("\n  (no forecast data)");
        return out;
    }

    for day in &weather.forecast {
        let icon = ConditionIcon::from_code(day.weather_code);
        let _ = write!(
            out,
            "\n  {:<12} {} {:>8} / {:<8} {:>5.1} mm  {}",
            format_date(&day.date),
            icon.glyph(),
            format_temperature(day.max_temp),
            format_temperature(day.min_temp),
            day.precipitation,
            icon.label(),
        );
    }
    out
}

pub fn map_link(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={latitude:.4}&mlon={longitude:.4}#map=10/{latitude:.4}/{longitude:.4}"
    )
}

pub fn recent_list(entries: &[RecentSearchEntry]) -> String {
    if entries.is_empty() {
        return "No recent searches yet.".to_string();
    }

    let mut out = String::from("Recent searches:");
    for (i, entry) in entries.iter().enumerate() {
        let _ = write!(out, "\n  {}. {}  ({})", i + 1, entry.params, relative_age(entry.timestamp));
    }
    out
}

fn relative_age(at: DateTime<Utc>) -> String {
    let secs = (Utc::now() - at).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{} min ago", secs / 60),
        3600..=86399 => format!("{} h ago", secs / 3600),
        _ => at.format("%Y-%m-%d").to_string(),
    }
}
