//! WMO weather interpretation codes as reported by the API.
//! See: https://open-meteo.com/en/docs#weathervariables

/// Icon category shown next to a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionIcon {
    Clear,
    Cloudy,
    Rain,
    Storm,
    Snow,
}

impl ConditionIcon {
    /// Unknown codes fall back to `Cloudy`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 | 3 | 45 | 48 => Self::Cloudy,
            51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 80 | 81 | 82 => Self::Rain,
            95 | 96 | 99 => Self::Storm,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            _ => Self::Cloudy,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear skies",
            Self::Cloudy => "Cloudy",
            Self::Rain => "Rain",
            Self::Storm => "Storm",
            Self::Snow => "Snow",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Clear => "☀",
            Self::Cloudy => "☁",
            Self::Rain => "☂",
            Self::Storm => "⚡",
            Self::Snow => "❄",
        }
    }
}

pub fn describe_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}
