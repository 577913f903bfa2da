use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SearchError;

pub const WEATHER_CITY_PATH: &str = "/api/v1/weather/city";
pub const WEATHER_COORDINATES_PATH: &str = "/api/v1/weather/coordinates";
pub const HEALTH_PATH: &str = "/api/v1/health";

/// Characters a URI component keeps unescaped besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A validated city lookup. The name is stored trimmed and is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityQuery {
    city: String,
}

impl CityQuery {
    pub fn name(&self) -> &str {
        &self.city
    }
}

/// A validated coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// One weather lookup, either by city name or by coordinates.
///
/// Only the validating constructors (and deserialization, which runs the
/// same checks) produce a value, so an out-of-range pair never reaches
/// the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", try_from = "RawSearchRequest")]
pub enum SearchRequest {
    City(CityQuery),
    Coordinates(Coordinates),
}

impl SearchRequest {
    pub fn city(name: &str) -> Result<Self, SearchError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SearchError::EmptyCity);
        }

        Ok(Self::City(CityQuery { city: trimmed.to_string() }))
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, SearchError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(SearchError::NotANumber);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SearchError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(SearchError::LongitudeOutOfRange(longitude));
        }

        Ok(Self::Coordinates(Coordinates { latitude, longitude }))
    }

    /// Request path (and query) for this lookup, relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            SearchRequest::City(query) => {
                format!(
                    "{WEATHER_CITY_PATH}/{}",
                    utf8_percent_encode(query.name(), URI_COMPONENT)
                )
            }
            SearchRequest::Coordinates(coords) => format!(
                "{WEATHER_COORDINATES_PATH}?lat={}&lon={}",
                coords.latitude, coords.longitude
            ),
        }
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchRequest::City(query) => f.write_str(query.name()),
            SearchRequest::Coordinates(coords) => {
                write!(f, "{:.2}, {:.2}", coords.latitude, coords.longitude)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawSearchRequest {
    City { city: String },
    Coordinates { latitude: f64, longitude: f64 },
}

impl TryFrom<RawSearchRequest> for SearchRequest {
    type Error = SearchError;

    fn try_from(raw: RawSearchRequest) -> Result<Self, Self::Error> {
        match raw {
            RawSearchRequest::City { city } => SearchRequest::city(&city),
            RawSearchRequest::Coordinates { latitude, longitude } => {
                SearchRequest::coordinates(latitude, longitude)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub condition: String,
    pub weather_code: i32,
    pub wind_speed: f64,
    pub wind_direction: i32,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub condition: String,
    pub weather_code: i32,
    pub precipitation: f64,
}

/// Weather for one location: current conditions plus the daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub location: Location,
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
}

/// Payload of `GET /api/v1/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

/// A past search and when it was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearchEntry {
    pub params: SearchRequest,
    pub timestamp: DateTime<Utc>,
}
