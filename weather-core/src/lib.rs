//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - The API client: timeout-bounded JSON requests with normalized errors
//! - The weather query facade (city and coordinate lookups)
//! - The health heartbeat poller
//! - The persisted recent-search store
//! - Configuration and shared domain models
//!
//! It is used by `weather-dashboard`, but can also be reused by other binaries or services.

pub mod client;
pub mod conditions;
pub mod config;
pub mod error;
pub mod heartbeat;
pub mod model;
pub mod recent;
pub mod search;

pub use client::{ApiClient, HealthProbe, WeatherSource};
pub use config::Config;
pub use error::{ApiError, ErrorDetail, ErrorResponse, SearchError};
pub use heartbeat::{Heartbeat, HeartbeatHandle, HealthState, HealthStatus};
pub use model::{
    CurrentWeather, ForecastDay, HealthResponse, Location, RecentSearchEntry, SearchRequest,
    WeatherResponse,
};
pub use recent::{FileStorage, MemoryStorage, RecentSearchStore, Storage};
pub use search::{SearchStatus, WeatherSearch};
pub use tokio_util::sync::CancellationToken;
