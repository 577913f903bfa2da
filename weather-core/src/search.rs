use std::sync::Arc;

use crate::{
    client::WeatherSource,
    error::ApiError,
    model::{SearchRequest, WeatherResponse},
    recent::RecentSearchStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// One search session: the latest result, the latest error, and the
/// recent-search history fed by successful lookups.
#[derive(Debug)]
pub struct WeatherSearch {
    source: Arc<dyn WeatherSource>,
    recent: Arc<RecentSearchStore>,
    status: SearchStatus,
    data: Option<WeatherResponse>,
    error: Option<ApiError>,
}

impl WeatherSearch {
    pub fn new(source: Arc<dyn WeatherSource>, recent: Arc<RecentSearchStore>) -> Self {
        Self {
            source,
            recent,
            status: SearchStatus::Idle,
            data: None,
            error: None,
        }
    }

    /// Run one lookup. Only successful lookups are added to the recent list.
    pub async fn search(&mut self, request: SearchRequest) -> Result<&WeatherResponse, &ApiError> {
        self.status = SearchStatus::Pending;
        self.error = None;
        tracing::info!(%request, "searching");

        match self.source.fetch_weather(&request, None).await {
            Ok(response) => {
                self.recent.add(request);
                self.status = SearchStatus::Success;
                Ok(self.data.insert(response))
            }
            Err(err) => {
                self.status = SearchStatus::Error;
                Err(self.error.insert(err))
            }
        }
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Result of the most recent successful lookup.
    pub fn data(&self) -> Option<&WeatherResponse> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn recent(&self) -> &RecentSearchStore {
        &self.recent
    }

    /// Banner text for the current status.
    pub fn status_message(&self) -> Option<String> {
        match self.status {
            SearchStatus::Idle => None,
            SearchStatus::Pending => Some("Fetching forecast…".to_string()),
            SearchStatus::Error => Some(
                self.error
                    .as_ref()
                    .map(|err| err.message().to_string())
                    .unwrap_or_else(|| "Unable to fetch forecast".to_string()),
            ),
            SearchStatus::Success => Some("Forecast updated".to_string()),
        }
    }
}
