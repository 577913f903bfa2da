//! Integration tests for ApiClient using wiremock.

use std::time::Duration;

use weather_core::{ApiClient, CancellationToken, SearchError, SearchRequest, WeatherSource};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn weather_body(name: &str) -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": name,
            "country": "Germany",
            "latitude": 52.52,
            "longitude": 13.41
        },
        "current": {
            "temperature": 14.2,
            "condition": "Partly cloudy",
            "weather_code": 2,
            "wind_speed": 11.5,
            "wind_direction": 240,
            "time": "2026-10-19T12:00"
        },
        "forecast": [
            {
                "date": "2026-10-19",
                "max_temp": 16.0,
                "min_temp": 8.5,
                "condition": "Slight rain",
                "weather_code": 61,
                "precipitation": 2.4
            },
            {
                "date": "2026-10-20",
                "max_temp": 15.1,
                "min_temp": 7.9,
                "condition": "Overcast",
                "weather_code": 3,
                "precipitation": 0.0
            }
        ]
    })
}

#[tokio::test]
async fn test_city_lookup_requests_encoded_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/weather/city/Berlin"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Berlin")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri());
    let request = SearchRequest::city(" Berlin ").unwrap();

    let weather = client.fetch_weather(&request, None).await.unwrap();

    assert_eq!(weather.location.name, "Berlin");
    assert_eq!(weather.forecast.len(), 2);
    assert_eq!(weather.forecast[0].weather_code, 61);
    assert_eq!(client.live_timers(), 0);
}

#[tokio::test]
async fn test_city_with_spaces_is_percent_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/weather/city/New%20York"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("New York")))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri());
    let request = SearchRequest::city("New York").unwrap();

    let weather = client.fetch_weather(&request, None).await.unwrap();
    assert_eq!(weather.location.name, "New York");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/api/v1/weather/city/New%20York");
}

#[tokio::test]
async fn test_coordinate_lookup_uses_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/weather/coordinates"))
        .and(query_param("lat", "52.52"))
        .and(query_param("lon", "13.41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("52.52, 13.41")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri());
    let request = SearchRequest::coordinates(52.52, 13.41).unwrap();

    let weather = client.fetch_weather(&request, None).await.unwrap();
    assert_eq!(weather.location.latitude, 52.52);
}

#[tokio::test]
async fn test_out_of_range_coordinates_never_reach_the_server() {
    let mock_server = MockServer::start().await;

    let result = SearchRequest::coordinates(95.0, 0.0);
    assert_eq!(result, Err(SearchError::LatitudeOutOfRange(95.0)));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_structured_error_body_is_normalized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/weather/city/Nowhere"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": "CITY_NOT_FOUND", "message": "no such city", "status": 404}
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri());
    let request = SearchRequest::city("Nowhere").unwrap();

    let err = client.fetch_weather(&request, None).await.unwrap_err();

    assert_eq!(err.code(), "CITY_NOT_FOUND");
    assert_eq!(err.message(), "no such city");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_error_body_without_status_uses_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": {"code": "MAINTENANCE", "message": "back soon"}
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri());
    let err = client.fetch_health(None).await.unwrap_err();

    assert_eq!(err.code(), "MAINTENANCE");
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_undecodable_error_body_synthesizes_http_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri());
    let err = client.fetch_health(None).await.unwrap_err();

    assert_eq!(err.code(), "HTTP_500");
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "Unexpected error occurred");
}

#[tokio::test]
async fn test_malformed_success_body_fails_closed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/weather/city/Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location": {"name": "Berlin"}
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri());
    let request = SearchRequest::city("Berlin").unwrap();

    let err = client.fetch_weather(&request, None).await.unwrap_err();

    assert_eq!(err.code(), "NETWORK_ERROR");
    assert_eq!(err.status(), None);
    assert!(!err.message().is_empty());
}

#[tokio::test]
async fn test_slow_response_times_out_and_releases_timer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(serde_json::json!({
                    "status": "healthy",
                    "service": "weather-api",
                    "version": "1.0.0",
                    "timestamp": "2026-10-19T00:00:00Z"
                })),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::with_timeout(mock_server.uri(), Duration::from_millis(200));

    let started = std::time::Instant::now();
    let err = client.fetch_health(None).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(err.is_timeout());
    assert_eq!(err.status(), Some(408));
    assert_eq!(err.message(), "Request timed out");
    assert_eq!(client.live_timers(), 0);
}

#[tokio::test]
async fn test_server_408_is_an_http_error_not_a_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(408))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri());
    let err = client.fetch_health(None).await.unwrap_err();

    assert!(!err.is_timeout());
    assert_eq!(err.code(), "HTTP_408");
    assert_eq!(err.status(), Some(408));
    assert_eq!(err.message(), "Unexpected error occurred");
}

#[tokio::test]
async fn test_external_cancellation_aborts_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/weather/city/Berlin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(weather_body("Berlin")),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri());
    let request = SearchRequest::city("Berlin").unwrap();
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let err = client.fetch_weather(&request, Some(&cancel)).await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(client.live_timers(), 0);
}

#[tokio::test]
async fn test_health_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy",
            "service": "weather-api",
            "version": "1.0.0",
            "timestamp": "2026-10-19T00:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(format!("{}/", mock_server.uri()));
    let health = client.fetch_health(None).await.unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "weather-api");
}
