// Tests for UpstreamClient against a mocked upstream API
// Uses mockito for HTTP mocking

mod common;

use mockito::{Matcher, Server};
use std::time::Duration;

use field_weather_service::fetch_error::FetchError;
use field_weather_service::fetcher::UpstreamClient;

fn create_test_client(base_url: String) -> UpstreamClient {
    UpstreamClient::new(base_url, Duration::from_secs(5)).expect("client should build")
}

#[tokio::test]
async fn test_fetch_fields_weather_success() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/api/v1/fields_weather")
        .match_query(Matcher::UrlEncoded("season".into(), "2025".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(common::fields_weather_json().to_string())
        .create_async()
        .await;

    let client = create_test_client(server.url());
    let dataset = client.fetch_fields_weather(common::SEASON).await.unwrap();

    assert_eq!(dataset.len(), 3);
    let avangard = &dataset["Avangard"];
    assert_eq!(avangard.fields.len(), 2);
    assert_eq!(avangard.fields["101"].tillable_area, 100.0);
    assert_eq!(avangard.avg_weather_periods["Wheat"].len(), 3);
    assert_eq!(avangard.avg_weather_periods["Wheat"][1].weather.mean_temperature, None);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_fields_weather_tolerates_trailing_slash() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/api/v1/fields_weather")
        .match_query(Matcher::UrlEncoded("season".into(), "2024".into()))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = create_test_client(server.url() + "/");
    let dataset = client.fetch_fields_weather(2024).await.unwrap();
    assert!(dataset.is_empty());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_weather_stations_unwraps_data() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/api/v1/weather_stations")
        .match_query(Matcher::UrlEncoded("year".into(), "2025".into()))
        .with_status(200)
        .with_body(common::stations_json().to_string())
        .create_async()
        .await;

    let client = create_test_client(server.url());
    let stations = client.fetch_weather_stations(common::SEASON).await.unwrap();

    assert_eq!(stations.len(), 3);
    assert_eq!(stations[0].weather_historyable_id, 1);
    assert_eq!(stations[0].value["2025-05-01"].relative_humidity, Some(60.0));
    // Observation fields the merger does not use are carried along
    assert!(stations[0].value["2025-05-01"].other.contains_key("wind_speed"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_exceptions() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/api/v1/weather_exception")
        .with_status(200)
        .with_body(common::exceptions_json().to_string())
        .create_async()
        .await;

    let client = create_test_client(server.url());
    let exceptions = client.fetch_exceptions().await.unwrap();

    assert_eq!(exceptions.len(), 1);
    assert_eq!(exceptions[0].crop, "Barley");
    assert_eq!(exceptions[0].id, 5);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/api/v1/fields_weather")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let client = create_test_client(server.url());
    let result = client.fetch_fields_weather(common::SEASON).await;

    match result.unwrap_err() {
        FetchError::Status { status, url } => {
            assert_eq!(status, 500);
            assert!(url.contains("fields_weather"));
        }
        other => panic!("Expected Status error, got {other:?}"),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_maps_to_decode() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/api/v1/weather_stations")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{\"data\": [{\"id\": \"not a number\"}]}")
        .create_async()
        .await;

    let client = create_test_client(server.url());
    let result = client.fetch_weather_stations(common::SEASON).await;

    assert!(matches!(result, Err(FetchError::Decode(_))));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_exception_posts_crop() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/api/v1/weather_exception")
        .match_body(Matcher::Json(serde_json::json!({ "crop": "Sunflower" })))
        .with_status(201)
        .with_body(r#"{"crop": "Sunflower", "id": 9}"#)
        .create_async()
        .await;

    let client = create_test_client(server.url());
    let created = client.create_exception("Sunflower").await.unwrap();

    assert_eq!(created.crop, "Sunflower");
    assert_eq!(created.id, 9);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_exception_by_id() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("DELETE", "/api/v1/weather_exception/5")
        .with_status(204)
        .create_async()
        .await;

    let client = create_test_client(server.url());
    client.delete_exception(5).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_missing_exception_is_status_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("DELETE", "/api/v1/weather_exception/77")
        .with_status(404)
        .create_async()
        .await;

    let client = create_test_client(server.url());
    let result = client.delete_exception(77).await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));

    mock.assert_async().await;
}
