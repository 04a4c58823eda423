use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::fetch_error::FetchError;
use crate::models::{
    CropException, FieldsWeatherResponse, WeatherStationRecord, WeatherStationsResponse,
};

#[derive(Serialize)]
struct NewException<'a> {
    crop: &'a str,
}

/// Client for the upstream agronomy API that owns the field, station and exception data
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Per-farm field weather for a season
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_fields_weather(&self, season: i32) -> Result<FieldsWeatherResponse, FetchError> {
        let url = format!("{}/api/v1/fields_weather?season={season}", self.base_url);
        let dataset: FieldsWeatherResponse = self.get_json(&url).await?;
        debug!("Fetched field weather for {} farms", dataset.len());
        Ok(dataset)
    }

    /// Daily station records for a year
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_weather_stations(&self, year: i32) -> Result<Vec<WeatherStationRecord>, FetchError> {
        let url = format!("{}/api/v1/weather_stations?year={year}", self.base_url);
        let response: WeatherStationsResponse = self.get_json(&url).await?;
        debug!("Fetched {} weather station records", response.data.len());
        Ok(response.data)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_exceptions(&self) -> Result<Vec<CropException>, FetchError> {
        let url = format!("{}/api/v1/weather_exception", self.base_url);
        let exceptions: Vec<CropException> = self.get_json(&url).await?;
        debug!("Fetched {} crop exceptions", exceptions.len());
        Ok(exceptions)
    }

    /// Exclude a crop; returns the record the upstream created
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn create_exception(&self, crop: &str) -> Result<CropException, FetchError> {
        let url = format!("{}/api/v1/weather_exception", self.base_url);
        debug!("Creating crop exception");
        let response = self
            .client
            .post(&url)
            .json(&NewException { crop })
            .send()
            .await?;
        let body = Self::success_body(response, &url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Re-include a crop by deleting the exception record that excludes it
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn delete_exception(&self, exception_id: i64) -> Result<(), FetchError> {
        let url = format!("{}/api/v1/weather_exception/{exception_id}", self.base_url);
        debug!("Deleting crop exception");
        let response = self.client.delete(&url).send().await?;
        Self::success_body(response, &url).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!("Sending HTTP request to {}", url);
        let response = self.client.get(url).send().await?;
        debug!("Received HTTP response with status: {}", response.status());

        let body = Self::success_body(response, url).await?;
        debug!("Retrieved body, size: {} bytes", body.len());

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to decode response from {}: {}", url, e);
            FetchError::Decode(e)
        })
    }

    async fn success_body(response: reqwest::Response, url: &str) -> Result<String, FetchError> {
        let status = response.status();
        if !status.is_success() {
            error!("Upstream request to {} failed with status {}", url, status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
