use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Upstream `fields_weather` snapshot, keyed by farm name.
pub type FieldsWeatherResponse = BTreeMap<String, Farm>;

/// Numeric values the upstream may send as `null` or omit entirely; both count as zero.
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

// Upstream snapshot models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Norms {
    #[serde(default)]
    pub crop: String,
    #[serde(default)]
    pub days_in_period: i32,
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub min_temp: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub norm_mean_temp: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub norm_precipitation: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub norm_sum_eff_temp: f64,
    pub period_id: u32,
    #[serde(default)]
    pub period_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Weather {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub effective_temperature_base: f64,
    #[serde(default)]
    pub mean_temperature: Option<f64>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub sum_effective_temperature: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub sum_precipitation: f64,
}

/// One agronomic development stage: target values (`norms`) next to what was observed.
///
/// Field-level periods carry their calendar bounds; pre-aggregated farm and crop
/// averages leave them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherPeriod {
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_end: Option<String>,
    pub norms: Norms,
    pub period_id: u32,
    pub weather: Weather,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub field_shape_id: i64,
    #[serde(default)]
    pub name: String,
    pub crop_name: String,
    #[serde(default)]
    pub sowing_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub tillable_area: f64,
    #[serde(default)]
    pub weather_periods: Vec<WeatherPeriod>,
    pub weather_station_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    #[serde(default)]
    pub avg_weather_periods: BTreeMap<String, Vec<WeatherPeriod>>,
    #[serde(default)]
    pub fields: BTreeMap<String, Field>,
}

/// Daily bundle from a weather station; only humidity is read; everything else is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    #[serde(default)]
    pub relative_humidity: Option<f64>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStationRecord {
    pub id: i64,
    pub weather_historyable_id: i64,
    #[serde(default)]
    pub weather_historyable_type: Option<String>,
    pub year: i32,
    #[serde(default)]
    pub value: BTreeMap<String, DailyObservation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherStationsResponse {
    pub data: Vec<WeatherStationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CropException {
    pub crop: String,
    pub id: i64,
}

// Core output DTOs
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodSummary {
    pub periods: Vec<WeatherPeriod>,
    pub total_area: f64,
}

impl PeriodSummary {
    pub fn empty() -> Self {
        Self {
            periods: Vec::new(),
            total_area: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HumidityPoint {
    pub date: String,
    pub humidity: Option<f64>,
}

/// A station or field the humidity merger could not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupMiss {
    FieldNotFound { field_id: i64 },
    StationNotFound { station_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HumiditySeries {
    pub points: Vec<HumidityPoint>,
    pub missing: Vec<LookupMiss>,
}
