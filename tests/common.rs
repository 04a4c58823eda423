#![allow(dead_code)]

use serde_json::{json, Value};

use field_weather_service::models::{FieldsWeatherResponse, WeatherStationRecord};

pub const SEASON: i32 = 2025;

/// Averaged (farm-level) period: no calendar bounds
pub fn avg_period(
    id: u32,
    name: Option<&str>,
    norms: (f64, f64, f64),
    weather: (Option<f64>, f64, f64),
) -> Value {
    json!({
        "date_start": null,
        "date_end": null,
        "norms": {
            "crop": "Wheat",
            "days_in_period": 12,
            "id": id * 10,
            "min_temp": 3.0,
            "norm_mean_temp": norms.0,
            "norm_sum_eff_temp": norms.1,
            "norm_precipitation": norms.2,
            "period_id": id,
            "period_name": name
        },
        "period_id": id,
        "weather": {
            "effective_temperature_base": 5.0,
            "mean_temperature": weather.0,
            "sum_effective_temperature": weather.1,
            "sum_precipitation": weather.2
        }
    })
}

/// Field-level period with its own dates
pub fn field_period(id: u32, start: &str, end: &str) -> Value {
    let mut period = avg_period(id, Some("Sowing"), (9.0, 110.0, 28.0), (Some(9.5), 95.0, 31.0));
    period["date_start"] = json!(start);
    period["date_end"] = json!(end);
    period
}

pub fn field(id: i64, name: &str, crop: &str, area: f64, station: i64, periods: Vec<Value>) -> Value {
    json!({
        "crop_name": crop,
        "field_shape_id": id,
        "name": name,
        "sowing_date": "2025-04-10",
        "tillable_area": area,
        "weather_periods": periods,
        "weather_station_id": station
    })
}

/// Three farms:
/// - Avangard: Wheat on 100 ha (station 1), Barley on 50 ha (station 2), wheat periods 1..=3
/// - Zarya: Wheat on 300 ha (station 2), Barley on 80 ha (station 1), wheat periods 2 and 1
/// - Empty: reports Wheat averages but sows only Sunflower (20 ha, station 3)
pub fn fields_weather_json() -> Value {
    json!({
        "Avangard": {
            "avg_weather_periods": {
                "Wheat": [
                    avg_period(1, Some("Sowing"), (10.0, 100.0, 30.0), (Some(11.0), 90.0, 20.0)),
                    avg_period(2, None, (15.0, 200.0, 40.0), (None, 210.0, 35.0)),
                    avg_period(3, Some("Heading"), (20.0, 300.0, 50.0), (Some(21.0), 280.0, 60.0))
                ],
                "Barley": [
                    avg_period(1, Some("Emergence"), (8.0, 80.0, 25.0), (Some(8.5), 70.0, 22.0))
                ]
            },
            "fields": {
                "101": field(101, "Avangard North", "Wheat", 100.0, 1, vec![
                    field_period(1, "2025-04-10", "2025-04-30"),
                    field_period(2, "2025-05-01", "2025-05-25")
                ]),
                "102": field(102, "Avangard South", "Barley", 50.0, 2, vec![])
            }
        },
        "Empty": {
            "avg_weather_periods": {
                "Wheat": [
                    avg_period(1, Some("Ignored"), (99.0, 999.0, 99.0), (Some(99.0), 999.0, 99.0))
                ],
                "Sunflower": [
                    avg_period(1, Some("Emergence"), (18.0, 150.0, 20.0), (Some(19.0), 160.0, 10.0))
                ]
            },
            "fields": {
                "301": field(301, "Empty Hill", "Sunflower", 20.0, 3, vec![])
            }
        },
        "Zarya": {
            "avg_weather_periods": {
                "Wheat": [
                    avg_period(2, Some("Tillering"), (17.0, 240.0, 44.0), (Some(18.0), 250.0, 39.0)),
                    avg_period(1, Some("Germination"), (12.0, 120.0, 34.1), (Some(13.0), 110.0, 28.0))
                ]
            },
            "fields": {
                "201": field(201, "Zarya Big", "Wheat", 300.0, 2, vec![]),
                "202": field(202, "Zarya Creek", "Barley", 80.0, 1, vec![])
            }
        }
    })
}

pub fn station_json(id: i64, days: &[(&str, f64)]) -> Value {
    let value: serde_json::Map<String, Value> = days
        .iter()
        .map(|(date, humidity)| {
            (
                date.to_string(),
                json!({
                    "relative_humidity": humidity,
                    "precipitation": 0.4,
                    "temperature_max": 21.0,
                    "temperature_min": 9.0,
                    "wind_speed": 3.2
                }),
            )
        })
        .collect();

    json!({
        "id": id + 1000,
        "created_at": "2025-05-03T00:00:00Z",
        "updated_at": "2025-05-03T00:00:00Z",
        "weather_historyable_id": id,
        "weather_historyable_type": "WeatherStation",
        "year": SEASON,
        "value": value
    })
}

pub fn stations_json() -> Value {
    json!({
        "data": [
            station_json(1, &[("2025-05-02", 50.0), ("2025-05-01", 60.0)]),
            station_json(2, &[("2025-05-01", 70.0), ("2025-05-02", 80.0)]),
            station_json(3, &[("02.05.2025", 40.0), ("30.04.2025", 45.0)])
        ]
    })
}

pub fn exceptions_json() -> Value {
    json!([{ "crop": "Barley", "id": 5 }])
}

pub fn dataset() -> FieldsWeatherResponse {
    serde_json::from_value(fields_weather_json()).expect("fixture dataset should deserialize")
}

pub fn stations() -> Vec<WeatherStationRecord> {
    let mut wrapped = stations_json();
    serde_json::from_value(wrapped["data"].take()).expect("fixture stations should deserialize")
}
