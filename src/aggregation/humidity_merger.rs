use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::models::{Field, HumidityPoint, HumiditySeries, LookupMiss, WeatherStationRecord};
use crate::utils::parse_calendar_date;

/// The slice of a field the humidity merger needs
#[derive(Debug, Clone, PartialEq)]
pub struct HumidityField {
    pub id: i64,
    pub weather_station_id: i64,
    pub tillable_area: f64,
}

impl From<&Field> for HumidityField {
    fn from(field: &Field) -> Self {
        Self {
            id: field.field_shape_id,
            weather_station_id: field.weather_station_id,
            tillable_area: field.tillable_area,
        }
    }
}

/// Build the daily humidity series for a set of candidate fields.
///
/// With `selected_field_id` the selected field's station series is returned as-is.
/// Without it, every station feeding a candidate field is blended per date,
/// weighted by the tillable area on that station. Unresolvable fields and stations
/// are reported in `missing` and never fail the merge.
#[instrument(skip(fields, stations), fields(fields = fields.len(), stations = stations.len()))]
pub fn merge_humidity(
    fields: &[HumidityField],
    stations: &[WeatherStationRecord],
    selected_field_id: Option<i64>,
) -> HumiditySeries {
    let mut series = match selected_field_id {
        Some(field_id) => selected_series(fields, stations, field_id),
        None => weighted_series(fields, stations),
    };

    sort_chronologically(&mut series.points);
    debug!(
        "Humidity series has {} dates, {} lookup misses",
        series.points.len(),
        series.missing.len()
    );

    series
}

fn selected_series(
    fields: &[HumidityField],
    stations: &[WeatherStationRecord],
    field_id: i64,
) -> HumiditySeries {
    let Some(field) = fields.iter().find(|f| f.id == field_id) else {
        warn!("Selected field {} is not among the candidate fields", field_id);
        return HumiditySeries {
            points: Vec::new(),
            missing: vec![LookupMiss::FieldNotFound { field_id }],
        };
    };

    let Some(station) = stations
        .iter()
        .find(|s| s.weather_historyable_id == field.weather_station_id)
    else {
        warn!(
            "Weather station {} not found for selected field {}",
            field.weather_station_id, field_id
        );
        return HumiditySeries {
            points: Vec::new(),
            missing: vec![LookupMiss::StationNotFound {
                station_id: field.weather_station_id,
            }],
        };
    };

    let points = station
        .value
        .iter()
        .map(|(date, obs)| HumidityPoint {
            date: date.clone(),
            humidity: obs.relative_humidity,
        })
        .collect();

    HumiditySeries {
        points,
        missing: Vec::new(),
    }
}

fn weighted_series(fields: &[HumidityField], stations: &[WeatherStationRecord]) -> HumiditySeries {
    let mut station_area: BTreeMap<i64, f64> = BTreeMap::new();
    for field in fields {
        *station_area.entry(field.weather_station_id).or_default() += field.tillable_area;
    }

    // date -> (Σ humidity * area, Σ area)
    let mut by_date: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for station in stations {
        // Zero-area stations register no dates; a date only they report is dropped
        let area = match station_area.get(&station.weather_historyable_id) {
            Some(&area) if area != 0.0 => area,
            _ => continue,
        };

        for (date, obs) in &station.value {
            let entry = by_date.entry(date.as_str()).or_default();
            if let Some(humidity) = obs.relative_humidity {
                entry.0 += humidity * area;
                entry.1 += area;
            }
        }
    }

    let missing: Vec<LookupMiss> = station_area
        .keys()
        .filter(|id| !stations.iter().any(|s| s.weather_historyable_id == **id))
        .map(|&station_id| {
            warn!("Weather station {} has fields but no records", station_id);
            LookupMiss::StationNotFound { station_id }
        })
        .collect();

    let points = by_date
        .into_iter()
        .map(|(date, (total, weight))| HumidityPoint {
            date: date.to_string(),
            humidity: if weight == 0.0 {
                None
            } else {
                Some(total / weight)
            },
        })
        .collect();

    HumiditySeries { points, missing }
}

/// Order by calendar date; keys that do not parse go last, in string order
fn sort_chronologically(points: &mut [HumidityPoint]) {
    points.sort_by_cached_key(|point| {
        let parsed = parse_calendar_date(&point.date);
        (parsed.is_none(), parsed, point.date.clone())
    });
}
