use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::aggregation::lookup::{crop_weight, find_field};
use crate::models::{Farm, FieldsWeatherResponse, Norms, PeriodSummary, Weather, WeatherPeriod};
use crate::utils::round_to_tenth;

/// Which slice of the dataset a period summary covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationScope<'a> {
    AllFarms,
    Farm(&'a str),
    Field { farm: &'a str, field_id: i64 },
}

/// Running area-weighted sums for one `period_id`
#[derive(Debug, Default)]
struct PeriodAccumulator {
    area: f64,
    period_name: Option<String>,
    norm_mean_temp: f64,
    norm_sum_eff_temp: f64,
    norm_precipitation: f64,
    mean_temperature: f64,
    sum_effective_temperature: f64,
    sum_precipitation: f64,
}

impl PeriodAccumulator {
    fn add(&mut self, period: &WeatherPeriod, weight: f64) {
        // First non-null name wins; farms disagreeing on a name resolve by map order.
        // A farm whose crop fields have no area cannot name the period.
        if self.period_name.is_none() && weight > 0.0 {
            self.period_name = period.norms.period_name.clone();
        }

        self.area += weight;
        self.norm_mean_temp += period.norms.norm_mean_temp * weight;
        self.norm_sum_eff_temp += period.norms.norm_sum_eff_temp * weight;
        self.norm_precipitation += period.norms.norm_precipitation * weight;
        self.mean_temperature += period.weather.mean_temperature.unwrap_or(0.0) * weight;
        self.sum_effective_temperature += period.weather.sum_effective_temperature * weight;
        self.sum_precipitation += period.weather.sum_precipitation * weight;
    }

    fn finalize(self, crop: &str, period_id: u32) -> WeatherPeriod {
        let area = self.area;
        let mean = |sum: f64| {
            if area == 0.0 {
                0.0
            } else {
                round_to_tenth(sum / area)
            }
        };

        if area == 0.0 {
            warn!("Period {} of crop {} has no tillable area behind it", period_id, crop);
        }

        WeatherPeriod {
            date_start: None,
            date_end: None,
            norms: Norms {
                crop: crop.to_string(),
                days_in_period: 0,
                id: 0,
                min_temp: 0.0,
                norm_mean_temp: mean(self.norm_mean_temp),
                norm_precipitation: mean(self.norm_precipitation),
                norm_sum_eff_temp: mean(self.norm_sum_eff_temp),
                period_id,
                period_name: self.period_name,
            },
            period_id,
            weather: Weather {
                effective_temperature_base: 0.0,
                mean_temperature: (area != 0.0).then(|| mean(self.mean_temperature)),
                sum_effective_temperature: mean(self.sum_effective_temperature),
                sum_precipitation: mean(self.sum_precipitation),
            },
        }
    }
}

/// Summarize `crop` over the given scope.
///
/// Farm and crop scopes fold each farm's pre-computed averages, weighted by the area
/// the farm actually sows with the crop. A field scope returns the field's own
/// periods untouched. An unknown farm or field yields an empty summary.
#[instrument(skip(dataset), fields(farms = dataset.len()))]
pub fn aggregate_periods(
    dataset: &FieldsWeatherResponse,
    crop: &str,
    scope: AggregationScope<'_>,
) -> PeriodSummary {
    match scope {
        AggregationScope::AllFarms => weighted_average(dataset.values(), crop),
        AggregationScope::Farm(farm_name) => match dataset.get(farm_name) {
            Some(farm) => weighted_average(std::iter::once(farm), crop),
            None => {
                warn!("Farm {} not present in dataset", farm_name);
                PeriodSummary::empty()
            }
        },
        AggregationScope::Field { farm, field_id } => {
            match dataset.get(farm).and_then(|f| find_field(f, field_id)) {
                Some(field) => PeriodSummary {
                    periods: field.weather_periods.clone(),
                    total_area: field.tillable_area,
                },
                None => {
                    warn!("Field {} not present on farm {}", field_id, farm);
                    PeriodSummary::empty()
                }
            }
        }
    }
}

/// Crop-level rollup across every farm
pub fn aggregate_crop(dataset: &FieldsWeatherResponse, crop: &str) -> PeriodSummary {
    aggregate_periods(dataset, crop, AggregationScope::AllFarms)
}

fn weighted_average<'a>(farms: impl Iterator<Item = &'a Farm>, crop: &str) -> PeriodSummary {
    let mut accumulators: BTreeMap<u32, PeriodAccumulator> = BTreeMap::new();
    let mut total_area = 0.0;
    let mut contributing = 0;

    for farm in farms {
        let Some(periods) = farm.avg_weather_periods.get(crop) else {
            continue;
        };
        let Some(weight) = crop_weight(farm, crop) else {
            continue;
        };

        contributing += 1;
        total_area += weight;

        for period in periods {
            accumulators
                .entry(period.period_id)
                .or_default()
                .add(period, weight);
        }
    }

    debug!(
        "Folded {} farms into {} periods for crop {}, total area {:.1}",
        contributing,
        accumulators.len(),
        crop,
        total_area
    );

    PeriodSummary {
        periods: accumulators
            .into_iter()
            .map(|(period_id, acc)| acc.finalize(crop, period_id))
            .collect(),
        total_area,
    }
}
