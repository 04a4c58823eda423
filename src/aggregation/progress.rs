use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Field, WeatherPeriod};
use crate::utils::round_to_tenth;

/// Actual against norm for one quantity summed over a period list
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NormProgress {
    pub norm: f64,
    pub actual: f64,
    /// Share of the norm reached, capped at 100; `None` when the norm is zero
    pub percent: Option<f64>,
    /// What is left to reach the norm, never negative
    pub remaining: f64,
}

impl NormProgress {
    fn new(norm: f64, actual: f64) -> Self {
        Self {
            norm: round_to_tenth(norm),
            actual: round_to_tenth(actual),
            percent: percent_of(actual, norm).map(|p| round_to_tenth(p.min(100.0))),
            remaining: round_to_tenth((norm - actual).max(0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodTotals {
    pub effective_temperature: NormProgress,
    pub precipitation: NormProgress,
}

/// One row of the per-field table: how much heat and rain the field got so far
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldProgress {
    pub field_id: i64,
    pub name: String,
    pub sowing_date: Option<String>,
    pub tillable_area: f64,
    pub heat_percent: Option<f64>,
    pub precipitation_percent: Option<f64>,
}

fn percent_of(actual: f64, norm: f64) -> Option<f64> {
    (norm != 0.0).then(|| actual / norm * 100.0)
}

/// Sum norm and actual effective temperature and precipitation across `periods`
pub fn period_totals(periods: &[WeatherPeriod]) -> PeriodTotals {
    let norm_eff: f64 = periods.iter().map(|p| p.norms.norm_sum_eff_temp).sum();
    let actual_eff: f64 = periods.iter().map(|p| p.weather.sum_effective_temperature).sum();
    let norm_precip: f64 = periods.iter().map(|p| p.norms.norm_precipitation).sum();
    let actual_precip: f64 = periods.iter().map(|p| p.weather.sum_precipitation).sum();

    PeriodTotals {
        effective_temperature: NormProgress::new(norm_eff, actual_eff),
        precipitation: NormProgress::new(norm_precip, actual_precip),
    }
}

/// Uncapped heat and precipitation received by a field, relative to its norms
pub fn field_progress(field: &Field) -> FieldProgress {
    let totals = |norm: fn(&WeatherPeriod) -> f64, actual: fn(&WeatherPeriod) -> f64| {
        let norm_sum: f64 = field.weather_periods.iter().map(norm).sum();
        let actual_sum: f64 = field.weather_periods.iter().map(actual).sum();
        percent_of(actual_sum, norm_sum).map(round_to_tenth)
    };

    FieldProgress {
        field_id: field.field_shape_id,
        name: field.name.clone(),
        sowing_date: field.sowing_date.clone(),
        tillable_area: field.tillable_area,
        heat_percent: totals(
            |p| p.norms.norm_sum_eff_temp,
            |p| p.weather.sum_effective_temperature,
        ),
        precipitation_percent: totals(
            |p| p.norms.norm_precipitation,
            |p| p.weather.sum_precipitation,
        ),
    }
}
