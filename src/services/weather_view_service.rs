use serde::Serialize;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use crate::aggregation::lookup::{
    crop_fields, farms_for_crop, find_field, humidity_candidates, selectable_crops,
};
use crate::aggregation::{
    aggregate_crop, aggregate_periods, field_progress, merge_humidity, period_totals,
    AggregationScope, FieldProgress, PeriodTotals,
};
use crate::exceptions::{ExceptionSet, ExceptionToggle};
use crate::fetch_error::FetchError;
use crate::fetcher::UpstreamClient;
use crate::models::{
    CropException, Farm, FieldsWeatherResponse, HumiditySeries, PeriodSummary, WeatherPeriod,
    WeatherStationRecord,
};
use crate::selection::{Scope, SelectionContext, SelectionError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Upstream fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Invalid selection: {0}")]
    Selection(#[from] SelectionError),
    #[error("Farm not found: {0}")]
    FarmNotFound(String),
    #[error("Field {field_id} not found on farm {farm}")]
    FieldNotFound { farm: String, field_id: i64 },
    #[error("Farm {farm} does not grow {crop}")]
    CropNotGrown { farm: String, crop: String },
}

/// Period summary of one card together with its norm progress totals
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SummaryCard {
    pub total_area: f64,
    pub periods: Vec<WeatherPeriod>,
    pub totals: PeriodTotals,
}

impl From<PeriodSummary> for SummaryCard {
    fn from(summary: PeriodSummary) -> Self {
        let totals = period_totals(&summary.periods);
        Self {
            total_area: summary.total_area,
            periods: summary.periods,
            totals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CropCard {
    pub crop: String,
    #[serde(flatten)]
    pub summary: SummaryCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CropsOverview {
    pub season: i32,
    pub crops: Vec<CropCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FarmCard {
    pub farm: String,
    #[serde(flatten)]
    pub summary: SummaryCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CropView {
    pub season: i32,
    pub crop: String,
    #[serde(flatten)]
    pub summary: SummaryCard,
    pub farms: Vec<FarmCard>,
}

/// Farm drill-down, optionally narrowed to one field
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FarmView {
    pub season: i32,
    pub crop: String,
    pub farm: String,
    pub field_id: Option<i64>,
    pub field_name: Option<String>,
    pub summary: SummaryCard,
    pub fields: Vec<FieldProgress>,
    pub humidity: HumiditySeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum WeatherView {
    Crops(CropsOverview),
    Crop(CropView),
    Farm(FarmView),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExceptionState {
    pub crop: String,
    pub excluded: bool,
    pub exceptions: Vec<CropException>,
}

/// A complete, internally consistent set of upstream data for one season
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub season: i32,
    pub dataset: FieldsWeatherResponse,
    pub stations: Vec<WeatherStationRecord>,
    pub exceptions: ExceptionSet,
}

impl Snapshot {
    pub fn new(
        season: i32,
        dataset: FieldsWeatherResponse,
        stations: Vec<WeatherStationRecord>,
        exceptions: ExceptionSet,
    ) -> Self {
        Self {
            season,
            dataset,
            stations,
            exceptions,
        }
    }

    /// Build whichever view the selection drills down to
    pub fn view(&self, selection: &SelectionContext) -> Result<WeatherView, ServiceError> {
        match selection.scope()? {
            Scope::Crops => Ok(WeatherView::Crops(self.crops_overview())),
            Scope::Crop(crop) => Ok(WeatherView::Crop(self.crop_view(crop))),
            Scope::Farm { crop, farm } => Ok(WeatherView::Farm(self.farm_view(crop, farm, None)?)),
            Scope::Field {
                crop,
                farm,
                field_id,
            } => Ok(WeatherView::Farm(self.farm_view(crop, farm, Some(field_id))?)),
        }
    }

    /// One card per selectable crop, rolled up across all farms
    pub fn crops_overview(&self) -> CropsOverview {
        let crops = selectable_crops(&self.dataset, &self.exceptions)
            .into_iter()
            .map(|crop| {
                let summary = aggregate_crop(&self.dataset, &crop).into();
                CropCard { crop, summary }
            })
            .collect();

        CropsOverview {
            season: self.season,
            crops,
        }
    }

    /// Crop rollup plus one card per farm reporting the crop
    pub fn crop_view(&self, crop: &str) -> CropView {
        let farms = farms_for_crop(&self.dataset, crop)
            .into_iter()
            .map(|farm| FarmCard {
                farm: farm.to_string(),
                summary: aggregate_periods(&self.dataset, crop, AggregationScope::Farm(farm))
                    .into(),
            })
            .collect();

        CropView {
            season: self.season,
            crop: crop.to_string(),
            summary: aggregate_crop(&self.dataset, crop).into(),
            farms,
        }
    }

    pub fn farm_view(
        &self,
        crop: &str,
        farm_name: &str,
        field_id: Option<i64>,
    ) -> Result<FarmView, ServiceError> {
        let farm = self.resolve_farm(crop, farm_name)?;

        let (scope, fields, field_name) = match field_id {
            Some(id) => {
                let field = find_field(farm, id).ok_or_else(|| ServiceError::FieldNotFound {
                    farm: farm_name.to_string(),
                    field_id: id,
                })?;
                (
                    AggregationScope::Field {
                        farm: farm_name,
                        field_id: id,
                    },
                    vec![field_progress(field)],
                    Some(field.name.clone()),
                )
            }
            None => (
                AggregationScope::Farm(farm_name),
                crop_fields(farm, crop)
                    .into_iter()
                    .map(field_progress)
                    .collect::<Vec<_>>(),
                None,
            ),
        };

        Ok(FarmView {
            season: self.season,
            crop: crop.to_string(),
            farm: farm_name.to_string(),
            field_id,
            field_name,
            summary: aggregate_periods(&self.dataset, crop, scope).into(),
            fields,
            humidity: self.humidity_for(farm, crop, field_id),
        })
    }

    /// Humidity series for a farm, or for one of its fields
    pub fn humidity(
        &self,
        crop: &str,
        farm_name: &str,
        field_id: Option<i64>,
    ) -> Result<HumiditySeries, ServiceError> {
        let farm = self.resolve_farm(crop, farm_name)?;
        if let Some(id) = field_id {
            if find_field(farm, id).is_none() {
                return Err(ServiceError::FieldNotFound {
                    farm: farm_name.to_string(),
                    field_id: id,
                });
            }
        }

        Ok(self.humidity_for(farm, crop, field_id))
    }

    fn humidity_for(&self, farm: &Farm, crop: &str, field_id: Option<i64>) -> HumiditySeries {
        let candidates = humidity_candidates(farm, crop, field_id);
        merge_humidity(&candidates, &self.stations, field_id)
    }

    fn resolve_farm(&self, crop: &str, farm_name: &str) -> Result<&Farm, ServiceError> {
        let farm = self
            .dataset
            .get(farm_name)
            .ok_or_else(|| ServiceError::FarmNotFound(farm_name.to_string()))?;

        let grows_crop = farm.avg_weather_periods.contains_key(crop)
            || !crop_fields(farm, crop).is_empty();
        if !grows_crop {
            return Err(ServiceError::CropNotGrown {
                farm: farm_name.to_string(),
                crop: crop.to_string(),
            });
        }

        Ok(farm)
    }
}

/// Fetches a season snapshot from upstream and builds views over it
#[derive(Clone)]
pub struct WeatherViewService {
    client: UpstreamClient,
}

impl WeatherViewService {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    /// Fetch field weather, station records and exceptions for one season.
    ///
    /// Field weather and stations are requested concurrently; the snapshot is only
    /// returned once all three have arrived.
    #[instrument(skip(self))]
    pub async fn fetch_snapshot(&self, season: i32) -> Result<Snapshot, FetchError> {
        debug!("Fetching snapshot for season {}", season);
        let (dataset, stations) = tokio::try_join!(
            self.client.fetch_fields_weather(season),
            self.client.fetch_weather_stations(season),
        )?;
        let exceptions = ExceptionSet::from_entries(self.client.fetch_exceptions().await?);

        info!(
            "Snapshot for season {}: {} farms, {} station records, {} excluded crops",
            season,
            dataset.len(),
            stations.len(),
            exceptions.len()
        );

        Ok(Snapshot::new(season, dataset, stations, exceptions))
    }

    pub async fn view(&self, selection: &SelectionContext) -> Result<WeatherView, ServiceError> {
        // Validate before paying for the fetch
        selection.scope()?;
        let snapshot = self.fetch_snapshot(selection.season).await?;
        snapshot.view(selection)
    }

    pub async fn crops_overview(&self, season: i32) -> Result<CropsOverview, ServiceError> {
        Ok(self.fetch_snapshot(season).await?.crops_overview())
    }

    pub async fn crop_view(&self, season: i32, crop: &str) -> Result<CropView, ServiceError> {
        Ok(self.fetch_snapshot(season).await?.crop_view(crop))
    }

    pub async fn farm_view(
        &self,
        season: i32,
        crop: &str,
        farm: &str,
        field_id: Option<i64>,
    ) -> Result<FarmView, ServiceError> {
        self.fetch_snapshot(season)
            .await?
            .farm_view(crop, farm, field_id)
    }

    pub async fn humidity(
        &self,
        season: i32,
        crop: &str,
        farm: &str,
        field_id: Option<i64>,
    ) -> Result<HumiditySeries, ServiceError> {
        self.fetch_snapshot(season)
            .await?
            .humidity(crop, farm, field_id)
    }

    pub async fn exceptions(&self) -> Result<Vec<CropException>, ServiceError> {
        Ok(self.client.fetch_exceptions().await?)
    }

    /// Flip a crop between excluded and selectable upstream
    #[instrument(skip(self))]
    pub async fn toggle_exception(&self, crop: &str) -> Result<ExceptionState, ServiceError> {
        let current = ExceptionSet::from_entries(self.client.fetch_exceptions().await?);

        let excluded = match current.toggle(crop) {
            ExceptionToggle::Exclude => {
                let created = self.client.create_exception(crop).await?;
                info!("Excluded crop {} (exception {})", crop, created.id);
                true
            }
            ExceptionToggle::Include { exception_id } => {
                self.client.delete_exception(exception_id).await?;
                info!("Re-included crop {} (deleted exception {})", crop, exception_id);
                false
            }
        };

        // The toggle is already applied upstream; a failed re-read still fails the call
        let exceptions = self.client.fetch_exceptions().await.map_err(|e| {
            error!("Toggled {} but could not re-read exceptions: {}", crop, e);
            e
        })?;

        Ok(ExceptionState {
            crop: crop.to_string(),
            excluded,
            exceptions,
        })
    }
}
