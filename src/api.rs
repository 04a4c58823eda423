use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::aggregation::{FieldProgress, NormProgress, PeriodTotals};
use crate::models::{
    CropException, HumidityPoint, HumiditySeries, LookupMiss, Norms, Weather, WeatherPeriod,
};
use crate::selection::{available_seasons, current_season, SelectionContext};
use crate::services::weather_view_service::{
    CropCard, CropView, CropsOverview, ExceptionState, FarmCard, FarmView, SummaryCard,
    WeatherView,
};
use crate::services::{ServiceError, WeatherViewService};

#[derive(Clone)]
pub struct AppState {
    pub weather_view_service: WeatherViewService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct SeasonsResponse {
    pub current: i32,
    pub seasons: Vec<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SeasonQuery {
    /// Season year, defaults to the current year
    pub season: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FarmQuery {
    /// Season year, defaults to the current year
    pub season: Option<i32>,
    /// Narrow the view to one field (its `field_shape_id`)
    pub field_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleExceptionRequest {
    pub crop: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_seasons,
        get_view,
        get_crops,
        get_crop_farms,
        get_farm_view,
        get_humidity,
        get_exceptions,
        toggle_exception
    ),
    components(schemas(
        HealthResponse,
        SeasonsResponse,
        ToggleExceptionRequest,
        CropsOverview,
        CropCard,
        CropView,
        FarmCard,
        FarmView,
        SummaryCard,
        PeriodTotals,
        NormProgress,
        FieldProgress,
        HumiditySeries,
        HumidityPoint,
        LookupMiss,
        WeatherPeriod,
        Norms,
        Weather,
        CropException,
        ExceptionState
    )),
    tags((name = "field-weather", description = "Area-weighted field weather views"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/seasons", get(get_seasons))
        .route("/view", get(get_view))
        .route("/crops", get(get_crops))
        .route("/crops/{crop}/farms", get(get_crop_farms))
        .route("/crops/{crop}/farms/{farm}", get(get_farm_view))
        .route("/crops/{crop}/farms/{farm}/humidity", get(get_humidity))
        .route("/exceptions", get(get_exceptions))
        .route("/exceptions/toggle", post(toggle_exception))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

fn status_for(e: &ServiceError) -> StatusCode {
    match e {
        ServiceError::Fetch(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Selection(_) => StatusCode::BAD_REQUEST,
        ServiceError::FarmNotFound(_)
        | ServiceError::FieldNotFound { .. }
        | ServiceError::CropNotGrown { .. } => StatusCode::NOT_FOUND,
    }
}

fn log_and_status(context: &str, e: ServiceError) -> StatusCode {
    let status = status_for(&e);
    if status.is_server_error() {
        error!("{}: {}", context, e);
    } else {
        warn!("{}: {}", context, e);
    }
    status
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "field-weather",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/seasons",
    tag = "field-weather",
    responses((status = 200, description = "Selectable seasons, newest first", body = SeasonsResponse))
)]
async fn get_seasons() -> Json<SeasonsResponse> {
    let current = current_season();
    Json(SeasonsResponse {
        current,
        seasons: available_seasons(current),
    })
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ViewQuery {
    /// Season year, defaults to the current year
    pub season: Option<i32>,
    pub crop: Option<String>,
    pub farm: Option<String>,
    pub field_id: Option<i64>,
}

impl From<ViewQuery> for SelectionContext {
    fn from(query: ViewQuery) -> Self {
        SelectionContext {
            season: query.season.unwrap_or_else(current_season),
            crop: query.crop,
            farm: query.farm,
            field_id: query.field_id,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/view",
    tag = "field-weather",
    params(ViewQuery),
    responses(
        (status = 200, description = "The view the selection drills down to, tagged by `level`"),
        (status = 400, description = "Farm without crop, or field without farm"),
        (status = 404, description = "Unknown farm or field, or the farm does not grow the crop"),
        (status = 502, description = "Upstream API failed")
    )
)]
#[instrument(skip(state))]
async fn get_view(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<WeatherView>, StatusCode> {
    let selection = SelectionContext::from(query);
    debug!("Building view for selection {:?}", selection);

    let view = state
        .weather_view_service
        .view(&selection)
        .await
        .map_err(|e| log_and_status("Failed to build view", e))?;

    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/api/v1/crops",
    tag = "field-weather",
    params(SeasonQuery),
    responses(
        (status = 200, description = "One rolled-up card per selectable crop", body = CropsOverview),
        (status = 502, description = "Upstream API failed")
    )
)]
#[instrument(skip(state))]
async fn get_crops(
    State(state): State<AppState>,
    Query(query): Query<SeasonQuery>,
) -> Result<Json<CropsOverview>, StatusCode> {
    let season = query.season.unwrap_or_else(current_season);
    debug!("Building crops overview for season {}", season);

    let overview = state
        .weather_view_service
        .crops_overview(season)
        .await
        .map_err(|e| log_and_status(&format!("Failed to build crops overview for {season}"), e))?;

    info!("Built {} crop cards for season {}", overview.crops.len(), season);
    Ok(Json(overview))
}

#[utoipa::path(
    get,
    path = "/api/v1/crops/{crop}/farms",
    tag = "field-weather",
    params(("crop" = String, Path, description = "Crop name"), SeasonQuery),
    responses(
        (status = 200, description = "Crop rollup and one card per farm", body = CropView),
        (status = 502, description = "Upstream API failed")
    )
)]
#[instrument(skip(state))]
async fn get_crop_farms(
    State(state): State<AppState>,
    Path(crop): Path<String>,
    Query(query): Query<SeasonQuery>,
) -> Result<Json<CropView>, StatusCode> {
    let season = query.season.unwrap_or_else(current_season);
    debug!("Building crop view for {} season {}", crop, season);

    let view = state
        .weather_view_service
        .crop_view(season, &crop)
        .await
        .map_err(|e| log_and_status(&format!("Failed to build crop view for {crop}"), e))?;

    info!(
        "Crop {} season {}: {} farms, total area {:.1}",
        crop,
        season,
        view.farms.len(),
        view.summary.total_area
    );
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/api/v1/crops/{crop}/farms/{farm}",
    tag = "field-weather",
    params(
        ("crop" = String, Path, description = "Crop name"),
        ("farm" = String, Path, description = "Farm name"),
        FarmQuery
    ),
    responses(
        (status = 200, description = "Farm or field drill-down", body = FarmView),
        (status = 404, description = "Unknown farm or field, or the farm does not grow the crop"),
        (status = 502, description = "Upstream API failed")
    )
)]
#[instrument(skip(state))]
async fn get_farm_view(
    State(state): State<AppState>,
    Path((crop, farm)): Path<(String, String)>,
    Query(query): Query<FarmQuery>,
) -> Result<Json<FarmView>, StatusCode> {
    let season = query.season.unwrap_or_else(current_season);
    debug!("Building farm view for {} / {} season {}", farm, crop, season);

    let view = state
        .weather_view_service
        .farm_view(season, &crop, &farm, query.field_id)
        .await
        .map_err(|e| log_and_status(&format!("Failed to build farm view for {farm}"), e))?;

    info!(
        "Farm {} crop {}: {} periods, {} fields, {} humidity points",
        farm,
        crop,
        view.summary.periods.len(),
        view.fields.len(),
        view.humidity.points.len()
    );
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/api/v1/crops/{crop}/farms/{farm}/humidity",
    tag = "field-weather",
    params(
        ("crop" = String, Path, description = "Crop name"),
        ("farm" = String, Path, description = "Farm name"),
        FarmQuery
    ),
    responses(
        (status = 200, description = "Daily humidity, ascending by date", body = HumiditySeries),
        (status = 404, description = "Unknown farm or field"),
        (status = 502, description = "Upstream API failed")
    )
)]
#[instrument(skip(state))]
async fn get_humidity(
    State(state): State<AppState>,
    Path((crop, farm)): Path<(String, String)>,
    Query(query): Query<FarmQuery>,
) -> Result<Json<HumiditySeries>, StatusCode> {
    let season = query.season.unwrap_or_else(current_season);

    let series = state
        .weather_view_service
        .humidity(season, &crop, &farm, query.field_id)
        .await
        .map_err(|e| log_and_status(&format!("Failed to build humidity for {farm}"), e))?;

    if !series.missing.is_empty() {
        warn!("Humidity for {} has {} lookup misses", farm, series.missing.len());
    }
    Ok(Json(series))
}

#[utoipa::path(
    get,
    path = "/api/v1/exceptions",
    tag = "field-weather",
    responses(
        (status = 200, description = "Excluded crops", body = [CropException]),
        (status = 502, description = "Upstream API failed")
    )
)]
#[instrument(skip(state))]
async fn get_exceptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<CropException>>, StatusCode> {
    let exceptions = state
        .weather_view_service
        .exceptions()
        .await
        .map_err(|e| log_and_status("Failed to fetch crop exceptions", e))?;

    Ok(Json(exceptions))
}

#[utoipa::path(
    post,
    path = "/api/v1/exceptions/toggle",
    tag = "field-weather",
    request_body = ToggleExceptionRequest,
    responses(
        (status = 200, description = "Crop exclusion flipped", body = ExceptionState),
        (status = 502, description = "Upstream API failed")
    )
)]
#[instrument(skip(state))]
async fn toggle_exception(
    State(state): State<AppState>,
    Json(request): Json<ToggleExceptionRequest>,
) -> Result<Json<ExceptionState>, StatusCode> {
    let exception_state = state
        .weather_view_service
        .toggle_exception(&request.crop)
        .await
        .map_err(|e| log_and_status(&format!("Failed to toggle exception for {}", request.crop), e))?;

    info!(
        "Crop {} is now {}",
        exception_state.crop,
        if exception_state.excluded { "excluded" } else { "selectable" }
    );
    Ok(Json(exception_state))
}
