//! # API REST
//!
//! REST API for the triage engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation served as JSON
//! - REST-specific concerns (request conversion, status codes, CORS)
//!
//! The router is built here so the standalone binary and the workspace's `triage-run` binary
//! serve the same application.

#![warn(rust_2018_idioms)]

pub mod dto;

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use dto::*;
use triage_core::{validate_patient, ForecastError, PatientInput, TriageError, TriageService};
use triage_kb::{KbError, RegionalBase};
use triage_types::Region;

/// Code accepted by `/regions/:region/diseases` for the region-agnostic base.
pub const GENERAL_REGION_CODE: &str = "general";

/// Application state shared across REST API handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: TriageService,
}

type ApiError = (StatusCode, Json<ErrorRes>);

fn api_error(status: StatusCode, error: impl Into<String>, details: Vec<String>) -> ApiError {
    (
        status,
        Json(ErrorRes {
            error: error.into(),
            details,
        }),
    )
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiError {
    tracing::error!("{context}: {e}");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error", Vec::new())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        triage,
        history,
        statistics,
        forecast,
        shopping_list,
        regions,
        region_diseases,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        TriageReq,
        TriageRes,
        MedicationRes,
        DifferentialRes,
        ScoreRes,
        HistoryRes,
        HistoryEntryRes,
        StatisticsRes,
        ForecastRes,
        MedicationNeedRes,
        CountRes,
        ShoppingListRes,
        ShoppingGroupRes,
        ShoppingItemRes,
        RegionsRes,
        RegionRes,
        DiseasesRes,
        DiseaseRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST application.
pub fn router(service: TriageService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/triage", post(triage))
        .route("/history", get(history))
        .route("/statistics", get(statistics))
        .route("/forecast", get(forecast))
        .route("/forecast/shopping-list", get(shopping_list))
        .route("/regions", get(regions))
        .route("/regions/:region/diseases", get(region_diseases))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(CorsLayer::permissive())
        .with_state(AppState { service })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Triage REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/triage",
    request_body = TriageReq,
    responses(
        (status = 200, description = "Triage outcome", body = TriageRes),
        (status = 404, description = "Region not loaded", body = ErrorRes),
        (status = 422, description = "Invalid patient input", body = ErrorRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Triage one patient
///
/// Unknown vocabulary codes and out-of-range vitals are rejected with every problem listed.
/// The outcome is recorded in the triage history.
#[axum::debug_handler]
async fn triage(
    State(state): State<AppState>,
    Json(req): Json<TriageReq>,
) -> Result<Json<TriageRes>, ApiError> {
    let patient = PatientInput::try_from(req).map_err(|details| {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid patient input",
            details,
        )
    })?;
    validate_patient(&patient).map_err(|e| {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid patient input",
            e.messages().to_vec(),
        )
    })?;

    match state.service.triage(&patient) {
        Ok(result) => Ok(Json(TriageRes::from(&result))),
        Err(TriageError::KnowledgeBase(e @ KbError::UnknownRegion(_))) => {
            Err(api_error(StatusCode::NOT_FOUND, e.to_string(), Vec::new()))
        }
        Err(e) => Err(internal_error("Triage error", e)),
    }
}

#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "Triage history, oldest first", body = HistoryRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn history(State(state): State<AppState>) -> Result<Json<HistoryRes>, ApiError> {
    let records = state
        .service
        .history()
        .map_err(|e| internal_error("History error", e))?;
    Ok(Json(HistoryRes {
        records: records.iter().map(HistoryEntryRes::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/statistics",
    responses(
        (status = 200, description = "Aggregate triage statistics", body = StatisticsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn statistics(State(state): State<AppState>) -> Result<Json<StatisticsRes>, ApiError> {
    let stats = state
        .service
        .statistics()
        .map_err(|e| internal_error("Statistics error", e))?;
    Ok(Json(StatisticsRes::from(stats)))
}

fn forecast_error(e: ForecastError) -> ApiError {
    match e {
        ForecastError::InvalidWindow => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), Vec::new())
        }
        ForecastError::EmptyHistory | ForecastError::EmptyWindow { .. } => {
            api_error(StatusCode::CONFLICT, e.to_string(), Vec::new())
        }
        ForecastError::History(e) => internal_error("Forecast history error", e),
    }
}

#[utoipa::path(
    get,
    path = "/forecast",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Medication forecast", body = ForecastRes),
        (status = 409, description = "Insufficient history for the window", body = ErrorRes),
        (status = 422, description = "Invalid window", body = ErrorRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Forecast medication needs from recent triage history
#[axum::debug_handler]
async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastRes>, ApiError> {
    let report = state
        .service
        .forecast_medication_needs(query.window_days(), query.projection_days())
        .map_err(forecast_error)?;
    Ok(Json(ForecastRes::from(&report)))
}

#[utoipa::path(
    get,
    path = "/forecast/shopping-list",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Medication shopping list", body = ShoppingListRes),
        (status = 409, description = "Insufficient history for the window", body = ErrorRes),
        (status = 422, description = "Invalid window", body = ErrorRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn shopping_list(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ShoppingListRes>, ApiError> {
    let list = state
        .service
        .shopping_list(query.window_days(), query.projection_days())
        .map_err(forecast_error)?;
    Ok(Json(ShoppingListRes::from(&list)))
}

#[utoipa::path(
    get,
    path = "/regions",
    responses(
        (status = 200, description = "Loaded knowledge bases", body = RegionsRes)
    )
)]
/// List the general base and every loaded regional base
#[axum::debug_handler]
async fn regions(State(state): State<AppState>) -> Json<RegionsRes> {
    let kb = state.service.knowledge_base();
    let mut regions = vec![RegionRes::new(GENERAL_REGION_CODE, kb.general())];
    for region in kb.regions() {
        if let Ok(base) = kb.regional_base(Some(region)) {
            regions.push(RegionRes::new(region.code(), base));
        }
    }
    Json(RegionsRes { regions })
}

#[utoipa::path(
    get,
    path = "/regions/{region}/diseases",
    params(
        ("region" = String, Path, description = "Region code, or `general` for the region-agnostic base")
    ),
    responses(
        (status = 200, description = "Diseases of one base", body = DiseasesRes),
        (status = 404, description = "Unknown or unloaded region", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn region_diseases(
    State(state): State<AppState>,
    AxumPath(region): AxumPath<String>,
) -> Result<Json<DiseasesRes>, ApiError> {
    let kb = state.service.knowledge_base();
    let not_found = |message: String| api_error(StatusCode::NOT_FOUND, message, Vec::new());

    let base: &RegionalBase = if region == GENERAL_REGION_CODE {
        kb.general()
    } else {
        let parsed = region
            .parse::<Region>()
            .map_err(|e| not_found(e.to_string()))?;
        kb.regional_base(Some(parsed))
            .map_err(|e| not_found(e.to_string()))?
    };

    Ok(Json(DiseasesRes {
        region: RegionRes::new(&region, base),
        diseases: base.diseases.iter().map(DiseaseRes::from).collect(),
    }))
}
