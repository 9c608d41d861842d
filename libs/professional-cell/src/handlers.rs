use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::session::{AdminSession, Section};

use crate::models::{
    AvailabilityError, AvailabilityResponse, CreateProfessionalRequest, DayOfWeek,
    EditAvailabilityRequest, ExportAvailabilityRequest, SaveAvailabilityRequest,
};
use crate::services::{AvailabilityGrid, ProfessionalService};

fn service_error(err: anyhow::Error) -> AppError {
    let message = err.to_string();
    if message.starts_with("Resource not found") {
        AppError::NotFound(message)
    } else if message.starts_with("Authentication error") {
        AppError::Auth(message)
    } else if message.starts_with("Conflict") {
        AppError::Conflict(message)
    } else if message.starts_with("Validation error") {
        AppError::ValidationError(message)
    } else {
        AppError::ExternalService(message)
    }
}

fn editor_error(err: AvailabilityError) -> AppError {
    AppError::BadRequest(err.to_string())
}

fn availability_response(grid: AvailabilityGrid) -> AvailabilityResponse {
    let removable = DayOfWeek::ALL
        .into_iter()
        .map(|day| (day, grid.can_remove(day)))
        .collect();

    AvailabilityResponse {
        professional_id: grid.professional_id(),
        availability: grid.into_availability(),
        removable,
    }
}

#[axum::debug_handler]
pub async fn get_professional(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<AdminSession>,
    Path(professional_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    session.require(Section::Professionals)?;

    let professional = ProfessionalService::new(&state)
        .get_professional(professional_id, session.token())
        .await
        .map_err(service_error)?;

    Ok(Json(json!(professional)))
}

#[axum::debug_handler]
pub async fn create_professional(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<AdminSession>,
    Json(request): Json<CreateProfessionalRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    session.require(Section::Professionals)?;

    let professional = ProfessionalService::new(&state)
        .create_professional(request, session.token())
        .await
        .map_err(service_error)?;

    Ok((StatusCode::CREATED, Json(json!(professional))))
}

/// Blank editor for a professional that does not exist yet.
pub async fn new_availability(
    Extension(session): Extension<AdminSession>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    session.require(Section::Professionals)?;

    Ok(Json(availability_response(AvailabilityGrid::new(None))))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<AdminSession>,
    Path(professional_id): Path<i64>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    session.require(Section::Professionals)?;

    let grid = ProfessionalService::new(&state)
        .load_availability(professional_id, session.token())
        .await
        .map_err(service_error)?;

    Ok(Json(availability_response(grid)))
}

pub async fn edit_availability(
    Extension(session): Extension<AdminSession>,
    Json(request): Json<EditAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    session.require(Section::Professionals)?;
    debug!("Applying availability edit: {:?}", request.command);

    let mut grid = AvailabilityGrid::with_availability(request.professional_id, request.availability);
    grid.apply(request.command).map_err(editor_error)?;

    Ok(Json(availability_response(grid)))
}

pub async fn export_availability(
    Extension(session): Extension<AdminSession>,
    Json(request): Json<ExportAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    session.require(Section::Professionals)?;

    let grid = AvailabilityGrid::with_availability(request.professional_id, request.availability);
    let entries = grid.export();

    Ok(Json(json!({
        "schedules": entries,
        "total": entries.len()
    })))
}

#[axum::debug_handler]
pub async fn save_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<AdminSession>,
    Path(professional_id): Path<i64>,
    Json(request): Json<SaveAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    session.require(Section::Professionals)?;

    let professional = ProfessionalService::new(&state)
        .save_availability(professional_id, request.availability, session.token())
        .await
        .map_err(service_error)?;

    Ok(Json(json!(professional)))
}
