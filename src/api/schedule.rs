use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub async fn list_schedules(State(state): State<AppState>) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let schedules = state.schedules().list_all().await?;
    Ok(Json(schedules.iter().map(ScheduleResponse::from).collect()))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Json(req): Json<NewScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), AppError> {
    let schedule = state.schedules().create(req).await?;
    Ok((StatusCode::CREATED, Json(ScheduleResponse::from(&schedule))))
}

pub async fn current_class(State(state): State<AppState>) -> Result<Json<CurrentClassResponse>, AppError> {
    let current = state.schedules().current_class().await?;
    Ok(Json(CurrentClassResponse::from(&current)))
}

pub async fn list_time_slots() -> Json<Vec<PeriodInfo>> {
    Json(Period::ALL.into_iter().map(PeriodInfo::from).collect())
}

pub async fn list_by_day(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let schedules = state.schedules().list_by_day(&day).await?;
    Ok(Json(schedules.iter().map(ScheduleResponse::from).collect()))
}

pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let schedule = state.schedules().get_by_id(&id).await?;
    Ok(Json(ScheduleResponse::from(&schedule)))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let schedule = state.schedules().update(&id, req).await?;
    Ok(Json(ScheduleResponse::from(&schedule)))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let schedule = state.schedules().delete(&id).await?;
    Ok(Json(ScheduleResponse::from(&schedule)))
}
