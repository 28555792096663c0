pub mod schedule;
pub mod teachers;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{Json, Router, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;
use crate::upload::MAX_AVATAR_BYTES;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health))
        .route("/schedule", get(schedule::list_schedules).post(schedule::create_schedule))
        .route("/schedule/current", get(schedule::current_class))
        .route("/schedule/time-slots", get(schedule::list_time_slots))
        .route("/schedule/day/{day}", get(schedule::list_by_day))
        .route(
            "/schedule/{id}",
            get(schedule::get_schedule)
                .put(schedule::update_schedule)
                .delete(schedule::delete_schedule),
        )
        .route("/teachers", get(teachers::list_teachers).post(teachers::create_teacher))
        .route(
            "/teachers/{id}",
            get(teachers::get_teacher)
                .put(teachers::update_teacher)
                .delete(teachers::delete_teacher),
        )
        .route("/teachers/{id}/avatar", put(teachers::update_avatar))
        .route(
            "/teachers/{id}/avatar/upload",
            post(teachers::upload_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 64 * 1024)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub api: PackageInfo,
    pub status: StatusInfo,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PackageInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusInfo {
    pub state: &'static str,
    pub uptime: String,
}

async fn api_info(State(state): State<AppState>) -> Json<ApiInfo> {
    Json(ApiInfo {
        api: PackageInfo {
            name: env!("CARGO_PKG_NAME"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            version: env!("CARGO_PKG_VERSION"),
        },
        status: StatusInfo {
            state: "online",
            uptime: format_uptime(state.started_at.elapsed()),
        },
        timestamp: Utc::now(),
    })
}

/// `"{h}h {m}m {s}s"`, truncated to whole seconds.
fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
