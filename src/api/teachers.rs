use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;

use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;
use crate::upload::AvatarFile;

pub async fn list_teachers(State(state): State<AppState>) -> Result<Json<Vec<TeacherResponse>>, AppError> {
    let teachers = state.teachers().list().await?;
    Ok(Json(teachers.iter().map(TeacherResponse::from).collect()))
}

pub async fn create_teacher(
    State(state): State<AppState>,
    Json(req): Json<NewTeacherRequest>,
) -> Result<(StatusCode, Json<TeacherResponse>), AppError> {
    let teacher = state.teachers().create(req).await?;
    Ok((StatusCode::CREATED, Json(TeacherResponse::from(&teacher))))
}

pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TeacherResponse>, AppError> {
    let teacher = state.teachers().get(&id).await?;
    Ok(Json(TeacherResponse::from(&teacher)))
}

pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTeacherRequest>,
) -> Result<Json<TeacherResponse>, AppError> {
    let teacher = state.teachers().update(&id, req).await?;
    Ok(Json(TeacherResponse::from(&teacher)))
}

pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TeacherResponse>, AppError> {
    let teacher = state.teachers().delete(&id).await?;
    Ok(Json(TeacherResponse::from(&teacher)))
}

pub async fn update_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAvatarRequest>,
) -> Result<Json<TeacherResponse>, AppError> {
    let teacher = state.teachers().update_avatar(&id, &req.avatar).await?;
    Ok(Json(TeacherResponse::from(&teacher)))
}

/// Multipart upload; the image is read from the `file` field.
pub async fn upload_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<TeacherResponse>, AppError> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("avatar").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;

        file = Some(AvatarFile {
            bytes: bytes.to_vec(),
            filename,
            content_type,
        });
        break;
    }

    let file = file.ok_or_else(|| AppError::Validation("Missing multipart field 'file'".to_string()))?;
    let teacher = state.teachers().upload_avatar(&id, file).await?;
    Ok(Json(TeacherResponse::from(&teacher)))
}
