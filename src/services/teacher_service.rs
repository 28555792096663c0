use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{error, info};

use crate::db::teachers;
use crate::error::AppError;
use crate::models::{NewTeacherRequest, Teacher, UpdateTeacherRequest};
use crate::models::validate;
use crate::upload::{AvatarFile, AvatarStore};

pub struct TeacherService {
    db: SqlitePool,
    avatars: Arc<dyn AvatarStore>,
}

fn teacher_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Teacher with ID {} not found", id))
}

/// Map storage failures for the teacher table. Unique and foreign-key
/// violations are client conflicts; everything else is internal.
fn storage_error(err: sqlx::Error, id: Option<&str>, context: &str) -> AppError {
    if let sqlx::Error::RowNotFound = err {
        if let Some(id) = id {
            return teacher_not_found(id);
        }
    }
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            info!("{}: name already taken", context);
            return AppError::Conflict("A teacher with this name already exists".to_string());
        }
        if db_err.is_foreign_key_violation() {
            info!("{}: teacher still referenced", context);
            return AppError::Conflict("Teacher is still referenced by schedule entries".to_string());
        }
    }
    error!("{}: {}", context, err);
    AppError::Internal(context.to_string())
}

impl TeacherService {
    pub fn new(db: SqlitePool, avatars: Arc<dyn AvatarStore>) -> Self {
        Self { db, avatars }
    }

    pub async fn list(&self) -> Result<Vec<Teacher>, AppError> {
        info!("Getting all teachers");
        teachers::fetch_teachers(&self.db)
            .await
            .map_err(|e| storage_error(e, None, "Failed to retrieve teachers"))
    }

    pub async fn get(&self, id: &str) -> Result<Teacher, AppError> {
        info!("Getting teacher with ID: {}", id);
        teachers::find_teacher_by_id(&self.db, id)
            .await
            .map_err(|e| storage_error(e, Some(id), "Failed to retrieve teacher"))?
            .ok_or_else(|| teacher_not_found(id))
    }

    pub async fn create(&self, req: NewTeacherRequest) -> Result<Teacher, AppError> {
        let req = req.validate()?;
        info!("Creating teacher: {}", req.name);
        teachers::insert_teacher(&self.db, &req.name, req.avatar.as_deref())
            .await
            .map_err(|e| storage_error(e, None, "Failed to create teacher"))
    }

    pub async fn update(&self, id: &str, req: UpdateTeacherRequest) -> Result<Teacher, AppError> {
        let req = req.validate()?;
        info!("Updating teacher with ID: {}", id);
        let existing = self.get(id).await?;

        let name = req.name.unwrap_or(existing.name);
        let avatar = req.avatar.or(existing.avatar);
        teachers::update_teacher(&self.db, id, &name, avatar.as_deref())
            .await
            .map_err(|e| storage_error(e, Some(id), "Failed to update teacher"))
    }

    /// Fails with a conflict while schedule entries still reference the
    /// teacher.
    pub async fn delete(&self, id: &str) -> Result<Teacher, AppError> {
        info!("Deleting teacher with ID: {}", id);
        self.get(id).await?;
        teachers::delete_teacher(&self.db, id)
            .await
            .map_err(|e| storage_error(e, Some(id), "Failed to delete teacher"))
    }

    pub async fn update_avatar(&self, id: &str, avatar: &str) -> Result<Teacher, AppError> {
        let avatar = validate::required("avatar", avatar, 1)?;
        info!("Updating avatar for teacher with ID: {}", id);
        let existing = self.get(id).await?;

        teachers::update_teacher(&self.db, id, &existing.name, Some(&avatar))
            .await
            .map_err(|e| storage_error(e, Some(id), "Failed to update teacher avatar"))
    }

    /// Store the image through the avatar store and point the teacher at it.
    pub async fn upload_avatar(&self, id: &str, file: AvatarFile) -> Result<Teacher, AppError> {
        file.validate()?;
        self.get(id).await?;

        let url = self.avatars.store(&file).await?;
        self.update_avatar(id, &url).await
    }
}
