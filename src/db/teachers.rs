use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::rows::TeacherRow;
use crate::models::Teacher;

const TEACHER_COLUMNS: &str = "id, name, avatar, created_at, updated_at";

pub async fn fetch_teachers(db: &SqlitePool) -> Result<Vec<Teacher>, sqlx::Error> {
    let sql = format!("SELECT {} FROM teachers ORDER BY name ASC", TEACHER_COLUMNS);
    sqlx::query_as::<_, TeacherRow>(&sql)
        .fetch_all(db)
        .await?
        .into_iter()
        .map(|row| Teacher::try_from(row).map_err(sqlx::Error::from))
        .collect()
}

pub async fn find_teacher_by_id(db: &SqlitePool, id: &str) -> Result<Option<Teacher>, sqlx::Error> {
    let sql = format!("SELECT {} FROM teachers WHERE id = ?1", TEACHER_COLUMNS);
    sqlx::query_as::<_, TeacherRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?
        .map(|row| Teacher::try_from(row).map_err(sqlx::Error::from))
        .transpose()
}

pub async fn insert_teacher(
    db: &SqlitePool,
    name: &str,
    avatar: Option<&str>,
) -> Result<Teacher, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let sql = format!(
        "INSERT INTO teachers ({cols}) VALUES (?1, ?2, ?3, ?4, ?4) RETURNING {cols}",
        cols = TEACHER_COLUMNS
    );
    let row = sqlx::query_as::<_, TeacherRow>(&sql)
        .bind(id)
        .bind(name)
        .bind(avatar)
        .bind(now)
        .fetch_one(db)
        .await?;

    Ok(Teacher::try_from(row)?)
}

/// `RowNotFound` when `id` does not exist.
pub async fn update_teacher(
    db: &SqlitePool,
    id: &str,
    name: &str,
    avatar: Option<&str>,
) -> Result<Teacher, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let sql = format!(
        "UPDATE teachers SET name = ?1, avatar = ?2, updated_at = ?3 WHERE id = ?4 RETURNING {}",
        TEACHER_COLUMNS
    );
    let row = sqlx::query_as::<_, TeacherRow>(&sql)
        .bind(name)
        .bind(avatar)
        .bind(now)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok(Teacher::try_from(row)?)
}

/// `RowNotFound` when `id` does not exist.
pub async fn delete_teacher(db: &SqlitePool, id: &str) -> Result<Teacher, sqlx::Error> {
    let sql = format!("DELETE FROM teachers WHERE id = ?1 RETURNING {}", TEACHER_COLUMNS);
    let row = sqlx::query_as::<_, TeacherRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok(Teacher::try_from(row)?)
}
