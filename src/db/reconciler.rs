//! Find-or-create for the reference tables.
//!
//! Each lookup is a single `INSERT ... ON CONFLICT DO UPDATE ... RETURNING`
//! statement keyed on the table's unique natural key, so the existence check
//! and the insert cannot race: concurrent callers with the same key all get
//! the one winning row back. Descriptive fields are only written on first
//! insert.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::rows::{RoomRow, SubjectRow, TeacherRow, TimeSlotRow};
use crate::models::{Room, Subject, Teacher, TimeOfDay, TimeSlot};
use crate::services::time_resolver;

pub async fn find_or_create_teacher(db: &SqlitePool, name: &str) -> Result<Teacher, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let row = sqlx::query_as::<_, TeacherRow>(
        r#"
        INSERT INTO teachers (id, name, avatar, created_at, updated_at)
        VALUES (?1, ?2, NULL, ?3, ?3)
        ON CONFLICT(name) DO UPDATE SET name = excluded.name
        RETURNING id, name, avatar, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(now)
    .fetch_one(db)
    .await?;

    Ok(Teacher::try_from(row)?)
}

pub async fn find_or_create_room(
    db: &SqlitePool,
    number: &str,
    building: Option<&str>,
    capacity: Option<i64>,
) -> Result<Room, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let row = sqlx::query_as::<_, RoomRow>(
        r#"
        INSERT INTO rooms (id, number, building, capacity, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT(number) DO UPDATE SET number = excluded.number
        RETURNING id, number, building, capacity, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(number)
    .bind(building)
    .bind(capacity)
    .bind(now)
    .fetch_one(db)
    .await?;

    Ok(Room::try_from(row)?)
}

/// `name` defaults to the code when the subject is first created.
pub async fn find_or_create_subject(
    db: &SqlitePool,
    code: &str,
    name: Option<&str>,
) -> Result<Subject, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let row = sqlx::query_as::<_, SubjectRow>(
        r#"
        INSERT INTO subjects (id, code, name, description, credit_hours, created_at, updated_at)
        VALUES (?1, ?2, ?3, NULL, NULL, ?4, ?4)
        ON CONFLICT(code) DO UPDATE SET code = excluded.code
        RETURNING id, code, name, description, credit_hours, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(name.unwrap_or(code))
    .bind(now)
    .fetch_one(db)
    .await?;

    Ok(Subject::try_from(row)?)
}

/// Keyed on the `(start, end)` pair. The period is recomputed from the start
/// time and written on every call, so stored periods follow the current
/// mapping.
pub async fn find_or_create_time_slot(
    db: &SqlitePool,
    start_time: TimeOfDay,
    end_time: TimeOfDay,
) -> Result<TimeSlot, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let period = time_resolver::period_of(start_time);

    let row = sqlx::query_as::<_, TimeSlotRow>(
        r#"
        INSERT INTO time_slots (id, start_time, end_time, period, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT(start_time, end_time) DO UPDATE SET
            period = excluded.period,
            updated_at = CASE
                WHEN time_slots.period = excluded.period THEN time_slots.updated_at
                ELSE excluded.updated_at
            END
        RETURNING id, start_time, end_time, period, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(start_time.to_string())
    .bind(end_time.to_string())
    .bind(period.as_db())
    .bind(now)
    .fetch_one(db)
    .await?;

    Ok(TimeSlot::try_from(row)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::Period;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    async fn count(db: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(db)
            .await
            .expect("Failed to count rows")
    }

    #[tokio::test]
    async fn test_teacher_reconciles_to_same_row() {
        let pool = db::memory_pool().await.expect("Failed to create test db");

        let first = find_or_create_teacher(&pool, "KRIS").await.expect("first upsert");
        let second = find_or_create_teacher(&pool, "KRIS").await.expect("second upsert");

        assert_eq!(first.id, second.id);
        assert_eq!(count(&pool, "teachers").await, 1);
    }

    /// File-backed pool with several connections, so spawned tasks really
    /// race each other.
    async fn file_pool() -> (SqlitePool, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("timetable-reconcile-{}.db", Uuid::new_v4()));
        let pool = db::connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .expect("Failed to create file db");
        (pool, path)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reconciliation_yields_one_row() {
        let (pool, path) = file_pool().await;

        let mut teachers = Vec::new();
        let mut slots = Vec::new();
        for _ in 0..32 {
            let pool_a = pool.clone();
            teachers.push(tokio::spawn(async move { find_or_create_teacher(&pool_a, "KRIS").await }));
            let pool_b = pool.clone();
            slots.push(tokio::spawn(async move {
                find_or_create_time_slot(&pool_b, t("6:45"), t("7:45")).await
            }));
        }

        let mut teacher_ids = std::collections::HashSet::new();
        for handle in teachers {
            teacher_ids.insert(handle.await.expect("task panicked").expect("upsert failed").id);
        }
        let mut slot_ids = std::collections::HashSet::new();
        for handle in slots {
            slot_ids.insert(handle.await.expect("task panicked").expect("upsert failed").id);
        }

        assert_eq!(teacher_ids.len(), 1);
        assert_eq!(slot_ids.len(), 1);
        assert_eq!(count(&pool, "teachers").await, 1);
        assert_eq!(count(&pool, "time_slots").await, 1);

        pool.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_descriptive_fields_only_on_first_insert() {
        let pool = db::memory_pool().await.expect("Failed to create test db");

        let created = find_or_create_subject(&pool, "E+L", Some("Electronics and Lab"))
            .await
            .expect("create");
        let again = find_or_create_subject(&pool, "E+L", Some("Something else"))
            .await
            .expect("reconcile");
        assert_eq!(again.id, created.id);
        assert_eq!(again.name, "Electronics and Lab");

        let defaulted = find_or_create_subject(&pool, "M A", None).await.expect("create");
        assert_eq!(defaulted.name, "M A");

        let room = find_or_create_room(&pool, "3J", Some("Main"), Some(40)).await.expect("room");
        let room_again = find_or_create_room(&pool, "3J", None, None).await.expect("room again");
        assert_eq!(room_again.building.as_deref(), Some("Main"));
        assert_eq!(room_again.capacity, Some(40));
        assert_eq!(room.id, room_again.id);
    }

    #[tokio::test]
    async fn test_time_slot_keyed_on_canonical_pair() {
        let pool = db::memory_pool().await.expect("Failed to create test db");

        let a = find_or_create_time_slot(&pool, t("5:45"), t("6:45")).await.expect("slot");
        let b = find_or_create_time_slot(&pool, t("05:45"), t("06:45")).await.expect("slot");

        assert_eq!(a.id, b.id);
        assert_eq!(a.period, Period::First);
        assert_eq!(a.start_time.to_string(), "5:45");
        assert_eq!(count(&pool, "time_slots").await, 1);
    }

    #[tokio::test]
    async fn test_time_slot_period_self_heals() {
        let pool = db::memory_pool().await.expect("Failed to create test db");

        let slot = find_or_create_time_slot(&pool, t("7:45"), t("8:45")).await.expect("slot");
        sqlx::query("UPDATE time_slots SET period = 'FIRST_PERIOD' WHERE id = ?")
            .bind(&slot.id)
            .execute(&pool)
            .await
            .expect("corrupt period");

        let healed = find_or_create_time_slot(&pool, t("7:45"), t("8:45")).await.expect("slot");
        assert_eq!(healed.id, slot.id);
        assert_eq!(healed.period, Period::Third);
    }
}
