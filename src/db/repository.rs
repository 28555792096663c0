use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::rows::ScheduleRow;
use crate::models::{Day, Period, Schedule};

/// Schedules joined with every reference row they point at.
const SCHEDULE_SELECT: &str = r#"
    SELECT
        s.id, s.day, s.semester, s.year, s.created_at, s.updated_at,
        t.id AS teacher_id, t.name AS teacher_name, t.avatar AS teacher_avatar,
        t.created_at AS teacher_created_at, t.updated_at AS teacher_updated_at,
        r.id AS room_id, r.number AS room_number, r.building AS room_building,
        r.capacity AS room_capacity,
        r.created_at AS room_created_at, r.updated_at AS room_updated_at,
        sub.id AS subject_id, sub.code AS subject_code, sub.name AS subject_name,
        sub.description AS subject_description, sub.credit_hours AS subject_credit_hours,
        sub.created_at AS subject_created_at, sub.updated_at AS subject_updated_at,
        ts.id AS time_slot_id, ts.start_time AS time_slot_start_time,
        ts.end_time AS time_slot_end_time, ts.period AS time_slot_period,
        ts.created_at AS time_slot_created_at, ts.updated_at AS time_slot_updated_at
    FROM schedules s
    JOIN teachers t ON t.id = s.teacher_id
    JOIN rooms r ON r.id = s.room_id
    JOIN subjects sub ON sub.id = s.subject_id
    JOIN time_slots ts ON ts.id = s.time_slot_id
"#;

/// Monday to Saturday, then first to third period.
const SCHEDULE_ORDER: &str = r#"
    ORDER BY
        CASE s.day
            WHEN 'MONDAY' THEN 1
            WHEN 'TUESDAY' THEN 2
            WHEN 'WEDNESDAY' THEN 3
            WHEN 'THURSDAY' THEN 4
            WHEN 'FRIDAY' THEN 5
            WHEN 'SATURDAY' THEN 6
        END,
        CASE ts.period
            WHEN 'FIRST_PERIOD' THEN 1
            WHEN 'SECOND_PERIOD' THEN 2
            WHEN 'THIRD_PERIOD' THEN 3
        END,
        s.created_at, s.id
"#;

/// Foreign keys and plain columns for a schedule row.
#[derive(Debug, Clone)]
pub struct ScheduleLinks {
    pub teacher_id: String,
    pub room_id: String,
    pub subject_id: String,
    pub time_slot_id: String,
    pub day: Day,
    pub semester: Option<String>,
    pub year: Option<String>,
}

fn hydrate(rows: Vec<ScheduleRow>) -> Result<Vec<Schedule>, sqlx::Error> {
    rows.into_iter()
        .map(|row| Schedule::try_from(row).map_err(sqlx::Error::from))
        .collect()
}

pub async fn fetch_schedules(db: &SqlitePool) -> Result<Vec<Schedule>, sqlx::Error> {
    let sql = format!("{} {}", SCHEDULE_SELECT, SCHEDULE_ORDER);
    let rows = sqlx::query_as::<_, ScheduleRow>(&sql).fetch_all(db).await?;
    hydrate(rows)
}

pub async fn fetch_schedules_by_day(db: &SqlitePool, day: Day) -> Result<Vec<Schedule>, sqlx::Error> {
    let sql = format!("{} WHERE s.day = ?1 {}", SCHEDULE_SELECT, SCHEDULE_ORDER);
    let rows = sqlx::query_as::<_, ScheduleRow>(&sql)
        .bind(day.as_db())
        .fetch_all(db)
        .await?;
    hydrate(rows)
}

pub async fn find_schedule_by_id(db: &SqlitePool, id: &str) -> Result<Option<Schedule>, sqlx::Error> {
    let sql = format!("{} WHERE s.id = ?1", SCHEDULE_SELECT);
    let row = sqlx::query_as::<_, ScheduleRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    row.map(|r| Schedule::try_from(r).map_err(sqlx::Error::from))
        .transpose()
}

/// Earliest-created entry for `(day, period)`, if any.
pub async fn find_schedule_by_day_and_period(
    db: &SqlitePool,
    day: Day,
    period: Period,
) -> Result<Option<Schedule>, sqlx::Error> {
    let sql = format!(
        "{} WHERE s.day = ?1 AND ts.period = ?2 ORDER BY s.created_at, s.id LIMIT 1",
        SCHEDULE_SELECT
    );
    let row = sqlx::query_as::<_, ScheduleRow>(&sql)
        .bind(day.as_db())
        .bind(period.as_db())
        .fetch_optional(db)
        .await?;

    row.map(|r| Schedule::try_from(r).map_err(sqlx::Error::from))
        .transpose()
}

/// Entries are deliberately not unique on (teacher, room, day, slot).
pub async fn insert_schedule(db: &SqlitePool, links: ScheduleLinks) -> Result<Schedule, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO schedules
            (id, teacher_id, room_id, subject_id, time_slot_id,
            day, semester, year, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
        "#,
    )
    .bind(&id)
    .bind(&links.teacher_id)
    .bind(&links.room_id)
    .bind(&links.subject_id)
    .bind(&links.time_slot_id)
    .bind(links.day.as_db())
    .bind(&links.semester)
    .bind(&links.year)
    .bind(&now)
    .execute(db)
    .await?;

    find_schedule_by_id(db, &id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Overwrite every column of an existing entry. `RowNotFound` when `id` does
/// not exist.
pub async fn update_schedule(
    db: &SqlitePool,
    id: &str,
    links: ScheduleLinks,
) -> Result<Schedule, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let affected = sqlx::query(
        r#"
        UPDATE schedules
        SET teacher_id = ?1,
            room_id = ?2,
            subject_id = ?3,
            time_slot_id = ?4,
            day = ?5,
            semester = ?6,
            year = ?7,
            updated_at = ?8
        WHERE id = ?9
        "#,
    )
    .bind(&links.teacher_id)
    .bind(&links.room_id)
    .bind(&links.subject_id)
    .bind(&links.time_slot_id)
    .bind(links.day.as_db())
    .bind(&links.semester)
    .bind(&links.year)
    .bind(&now)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    find_schedule_by_id(db, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Delete an entry and return what it looked like. Reference rows are kept.
pub async fn delete_schedule(db: &SqlitePool, id: &str) -> Result<Schedule, sqlx::Error> {
    let snapshot = find_schedule_by_id(db, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    let affected = sqlx::query("DELETE FROM schedules WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, reconciler};

    async fn links(db: &SqlitePool, teacher: &str, day: Day, period: Period) -> ScheduleLinks {
        let teacher = reconciler::find_or_create_teacher(db, teacher).await.expect("teacher");
        let room = reconciler::find_or_create_room(db, "2B", None, None).await.expect("room");
        let subject = reconciler::find_or_create_subject(db, "CA II", None).await.expect("subject");
        let slot = reconciler::find_or_create_time_slot(db, period.start(), period.end())
            .await
            .expect("slot");
        ScheduleLinks {
            teacher_id: teacher.id,
            room_id: room.id,
            subject_id: subject.id,
            time_slot_id: slot.id,
            day,
            semester: Some("1".to_string()),
            year: Some("4".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_schedule() {
        let pool = db::memory_pool().await.expect("Failed to create test db");

        let l = links(&pool, "PISETH", Day::Thursday, Period::Second).await;
        let schedule = insert_schedule(&pool, l).await.expect("Failed to insert schedule");

        assert_eq!(schedule.teacher.name, "PISETH");
        assert_eq!(schedule.room.number, "2B");
        assert_eq!(schedule.time_slot.period, Period::Second);
        assert_eq!(schedule.day, Day::Thursday);

        let found = find_schedule_by_id(&pool, &schedule.id)
            .await
            .expect("Failed to fetch schedule")
            .expect("Schedule not found");
        assert_eq!(found, schedule);
    }

    #[tokio::test]
    async fn test_fetch_orders_by_day_then_period() {
        let pool = db::memory_pool().await.expect("Failed to create test db");

        for (day, period) in [
            (Day::Saturday, Period::First),
            (Day::Monday, Period::Third),
            (Day::Tuesday, Period::First),
            (Day::Monday, Period::First),
        ] {
            let l = links(&pool, "KRIS", day, period).await;
            insert_schedule(&pool, l).await.expect("insert");
        }

        let order: Vec<(Day, Period)> = fetch_schedules(&pool)
            .await
            .expect("fetch")
            .into_iter()
            .map(|s| (s.day, s.time_slot.period))
            .collect();

        assert_eq!(
            order,
            vec![
                (Day::Monday, Period::First),
                (Day::Monday, Period::Third),
                (Day::Tuesday, Period::First),
                (Day::Saturday, Period::First),
            ]
        );

        let monday = fetch_schedules_by_day(&pool, Day::Monday).await.expect("fetch by day");
        assert_eq!(monday.len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let pool = db::memory_pool().await.expect("Failed to create test db");
        let l = links(&pool, "KRIS", Day::Monday, Period::First).await;

        let err = update_schedule(&pool, "missing", l).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));

        let err = delete_schedule(&pool, "missing").await.unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_delete_keeps_reference_rows() {
        let pool = db::memory_pool().await.expect("Failed to create test db");
        let l = links(&pool, "SUM", Day::Wednesday, Period::Third).await;
        let schedule = insert_schedule(&pool, l).await.expect("insert");

        let deleted = delete_schedule(&pool, &schedule.id).await.expect("delete");
        assert_eq!(deleted.id, schedule.id);
        assert!(find_schedule_by_id(&pool, &schedule.id).await.expect("fetch").is_none());

        let teachers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(teachers, 1);
    }
}
