use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::db::reconciler;
use crate::db::repository::{self, ScheduleLinks};
use crate::error::AppError;
use crate::models::schedule::canonical_period;
use crate::models::{CurrentClass, Day, NewScheduleRequest, Schedule, TimeOfDay, UpdateScheduleRequest};
use crate::services::time_resolver::{self, Clock};

pub struct ScheduleService {
    db: SqlitePool,
    clock: Arc<dyn Clock>,
}

/// Translate a storage failure: a missing row becomes `NotFound`, anything
/// else is logged and surfaced as an opaque `Internal` error.
fn storage_error(err: sqlx::Error, not_found: impl FnOnce() -> String, context: &str) -> AppError {
    match err {
        sqlx::Error::RowNotFound => {
            let message = not_found();
            warn!("{}: {}", context, message);
            AppError::NotFound(message)
        }
        other => {
            error!("{}: {}", context, other);
            AppError::Internal(context.to_string())
        }
    }
}

fn schedule_not_found(id: &str) -> impl FnOnce() -> String + '_ {
    move || format!("Schedule with ID {} not found", id)
}

impl ScheduleService {
    pub fn new(db: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Reconcile the four reference rows, then insert the entry.
    ///
    /// Reference rows created before a later failure stay in place.
    pub async fn create(&self, req: NewScheduleRequest) -> Result<Schedule, AppError> {
        let new = req.validate()?;
        info!(
            "Creating schedule: {} / {} / {} on {} at {}",
            new.teacher_name, new.room, new.subject, new.day, new.start_time
        );

        let result: Result<Schedule, sqlx::Error> = async {
            let teacher = reconciler::find_or_create_teacher(&self.db, &new.teacher_name).await?;
            let room = reconciler::find_or_create_room(&self.db, &new.room, None, None).await?;
            let subject = reconciler::find_or_create_subject(
                &self.db,
                &new.subject,
                new.subject_name.as_deref(),
            )
            .await?;
            let time_slot =
                reconciler::find_or_create_time_slot(&self.db, new.start_time, new.end_time).await?;

            repository::insert_schedule(
                &self.db,
                ScheduleLinks {
                    teacher_id: teacher.id,
                    room_id: room.id,
                    subject_id: subject.id,
                    time_slot_id: time_slot.id,
                    day: new.day,
                    semester: new.semester.clone(),
                    year: new.year.clone(),
                },
            )
            .await
        }
        .await;

        result.map_err(|e| {
            error!("Failed to create schedule: {}", e);
            AppError::Internal("Failed to create schedule".to_string())
        })
    }

    pub async fn list_all(&self) -> Result<Vec<Schedule>, AppError> {
        repository::fetch_schedules(&self.db).await.map_err(|e| {
            storage_error(e, || "Schedule not found".to_string(), "Failed to retrieve schedule data")
        })
    }

    /// Entries for one day. An unknown day is a not-found condition naming
    /// the day as given.
    pub async fn list_by_day(&self, day: &str) -> Result<Vec<Schedule>, AppError> {
        let parsed: Day = day.parse().map_err(|_| {
            warn!("Rejected schedule lookup for invalid day: {}", day);
            AppError::NotFound(format!("Invalid day: {}", day))
        })?;

        repository::fetch_schedules_by_day(&self.db, parsed)
            .await
            .map_err(|e| {
                storage_error(
                    e,
                    || format!("Invalid day: {}", day),
                    &format!("Failed to retrieve schedule data for day: {}", day),
                )
            })
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Schedule, AppError> {
        repository::find_schedule_by_id(&self.db, id)
            .await
            .map_err(|e| {
                storage_error(
                    e,
                    schedule_not_found(id),
                    &format!("Failed to retrieve schedule with ID: {}", id),
                )
            })?
            .ok_or_else(|| AppError::NotFound(schedule_not_found(id)()))
    }

    /// What is in session right now.
    ///
    /// Sunday short-circuits without touching storage. Otherwise the current
    /// time is bucketed into a period and the matching entry is returned if
    /// the clock actually falls inside its slot.
    pub async fn current_class(&self) -> Result<CurrentClass, AppError> {
        let now = self.clock.now();

        let Some(day) = time_resolver::day_of(now) else {
            info!("Current class requested on Sunday");
            return Ok(CurrentClass::sunday());
        };

        let period = time_resolver::resolve_current_period(TimeOfDay::from(now.time()));
        let found = repository::find_schedule_by_day_and_period(&self.db, day, period)
            .await
            .map_err(|e| {
                storage_error(e, || "No current class".to_string(), "Failed to determine current class")
            })?;

        match found {
            Some(schedule) if time_resolver::is_in_session(&schedule, now) => {
                Ok(CurrentClass::InSession(Box::new(schedule)))
            }
            _ => Ok(CurrentClass::none()),
        }
    }

    /// Apply the fields that are present. Each present reference field is
    /// re-reconciled; the others keep their current rows.
    pub async fn update(&self, id: &str, req: UpdateScheduleRequest) -> Result<Schedule, AppError> {
        let changes = req.validate()?;
        let existing = self.get_by_id(id).await?;

        let slot_change = if changes.start_time.is_some() || changes.end_time.is_some() {
            let start = changes.start_time.unwrap_or(existing.time_slot.start_time);
            let end = changes.end_time.unwrap_or(existing.time_slot.end_time);
            canonical_period(start, end)?;
            Some((start, end))
        } else {
            None
        };

        info!("Updating schedule with ID: {}", id);
        let result: Result<Schedule, sqlx::Error> = async {
            let teacher_id = match &changes.teacher_name {
                Some(name) => reconciler::find_or_create_teacher(&self.db, name).await?.id,
                None => existing.teacher.id.clone(),
            };
            let room_id = match &changes.room {
                Some(number) => reconciler::find_or_create_room(&self.db, number, None, None).await?.id,
                None => existing.room.id.clone(),
            };
            let subject_id = match &changes.subject {
                Some(code) => reconciler::find_or_create_subject(&self.db, code, None).await?.id,
                None => existing.subject.id.clone(),
            };
            let time_slot_id = match slot_change {
                Some((start, end)) => reconciler::find_or_create_time_slot(&self.db, start, end).await?.id,
                None => existing.time_slot.id.clone(),
            };

            repository::update_schedule(
                &self.db,
                id,
                ScheduleLinks {
                    teacher_id,
                    room_id,
                    subject_id,
                    time_slot_id,
                    day: changes.day.unwrap_or(existing.day),
                    semester: changes.semester.clone().or_else(|| existing.semester.clone()),
                    year: changes.year.clone().or_else(|| existing.year.clone()),
                },
            )
            .await
        }
        .await;

        result.map_err(|e| {
            storage_error(
                e,
                schedule_not_found(id),
                &format!("Failed to update schedule with ID: {}", id),
            )
        })
    }

    /// Delete an entry and return its last state.
    pub async fn delete(&self, id: &str) -> Result<Schedule, AppError> {
        self.get_by_id(id).await?;
        info!("Deleting schedule with ID: {}", id);

        repository::delete_schedule(&self.db, id).await.map_err(|e| {
            storage_error(
                e,
                schedule_not_found(id),
                &format!("Failed to delete schedule with ID: {}", id),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::db;
    use crate::models::Period;
    use crate::services::time_resolver::FixedClock;

    // 2025-05-19 is a Monday.
    fn monday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 19).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn request(teacher: &str, room: &str, start: &str, end: &str, day: &str) -> NewScheduleRequest {
        NewScheduleRequest {
            teacher_name: teacher.to_string(),
            room: room.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            day: day.to_string(),
            subject: "E+L".to_string(),
            subject_name: None,
            semester: Some("1".to_string()),
            year: Some("4".to_string()),
        }
    }

    async fn service_at(at: NaiveDateTime) -> ScheduleService {
        let pool = db::memory_pool().await.expect("Failed to create test db");
        ScheduleService::new(pool, Arc::new(FixedClock(at)))
    }

    async fn count(service: &ScheduleService, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&service.db)
            .await
            .expect("count")
    }

    #[tokio::test]
    async fn test_create_returns_hydrated_entry() {
        let service = service_at(monday_at(6, 0)).await;

        let schedule = service
            .create(request("SEM", "2C", "5:45", "6:45", "monday"))
            .await
            .expect("create");

        assert_eq!(schedule.teacher.name, "SEM");
        assert_eq!(schedule.room.number, "2C");
        assert_eq!(schedule.subject.code, "E+L");
        assert_eq!(schedule.time_slot.period, Period::First);
        assert_eq!(schedule.day, Day::Monday);
        assert_eq!(schedule.semester.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_storage() {
        let service = service_at(monday_at(6, 0)).await;

        let err = service
            .create(request("SEM", "2C", "9:00", "6:45", "monday"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(count(&service, "teachers").await, 0);
    }

    #[tokio::test]
    async fn test_list_by_day_is_case_insensitive() {
        let service = service_at(monday_at(6, 0)).await;
        service.create(request("KRIS", "2B", "7:45", "8:45", "tuesday")).await.expect("create");
        service.create(request("LIM", "2B", "6:45", "7:45", "tuesday")).await.expect("create");
        service.create(request("SEM", "2C", "5:45", "6:45", "monday")).await.expect("create");

        let lower = service.list_by_day("tuesday").await.expect("lower");
        let upper = service.list_by_day("TUESDAY").await.expect("upper");

        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 2);
        assert_eq!(lower[0].teacher.name, "LIM");
        assert_eq!(lower[1].teacher.name, "KRIS");
    }

    #[tokio::test]
    async fn test_list_by_unknown_day_is_not_found() {
        let service = service_at(monday_at(6, 0)).await;

        let err = service.list_by_day("funday").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg.contains("funday")));
    }

    #[tokio::test]
    async fn test_get_missing_id_is_not_found() {
        let service = service_at(monday_at(6, 0)).await;

        let err = service.get_by_id("nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg.contains("nope")));
    }

    #[tokio::test]
    async fn test_current_class_scenario() {
        let pool = db::memory_pool().await.expect("Failed to create test db");
        let at_six = ScheduleService::new(pool.clone(), Arc::new(FixedClock(monday_at(6, 0))));
        let at_seven = ScheduleService::new(pool, Arc::new(FixedClock(monday_at(7, 0))));

        let created = at_six
            .create(request("SEM", "2C", "5:45", "6:45", "monday"))
            .await
            .expect("create");

        match at_six.current_class().await.expect("current") {
            CurrentClass::InSession(schedule) => assert_eq!(schedule.id, created.id),
            other => panic!("expected a class in session, got {:?}", other),
        }
        assert_eq!(at_seven.current_class().await.expect("current"), CurrentClass::none());
    }

    #[tokio::test]
    async fn test_current_class_outside_school_hours() {
        let pool = db::memory_pool().await.expect("Failed to create test db");
        let early = ScheduleService::new(pool.clone(), Arc::new(FixedClock(monday_at(3, 0))));
        early
            .create(request("SEM", "2C", "5:45", "6:45", "monday"))
            .await
            .expect("create");

        assert_eq!(early.current_class().await.expect("current"), CurrentClass::none());
    }

    #[tokio::test]
    async fn test_sunday_never_touches_storage() {
        // 2025-05-18 is a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2025, 5, 18).unwrap().and_hms_opt(6, 0, 0).unwrap();
        let service = service_at(sunday).await;
        service.db.close().await;

        let result = service.current_class().await.expect("sunday is not an error");
        assert_eq!(result, CurrentClass::sunday());
    }

    #[tokio::test]
    async fn test_update_room_only_keeps_other_references() {
        let service = service_at(monday_at(6, 0)).await;
        let created = service
            .create(request("SEM", "2C", "5:45", "6:45", "monday"))
            .await
            .expect("create");

        let updated = service
            .update(
                &created.id,
                UpdateScheduleRequest {
                    room: Some("3D".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        assert_eq!(updated.room.number, "3D");
        assert_ne!(updated.room.id, created.room.id);
        assert_eq!(updated.teacher.id, created.teacher.id);
        assert_eq!(updated.subject.id, created.subject.id);
        assert_eq!(updated.time_slot.id, created.time_slot.id);
        assert_eq!(updated.day, created.day);
        assert_eq!(updated.semester, created.semester);

        assert_eq!(count(&service, "teachers").await, 1);
        assert_eq!(count(&service, "subjects").await, 1);
        assert_eq!(count(&service, "time_slots").await, 1);
        assert_eq!(count(&service, "rooms").await, 2);
    }

    #[tokio::test]
    async fn test_update_single_time_boundary_must_stay_canonical() {
        let service = service_at(monday_at(6, 0)).await;
        let created = service
            .create(request("SEM", "2C", "5:45", "6:45", "monday"))
            .await
            .expect("create");

        let err = service
            .update(
                &created.id,
                UpdateScheduleRequest {
                    end_time: Some("7:45".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let moved = service
            .update(
                &created.id,
                UpdateScheduleRequest {
                    start_time: Some("6:45".to_string()),
                    end_time: Some("7:45".to_string()),
                    day: Some("Friday".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(moved.time_slot.period, Period::Second);
        assert_eq!(moved.day, Day::Friday);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_id() {
        let service = service_at(monday_at(6, 0)).await;

        let err = service.update("ghost", UpdateScheduleRequest::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg.contains("ghost")));

        let err = service.delete("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_returns_snapshot() {
        let service = service_at(monday_at(6, 0)).await;
        let created = service
            .create(request("SEM", "2C", "5:45", "6:45", "monday"))
            .await
            .expect("create");

        let deleted = service.delete(&created.id).await.expect("delete");
        assert_eq!(deleted, created);
        assert!(matches!(service.get_by_id(&created.id).await, Err(AppError::NotFound(_))));
        assert_eq!(count(&service, "teachers").await, 1);
    }

    #[tokio::test]
    async fn test_double_booking_is_allowed() {
        let service = service_at(monday_at(6, 0)).await;

        let a = service.create(request("SEM", "2C", "5:45", "6:45", "monday")).await.expect("first");
        let b = service.create(request("SEM", "2C", "5:45", "6:45", "monday")).await.expect("second");
        assert_ne!(a.id, b.id);

        let all = service.list_all().await.expect("list");
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|s| s.id == a.id));
        assert!(all.iter().any(|s| s.id == b.id));
        assert_eq!(count(&service, "teachers").await, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal() {
        let service = service_at(monday_at(6, 0)).await;
        service.db.close().await;

        let err = service.list_all().await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let err = service
            .create(request("SEM", "2C", "5:45", "6:45", "monday"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(msg) if msg == "Failed to create schedule"));
    }
}
