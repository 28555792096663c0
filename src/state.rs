use std::sync::Arc;
use std::time::Instant;

use sqlx::SqlitePool;

use crate::services::{Clock, ScheduleService, TeacherService};
use crate::upload::AvatarStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub clock: Arc<dyn Clock>,
    pub avatars: Arc<dyn AvatarStore>,
    /// When the process came up; reported as uptime on `/`.
    pub started_at: Instant,
}

impl AppState {
    pub fn schedules(&self) -> ScheduleService {
        ScheduleService::new(self.db.clone(), self.clock.clone())
    }

    pub fn teachers(&self) -> TeacherService {
        TeacherService::new(self.db.clone(), self.avatars.clone())
    }
}
