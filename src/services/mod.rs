pub mod schedule_service;
pub mod seed;
pub mod teacher_service;
pub mod time_resolver;

pub use schedule_service::ScheduleService;
pub use teacher_service::TeacherService;
pub use time_resolver::{Clock, FixedClock, SystemClock};
