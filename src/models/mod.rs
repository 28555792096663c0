pub mod day;
pub mod reference;
pub mod schedule;
pub mod teacher;
pub mod time;
pub mod validate;

pub use day::Day;
pub use reference::{PeriodInfo, Room, Subject, TimeSlot};
pub use schedule::{
    CurrentClass, CurrentClassResponse, NewSchedule, NewScheduleRequest, Schedule, ScheduleChanges,
    ScheduleResponse, UpdateScheduleRequest,
};
pub use teacher::{NewTeacherRequest, Teacher, TeacherResponse, UpdateAvatarRequest, UpdateTeacherRequest};
pub use time::{Period, TimeOfDay};
