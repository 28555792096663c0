use tracing::info;

use crate::error::AppError;
use crate::models::{NewScheduleRequest, Period};
use crate::services::ScheduleService;

/// Subject codes with their full names.
const SUBJECTS: &[(&str, &str)] = &[
    ("E+L", "Electronics and Lab"),
    ("CND II", "Computer Networks and Distributions II"),
    ("CA II", "Computer Algorithms II"),
    ("E COM", "E-Commerce"),
    ("ADV PP", "Advanced Probabilistic Programming"),
    ("J IREP", "Java Integration and REP"),
    ("ENG 7", "English 7"),
    ("LIN II", "Linear Algebra II"),
    ("M A", "Mobile Applications"),
];

/// (day, period, teacher, room, subject code)
const WEEK: &[(&str, Period, &str, &str, &str)] = &[
    ("monday", Period::First, "SEM", "2C", "E+L"),
    ("monday", Period::Second, "LIM", "2L", "J IREP"),
    ("monday", Period::Third, "PHILIPPE", "2J", "ADV PP"),
    ("tuesday", Period::First, "SYDETH", "2I", "CND II"),
    ("tuesday", Period::Second, "LIM", "2B", "J IREP"),
    ("tuesday", Period::Third, "KRIS", "2B", "LIN II"),
    ("wednesday", Period::First, "PISETH", "2L", "CA II"),
    ("wednesday", Period::Second, "DS", "3J", "ENG 7"),
    ("wednesday", Period::Third, "SUM", "3J", "M A"),
    ("thursday", Period::First, "CS", "2B", "E COM"),
    ("thursday", Period::Second, "PISETH", "2B", "CA II"),
    ("thursday", Period::Third, "SUM", "1B", "M A"),
    ("friday", Period::First, "PHILIPPE", "1B", "ADV PP"),
    ("friday", Period::Second, "SEM", "3D", "E+L"),
    ("friday", Period::Third, "DS", "3D", "ENG 7"),
    ("saturday", Period::First, "CS", "1E", "E COM"),
    ("saturday", Period::Second, "KRIS", "1G", "LIN II"),
    ("saturday", Period::Third, "SYDETH", "3I", "CND II"),
];

fn subject_name(code: &str) -> Option<String> {
    SUBJECTS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
}

/// Load the demo week into an empty timetable. Returns how many entries were
/// created; an already populated timetable is left alone.
pub async fn seed_demo_timetable(service: &ScheduleService) -> Result<usize, AppError> {
    if !service.list_all().await?.is_empty() {
        info!("Timetable already has entries, skipping seed");
        return Ok(0);
    }

    for (day, period, teacher, room, subject) in WEEK {
        let schedule = service
            .create(NewScheduleRequest {
                teacher_name: teacher.to_string(),
                room: room.to_string(),
                start_time: period.start().to_string(),
                end_time: period.end().to_string(),
                day: day.to_string(),
                subject: subject.to_string(),
                subject_name: subject_name(subject),
                semester: Some("1".to_string()),
                year: Some("4".to_string()),
            })
            .await?;
        info!("Created schedule with ID: {}", schedule.id);
    }

    info!("Seeding completed: {} entries", WEEK.len());
    Ok(WEEK.len())
}
