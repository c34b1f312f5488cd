//! Projection of a schedule's time-unit offsets onto calendar dates.
//!
//! One time unit is one day. No working-day calendar is applied.

use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::critical_path::Schedule;
use crate::models::CalendarTiming;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Offset {offset} for task {task} is outside the supported date range")]
    OutOfRange { task: String, offset: i64 },
}

fn shift(start: NaiveDate, task: &str, offset: i64) -> Result<NaiveDate, CalendarError> {
    let out_of_range = || CalendarError::OutOfRange {
        task: task.to_string(),
        offset,
    };
    let days = u64::try_from(offset).map_err(|_| out_of_range())?;
    start.checked_add_days(Days::new(days)).ok_or_else(out_of_range)
}

/// Dated rows for every task, ordered by earliest start then id.
pub fn project_onto_calendar(
    schedule: &Schedule,
    start: NaiveDate,
) -> Result<Vec<CalendarTiming>, CalendarError> {
    schedule
        .timings()
        .into_iter()
        .map(|(id, timing)| {
            Ok(CalendarTiming {
                task_id: id.to_string(),
                earliest_start: shift(start, id, timing.earliest_start)?,
                earliest_finish: shift(start, id, timing.earliest_finish)?,
                latest_start: shift(start, id, timing.latest_start)?,
                latest_finish: shift(start, id, timing.latest_finish)?,
                is_critical: timing.is_critical(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PassConfig;
    use crate::critical_path::compute_schedule;
    use crate::models::TaskSpec;

    fn make_date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_dates_follow_offsets() {
        let schedule = compute_schedule(
            vec![
                TaskSpec::new("design", 3, Vec::<String>::new()),
                TaskSpec::new("docs", 1, Vec::<String>::new()),
                TaskSpec::new("build", 5, ["design"]),
            ],
            &PassConfig::default(),
        )
        .unwrap();

        let rows = project_onto_calendar(&schedule, make_date(2025, 1, 30)).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["design", "docs", "build"]);

        let build = &rows[2];
        assert_eq!(build.earliest_start, make_date(2025, 2, 2));
        assert_eq!(build.earliest_finish, make_date(2025, 2, 7));
        assert!(build.is_critical);

        // docs has 7 days of slack and must finish by the makespan
        let docs = &rows[1];
        assert_eq!(docs.latest_start, make_date(2025, 2, 6));
        assert_eq!(docs.latest_finish, make_date(2025, 2, 7));
        assert!(!docs.is_critical);
    }

    #[test]
    fn test_out_of_range_error() {
        let schedule = compute_schedule(
            vec![TaskSpec::new("forever", 10_000, Vec::<String>::new())],
            &PassConfig::default(),
        )
        .unwrap();

        let result = project_onto_calendar(&schedule, NaiveDate::MAX - Days::new(5));
        assert!(matches!(result, Err(CalendarError::OutOfRange { .. })));
    }
}
