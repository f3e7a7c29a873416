//! Schedule projection.
//!
//! The schedule is a pure read over class sessions relative to a reference
//! date `D` and wall-clock time `T`:
//!
//! - week: Monday of `D`'s week through the following Sunday
//! - today: sessions on `D`
//! - active: today's sessions with `start_time <= T <= end_time`
//! - upcoming: today's sessions with `start_time > T`

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::class_sessions::ClassSessionDetail;

/// Monday-to-Sunday week containing `date`.
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (start, start + Duration::days(6))
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleQuery {
    /// Reference date, defaults to today
    #[param(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    /// Reference time of day, defaults to now
    #[param(value_type = Option<String>, example = "10:30")]
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduleView {
    pub reference_date: NaiveDate,
    #[schema(value_type = String)]
    pub reference_time: NaiveTime,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub week_sessions: Vec<ClassSessionDetail>,
    pub today_sessions: Vec<ClassSessionDetail>,
    pub active_sessions: Vec<ClassSessionDetail>,
    pub upcoming_sessions: Vec<ClassSessionDetail>,
}

impl ScheduleView {
    /// Projects sessions onto the week of `date`. Sessions outside the week
    /// are dropped; input order is kept within each group.
    pub fn project(date: NaiveDate, time: NaiveTime, sessions: Vec<ClassSessionDetail>) -> Self {
        let (week_start, week_end) = week_range(date);

        let week_sessions: Vec<ClassSessionDetail> = sessions
            .into_iter()
            .filter(|s| s.session.date >= week_start && s.session.date <= week_end)
            .collect();

        let today_sessions: Vec<ClassSessionDetail> = week_sessions
            .iter()
            .filter(|s| s.session.date == date)
            .cloned()
            .collect();

        let active_sessions = today_sessions
            .iter()
            .filter(|s| s.session.start_time <= time && time <= s.session.end_time)
            .cloned()
            .collect();

        let upcoming_sessions = today_sessions
            .iter()
            .filter(|s| s.session.start_time > time)
            .cloned()
            .collect();

        Self {
            reference_date: date,
            reference_time: time,
            week_start,
            week_end,
            week_sessions,
            today_sessions,
            active_sessions,
            upcoming_sessions,
        }
    }
}
