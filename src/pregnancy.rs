mod milestones;

pub use milestones::{DEFAULT_MILESTONE, Milestone, milestone_for};

use chrono::{DateTime, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days from conception to the estimated due date (280 days from LMP).
pub const DAYS_TO_DUE: u64 = 266;
/// Oldest accepted conception date, in days before today (42 weeks).
pub const MAX_DAYS_SINCE_CONCEPTION: i64 = 294;
/// Latest accepted conception date, in days after today.
pub const MAX_DAYS_IN_FUTURE: i64 = 1;
/// Weeks between last menstrual period and conception.
const LMP_OFFSET_WEEKS: i64 = 2;
pub const MAX_WEEK: u32 = 44;

pub const INVALID_DATE_MESSAGE: &str =
    "Please enter when you conceived - this should be in the past, up to 10 months ago.";

/// Gestational week for a conception date, or 0 when the date is outside
/// the accepted window.
pub fn compute_week(conception: NaiveDate, today: NaiveDate) -> u32 {
    let days = today.signed_duration_since(conception).num_days();
    if days < -MAX_DAYS_IN_FUTURE || days > MAX_DAYS_SINCE_CONCEPTION {
        return 0;
    }

    let weeks = (days as f64 / 7.0).round() as i64;
    (weeks + LMP_OFFSET_WEEKS).clamp(0, MAX_WEEK as i64) as u32
}

/// Same as [`compute_week`] after dropping the time of day from both instants.
pub fn compute_week_at(conception: DateTime<Local>, now: DateTime<Local>) -> u32 {
    compute_week(conception.date_naive(), now.date_naive())
}

pub fn due_date(conception: NaiveDate) -> NaiveDate {
    conception
        .checked_add_days(Days::new(DAYS_TO_DUE))
        .unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermStatus {
    WeeksRemaining(u32),
    FullTerm,
    DueNow,
    Overdue(u32),
}

impl TermStatus {
    pub fn for_week(week: u32) -> Self {
        match week {
            w if w > 40 => Self::Overdue(w - 40),
            40 => Self::DueNow,
            37..=39 => Self::FullTerm,
            w => Self::WeeksRemaining(40 - w),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::WeeksRemaining(n) => format!("{} weeks until due date", n),
            Self::FullTerm => "Full Term - baby can safely arrive anytime".to_string(),
            Self::DueNow => "Due date arrived!".to_string(),
            Self::Overdue(1) => "1 week past due date".to_string(),
            Self::Overdue(n) => format!("{} weeks past due date", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyRecord {
    pub conception_date: NaiveDate,
    pub due_date: NaiveDate,
    pub current_week: u32,
    pub baby_size: String,
    pub milestone: String,
}

impl PregnancyRecord {
    pub fn from_conception(conception_date: NaiveDate, today: NaiveDate) -> Self {
        let current_week = compute_week(conception_date, today);
        let milestone = milestone_for(current_week).unwrap_or(&DEFAULT_MILESTONE);

        Self {
            conception_date,
            due_date: due_date(conception_date),
            current_week,
            baby_size: milestone.baby_size.to_string(),
            milestone: milestone.milestone.to_string(),
        }
    }

    /// Recomputes the derived fields against a new `today`.
    pub fn refreshed(&self, today: NaiveDate) -> Self {
        Self::from_conception(self.conception_date, today)
    }

    pub fn is_valid(&self) -> bool {
        self.current_week > 0
    }

    /// Inline message to show next to the date input, if any.
    pub fn validation_message(&self) -> Option<&'static str> {
        (!self.is_valid()).then_some(INVALID_DATE_MESSAGE)
    }

    pub fn term_status(&self) -> Option<TermStatus> {
        self.is_valid()
            .then(|| TermStatus::for_week(self.current_week))
    }

    pub fn share_message(&self) -> String {
        format!("🤱 Week {} Update: {}", self.current_week, self.milestone)
    }
}
