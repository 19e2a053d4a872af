// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local-day arithmetic.
//!
//! Reports bucket events by the calendar day and hour of the host time zone,
//! or of a fixed offset when one is configured.

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc,
};

use cadence_config::model::AnalyticsConfig;
use cadence_core::TimeRange;

/// Time zone used to cut the timeline into days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayClock {
    Local,
    Fixed(FixedOffset),
}

impl DayClock {
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        config
            .utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .map(DayClock::Fixed)
            .unwrap_or(DayClock::Local)
    }

    pub fn utc() -> Self {
        FixedOffset::east_opt(0)
            .map(DayClock::Fixed)
            .unwrap_or(DayClock::Local)
    }

    /// The local calendar date containing `at`.
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        match self {
            DayClock::Local => at.with_timezone(&Local).date_naive(),
            DayClock::Fixed(offset) => at.with_timezone(offset).date_naive(),
        }
    }

    /// The local hour (0–23) of `at`.
    pub fn hour_of(&self, at: DateTime<Utc>) -> u32 {
        match self {
            DayClock::Local => at.with_timezone(&Local).hour(),
            DayClock::Fixed(offset) => at.with_timezone(offset).hour(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }

    /// `[start of date, start of next date)` in UTC.
    pub fn day_range(&self, date: NaiveDate) -> TimeRange {
        let start = self.start_of(date);
        let end = date
            .succ_opt()
            .map(|next| self.start_of(next))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        TimeRange::new(start, end)
    }

    fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self {
            DayClock::Local => first_instant(&Local, midnight),
            DayClock::Fixed(offset) => first_instant(offset, midnight),
        }
    }
}

/// Earliest instant at or after local `naive`. Midnight can fall in a DST gap,
/// in which case the day starts at the end of the gap.
fn first_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = naive;
    for _ in 0..4 {
        if let Some(at) = tz.from_local_datetime(&candidate).earliest() {
            return at.with_timezone(&Utc);
        }
        candidate += Duration::minutes(30);
    }
    Utc.from_utc_datetime(&naive)
}
