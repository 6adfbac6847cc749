//! The moment value: a point in time in a timezone, or an invalid marker.
//!
//! A [`Moment`] never fails to exist. Input that cannot be interpreted yields
//! an invalid moment, which every comparison treats as `false`. Boundary
//! derivation ([`Moment::start_of`], [`Moment::end_of`]) consumes the moment
//! and returns a new one, so comparisons work on clones and the caller's
//! value is never touched.
//!
//! # Buckets
//!
//! - Calendar units (year, quarter, month, week, isoWeek, day, date) are
//!   bucketed on the local wall clock of the moment's timezone. The bucket
//!   ends one millisecond before the next bucket starts.
//! - Hour, minute and second are bucketed by truncating the instant shifted
//!   by the current UTC offset, which keeps both halves of a DST fold in
//!   separate buckets.
//! - Millisecond buckets are the moment itself.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Days, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::Serialize;

use crate::coerce::{parse_local_text, LocalOptions};
use crate::error::MomentError;
use crate::unit::Unit;

// ── Configurable week start ─────────────────────────────────────────────────

/// Which day begins a [`Unit::Week`] bucket.
///
/// Does **not** affect [`Unit::IsoWeek`], which always starts on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    /// ISO 8601 convention.
    Monday,
    /// US/Canada convention.
    #[default]
    Sunday,
}

impl FromStr for WeekStartDay {
    type Err = MomentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" => Ok(WeekStartDay::Monday),
            "sunday" | "sun" => Ok(WeekStartDay::Sunday),
            _ => Err(MomentError::InvalidWeekStart(format!("'{s}'"))),
        }
    }
}

/// How many days `weekday` is from the week-start day.
fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> u64 {
    match week_start {
        WeekStartDay::Monday => u64::from(weekday.num_days_from_monday()),
        WeekStartDay::Sunday => u64::from(weekday.num_days_from_sunday()),
    }
}

// ── Moment ──────────────────────────────────────────────────────────────────

/// A single point in time with a validity flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moment {
    datetime: Option<DateTime<Tz>>,
    week_start: WeekStartDay,
}

impl Moment {
    /// A valid moment at `datetime`.
    pub fn new(datetime: DateTime<Tz>) -> Self {
        Moment {
            datetime: Some(datetime),
            week_start: WeekStartDay::default(),
        }
    }

    /// A moment that represents no point in time.
    pub fn invalid() -> Self {
        Moment {
            datetime: None,
            week_start: WeekStartDay::default(),
        }
    }

    /// A moment at `millis` since the Unix epoch, viewed in `timezone`.
    ///
    /// Out-of-range values produce an invalid moment.
    pub fn from_millis(millis: i64, timezone: Tz) -> Self {
        DateTime::from_timestamp_millis(millis)
            .map(|utc| Moment::new(utc.with_timezone(&timezone)))
            .unwrap_or_else(Moment::invalid)
    }

    /// Strictly parse `text` using the given local options.
    ///
    /// Accepts RFC 3339 with an offset, or a local `YYYY-MM-DD[THH:MM[:SS[.fff]]]`
    /// or `YYYY-MM` interpreted in `options.timezone`.
    ///
    /// # Errors
    ///
    /// Returns [`MomentError::InvalidDatetime`] if the text matches none of the
    /// accepted forms. Use a [`crate::MomentFactory`] for the lenient variant
    /// that yields an invalid moment instead.
    pub fn parse_in(text: &str, options: &LocalOptions) -> crate::error::Result<Self> {
        parse_local_text(text, &options.timezone)
            .map(|dt| Moment::new(dt).with_week_start(options.week_start))
            .ok_or_else(|| MomentError::InvalidDatetime(format!("'{}'", text.trim())))
    }

    /// Replace the week-start day used for [`Unit::Week`] buckets.
    pub fn with_week_start(mut self, week_start: WeekStartDay) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.datetime.is_some()
    }

    /// Milliseconds since the Unix epoch, or `None` for an invalid moment.
    pub fn value_of(&self) -> Option<i64> {
        self.datetime.map(|dt| dt.timestamp_millis())
    }

    pub fn datetime(&self) -> Option<&DateTime<Tz>> {
        self.datetime.as_ref()
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.datetime.map(|dt| dt.timezone())
    }

    pub fn week_start(&self) -> WeekStartDay {
        self.week_start
    }

    /// RFC 3339 with millisecond precision, or `None` for an invalid moment.
    ///
    /// Offsets with a seconds component (local mean time in historical zones)
    /// cannot be written in RFC 3339, so those instants are rendered in UTC.
    pub fn to_rfc3339(&self) -> Option<String> {
        self.datetime.map(|dt| {
            if dt.offset().fix().local_minus_utc() % 60 == 0 {
                dt.to_rfc3339_opts(SecondsFormat::Millis, false)
            } else {
                dt.with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Millis, false)
            }
        })
    }

    /// The earliest instant of the `unit` bucket containing this moment.
    ///
    /// Invalid moments are returned unchanged.
    pub fn start_of(self, unit: Unit) -> Moment {
        let Some(dt) = self.datetime else {
            return self;
        };
        let start = match unit {
            Unit::Millisecond => Some(dt),
            _ => match unit.fixed_length_ms() {
                Some(len) => fixed_bucket_start(&dt, len),
                None => calendar_bucket_start(&dt, unit, self.week_start),
            },
        };
        Moment {
            datetime: start,
            ..self
        }
    }

    /// The latest instant (to the millisecond) of the `unit` bucket
    /// containing this moment.
    ///
    /// Invalid moments are returned unchanged.
    pub fn end_of(self, unit: Unit) -> Moment {
        let Some(dt) = self.datetime else {
            return self;
        };
        let end = match unit {
            Unit::Millisecond => Some(dt),
            _ => match unit.fixed_length_ms() {
                Some(len) => fixed_bucket_start(&dt, len).and_then(|start| {
                    start.checked_add_signed(chrono::Duration::milliseconds(len - 1))
                }),
                None => calendar_bucket_end(&dt, unit, self.week_start),
            },
        };
        Moment {
            datetime: end,
            ..self
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Some(text) => f.write_str(&text),
            None => f.write_str("Invalid date"),
        }
    }
}

// ── Bucket computation ──────────────────────────────────────────────────────

/// Start of a fixed-length bucket, aligned on the local wall clock.
fn fixed_bucket_start(dt: &DateTime<Tz>, len: i64) -> Option<DateTime<Tz>> {
    let millis = dt.timestamp_millis();
    let offset_ms = i64::from(dt.offset().fix().local_minus_utc()) * 1000;
    let start = millis - (millis + offset_ms).rem_euclid(len);
    DateTime::from_timestamp_millis(start).map(|utc| utc.with_timezone(&dt.timezone()))
}

/// First local date of the calendar bucket containing `date`.
fn calendar_start_date(date: NaiveDate, unit: Unit, week_start: WeekStartDay) -> Option<NaiveDate> {
    match unit {
        Unit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        Unit::Quarter => {
            let q_start_month = ((date.month() - 1) / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), q_start_month, 1)
        }
        Unit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
        Unit::Week => {
            date.checked_sub_days(Days::new(days_from_week_start(date.weekday(), week_start)))
        }
        Unit::IsoWeek => date.checked_sub_days(Days::new(u64::from(
            date.weekday().num_days_from_monday(),
        ))),
        Unit::Day | Unit::Date => Some(date),
        Unit::Hour | Unit::Minute | Unit::Second | Unit::Millisecond => None,
    }
}

/// First local date of the calendar bucket following the one that starts at `start`.
fn next_calendar_start_date(start: NaiveDate, unit: Unit) -> Option<NaiveDate> {
    match unit {
        Unit::Year => start.checked_add_months(Months::new(12)),
        Unit::Quarter => start.checked_add_months(Months::new(3)),
        Unit::Month => start.checked_add_months(Months::new(1)),
        Unit::Week | Unit::IsoWeek => start.checked_add_days(Days::new(7)),
        Unit::Day | Unit::Date => start.succ_opt(),
        Unit::Hour | Unit::Minute | Unit::Second | Unit::Millisecond => None,
    }
}

fn calendar_bucket_start(
    dt: &DateTime<Tz>,
    unit: Unit,
    week_start: WeekStartDay,
) -> Option<DateTime<Tz>> {
    let start = calendar_start_date(dt.date_naive(), unit, week_start)?;
    resolve_local(&dt.timezone(), start.and_time(NaiveTime::MIN))
}

fn calendar_bucket_end(
    dt: &DateTime<Tz>,
    unit: Unit,
    week_start: WeekStartDay,
) -> Option<DateTime<Tz>> {
    let start = calendar_start_date(dt.date_naive(), unit, week_start)?;
    let next = next_calendar_start_date(start, unit)?;
    resolve_local(&dt.timezone(), next.and_time(NaiveTime::MIN))?
        .checked_sub_signed(chrono::Duration::milliseconds(1))
}

/// Map a local wall-clock time to an instant in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap resolve forward to the first instant after the gap, using the
/// offset that was in effect before it.
pub(crate) fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let before = tz
                .from_local_datetime(&naive.checked_sub_days(Days::new(1))?)
                .earliest()?;
            let offset_secs = before.offset().fix().local_minus_utc();
            let utc = naive.checked_sub_signed(chrono::Duration::seconds(i64::from(offset_secs)))?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
