//! Turning arbitrary comparison arguments into moments.
//!
//! Every comparison accepts `impl Into<MomentInput>`. An existing [`Moment`]
//! is borrowed and used as-is; everything else is handed to a
//! [`MomentFactory`]. Factories are injected into the
//! [`Comparator`](crate::Comparator), never looked up globally, so tests can
//! substitute their own.
//!
//! [`LocalFactory`] is the default strategy: instants keep their instant,
//! wall-clock values are read in the configured timezone, and anything it
//! cannot interpret becomes an invalid moment. It never panics.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{MomentError, Result};
use crate::moment::{resolve_local, Moment, WeekStartDay};

/// Naive datetime layouts accepted for text input, tried in order.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ── Inputs ──────────────────────────────────────────────────────────────────

/// A value that can be compared against a moment.
#[derive(Debug, Clone, PartialEq)]
pub enum MomentInput<'a> {
    /// An existing moment, used without coercion.
    Moment(&'a Moment),
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// Text, interpreted by the factory.
    Text(Cow<'a, str>),
    Utc(DateTime<Utc>),
    Fixed(DateTime<FixedOffset>),
    /// Wall-clock time in the factory's timezone.
    Naive(NaiveDateTime),
    /// Local midnight in the factory's timezone.
    Date(NaiveDate),
}

impl<'a> From<&'a Moment> for MomentInput<'a> {
    fn from(moment: &'a Moment) -> Self {
        MomentInput::Moment(moment)
    }
}

impl From<i64> for MomentInput<'_> {
    fn from(millis: i64) -> Self {
        MomentInput::Millis(millis)
    }
}

impl<'a> From<&'a str> for MomentInput<'a> {
    fn from(text: &'a str) -> Self {
        MomentInput::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for MomentInput<'a> {
    fn from(text: &'a String) -> Self {
        MomentInput::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for MomentInput<'_> {
    fn from(text: String) -> Self {
        MomentInput::Text(Cow::Owned(text))
    }
}

impl From<DateTime<Utc>> for MomentInput<'_> {
    fn from(dt: DateTime<Utc>) -> Self {
        MomentInput::Utc(dt)
    }
}

impl From<DateTime<FixedOffset>> for MomentInput<'_> {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        MomentInput::Fixed(dt)
    }
}

impl From<DateTime<Tz>> for MomentInput<'_> {
    fn from(dt: DateTime<Tz>) -> Self {
        MomentInput::Fixed(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for MomentInput<'_> {
    fn from(naive: NaiveDateTime) -> Self {
        MomentInput::Naive(naive)
    }
}

impl From<NaiveDate> for MomentInput<'_> {
    fn from(date: NaiveDate) -> Self {
        MomentInput::Date(date)
    }
}

// ── Factories ───────────────────────────────────────────────────────────────

/// Strategy for building a moment from a non-moment input.
///
/// Implementations must be total: input they cannot interpret yields
/// [`Moment::invalid`], never a panic.
pub trait MomentFactory {
    fn create(&self, input: MomentInput<'_>) -> Moment;
}

impl<F: MomentFactory + ?Sized> MomentFactory for &F {
    fn create(&self, input: MomentInput<'_>) -> Moment {
        (**self).create(input)
    }
}

/// Options for [`LocalFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalOptions {
    /// Zone used to read wall-clock input and to view every created moment.
    pub timezone: Tz,
    /// Week start carried by created moments.
    pub week_start: WeekStartDay,
}

impl Default for LocalOptions {
    fn default() -> Self {
        LocalOptions {
            timezone: Tz::UTC,
            week_start: WeekStartDay::default(),
        }
    }
}

impl LocalOptions {
    /// Set the timezone from an IANA name.
    ///
    /// # Errors
    ///
    /// Returns [`MomentError::InvalidTimezone`] if `name` is not a valid IANA timezone.
    pub fn with_timezone(mut self, name: &str) -> Result<Self> {
        self.timezone = parse_timezone(name)?;
        Ok(self)
    }

    pub fn with_week_start(mut self, week_start: WeekStartDay) -> Self {
        self.week_start = week_start;
        self
    }
}

/// The default coercion strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalFactory {
    options: LocalOptions,
}

impl LocalFactory {
    pub fn new(options: LocalOptions) -> Self {
        LocalFactory { options }
    }

    pub fn options(&self) -> &LocalOptions {
        &self.options
    }
}

impl MomentFactory for LocalFactory {
    fn create(&self, input: MomentInput<'_>) -> Moment {
        let tz = &self.options.timezone;
        let datetime = match input {
            MomentInput::Moment(moment) => return moment.clone(),
            MomentInput::Millis(millis) => {
                DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(tz))
            }
            MomentInput::Text(ref text) => parse_local_text(text, tz),
            MomentInput::Utc(dt) => Some(dt.with_timezone(tz)),
            MomentInput::Fixed(dt) => Some(dt.with_timezone(tz)),
            MomentInput::Naive(naive) => resolve_local(tz, naive),
            MomentInput::Date(date) => resolve_local(tz, date.and_time(NaiveTime::MIN)),
        };
        match datetime {
            Some(dt) => Moment::new(dt).with_week_start(self.options.week_start),
            None => {
                debug!(?input, timezone = %tz, "input coerced to an invalid moment");
                Moment::invalid().with_week_start(self.options.week_start)
            }
        }
    }
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// Parse an IANA timezone string into `Tz`.
pub(crate) fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| MomentError::InvalidTimezone(format!("'{}'", s)))
}

/// Interpret text as an instant (RFC 3339) or as local wall-clock time in `tz`.
pub(crate) fn parse_local_text(s: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(tz));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return resolve_local(tz, naive);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return resolve_local(tz, date.and_time(NaiveTime::MIN));
    }

    // Year-month: "2021-05"
    let date = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()?;
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

// ── Tests ───────────────────────────────────────────────────────────────────
