//! Canonical comparison units and alias normalization.
//!
//! Callers name units loosely: `"day"`, `"days"`, `"D"`, `"Years"`, `"ms"`.
//! [`Unit::normalize`] maps every supported spelling onto one [`Unit`]. Single
//! letter shorthands are case-sensitive (`"M"` is month, `"m"` is minute);
//! full names and plurals are matched case-insensitively.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::MomentError;

/// The granularity at which two moments are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Unit {
    Year,
    Quarter,
    Month,
    /// Locale week, starting on the moment's configured week-start day.
    Week,
    /// ISO 8601 week, always starting on Monday.
    IsoWeek,
    Day,
    /// Day of month. Buckets identically to [`Unit::Day`].
    Date,
    Hour,
    Minute,
    Second,
    /// Exact instant comparison. The default when no unit is given.
    #[default]
    Millisecond,
}

impl Unit {
    /// Every canonical unit, coarsest first.
    pub const ALL: [Unit; 11] = [
        Unit::Year,
        Unit::Quarter,
        Unit::Month,
        Unit::Week,
        Unit::IsoWeek,
        Unit::Day,
        Unit::Date,
        Unit::Hour,
        Unit::Minute,
        Unit::Second,
        Unit::Millisecond,
    ];

    /// Normalize a unit name, plural or shorthand to its canonical unit.
    ///
    /// The exact spelling is tried first so case-sensitive shorthands win,
    /// then the lowercased spelling. Returns `None` for anything outside the
    /// alias set.
    ///
    /// ```
    /// use moment_compare::Unit;
    ///
    /// assert_eq!(Unit::normalize("Days"), Some(Unit::Day));
    /// assert_eq!(Unit::normalize("M"), Some(Unit::Month));
    /// assert_eq!(Unit::normalize("m"), Some(Unit::Minute));
    /// assert_eq!(Unit::normalize("fortnight"), None);
    /// ```
    pub fn normalize(name: &str) -> Option<Unit> {
        lookup_alias(name).or_else(|| lookup_alias(&name.to_lowercase()))
    }

    /// The canonical name of this unit.
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Year => "year",
            Unit::Quarter => "quarter",
            Unit::Month => "month",
            Unit::Week => "week",
            Unit::IsoWeek => "isoWeek",
            Unit::Day => "day",
            Unit::Date => "date",
            Unit::Hour => "hour",
            Unit::Minute => "minute",
            Unit::Second => "second",
            Unit::Millisecond => "millisecond",
        }
    }

    /// Bucket length in milliseconds for units that never vary with the
    /// calendar. Day and coarser units return `None`.
    pub(crate) fn fixed_length_ms(self) -> Option<i64> {
        match self {
            Unit::Hour => Some(3_600_000),
            Unit::Minute => Some(60_000),
            Unit::Second => Some(1_000),
            Unit::Millisecond => Some(1),
            _ => None,
        }
    }
}

fn lookup_alias(name: &str) -> Option<Unit> {
    match name {
        "year" | "years" | "y" => Some(Unit::Year),
        "quarter" | "quarters" | "Q" => Some(Unit::Quarter),
        "month" | "months" | "M" => Some(Unit::Month),
        "week" | "weeks" | "w" => Some(Unit::Week),
        "isoweek" | "isoweeks" | "W" => Some(Unit::IsoWeek),
        "day" | "days" | "d" => Some(Unit::Day),
        "date" | "dates" | "D" => Some(Unit::Date),
        "hour" | "hours" | "h" => Some(Unit::Hour),
        "minute" | "minutes" | "m" => Some(Unit::Minute),
        "second" | "seconds" | "s" => Some(Unit::Second),
        "millisecond" | "milliseconds" | "ms" => Some(Unit::Millisecond),
        _ => None,
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = MomentError;

    /// Strict parse: unknown names are an error instead of falling back to
    /// millisecond precision.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::normalize(s).ok_or_else(|| MomentError::InvalidUnit(format!("'{s}'")))
    }
}

// ── Unit arguments ──────────────────────────────────────────────────────────

/// Anything a comparison accepts as its unit argument.
///
/// `None` and unrecognized names both resolve to [`Unit::Millisecond`], so an
/// unknown unit degrades to exact instant comparison rather than failing.
pub trait IntoUnit {
    /// The normalized unit, or `None` when the argument names no known unit.
    fn into_unit(self) -> Option<Unit>;

    /// The unit a comparison actually runs at.
    fn resolve_unit(self) -> Unit
    where
        Self: Sized,
    {
        self.into_unit().unwrap_or_default()
    }
}

impl IntoUnit for Unit {
    fn into_unit(self) -> Option<Unit> {
        Some(self)
    }
}

impl IntoUnit for &str {
    fn into_unit(self) -> Option<Unit> {
        Unit::normalize(self)
    }
}

impl IntoUnit for String {
    fn into_unit(self) -> Option<Unit> {
        Unit::normalize(&self)
    }
}

impl IntoUnit for &String {
    fn into_unit(self) -> Option<Unit> {
        Unit::normalize(self)
    }
}

impl<T: IntoUnit> IntoUnit for Option<T> {
    fn into_unit(self) -> Option<Unit> {
        self.and_then(IntoUnit::into_unit)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
