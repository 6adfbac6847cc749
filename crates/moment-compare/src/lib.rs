//! # moment-compare
//!
//! Granularity-aware comparison of points in time.
//!
//! Asks whether one moment is before, after, the same as, or between other
//! moments at a chosen unit of precision (year, quarter, month, week, day,
//! hour, minute, second or millisecond) rather than by exact instant. Two
//! moments on the same calendar day are "the same" at `day` precision even
//! hours apart.
//!
//! Comparisons are total. Invalid moments, unparsable inputs, unknown units
//! and malformed inclusivity descriptors never panic and never return an
//! error: they produce `false` (or fall back to millisecond precision).
//!
//! ## Modules
//!
//! - [`compare`] — The comparator: `is_before`, `is_after`, `is_same`, `is_same_or_*`, `is_between`
//! - [`moment`] — The moment value, validity and start/end-of-unit buckets
//! - [`coerce`] — Turning strings, timestamps and chrono values into moments
//! - [`unit`] — Canonical units and alias normalization
//! - [`inclusivity`] — Open/closed range ends for `is_between`
//! - [`error`] — Error types for the strict parsing entry points
//!
//! ```
//! use moment_compare::{LocalOptions, Moment};
//!
//! let a = Moment::parse_in("2021-05-15T10:00:00", &LocalOptions::default()).unwrap();
//! assert!(!a.is_same("2021-05-15T23:59:59", "millisecond"));
//! assert!(a.is_same("2021-05-15T23:59:59", "day"));
//! assert!(a.is_between("2021-05-15", "2021-05-17", "day", "[)"));
//! ```

pub mod coerce;
pub mod compare;
pub mod error;
pub mod inclusivity;
pub mod moment;
pub mod unit;

pub use coerce::{LocalFactory, LocalOptions, MomentFactory, MomentInput};
pub use compare::{Comparator, Relation};
pub use error::MomentError;
pub use inclusivity::{Bound, Inclusivity};
pub use moment::{Moment, WeekStartDay};
pub use unit::{IntoUnit, Unit};
