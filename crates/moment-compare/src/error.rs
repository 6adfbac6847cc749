//! Error types for moment-compare operations.
//!
//! Comparisons never return these: an invalid moment simply compares `false`.
//! They surface only from the strict entry points (unit parsing, timezone
//! lookup, strict moment parsing).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MomentError {
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid week start: {0}")]
    InvalidWeekStart(String),
}

pub type Result<T> = std::result::Result<T, MomentError>;
