//! Range-end inclusivity for [`Comparator::is_between`](crate::Comparator::is_between).
//!
//! Descriptors are two characters, one per end: `(`/`)` exclude the bound,
//! `[`/`]` include it. Parsing never fails. Each position is checked on its
//! own: the lower end is exclusive only when the first character is exactly
//! `(`, and the upper end is exclusive only when the second character is
//! exactly `)`. Anything else at either position (including a missing
//! character) means inclusive. An empty descriptor is the default `()`.

use std::fmt;

use serde::{Serialize, Serializer};

/// Whether one end of a range contains its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Inclusive,
    Exclusive,
}

/// Inclusivity of both ends of a between-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inclusivity {
    pub lower: Bound,
    pub upper: Bound,
}

impl Inclusivity {
    /// `()`: both bounds excluded.
    pub const EXCLUSIVE: Inclusivity = Inclusivity::new(Bound::Exclusive, Bound::Exclusive);
    /// `[]`: both bounds included.
    pub const INCLUSIVE: Inclusivity = Inclusivity::new(Bound::Inclusive, Bound::Inclusive);
    /// `[)`: lower bound included, upper excluded.
    pub const LEFT_CLOSED: Inclusivity = Inclusivity::new(Bound::Inclusive, Bound::Exclusive);
    /// `(]`: lower bound excluded, upper included.
    pub const RIGHT_CLOSED: Inclusivity = Inclusivity::new(Bound::Exclusive, Bound::Inclusive);

    pub const fn new(lower: Bound, upper: Bound) -> Self {
        Inclusivity { lower, upper }
    }

    /// Read a descriptor position by position.
    ///
    /// ```
    /// use moment_compare::Inclusivity;
    ///
    /// assert_eq!(Inclusivity::parse("[)"), Inclusivity::LEFT_CLOSED);
    /// assert_eq!(Inclusivity::parse(""), Inclusivity::EXCLUSIVE);
    /// // Unrecognized characters are inclusive.
    /// assert_eq!(Inclusivity::parse("xy"), Inclusivity::INCLUSIVE);
    /// ```
    pub fn parse(descriptor: &str) -> Self {
        if descriptor.is_empty() {
            return Inclusivity::EXCLUSIVE;
        }
        let mut chars = descriptor.chars();
        let lower = match chars.next() {
            Some('(') => Bound::Exclusive,
            _ => Bound::Inclusive,
        };
        let upper = match chars.next() {
            Some(')') => Bound::Exclusive,
            _ => Bound::Inclusive,
        };
        Inclusivity { lower, upper }
    }
}

impl Default for Inclusivity {
    fn default() -> Self {
        Inclusivity::EXCLUSIVE
    }
}

impl fmt::Display for Inclusivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = match self.lower {
            Bound::Exclusive => '(',
            Bound::Inclusive => '[',
        };
        let close = match self.upper {
            Bound::Exclusive => ')',
            Bound::Inclusive => ']',
        };
        write!(f, "{open}{close}")
    }
}

impl Serialize for Inclusivity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for Inclusivity {
    fn from(descriptor: &str) -> Self {
        Inclusivity::parse(descriptor)
    }
}

impl From<&String> for Inclusivity {
    fn from(descriptor: &String) -> Self {
        Inclusivity::parse(descriptor)
    }
}

impl From<String> for Inclusivity {
    fn from(descriptor: String) -> Self {
        Inclusivity::parse(&descriptor)
    }
}

impl From<Option<&str>> for Inclusivity {
    fn from(descriptor: Option<&str>) -> Self {
        descriptor.map(Inclusivity::parse).unwrap_or_default()
    }
}

impl From<Option<Inclusivity>> for Inclusivity {
    fn from(inclusivity: Option<Inclusivity>) -> Self {
        inclusivity.unwrap_or_default()
    }
}
