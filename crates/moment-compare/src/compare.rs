//! Granularity-aware comparison of moments.
//!
//! Every predicate follows the same steps: coerce the input through the
//! injected [`MomentFactory`], return `false` if either moment is invalid,
//! normalize the unit, then compare either raw instants (millisecond
//! precision) or the receiver's bucket boundaries.
//!
//! Bucket semantics at a coarser unit:
//!
//! - `is_after`: the input lies strictly before the start of the receiver's bucket.
//! - `is_before`: the input lies strictly after the end of the receiver's bucket.
//! - `is_same`: the input lies inside the receiver's bucket, both ends included.
//!
//! Nothing here panics or returns an error. Invalid moments, unknown units and
//! malformed inclusivity descriptors all degrade to a plain `bool`.

use std::borrow::Cow;

use serde::Serialize;
use tracing::trace;

use crate::coerce::{LocalFactory, LocalOptions, MomentFactory, MomentInput};
use crate::inclusivity::{Bound, Inclusivity};
use crate::moment::Moment;
use crate::unit::{IntoUnit, Unit};

/// All relational predicates between two moments at one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relation {
    /// The unit the comparison ran at, after normalization.
    pub unit: Unit,
    pub before: bool,
    pub same: bool,
    pub after: bool,
    pub same_or_before: bool,
    pub same_or_after: bool,
}

/// Relational predicates with an injected coercion strategy.
///
/// The receiver ("this") is always the explicit first argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comparator<F = LocalFactory> {
    factory: F,
}

impl<F: MomentFactory> Comparator<F> {
    pub fn new(factory: F) -> Self {
        Comparator { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Is `this` after `input` at `unit` granularity?
    ///
    /// # Examples
    ///
    /// ```
    /// use moment_compare::{Comparator, LocalFactory, MomentFactory, Unit};
    ///
    /// let cmp = Comparator::new(LocalFactory::default());
    /// let june = cmp.factory().create("2021-06-01".into());
    /// assert!(cmp.is_after(&june, "2021-05-31T23:59:59.999", Unit::Month));
    /// assert!(!cmp.is_after(&june, "2021-06-30", Unit::Month));
    /// ```
    pub fn is_after<'a>(
        &self,
        this: &Moment,
        input: impl Into<MomentInput<'a>>,
        unit: impl IntoUnit,
    ) -> bool {
        let input = self.coerce(input.into());
        let Some((this_ms, input_ms)) = instants(this, &input) else {
            return false;
        };
        match unit.resolve_unit() {
            Unit::Millisecond => this_ms > input_ms,
            unit => this
                .clone()
                .start_of(unit)
                .value_of()
                .is_some_and(|start| input_ms < start),
        }
    }

    /// Is `this` before `input` at `unit` granularity?
    pub fn is_before<'a>(
        &self,
        this: &Moment,
        input: impl Into<MomentInput<'a>>,
        unit: impl IntoUnit,
    ) -> bool {
        let input = self.coerce(input.into());
        let Some((this_ms, input_ms)) = instants(this, &input) else {
            return false;
        };
        match unit.resolve_unit() {
            Unit::Millisecond => this_ms < input_ms,
            unit => this
                .clone()
                .end_of(unit)
                .value_of()
                .is_some_and(|end| end < input_ms),
        }
    }

    /// Does `input` fall in the same `unit` bucket as `this`?
    pub fn is_same<'a>(
        &self,
        this: &Moment,
        input: impl Into<MomentInput<'a>>,
        unit: impl IntoUnit,
    ) -> bool {
        let input = self.coerce(input.into());
        let Some((this_ms, input_ms)) = instants(this, &input) else {
            return false;
        };
        match unit.resolve_unit() {
            Unit::Millisecond => this_ms == input_ms,
            unit => {
                let start = this.clone().start_of(unit).value_of();
                let end = this.clone().end_of(unit).value_of();
                matches!((start, end), (Some(start), Some(end)) if start <= input_ms && input_ms <= end)
            }
        }
    }

    /// `is_same || is_after`. Each half coerces and validates on its own.
    pub fn is_same_or_after<'a>(
        &self,
        this: &Moment,
        input: impl Into<MomentInput<'a>>,
        unit: impl IntoUnit,
    ) -> bool {
        let input = input.into();
        let unit = unit.into_unit();
        self.is_same(this, input.clone(), unit) || self.is_after(this, input, unit)
    }

    /// `is_same || is_before`. Each half coerces and validates on its own.
    pub fn is_same_or_before<'a>(
        &self,
        this: &Moment,
        input: impl Into<MomentInput<'a>>,
        unit: impl IntoUnit,
    ) -> bool {
        let input = input.into();
        let unit = unit.into_unit();
        self.is_same(this, input.clone(), unit) || self.is_before(this, input, unit)
    }

    /// Does `this` lie between `from` and `to` at `unit` granularity?
    ///
    /// An exclusive lower end uses `is_after(from)`, an inclusive one
    /// `!is_before(from)`. An exclusive upper end uses `is_before(to)`, an
    /// inclusive one `!is_after(to)`.
    ///
    /// An invalid bound makes its `is_before`/`is_after` check `false`, so an
    /// inclusive end against an invalid bound passes.
    ///
    /// # Examples
    ///
    /// ```
    /// use moment_compare::{Comparator, LocalFactory, MomentFactory};
    ///
    /// let cmp = Comparator::new(LocalFactory::default());
    /// let day1 = cmp.factory().create("2021-05-01".into());
    /// assert!(cmp.is_between(&day1, "2021-05-01", "2021-05-03", "day", "[)"));
    /// assert!(!cmp.is_between(&day1, "2021-05-01", "2021-05-03", "day", "()"));
    /// ```
    pub fn is_between<'a, 'b>(
        &self,
        this: &Moment,
        from: impl Into<MomentInput<'a>>,
        to: impl Into<MomentInput<'b>>,
        unit: impl IntoUnit,
        inclusivity: impl Into<Inclusivity>,
    ) -> bool {
        let unit = unit.into_unit();
        let inclusivity = inclusivity.into();

        let lower = match inclusivity.lower {
            Bound::Exclusive => self.is_after(this, from, unit),
            Bound::Inclusive => !self.is_before(this, from, unit),
        };
        lower
            && match inclusivity.upper {
                Bound::Exclusive => self.is_before(this, to, unit),
                Bound::Inclusive => !self.is_after(this, to, unit),
            }
    }

    /// Evaluate every predicate of `this` against `input` at one unit.
    pub fn relate<'a>(
        &self,
        this: &Moment,
        input: impl Into<MomentInput<'a>>,
        unit: impl IntoUnit,
    ) -> Relation {
        let input = input.into();
        let unit = unit.into_unit();
        Relation {
            unit: unit.unwrap_or_default(),
            before: self.is_before(this, input.clone(), unit),
            same: self.is_same(this, input.clone(), unit),
            after: self.is_after(this, input.clone(), unit),
            same_or_before: self.is_same_or_before(this, input.clone(), unit),
            same_or_after: self.is_same_or_after(this, input, unit),
        }
    }

    fn coerce<'a>(&self, input: MomentInput<'a>) -> Cow<'a, Moment> {
        match input {
            MomentInput::Moment(moment) => Cow::Borrowed(moment),
            other => Cow::Owned(self.factory.create(other)),
        }
    }
}

/// Instant values of both moments, or `None` if either is invalid.
fn instants(this: &Moment, input: &Moment) -> Option<(i64, i64)> {
    match (this.value_of(), input.value_of()) {
        (Some(this_ms), Some(input_ms)) => Some((this_ms, input_ms)),
        _ => {
            trace!(
                this_valid = this.is_valid(),
                input_valid = input.is_valid(),
                "comparison short-circuited on invalid moment"
            );
            None
        }
    }
}

// ── Receiver-bound predicates ───────────────────────────────────────────────

/// The same predicates with the moment as receiver. Non-moment inputs are
/// read with a [`LocalFactory`] in the receiver's own timezone and week start
/// (UTC for an invalid receiver).
impl Moment {
    fn local_comparator(&self) -> Comparator<LocalFactory> {
        let options = LocalOptions {
            timezone: self.timezone().unwrap_or(chrono_tz::Tz::UTC),
            week_start: self.week_start(),
        };
        Comparator::new(LocalFactory::new(options))
    }

    pub fn is_after<'a>(&self, input: impl Into<MomentInput<'a>>, unit: impl IntoUnit) -> bool {
        self.local_comparator().is_after(self, input, unit)
    }

    pub fn is_before<'a>(&self, input: impl Into<MomentInput<'a>>, unit: impl IntoUnit) -> bool {
        self.local_comparator().is_before(self, input, unit)
    }

    pub fn is_same<'a>(&self, input: impl Into<MomentInput<'a>>, unit: impl IntoUnit) -> bool {
        self.local_comparator().is_same(self, input, unit)
    }

    pub fn is_same_or_after<'a>(
        &self,
        input: impl Into<MomentInput<'a>>,
        unit: impl IntoUnit,
    ) -> bool {
        self.local_comparator().is_same_or_after(self, input, unit)
    }

    pub fn is_same_or_before<'a>(
        &self,
        input: impl Into<MomentInput<'a>>,
        unit: impl IntoUnit,
    ) -> bool {
        self.local_comparator().is_same_or_before(self, input, unit)
    }

    pub fn is_between<'a, 'b>(
        &self,
        from: impl Into<MomentInput<'a>>,
        to: impl Into<MomentInput<'b>>,
        unit: impl IntoUnit,
        inclusivity: impl Into<Inclusivity>,
    ) -> bool {
        self.local_comparator()
            .is_between(self, from, to, unit, inclusivity)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn m(s: &str) -> Moment {
        Moment::parse_in(s, &LocalOptions::default()).unwrap()
    }

    /// Factory that counts calls and yields the configured moment.
    struct CountingFactory {
        calls: Cell<usize>,
        result: Moment,
    }

    impl CountingFactory {
        fn yielding(result: Moment) -> Self {
            CountingFactory {
                calls: Cell::new(0),
                result,
            }
        }
    }

    impl MomentFactory for CountingFactory {
        fn create(&self, _input: MomentInput<'_>) -> Moment {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    // ── invalidity ──────────────────────────────────────────────────────

    #[test]
    fn test_invalid_receiver_is_false_everywhere() {
        let invalid = Moment::invalid();
        let valid = m("2021-05-15T10:00:00");
        for unit in [Unit::Millisecond, Unit::Day, Unit::Year] {
            assert!(!invalid.is_before(&valid, unit));
            assert!(!invalid.is_after(&valid, unit));
            assert!(!invalid.is_same(&valid, unit));
            assert!(!invalid.is_same_or_before(&valid, unit));
            assert!(!invalid.is_same_or_after(&valid, unit));
        }
    }

    #[test]
    fn test_invalid_input_is_false_everywhere() {
        let valid = m("2021-05-15T10:00:00");
        for unit in ["millisecond", "day", "year"] {
            assert!(!valid.is_before("garbage", unit));
            assert!(!valid.is_after("garbage", unit));
            assert!(!valid.is_same("garbage", unit));
            assert!(!valid.is_same_or_before(&Moment::invalid(), unit));
            assert!(!valid.is_same_or_after(&Moment::invalid(), unit));
        }
    }

    #[test]
    fn test_invalid_is_not_same_as_itself() {
        let invalid = Moment::invalid();
        assert!(!invalid.is_same(&invalid, Unit::Year));
    }

    // ── millisecond precision ───────────────────────────────────────────

    #[test]
    fn test_millisecond_default_unit() {
        let a = m("2021-05-15T10:00:00.000");
        let b = m("2021-05-15T10:00:00.001");
        assert!(a.is_before(&b, None::<Unit>));
        assert!(b.is_after(&a, None::<&str>));
        assert!(!a.is_same(&b, None::<Unit>));
        assert!(a.is_same(&a.clone(), None::<Unit>));
    }

    #[test]
    fn test_unknown_unit_behaves_as_millisecond() {
        let a = m("2021-05-15T10:00:00");
        let b = m("2021-05-15T23:59:59");
        assert!(!a.is_same(&b, "fortnight"));
        assert!(a.is_before(&b, "fortnight"));
        assert!(!a.is_after(&b, ""));
    }

    // ── granularity ─────────────────────────────────────────────────────

    #[test]
    fn test_granularity_widening_same_day() {
        let a = m("2021-05-15T10:00:00");
        let b = m("2021-05-15T23:59:59");
        assert!(!a.is_same(&b, "millisecond"));
        assert!(a.is_same(&b, "day"));
        assert!(a.is_same(&b, "days"));
        assert!(a.is_same(&b, Unit::Month));
        assert!(!a.is_same(&b, Unit::Hour));
    }

    #[test]
    fn test_is_after_month_granularity() {
        let a = m("2021-06-01");
        let b = m("2021-05-31T23:59:59.999");
        assert!(a.is_after(&b, "month"));
    }

    #[test]
    fn test_is_after_millisecond_granularity() {
        let a = m("2021-06-01");
        let b = m("2021-05-31T23:59:59.999");
        assert!(a.is_after(&b, "millisecond"));
        assert_eq!(a.value_of().unwrap() - b.value_of().unwrap(), 1);
    }

    #[test]
    fn test_is_after_false_inside_own_bucket() {
        // Later in the day, but not after the day as a whole.
        let a = m("2021-06-01T18:00:00");
        let b = m("2021-06-01T06:00:00");
        assert!(a.is_after(&b, "ms"));
        assert!(!a.is_after(&b, "day"));
        assert!(a.is_same_or_after(&b, "day"));
    }

    #[test]
    fn test_is_before_uses_end_of_bucket() {
        let a = m("2021-05-31T00:00:00");
        let end_of_may = m("2021-05-31T23:59:59.999");
        let june = m("2021-06-01");
        assert!(!a.is_before(&end_of_may, "month"));
        assert!(a.is_before(&june, "month"));
        assert!(a.is_before(&end_of_may, "ms"));
    }

    #[test]
    fn test_is_same_bucket_edges_inclusive() {
        let a = m("2021-05-15T10:00:00");
        assert!(a.is_same("2021-05-15T00:00:00.000", "day"));
        assert!(a.is_same("2021-05-15T23:59:59.999", "day"));
        assert!(!a.is_same("2021-05-16T00:00:00.000", "day"));
        assert!(!a.is_same("2021-05-14T23:59:59.999", "day"));
    }

    #[test]
    fn test_quarter_and_year() {
        let a = m("2021-05-15");
        assert!(a.is_same("2021-04-01", "quarter"));
        assert!(a.is_before("2021-07-01", "Q"));
        assert!(a.is_after("2020-12-31T23:59:59.999", "y"));
        assert!(a.is_same("2021-12-31T23:59:59.999", "years"));
    }

    #[test]
    fn test_week_uses_receiver_week_start() {
        // Saturday 2021-05-15 vs Sunday 2021-05-16.
        let saturday = m("2021-05-15T12:00:00");
        assert!(saturday.is_before("2021-05-16T12:00:00", "week"));

        let monday_weeks = saturday.clone().with_week_start(crate::WeekStartDay::Monday);
        assert!(monday_weeks.is_same("2021-05-16T12:00:00", "week"));
        assert!(saturday.is_same("2021-05-16T12:00:00", "isoWeek"));
    }

    #[test]
    fn test_string_input_read_in_receiver_zone() {
        let options = LocalOptions::default().with_timezone("Asia/Tokyo").unwrap();
        let tokyo = Moment::parse_in("2021-05-15T01:00:00", &options).unwrap();
        // Same Tokyo day, although the UTC dates differ.
        assert!(tokyo.is_same("2021-05-15T23:00:00", "day"));
        assert!(!tokyo.is_same("2021-05-14T23:00:00", "day"));
    }

    // ── between ─────────────────────────────────────────────────────────

    #[test]
    fn test_between_inclusivity_matrix() {
        let from = m("2021-05-01");
        let to = m("2021-05-03");
        let day1 = m("2021-05-01");
        assert!(day1.is_between(&from, &to, "day", "[)"));
        assert!(!day1.is_between(&from, &to, "day", "()"));
        assert!(day1.is_between(&from, &to, "day", "[]"));
        assert!(!day1.is_between(&from, &to, "day", "(]"));
    }

    #[test]
    fn test_between_upper_bound() {
        let from = m("2021-05-01");
        let to = m("2021-05-03");
        let day3 = m("2021-05-03T15:00:00");
        assert!(!day3.is_between(&from, &to, "day", "()"));
        assert!(day3.is_between(&from, &to, "day", "(]"));
        assert!(day3.is_between(&from, &to, "day", "[]"));
        assert!(!day3.is_between(&from, &to, "day", "[)"));
    }

    #[test]
    fn test_between_default_inclusivity_is_exclusive() {
        let from = m("2021-05-01");
        let to = m("2021-05-03");
        assert!(m("2021-05-02").is_between(&from, &to, "day", None::<&str>));
        assert!(!m("2021-05-01").is_between(&from, &to, "day", None::<&str>));
        assert!(!m("2021-05-01").is_between(&from, &to, "day", ""));
    }

    #[test]
    fn test_between_millisecond_default() {
        let from = m("2021-05-01T00:00:00");
        let to = m("2021-05-01T00:00:00.002");
        let mid = m("2021-05-01T00:00:00.001");
        assert!(mid.is_between(&from, &to, None::<Unit>, Inclusivity::EXCLUSIVE));
        assert!(!from.is_between(&from, &to, None::<Unit>, Inclusivity::EXCLUSIVE));
        assert!(from.is_between(&from, &to, None::<Unit>, Inclusivity::LEFT_CLOSED));
    }

    #[test]
    fn test_between_malformed_descriptor_is_positional() {
        let from = m("2021-05-01");
        let to = m("2021-05-03");
        // "xy" means inclusive on both ends.
        assert!(m("2021-05-01").is_between(&from, &to, "day", "xy"));
        assert!(m("2021-05-03").is_between(&from, &to, "day", "xy"));
        // "))" is inclusive lower, exclusive upper.
        assert!(m("2021-05-01").is_between(&from, &to, "day", "))"));
        assert!(!m("2021-05-03").is_between(&from, &to, "day", "))"));
    }

    #[test]
    fn test_between_inclusive_end_passes_invalid_bound() {
        let from = m("2021-05-01");
        let this = m("2021-05-02");
        assert!(this.is_between(&from, "garbage", "day", "(]"));
        assert!(!this.is_between(&from, "garbage", "day", "()"));
    }

    #[test]
    fn test_between_invalid_receiver_passes_inclusive_ends() {
        // Both inner checks are false for an invalid receiver, so "[]" negates them to true.
        let invalid = Moment::invalid();
        assert!(invalid.is_between("2021-05-01", "2021-05-03", "day", "[]"));
        assert!(!invalid.is_between("2021-05-01", "2021-05-03", "day", "()"));
        assert!(!invalid.is_between("2021-05-01", "2021-05-03", "day", "[)"));
        assert!(!invalid.is_between("2021-05-01", "2021-05-03", "day", "(]"));
    }

    #[test]
    fn test_between_reversed_bounds_is_false() {
        let this = m("2021-05-02");
        assert!(!this.is_between("2021-05-03", "2021-05-01", "day", "[]"));
    }

    // ── coercion and clone discipline ───────────────────────────────────

    #[test]
    fn test_moment_input_bypasses_factory() {
        let factory = CountingFactory::yielding(Moment::invalid());
        let cmp = Comparator::new(&factory);
        let a = m("2021-05-15");
        let b = m("2021-05-16");
        assert!(cmp.is_before(&a, &b, "day"));
        assert_eq!(factory.calls.get(), 0);
    }

    #[test]
    fn test_raw_input_goes_through_injected_factory() {
        let factory = CountingFactory::yielding(m("2030-01-01"));
        let cmp = Comparator::new(&factory);
        let a = m("2021-05-15");
        assert!(cmp.is_before(&a, 0_i64, "year"));
        assert_eq!(factory.calls.get(), 1);
    }

    #[test]
    fn test_same_or_after_coerces_in_each_delegated_call() {
        let factory = CountingFactory::yielding(Moment::invalid());
        let cmp = Comparator::new(&factory);
        let a = m("2021-05-15");
        assert!(!cmp.is_same_or_after(&a, "anything", "day"));
        assert_eq!(factory.calls.get(), 2);
    }

    #[test]
    fn test_boundary_derivation_does_not_mutate_receiver() {
        let a = m("2021-05-15T10:20:30.456");
        let snapshot = a.clone();
        let b = m("2022-01-01");
        assert!(a.is_before(&b, "year"));
        assert!(a.is_same_or_before(&b, "month"));
        assert!(!a.is_after(&b, "day"));
        assert_eq!(a, snapshot);
        assert_eq!(a.value_of(), snapshot.value_of());
        assert!(a.is_valid());
    }

    // ── thread safety ───────────────────────────────────────────────────

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_public_types_are_send_and_sync() {
        assert_send_sync::<Moment>();
        assert_send_sync::<Unit>();
        assert_send_sync::<Inclusivity>();
        assert_send_sync::<LocalFactory>();
        assert_send_sync::<Comparator<LocalFactory>>();
        assert_send_sync::<Relation>();
    }

    // ── relate ──────────────────────────────────────────────────────────

    #[test]
    fn test_relate_summarizes_all_predicates() {
        let cmp = Comparator::new(LocalFactory::default());
        let a = m("2021-05-15T10:00:00");
        let relation = cmp.relate(&a, "2021-05-15T23:59:59", "days");
        assert_eq!(
            relation,
            Relation {
                unit: Unit::Day,
                before: false,
                same: true,
                after: false,
                same_or_before: true,
                same_or_after: true,
            }
        );
    }

    #[test]
    fn test_relate_reports_default_unit() {
        let cmp = Comparator::new(LocalFactory::default());
        let a = m("2021-05-15T10:00:00");
        let relation = cmp.relate(&a, "2021-05-15T09:00:00", "bogus");
        assert_eq!(relation.unit, Unit::Millisecond);
        assert!(relation.after);
        assert!(relation.same_or_after);
        assert!(!relation.same_or_before);
    }

    #[test]
    fn test_relation_serializes() {
        let cmp = Comparator::new(LocalFactory::default());
        let a = m("2021-05-15");
        let json = serde_json::to_value(cmp.relate(&a, "2021-05-16", "day")).unwrap();
        assert_eq!(json["unit"], "day");
        assert_eq!(json["before"], true);
        assert_eq!(json["same_or_after"], false);
    }
}
