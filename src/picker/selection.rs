use crate::entities::{DateValue, DayRange, SelectionError, ValueKind};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Which days may be chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayRules {
    pub minimum_date: Option<NaiveDate>,
    pub maximum_date: Option<NaiveDate>,
    pub disabled_days: BTreeSet<NaiveDate>,
}

impl DayRules {
    pub fn new(
        minimum_date: Option<NaiveDate>,
        maximum_date: Option<NaiveDate>,
        disabled_days: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        Self {
            minimum_date,
            maximum_date,
            disabled_days: disabled_days.into_iter().collect(),
        }
    }

    pub fn check(&self, day: NaiveDate) -> Result<(), SelectionError> {
        if let Some(minimum) = self.minimum_date {
            if day < minimum {
                return Err(SelectionError::BeforeMinimum { day, minimum });
            }
        }
        if let Some(maximum) = self.maximum_date {
            if day > maximum {
                return Err(SelectionError::AfterMaximum { day, maximum });
            }
        }
        if self.disabled_days.contains(&day) {
            return Err(SelectionError::DisabledDay(day));
        }
        Ok(())
    }

    pub fn is_selectable(&self, day: NaiveDate) -> bool {
        self.check(day).is_ok()
    }

    /// First disabled day inside `from..=to`, if any.
    pub fn first_disabled_between(&self, from: NaiveDate, to: NaiveDate) -> Option<NaiveDate> {
        self.disabled_days.range(from..=to).next().copied()
    }
}

/// The value that results from choosing `day` on the calendar.
pub fn next_value(
    current: &DateValue,
    day: NaiveDate,
    rules: &DayRules,
) -> Result<DateValue, SelectionError> {
    rules.check(day)?;

    match current {
        DateValue::Single(_) => Ok(DateValue::Single(Some(day))),
        DateValue::Range(range) => next_range(range, day, rules).map(DateValue::Range),
        DateValue::Multi(dates) => {
            let mut dates = dates.clone();
            if let Some(index) = dates.iter().position(|selected| *selected == day) {
                dates.remove(index);
            } else {
                let index = dates.partition_point(|selected| *selected < day);
                dates.insert(index, day);
            }
            Ok(DateValue::Multi(dates))
        }
    }
}

fn next_range(
    range: &DayRange,
    day: NaiveDate,
    rules: &DayRules,
) -> Result<DayRange, SelectionError> {
    match range.from {
        Some(from) if range.to.is_none() => {
            let (from, to) = if day < from { (day, from) } else { (from, day) };
            if let Some(disabled) = rules.first_disabled_between(from, to) {
                return Err(SelectionError::RangeIncludesDisabledDay { from, to, disabled });
            }
            Ok(DayRange::new(Some(from), Some(to)))
        }
        // Empty or already complete: start over
        _ => Ok(DayRange::new(Some(day), None)),
    }
}

/// Whether a selection of `new_value` completes the picker's job.
///
/// `kind` is the shape of the value held before the selection.
pub fn should_close(kind: ValueKind, new_value: &DateValue) -> bool {
    match kind {
        ValueKind::Single => true,
        ValueKind::Range => matches!(new_value, DateValue::Range(range) if range.is_complete()),
        ValueKind::Multi => false,
    }
}
