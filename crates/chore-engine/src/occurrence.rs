//! The occurrence predicate: does a chore fall due on a given calendar date?

use chrono::{Datelike, NaiveDate};

use crate::chore::{Chore, Recurrence};

/// Decide whether `chore` has an occurrence on `date`.
///
/// - Nothing occurs before the start date.
/// - `None` (and any unrecognized rule) occurs only on the start date.
/// - `Daily` occurs on every date from the start on.
/// - `Weekly` occurs when the weekday matches the start date's weekday.
/// - `Monthly` occurs when the day-of-month matches. A month without that day
///   (day 31 in April, day 30 in February) has no occurrence; there is no
///   rollover to the last day or into the next month.
///
/// A chore whose stored start date cannot be parsed never occurs.
pub fn occurs_on_date(chore: &Chore, date: NaiveDate) -> bool {
    match chore.start() {
        Some(start) => occurs_from(&chore.recurrence, start, date),
        None => false,
    }
}

/// The same rule set as [`occurs_on_date`], on an already parsed start date.
pub fn occurs_from(recurrence: &Recurrence, start: NaiveDate, date: NaiveDate) -> bool {
    if date < start {
        return false;
    }

    match recurrence {
        Recurrence::Daily => true,
        Recurrence::Weekly => date.weekday() == start.weekday(),
        Recurrence::Monthly => date.day() == start.day(),
        Recurrence::None | Recurrence::Other(_) => date == start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn other_rules_fall_back_to_single_occurrence() {
        let rule = Recurrence::Other("yearly".into());
        assert!(occurs_from(&rule, d(2024, 1, 1), d(2024, 1, 1)));
        assert!(!occurs_from(&rule, d(2024, 1, 1), d(2025, 1, 1)));
    }

    #[test]
    fn leap_day_monthly_only_hits_day_29() {
        let start = d(2024, 2, 29);
        assert!(occurs_from(&Recurrence::Monthly, start, d(2024, 3, 29)));
        assert!(!occurs_from(&Recurrence::Monthly, start, d(2025, 2, 28)));
        assert!(!occurs_from(&Recurrence::Monthly, start, d(2025, 3, 1)));
    }
}
