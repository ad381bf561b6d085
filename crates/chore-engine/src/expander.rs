//! Windowed expansion -- materializes the occurrences of a set of chores over a
//! finite, inclusive range of calendar dates.
//!
//! Callers pick the window (the upcoming list uses a 60-day horizon from today,
//! the calendar view a single month); the expander itself never reads the clock.

use chrono::{Days, NaiveDate};

use crate::chore::Chore;
use crate::date::month_bounds;
use crate::occurrence::occurs_from;

/// Forward horizon used by the upcoming list.
pub const DEFAULT_HORIZON_DAYS: u32 = 60;

/// An inclusive range of calendar dates. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `days` consecutive dates starting at `today`. Zero days is empty.
    pub fn horizon(today: NaiveDate, days: u32) -> Self {
        let end = match days.checked_sub(1) {
            Some(extra) => today
                .checked_add_days(Days::new(extra as u64))
                .unwrap_or(NaiveDate::MAX),
            None => today.pred_opt().unwrap_or(NaiveDate::MIN),
        };
        Self { start: today, end }
    }

    /// Every day of a calendar month. `None` for an invalid month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        month_bounds(year, month).map(|(start, end)| Self { start, end })
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterate the dates of the window in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// One occurrence of a chore on a concrete date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub chore: &'a Chore,
    pub date: NaiveDate,
}

/// Expand `chores` over the inclusive range `window_start..=window_end`.
///
/// The result is ordered by date, then by title (byte-wise, case-sensitive).
/// Chores with identical titles on the same date keep their input order.
/// Chores whose start date cannot be parsed contribute nothing.
pub fn expand_occurrences(
    chores: &[Chore],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<Occurrence<'_>> {
    expand_window(chores, DateWindow::new(window_start, window_end))
}

/// [`expand_occurrences`] over a [`DateWindow`].
pub fn expand_window(chores: &[Chore], window: DateWindow) -> Vec<Occurrence<'_>> {
    // Parse each start date once rather than once per day.
    let parsed: Vec<(&Chore, NaiveDate)> = chores
        .iter()
        .filter_map(|chore| match chore.start() {
            Some(start) => Some((chore, start)),
            None => {
                tracing::debug!(
                    chore_id = %chore.id,
                    start_date = %chore.start_date,
                    "skipping chore with unparseable start date"
                );
                None
            }
        })
        .collect();

    let mut occurrences = Vec::new();
    for date in window.days() {
        for &(chore, start) in &parsed {
            if occurs_from(&chore.recurrence, start, date) {
                occurrences.push(Occurrence { chore, date });
            }
        }
    }

    // Stable sort: dates are already ascending, so this only orders titles
    // within a day.
    occurrences.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.chore.title.cmp(&b.chore.title))
    });

    occurrences
}
