use crate::model::ReadingTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An inclusive date range used to select rows for viewing, editing, deleting or summarizing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Builds a window from optional bounds. A missing `start` falls back to the earliest date in
    /// `table` and a missing `end` to the latest. When the table is empty, `today` is used for both.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        table: &ReadingTable,
        today: NaiveDate,
    ) -> Self {
        let (first, last) = table.date_range().unwrap_or((today, today));
        Self {
            start: start.unwrap_or(first),
            end: end.unwrap_or(last),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Both ends are inclusive. A window with `start > end` contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_contains_is_inclusive() {
        let w = Window::new(d("2024-01-01"), d("2024-01-31"));
        assert!(w.contains(d("2024-01-01")));
        assert!(w.contains(d("2024-01-15")));
        assert!(w.contains(d("2024-01-31")));
        assert!(!w.contains(d("2023-12-31")));
        assert!(!w.contains(d("2024-02-01")));
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let w = Window::new(d("2024-02-01"), d("2024-01-01"));
        assert!(!w.contains(d("2024-01-15")));
        assert!(!w.contains(d("2024-02-01")));
    }

    #[test]
    fn test_resolve_empty_table_uses_today() {
        let table = ReadingTable::new(["Ground Floor", "First Floor"]);
        let today = d("2025-06-01");
        let w = Window::resolve(None, None, &table, today);
        assert_eq!(w, Window::new(today, today));
    }

    #[test]
    fn test_resolve_uses_table_bounds() {
        let table = ReadingTable::parse(
            "Date,A\n2024-03-01,1\n2024-01-01,0\n2024-02-01,2\n",
            &["A"],
        )
        .unwrap();
        let today = d("2025-06-01");
        let w = Window::resolve(None, None, &table, today);
        assert_eq!(w, Window::new(d("2024-01-01"), d("2024-03-01")));

        let w = Window::resolve(Some(d("2024-01-15")), None, &table, today);
        assert_eq!(w, Window::new(d("2024-01-15"), d("2024-03-01")));
    }
}
