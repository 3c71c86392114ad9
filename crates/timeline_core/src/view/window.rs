//! Visible date range and zoom state.
//!
//! # Invariants
//! - `zoom_index` always indexes into [`ZOOM_LEVELS`].
//! - Zoom preserves the range center within integer-day rounding.
//! - Pan distance is a quarter of the current zoom width, at least one day.
//! - Date arithmetic saturates at the calendar bounds instead of panicking.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Window widths in days, narrowest first: day, week, month, quarter, year, five years.
pub const ZOOM_LEVELS: [i64; 6] = [1, 7, 30, 90, 365, 1825];

/// Opens on the one-year width.
pub const DEFAULT_ZOOM_INDEX: usize = 4;

/// Context kept around an event when the range grows to include it.
pub const EXPAND_MARGIN_DAYS: i64 = 30;

/// Range bounds were supplied in the wrong order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvertedRangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Display for InvertedRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "range end {} is before start {}", self.end, self.start)
    }
}

impl Error for InvertedRangeError {}

/// Pan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineWindow {
    range_start: NaiveDate,
    range_end: NaiveDate,
    zoom_index: usize,
}

impl TimelineWindow {
    /// Creates a window over `[start, end]` at the default zoom level.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvertedRangeError> {
        Self::with_zoom(start, end, DEFAULT_ZOOM_INDEX)
    }

    /// Creates a window with an explicit zoom index, clamped to the valid range.
    pub fn with_zoom(
        start: NaiveDate,
        end: NaiveDate,
        zoom_index: usize,
    ) -> Result<Self, InvertedRangeError> {
        if end < start {
            return Err(InvertedRangeError { start, end });
        }
        Ok(Self {
            range_start: start,
            range_end: end,
            zoom_index: zoom_index.min(ZOOM_LEVELS.len() - 1),
        })
    }

    pub fn range_start(&self) -> NaiveDate {
        self.range_start
    }

    pub fn range_end(&self) -> NaiveDate {
        self.range_end
    }

    pub fn zoom_index(&self) -> usize {
        self.zoom_index
    }

    /// Width in days of the current zoom level.
    pub fn zoom_width(&self) -> i64 {
        ZOOM_LEVELS[self.zoom_index]
    }

    /// Actual span of the current range in days.
    pub fn width_days(&self) -> i64 {
        (self.range_end - self.range_start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.range_start <= date && date <= self.range_end
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom_index > 0
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom_index + 1 < ZOOM_LEVELS.len()
    }

    /// Narrows to the next smaller width. Returns `false` at the narrowest level.
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.apply_zoom(self.zoom_index - 1);
        true
    }

    /// Widens to the next larger width. Returns `false` at the widest level.
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.apply_zoom(self.zoom_index + 1);
        true
    }

    fn apply_zoom(&mut self, zoom_index: usize) {
        self.zoom_index = zoom_index;
        let half_width = ZOOM_LEVELS[zoom_index] / 2;
        let center = shift_days(self.range_start, self.width_days() / 2);
        self.range_start = shift_days(center, -half_width);
        self.range_end = shift_days(center, half_width);
    }

    /// Days moved by one pan step at the current zoom level.
    pub fn pan_step(&self) -> i64 {
        (self.zoom_width() / 4).max(1)
    }

    pub fn pan(&mut self, direction: PanDirection) {
        let step = match direction {
            PanDirection::Left => -self.pan_step(),
            PanDirection::Right => self.pan_step(),
        };
        self.range_start = shift_days(self.range_start, step);
        self.range_end = shift_days(self.range_end, step);
    }

    pub fn pan_left(&mut self) {
        self.pan(PanDirection::Left);
    }

    pub fn pan_right(&mut self) {
        self.pan(PanDirection::Right);
    }

    /// Moves only the violated bound(s) so that `[event_start, event_end]`
    /// is visible with [`EXPAND_MARGIN_DAYS`] of context.
    ///
    /// Returns whether the range changed.
    pub fn expand_to_include(&mut self, event_start: NaiveDate, event_end: NaiveDate) -> bool {
        let mut changed = false;
        if event_start < self.range_start {
            self.range_start = shift_days(event_start, -EXPAND_MARGIN_DAYS);
            changed = true;
        }
        if event_end > self.range_end {
            self.range_end = shift_days(event_end, EXPAND_MARGIN_DAYS);
            changed = true;
        }
        changed
    }

    /// Replaces the range directly; the zoom index is kept.
    pub fn set_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), InvertedRangeError> {
        if end < start {
            return Err(InvertedRangeError { start, end });
        }
        self.range_start = start;
        self.range_end = end;
        Ok(())
    }

    /// Recenters the range on `date`, keeping its current span.
    pub fn center_on(&mut self, date: NaiveDate) {
        let width = self.width_days();
        self.range_start = shift_days(date, -(width / 2));
        self.range_end = shift_days(self.range_start, width);
    }
}

fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    fn window(start: &str, end: &str) -> TimelineWindow {
        TimelineWindow::new(date(start), date(end)).unwrap()
    }

    fn center(window: &TimelineWindow) -> NaiveDate {
        shift_days(window.range_start(), window.width_days() / 2)
    }

    #[test]
    fn new_window_opens_at_one_year_width() {
        let window = window("2024-01-01", "2024-12-31");
        assert_eq!(window.zoom_index(), DEFAULT_ZOOM_INDEX);
        assert_eq!(window.zoom_width(), 365);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = TimelineWindow::new(date("2024-02-01"), date("2024-01-01")).unwrap_err();
        assert_eq!(err.start, date("2024-02-01"));
        assert!(window("2024-01-01", "2024-01-01").contains(date("2024-01-01")));
    }

    #[test]
    fn zoom_in_is_center_preserving() {
        let mut window = window("2024-01-01", "2024-12-31");
        let before = center(&window);
        assert!(window.zoom_in());
        assert_eq!(window.zoom_width(), 90);
        assert_eq!(window.width_days(), 90);
        let after = center(&window);
        assert!((after - before).num_days().abs() <= 1);
        assert_eq!(window.range_start(), date("2024-05-17"));
        assert_eq!(window.range_end(), date("2024-08-15"));
    }

    #[test]
    fn zoom_is_clamped_at_both_ends() {
        let mut window = window("2024-01-01", "2024-12-31");
        while window.zoom_in() {}
        assert_eq!(window.zoom_index(), 0);
        assert!(!window.zoom_in());
        assert_eq!(window.zoom_index(), 0);

        while window.zoom_out() {}
        assert_eq!(window.zoom_index(), ZOOM_LEVELS.len() - 1);
        let snapshot = window;
        assert!(!window.zoom_out());
        assert_eq!(window, snapshot);
    }

    #[test]
    fn every_successful_zoom_keeps_center_within_a_day() {
        let mut window = window("2023-03-10", "2023-09-10");
        let mut previous = center(&window);
        for _ in 0..ZOOM_LEVELS.len() {
            if window.zoom_out() {
                let current = center(&window);
                assert!((current - previous).num_days().abs() <= 1);
                previous = current;
            }
        }
        for _ in 0..ZOOM_LEVELS.len() {
            if window.zoom_in() {
                let current = center(&window);
                assert!((current - previous).num_days().abs() <= 1);
                previous = current;
            }
        }
    }

    #[test]
    fn pan_step_scales_with_zoom_width() {
        let mut wide =
            TimelineWindow::with_zoom(date("2020-01-01"), date("2024-12-30"), 5).unwrap();
        wide.pan_right();
        assert_eq!(wide.range_start(), date("2020-01-01") + Duration::days(456));
        assert_eq!(wide.pan_step(), 456);

        let mut narrow =
            TimelineWindow::with_zoom(date("2024-01-10"), date("2024-01-11"), 0).unwrap();
        narrow.pan_left();
        assert_eq!(narrow.range_start(), date("2024-01-09"));
        assert_eq!(narrow.range_end(), date("2024-01-10"));
    }

    #[test]
    fn expand_moves_only_violated_start_bound() {
        let mut window = window("2024-01-01", "2024-03-01");
        assert!(window.expand_to_include(date("2023-10-01"), date("2023-10-05")));
        assert_eq!(window.range_start(), date("2023-09-01"));
        assert_eq!(window.range_end(), date("2024-03-01"));
    }

    #[test]
    fn expand_moves_end_bound_and_ignores_contained_events() {
        let mut window = window("2024-01-01", "2024-03-01");
        assert!(!window.expand_to_include(date("2024-01-15"), date("2024-02-01")));
        assert!(window.expand_to_include(date("2024-02-01"), date("2024-04-01")));
        assert_eq!(window.range_start(), date("2024-01-01"));
        assert_eq!(window.range_end(), date("2024-05-01"));
    }

    #[test]
    fn center_on_keeps_span() {
        let mut window = window("2024-01-01", "2024-01-31");
        window.center_on(date("2025-06-15"));
        assert_eq!(window.width_days(), 30);
        assert_eq!(window.range_start(), date("2025-05-31"));
    }

    #[test]
    fn set_range_rejects_inverted_bounds_and_keeps_state() {
        let mut window = window("2024-01-01", "2024-01-31");
        assert!(window.set_range(date("2024-05-01"), date("2024-04-01")).is_err());
        assert_eq!(window.range_start(), date("2024-01-01"));
    }

    #[test]
    fn shifting_past_calendar_bounds_saturates() {
        assert_eq!(shift_days(NaiveDate::MAX, 10), NaiveDate::MAX);
        assert_eq!(shift_days(NaiveDate::MIN, -10), NaiveDate::MIN);
    }
}
