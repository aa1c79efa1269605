//! Normalized price series: window selection and trading-day resolution.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use super::bar::{PriceBar, RawBar};

/// Longest calendar gap the forward probe will cross. Covers weekends,
/// holiday clusters and extended market closures; a tunable assumption,
/// not a hard law.
pub const MAX_CALENDAR_GAP_DAYS: i64 = 30;

/// An ordered-by-date series of cleaned bars with a date index for O(1)
/// lookup. Dates are strictly increasing.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceSeries {
    /// Clean a provider bar sequence: rows without a close are dropped,
    /// remaining bars are sorted by date and duplicate dates collapse to
    /// their first occurrence. Empty input yields an empty series.
    pub fn normalize(raw: &[RawBar]) -> Self {
        let mut bars: Vec<PriceBar> = raw.iter().filter_map(PriceBar::from_raw).collect();
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self::from_bars(bars)
    }

    fn from_bars(bars: Vec<PriceBar>) -> Self {
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        Self { bars, date_index }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn bar(&self, date: NaiveDate) -> Option<&PriceBar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }

    pub fn bar_index(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    /// Bars with date in `[start, end]`, inclusive on both ends. An empty
    /// intersection is an empty series, not an error.
    pub fn select_window(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        let bars = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        Self::from_bars(bars)
    }

    /// Coarse variant of [`select_window`]: bars with calendar year in
    /// `[from_year, to_year]`, inclusive.
    ///
    /// [`select_window`]: PriceSeries::select_window
    pub fn select_years(&self, from_year: i32, to_year: i32) -> PriceSeries {
        let bars = self
            .bars
            .iter()
            .filter(|b| b.year >= from_year && b.year <= to_year)
            .cloned()
            .collect();
        Self::from_bars(bars)
    }

    /// First bar on or after `date` with a positive close, probing at most
    /// [`MAX_CALENDAR_GAP_DAYS`] forward. `None` means no trading day exists
    /// within the bound.
    pub fn resolve_bar(&self, date: NaiveDate) -> Option<&PriceBar> {
        (0..=MAX_CALENDAR_GAP_DAYS).find_map(|offset| {
            self.bar(date + Duration::days(offset))
                .filter(|b| b.close > 0.0)
        })
    }

    /// Snap `date` forward to the nearest subsequent trading day.
    pub fn resolve_trading_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.resolve_bar(date).map(|b| b.date)
    }

    /// Closing price at the trading day `date` snaps to.
    pub fn resolve_close(&self, date: NaiveDate) -> Option<f64> {
        self.resolve_bar(date).map(|b| b.close)
    }
}
