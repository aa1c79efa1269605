#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use stopsim::domain::bar::RawBar;
use stopsim::domain::error::StopsimError;
use stopsim::domain::series::PriceSeries;
use stopsim::ports::history_port::HistoryPort;

pub struct MockHistoryPort {
    pub data: HashMap<String, Vec<RawBar>>,
    pub errors: HashMap<String, String>,
}

impl MockHistoryPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl HistoryPort for MockHistoryPort {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<RawBar>, StopsimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StopsimError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) => Ok(bars.clone()),
            None => Err(StopsimError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, StopsimError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StopsimError> {
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bar with a known close; the low sits one unit below it.
pub fn raw_bar(date: NaiveDate, close: f64) -> RawBar {
    RawBar {
        date,
        close: Some(close),
        low: close - 1.0,
    }
}

/// Holiday/data-gap row: present in the provider output, no close.
pub fn gap_bar(date: NaiveDate) -> RawBar {
    RawBar {
        date,
        close: None,
        low: 0.0,
    }
}

/// Consecutive-day bars starting at `start`, lows one below the close.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<RawBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| raw_bar(start + Duration::days(i as i64), close))
        .collect()
}

pub fn series_from_closes(start: NaiveDate, closes: &[f64]) -> PriceSeries {
    PriceSeries::normalize(&bars_from_closes(start, closes))
}
