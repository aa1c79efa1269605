//! Daily price bar representations.

use chrono::{Datelike, NaiveDate};

/// A bar as delivered by a price-history provider.
///
/// `close` is absent on holiday rows and provider data gaps; `low` is the
/// intraday low as reported.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub low: f64,
}

/// A cleaned bar: close is known, calendar year derived from the date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub low: f64,
    pub year: i32,
}

impl PriceBar {
    /// `None` when the raw bar has no close. Closes are never fabricated
    /// or interpolated.
    pub fn from_raw(raw: &RawBar) -> Option<Self> {
        raw.close.map(|close| PriceBar {
            date: raw.date,
            close,
            low: raw.low,
            year: raw.date.year(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            close: Some(105.0),
            low: 101.5,
        }
    }

    #[test]
    fn from_raw_with_close() {
        let bar = PriceBar::from_raw(&sample_raw()).unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!((bar.close - 105.0).abs() < f64::EPSILON);
        assert!((bar.low - 101.5).abs() < f64::EPSILON);
        assert_eq!(bar.year, 2024);
    }

    #[test]
    fn from_raw_without_close() {
        let raw = RawBar {
            close: None,
            ..sample_raw()
        };
        assert!(PriceBar::from_raw(&raw).is_none());
    }

    #[test]
    fn year_tracks_date() {
        let raw = RawBar {
            date: NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
            close: Some(50.0),
            low: 49.0,
        };
        assert_eq!(PriceBar::from_raw(&raw).unwrap().year, 1999);
    }
}
