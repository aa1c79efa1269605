//! Stop-loss simulation engine.
//!
//! Walks every possible calendar start date in the window, runs a
//! fixed-length holding-period trial from each, and folds the outcomes
//! into per-run accumulators. Trials are independent; the fold never
//! mutates one trial from another.

use chrono::{Duration, NaiveDate};

use super::series::PriceSeries;

/// The date range and holding period one simulation runs over.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub holding_period_days: i64,
}

/// Stop-loss policy, immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct StopLossConfig {
    /// Percentage drop from the entry close that fires the stop, in [0, 100].
    pub loss_threshold_pct: f64,
}

impl StopLossConfig {
    /// Price at or below which the stop fires for the given entry close.
    pub fn sell_threshold(&self, entry_close: f64) -> f64 {
        entry_close * (1.0 - self.loss_threshold_pct / 100.0)
    }
}

/// One simulated entry. Ephemeral: produced by [`evaluate_trial`], folded
/// into a [`SimulationOutcome`], never stored across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub entry_date: NaiveDate,
    pub entry_close: f64,
    pub exit_date: NaiveDate,
    pub triggered: bool,
    /// Return to natural exit, ignoring the stop.
    pub natural_return_pct: f64,
    /// Return under the stop-loss policy: the first-touch exit when
    /// triggered, the natural return otherwise.
    pub outcome_return_pct: f64,
}

/// Fold accumulators for one simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOutcome {
    pub triggered_count: usize,
    pub not_triggered_count: usize,
    /// Calendar starts whose entry or exit could not be resolved to a
    /// trading day. Excluded from every statistic.
    pub skipped_count: usize,
    pub with_stop_returns: Vec<f64>,
    pub no_stop_returns: Vec<f64>,
}

impl SimulationOutcome {
    pub fn trial_count(&self) -> usize {
        self.triggered_count + self.not_triggered_count
    }

    fn record(&mut self, trial: &Trial) {
        self.no_stop_returns.push(trial.natural_return_pct);
        self.with_stop_returns.push(trial.outcome_return_pct);
        if trial.triggered {
            self.triggered_count += 1;
        } else {
            self.not_triggered_count += 1;
        }
    }
}

/// Evaluate the trial entered on calendar day `start`.
///
/// Entry snaps forward to the first trading day on or after `start`, exit
/// to the first on or after `start + holding_period_days`; snapping is
/// monotone, so the exit never precedes the entry. `None` when either end
/// cannot be resolved within the gap bound — the caller counts such starts
/// as skipped, never as an outcome.
pub fn evaluate_trial(
    series: &PriceSeries,
    start: NaiveDate,
    holding_period_days: i64,
    config: &StopLossConfig,
) -> Option<Trial> {
    let entry = series.resolve_bar(start)?;
    let exit = series.resolve_bar(start + Duration::days(holding_period_days))?;

    let entry_close = entry.close;
    let sell_threshold = config.sell_threshold(entry_close);
    let natural_return_pct = (exit.close - entry_close) / entry_close * 100.0;

    let entry_idx = series.bar_index(entry.date)?;
    let exit_idx = series.bar_index(exit.date)?;
    let held = &series.bars()[entry_idx..=exit_idx];

    // First-touch: the stop fires the moment the intraday low crosses the
    // threshold, not at the period's worst price.
    let (triggered, outcome_return_pct) = match held.iter().find(|b| b.low <= sell_threshold) {
        Some(touch) => (true, (touch.low - entry_close) / entry_close * 100.0),
        None => (false, natural_return_pct),
    };

    Some(Trial {
        entry_date: entry.date,
        entry_close,
        exit_date: exit.date,
        triggered,
        natural_return_pct,
        outcome_return_pct,
    })
}

/// Run every trial in the window and fold the outcomes.
///
/// Steps one calendar day at a time, not one trading day: starts that land
/// in a data gap resolve forward, so several starts may share a trading
/// day. This weights the statistics by calendar-day entry opportunities.
pub fn run_simulation(
    series: &PriceSeries,
    window: &SimulationWindow,
    config: &StopLossConfig,
) -> SimulationOutcome {
    let mut outcome = SimulationOutcome::default();

    let last_possible_start = window.end_date - Duration::days(window.holding_period_days);
    if last_possible_start < window.start_date {
        return outcome;
    }

    let mut day = window.start_date;
    while day <= last_possible_start {
        match evaluate_trial(series, day, window.holding_period_days, config) {
            Some(trial) => outcome.record(&trial),
            None => outcome.skipped_count += 1,
        }
        day += Duration::days(1);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::RawBar;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Consecutive-day bars starting at `start`, lows one below the close.
    fn series_from_closes(start: NaiveDate, closes: &[f64]) -> PriceSeries {
        let raw: Vec<RawBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| RawBar {
                date: start + Duration::days(i as i64),
                close: Some(close),
                low: close - 1.0,
            })
            .collect();
        PriceSeries::normalize(&raw)
    }

    fn stop(pct: f64) -> StopLossConfig {
        StopLossConfig {
            loss_threshold_pct: pct,
        }
    }

    #[test]
    fn trial_not_triggered_on_flat_series() {
        let series = series_from_closes(date(2024, 1, 1), &[100.0; 10]);
        let trial = evaluate_trial(&series, date(2024, 1, 1), 3, &stop(7.0)).unwrap();

        assert!(!trial.triggered);
        assert!((trial.natural_return_pct - 0.0).abs() < f64::EPSILON);
        assert!((trial.outcome_return_pct - 0.0).abs() < f64::EPSILON);
        assert_eq!(trial.entry_date, date(2024, 1, 1));
        assert_eq!(trial.exit_date, date(2024, 1, 4));
    }

    #[test]
    fn trial_triggered_on_drop() {
        let series = series_from_closes(date(2024, 1, 1), &[100.0, 100.0, 95.0, 90.0, 100.0]);
        let trial = evaluate_trial(&series, date(2024, 1, 1), 3, &stop(7.0)).unwrap();

        // threshold 93; lows 99, 99, 94, 89 — first touch is the 89 low
        assert!(trial.triggered);
        assert!((trial.outcome_return_pct - (-11.0)).abs() < 1e-9);
        // natural return is recorded regardless of the trigger
        assert!((trial.natural_return_pct - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn trigger_uses_first_touch_not_worst_price() {
        // entry 100, threshold 93; lows 99, 92.5, 85 — the stop fires at
        // 92.5, not at the deeper 85 low
        let raw = vec![
            RawBar {
                date: date(2024, 1, 1),
                close: Some(100.0),
                low: 99.0,
            },
            RawBar {
                date: date(2024, 1, 2),
                close: Some(96.0),
                low: 92.5,
            },
            RawBar {
                date: date(2024, 1, 3),
                close: Some(90.0),
                low: 85.0,
            },
        ];
        let series = PriceSeries::normalize(&raw);
        let trial = evaluate_trial(&series, date(2024, 1, 1), 2, &stop(7.0)).unwrap();

        assert!(trial.triggered);
        assert!((trial.outcome_return_pct - (-7.5)).abs() < 1e-9);
    }

    #[test]
    fn trial_skipped_when_exit_unresolvable() {
        let series = series_from_closes(date(2024, 1, 1), &[100.0, 100.0, 100.0]);
        // exit probe starts 60 days past the last bar
        assert!(evaluate_trial(&series, date(2024, 1, 1), 63, &stop(5.0)).is_none());
    }

    #[test]
    fn entry_and_exit_snap_forward_over_gap() {
        // bars on Jan 1 and Jan 10-12 only
        let raw = vec![
            RawBar {
                date: date(2024, 1, 1),
                close: Some(100.0),
                low: 99.0,
            },
            RawBar {
                date: date(2024, 1, 10),
                close: Some(100.0),
                low: 99.0,
            },
            RawBar {
                date: date(2024, 1, 11),
                close: Some(101.0),
                low: 100.0,
            },
            RawBar {
                date: date(2024, 1, 12),
                close: Some(102.0),
                low: 101.0,
            },
        ];
        let series = PriceSeries::normalize(&raw);
        let trial = evaluate_trial(&series, date(2024, 1, 3), 8, &stop(5.0)).unwrap();

        // entry snaps 3 -> 10, exit snaps 11 -> 11
        assert_eq!(trial.entry_date, date(2024, 1, 10));
        assert_eq!(trial.exit_date, date(2024, 1, 11));
        assert!((trial.entry_close - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn calendar_stepping_counts_gap_starts_separately() {
        // trading days Jan 1 and Jan 4-8; starts on Jan 2 and Jan 3 both
        // resolve their entry to Jan 4 and still count as distinct trials
        let mut raw = vec![RawBar {
            date: date(2024, 1, 1),
            close: Some(100.0),
            low: 99.0,
        }];
        raw.extend((0..5).map(|i| RawBar {
            date: date(2024, 1, 4) + Duration::days(i),
            close: Some(100.0),
            low: 99.0,
        }));
        let series = PriceSeries::normalize(&raw);

        let window = SimulationWindow {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 7),
            holding_period_days: 1,
        };
        let outcome = run_simulation(&series, &window, &stop(5.0));

        // starts Jan 1 .. Jan 6 inclusive
        assert_eq!(outcome.trial_count(), 6);
        assert_eq!(outcome.skipped_count, 0);
    }

    #[test]
    fn zero_trials_when_holding_exceeds_window() {
        let series = series_from_closes(date(2024, 1, 1), &[100.0; 10]);
        let window = SimulationWindow {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 5),
            holding_period_days: 10,
        };
        let outcome = run_simulation(&series, &window, &stop(5.0));

        assert_eq!(outcome, SimulationOutcome::default());
    }

    #[test]
    fn empty_series_skips_every_start() {
        let series = PriceSeries::normalize(&[]);
        let window = SimulationWindow {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 10),
            holding_period_days: 3,
        };
        let outcome = run_simulation(&series, &window, &stop(5.0));

        assert_eq!(outcome.trial_count(), 0);
        assert_eq!(outcome.skipped_count, 8);
    }

    #[test]
    fn accumulators_cover_every_start() {
        let series = series_from_closes(
            date(2024, 1, 1),
            &[100.0, 100.0, 95.0, 90.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0],
        );
        let window = SimulationWindow {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 7),
            holding_period_days: 3,
        };
        let outcome = run_simulation(&series, &window, &stop(7.0));

        let scanned = 4; // Jan 1 .. Jan 4
        assert_eq!(
            outcome.triggered_count + outcome.not_triggered_count + outcome.skipped_count,
            scanned
        );
        assert_eq!(outcome.no_stop_returns.len(), outcome.trial_count());
        assert_eq!(outcome.with_stop_returns.len(), outcome.trial_count());
    }
}
