//! Aggregate statistics and report rendering.

use super::simulation::SimulationOutcome;

/// Summary statistics for one simulation run. Built once, never mutated.
///
/// The rate and mean fields are `None` when the run produced no valid
/// trials; absence is surfaced, never replaced by a default.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub trial_count: usize,
    pub skipped_count: usize,
    pub trigger_rate_pct: Option<f64>,
    pub mean_return_no_stop_pct: Option<f64>,
    pub mean_return_with_stop_pct: Option<f64>,
}

impl SimulationReport {
    pub fn from_outcome(outcome: &SimulationOutcome) -> Self {
        let trial_count = outcome.trial_count();
        let trigger_rate_pct = if trial_count > 0 {
            Some(outcome.triggered_count as f64 / trial_count as f64 * 100.0)
        } else {
            None
        };

        SimulationReport {
            trial_count,
            skipped_count: outcome.skipped_count,
            trigger_rate_pct,
            mean_return_no_stop_pct: mean(&outcome.no_stop_returns),
            mean_return_with_stop_pct: mean(&outcome.with_stop_returns),
        }
    }

    /// Human-readable comparison sentence, or an insufficient-data message
    /// when the window produced no valid trials.
    pub fn summary_sentence(&self, loss_threshold_pct: f64) -> String {
        match (
            self.trigger_rate_pct,
            self.mean_return_no_stop_pct,
            self.mean_return_with_stop_pct,
        ) {
            (Some(rate), Some(no_stop), Some(with_stop)) => format!(
                "A stop-loss at {:.1}% would have triggered in {:.1}% of cases; \
                 it would have turned an average {} of {:.2}% into an average {} of {:.2}%.",
                loss_threshold_pct,
                rate,
                gain_or_loss(no_stop),
                no_stop.abs(),
                gain_or_loss(with_stop),
                with_stop.abs(),
            ),
            _ => "Insufficient data: the selected window produced no valid trials.".to_string(),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn gain_or_loss(value: f64) -> &'static str {
    if value >= 0.0 { "gain" } else { "loss" }
}
