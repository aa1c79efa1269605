//! Configuration validation.
//!
//! Rejects invalid analysis parameters before any simulation runs; a
//! rejected config never produces a partial run.

use crate::domain::error::StopsimError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StopsimError> {
    match config.get_string("data", "history_path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(StopsimError::ConfigMissing {
            section: "data".to_string(),
            key: "history_path".to_string(),
        }),
    }
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), StopsimError> {
    validate_symbol(config)?;
    validate_holding_period(config)?;
    validate_loss_threshold(config)?;
    validate_range(config)?;
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), StopsimError> {
    match config.get_string("analysis", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(StopsimError::ConfigMissing {
            section: "analysis".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_holding_period(config: &dyn ConfigPort) -> Result<(), StopsimError> {
    let value = config.get_int("analysis", "holding_period_days", 0);
    if value < 1 {
        return Err(StopsimError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "holding_period_days".to_string(),
            reason: "holding_period_days must be a positive integer".to_string(),
        });
    }
    Ok(())
}

fn validate_loss_threshold(config: &dyn ConfigPort) -> Result<(), StopsimError> {
    let value = config.get_float("analysis", "stop_loss_pct", -1.0);
    if !(0.0..=100.0).contains(&value) {
        return Err(StopsimError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "stop_loss_pct".to_string(),
            reason: "stop_loss_pct must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}

/// Either a `start_date`/`end_date` pair or a `start_year`/`end_year` pair
/// must be present; dates take precedence when both are configured.
fn validate_range(config: &dyn ConfigPort) -> Result<(), StopsimError> {
    let start_str = config.get_string("analysis", "start_date");
    let end_str = config.get_string("analysis", "end_date");

    if start_str.is_some() || end_str.is_some() {
        let start = parse_date(start_str.as_deref(), "start_date")?;
        let end = parse_date(end_str.as_deref(), "end_date")?;
        if start > end {
            return Err(StopsimError::ConfigInvalid {
                section: "analysis".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must not be after end_date".to_string(),
            });
        }
        return Ok(());
    }

    let from = config.get_int("analysis", "start_year", 0);
    let to = config.get_int("analysis", "end_year", 0);
    if from == 0 && to == 0 {
        return Err(StopsimError::ConfigMissing {
            section: "analysis".to_string(),
            key: "start_date".to_string(),
        });
    }
    for (key, year) in [("start_year", from), ("end_year", to)] {
        if !(1000..=9999).contains(&year) {
            return Err(StopsimError::ConfigInvalid {
                section: "analysis".to_string(),
                key: key.to_string(),
                reason: "year must be a four-digit calendar year".to_string(),
            });
        }
    }
    if from > to {
        return Err(StopsimError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "start_year".to_string(),
            reason: "start_year must not be after end_year".to_string(),
        });
    }
    Ok(())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, StopsimError> {
    match value {
        None => Err(StopsimError::ConfigMissing {
            section: "analysis".to_string(),
            key: field.to_string(),
        }),
        Some(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| StopsimError::ConfigInvalid {
                section: "analysis".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            })
        }
    }
}
