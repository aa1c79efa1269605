//! Cleaned-series CSV export for charting.

use crate::domain::error::StopsimError;
use crate::domain::series::PriceSeries;
use std::path::Path;

/// Write the cleaned series as `date,close,low` rows.
pub fn write_series_csv(path: &Path, series: &PriceSeries) -> Result<(), StopsimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| StopsimError::Data {
        reason: format!("failed to open {}: {}", path.display(), e),
    })?;

    wtr.write_record(["date", "close", "low"])
        .map_err(|e| StopsimError::Data {
            reason: format!("CSV write error: {}", e),
        })?;

    for bar in series.bars() {
        wtr.write_record([
            bar.date.format("%Y-%m-%d").to_string(),
            bar.close.to_string(),
            bar.low.to_string(),
        ])
        .map_err(|e| StopsimError::Data {
            reason: format!("CSV write error: {}", e),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
