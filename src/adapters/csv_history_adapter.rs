//! CSV file price-history adapter.
//!
//! One file per symbol under the base directory, `<SYMBOL>.csv`, with
//! columns `date,close,low`. An empty close field marks a holiday or
//! provider data-gap row and is preserved as a bar without a close.

use crate::domain::bar::RawBar;
use crate::domain::error::StopsimError;
use crate::ports::history_port::HistoryPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::ports::config_port::ConfigPort;

#[derive(Debug)]
pub struct CsvHistoryAdapter {
    base_path: PathBuf,
}

impl CsvHistoryAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StopsimError> {
        let path =
            config
                .get_string("data", "history_path")
                .ok_or_else(|| StopsimError::ConfigMissing {
                    section: "data".into(),
                    key: "history_path".into(),
                })?;
        Ok(Self::new(PathBuf::from(path)))
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

impl HistoryPort for CsvHistoryAdapter {
    fn fetch_history(&self, symbol: &str) -> Result<Vec<RawBar>, StopsimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StopsimError::NoData {
                    symbol: symbol.to_uppercase(),
                }
            } else {
                StopsimError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                }
            }
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StopsimError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| StopsimError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                StopsimError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let close_str = record.get(1).ok_or_else(|| StopsimError::Data {
                reason: "missing close column".into(),
            })?;
            let close = if close_str.trim().is_empty() {
                None
            } else {
                Some(
                    close_str
                        .parse::<f64>()
                        .map_err(|e| StopsimError::Data {
                            reason: format!("invalid close value: {}", e),
                        })?,
                )
            };

            let low: f64 = record
                .get(2)
                .ok_or_else(|| StopsimError::Data {
                    reason: "missing low column".into(),
                })?
                .parse()
                .map_err(|e| StopsimError::Data {
                    reason: format!("invalid low value: {}", e),
                })?;

            bars.push(RawBar { date, close, low });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StopsimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StopsimError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StopsimError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StopsimError> {
        let bars = self.fetch_history(symbol)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}
