//! CSV symbol reference table adapter.
//!
//! Reads the static `Symbol,Name,Index,Description,Category,Provider`
//! table shipped alongside the price data.

use crate::domain::error::StopsimError;
use crate::domain::instrument::{Instrument, SymbolTable};
use crate::ports::reference_port::ReferencePort;
use std::fs;
use std::path::PathBuf;

pub struct CsvSymbolAdapter {
    path: PathBuf,
}

impl CsvSymbolAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ReferencePort for CsvSymbolAdapter {
    fn load_symbol_table(&self) -> Result<SymbolTable, StopsimError> {
        let content = fs::read_to_string(&self.path).map_err(|e| StopsimError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut instruments = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StopsimError::Data {
                reason: format!("CSV parse error in {}: {}", self.path.display(), e),
            })?;

            let field = |i: usize| record.get(i).unwrap_or_default().trim().to_string();
            let symbol = field(0);
            if symbol.is_empty() {
                continue;
            }

            instruments.push(Instrument {
                symbol,
                name: field(1),
                index: field(2),
                description: field(3),
                category: field(4),
                provider: field(5),
            });
        }

        Ok(SymbolTable::new(instruments))
    }
}
