//! Price-history provider port trait.

use crate::domain::bar::RawBar;
use crate::domain::error::StopsimError;
use chrono::NaiveDate;

pub trait HistoryPort {
    /// Full provider history for one symbol, ordered by date. The result
    /// may contain calendar gaps and bars without a close; cleaning is the
    /// caller's job.
    fn fetch_history(&self, symbol: &str) -> Result<Vec<RawBar>, StopsimError>;

    fn list_symbols(&self) -> Result<Vec<String>, StopsimError>;

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StopsimError>;
}
