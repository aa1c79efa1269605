//! Reference-data port trait.

use crate::domain::error::StopsimError;
use crate::domain::instrument::SymbolTable;

/// Source of the static symbol/name reference table. Loaded once before
/// first use; the table itself is read-only.
pub trait ReferencePort {
    fn load_symbol_table(&self) -> Result<SymbolTable, StopsimError>;
}
