//! Static symbol reference table.
//!
//! One row per listed instrument, loaded once before first use and
//! read-only afterwards.

/// One row of the reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub index: String,
    pub description: String,
    pub category: String,
    pub provider: String,
}

/// Lookup over the loaded reference rows. Symbol matching is
/// case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    instruments: Vec<Instrument>,
}

impl SymbolTable {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn find(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
    }

    /// `SYMBOL   Name` label for selection lists and report headings;
    /// falls back to the bare symbol when the table has no row for it.
    pub fn display_label(&self, symbol: &str) -> String {
        match self.find(symbol) {
            Some(inst) => format!("{}   {}", inst.symbol, inst.name),
            None => symbol.to_uppercase(),
        }
    }
}
