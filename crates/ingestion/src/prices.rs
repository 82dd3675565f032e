//! Closing price file loading.
//!
//! Long format with a header row: `date,symbol,close`, ISO dates.

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use marketsim_core::{Error, InMemoryPriceTable, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    symbol: String,
    close: f64,
}

/// Load a price table from a CSV source.
///
/// A repeated (symbol, date) keeps the last row.
pub fn read_prices<R: Read>(reader: R) -> Result<InMemoryPriceTable> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut table = InMemoryPriceTable::new();
    let mut rows = 0usize;
    for row in rdr.deserialize::<PriceRow>() {
        let row = row?;
        if row.symbol.is_empty() {
            return Err(Error::data(format!("price row {} has no symbol", rows + 1)));
        }
        table.insert(row.symbol, row.date, row.close)?;
        rows += 1;
    }

    if rows != table.len() {
        warn!(rows, unique = table.len(), "duplicate price rows collapsed");
    }
    debug!(rows, symbols = table.symbols().count(), "loaded prices");
    Ok(table)
}

/// Load a price table from a CSV file.
pub fn read_prices_file(path: impl AsRef<Path>) -> Result<InMemoryPriceTable> {
    let file = std::fs::File::open(path)?;
    read_prices(file)
}
