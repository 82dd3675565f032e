//! Order file parsing.
//!
//! Rows are headerless `year,month,day,symbol,side,shares`. Trailing empty
//! fields are tolerated (spreadsheet exports often end rows with a comma).
//! The first malformed row rejects the whole file.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use marketsim_core::{Error, Order, Result, Side};
use std::io::Read;
use std::path::Path;
use tracing::debug;

const FIELD_COUNT: usize = 6;

/// Read every order from a CSV source.
pub fn read_orders<R: Read>(reader: R) -> Result<Vec<Order>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut orders = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);
        orders.push(parse_record(&record, line)?);
    }

    debug!(count = orders.len(), "parsed orders");
    Ok(orders)
}

/// Read every order from a CSV file.
pub fn read_orders_file(path: impl AsRef<Path>) -> Result<Vec<Order>> {
    let file = std::fs::File::open(path)?;
    read_orders(file)
}

fn parse_record(record: &StringRecord, line: usize) -> Result<Order> {
    if record.len() < FIELD_COUNT {
        return Err(Error::malformed_order(
            line,
            format!("expected {FIELD_COUNT} fields, found {}", record.len()),
        ));
    }
    if let Some(extra) = record.iter().skip(FIELD_COUNT).find(|f| !f.is_empty()) {
        return Err(Error::malformed_order(
            line,
            format!("unexpected trailing field '{extra}'"),
        ));
    }

    let year: i32 = parse_field(record, 0, "year", line)?;
    let month: u32 = parse_field(record, 1, "month", line)?;
    let day: u32 = parse_field(record, 2, "day", line)?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        Error::malformed_order(line, format!("invalid date {year}-{month}-{day}"))
    })?;

    let symbol = &record[3];
    let side: Side = record[4]
        .parse()
        .map_err(|_| Error::malformed_order(line, format!("unknown side '{}'", &record[4])))?;
    let shares: u32 = parse_field(record, 5, "shares", line)?;

    Order::new(date, symbol, side, shares).map_err(|e| match e {
        Error::Data(reason) => Error::malformed_order(line, reason),
        other => other,
    })
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    idx: usize,
    name: &str,
    line: usize,
) -> Result<T> {
    let raw = &record[idx];
    raw.parse()
        .map_err(|_| Error::malformed_order(line, format!("invalid {name} '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orders_in_file_order() {
        let csv = "2011,1,10,AAPL,Buy,1500,\n2011,1,13,AAPL,Sell,1500,\n2011,1,13,IBM,Buy,4000,\n";
        let orders = read_orders(csv.as_bytes()).unwrap();

        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].symbol(), "AAPL");
        assert_eq!(orders[0].side(), Side::Buy);
        assert_eq!(orders[0].shares(), 1500);
        assert_eq!(orders[0].date(), NaiveDate::from_ymd_opt(2011, 1, 10).unwrap());
        assert_eq!(orders[1].side(), Side::Sell);
        assert_eq!(orders[2].symbol(), "IBM");
    }

    #[test]
    fn test_whitespace_trimmed() {
        let csv = " 2011 , 1 , 10 , AAPL , Buy , 15 \n";
        let orders = read_orders(csv.as_bytes()).unwrap();
        assert_eq!(orders[0].symbol(), "AAPL");
        assert_eq!(orders[0].shares(), 15);
    }

    #[test]
    fn test_unknown_side_rejects_file() {
        let csv = "2011,1,10,AAPL,Buy,1500\n2011,1,11,AAPL,Hold,10\n";
        let err = read_orders(csv.as_bytes()).unwrap_err();
        match err {
            Error::MalformedOrder { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("Hold"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_bad_shares_and_dates() {
        assert!(matches!(
            read_orders("2011,1,10,AAPL,Buy,1.5\n".as_bytes()),
            Err(Error::MalformedOrder { .. })
        ));
        assert!(matches!(
            read_orders("2011,1,10,AAPL,Buy,-3\n".as_bytes()),
            Err(Error::MalformedOrder { .. })
        ));
        assert!(matches!(
            read_orders("2011,1,10,AAPL,Buy,0\n".as_bytes()),
            Err(Error::MalformedOrder { .. })
        ));
        assert!(matches!(
            read_orders("2011,2,30,AAPL,Buy,10\n".as_bytes()),
            Err(Error::MalformedOrder { .. })
        ));
        assert!(matches!(
            read_orders("2011,1,10,AAPL\n".as_bytes()),
            Err(Error::MalformedOrder { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(read_orders("".as_bytes()).unwrap().is_empty());
    }
}
