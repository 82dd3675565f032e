//! Valuation series files: headerless `year,month,day,equity` rows.

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use marketsim_core::{Error, Result, ValuationPoint};
use std::io::{Read, Write};
use std::path::Path;

/// Write a valuation series.
pub fn write_valuations<W: Write>(writer: W, series: &[ValuationPoint]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    for point in series {
        wtr.serialize(point.to_record())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a valuation series to a file, replacing it.
pub fn write_valuations_file(path: impl AsRef<Path>, series: &[ValuationPoint]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_valuations(file, series)
}

/// Read a valuation series. Dates must be strictly ascending.
pub fn read_valuations<R: Read>(reader: R) -> Result<Vec<ValuationPoint>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(reader);

    let mut series: Vec<ValuationPoint> = Vec::new();
    for row in rdr.deserialize::<(i32, u32, u32, f64)>() {
        let (year, month, day, equity) = row?;
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| Error::data(format!("invalid date {year}-{month}-{day}")))?;
        if let Some(prev) = series.last() {
            if date <= prev.date {
                return Err(Error::data(format!(
                    "valuation dates not ascending: {} then {date}",
                    prev.date
                )));
            }
        }
        series.push(ValuationPoint { date, equity });
    }
    Ok(series)
}

/// Read a valuation series from a file.
pub fn read_valuations_file(path: impl AsRef<Path>) -> Result<Vec<ValuationPoint>> {
    let file = std::fs::File::open(path)?;
    read_valuations(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(d: u32, equity: f64) -> ValuationPoint {
        ValuationPoint {
            date: NaiveDate::from_ymd_opt(2011, 1, d).unwrap(),
            equity,
        }
    }

    #[test]
    fn test_write_format() {
        let mut out = Vec::new();
        write_valuations(&mut out, &[point(10, 1_000_000.0), point(11, 998_785.5)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "2011,1,10,1000000.0\n2011,1,11,998785.5\n");
    }

    #[test]
    fn test_read_written_series() {
        let series = vec![point(10, 1_000_000.0), point(11, 998_785.5), point(12, 1_001_234.25)];
        let mut out = Vec::new();
        write_valuations(&mut out, &series).unwrap();
        assert_eq!(read_valuations(out.as_slice()).unwrap(), series);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let csv = "2011,1,11,100.0\n2011,1,10,101.0\n";
        assert!(matches!(read_valuations(csv.as_bytes()), Err(Error::Data(_))));
        let dup = "2011,1,11,100.0\n2011,1,11,101.0\n";
        assert!(read_valuations(dup.as_bytes()).is_err());
    }
}
