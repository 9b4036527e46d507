//! Numeric series extraction from CSV files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{DataError, DataResult};

/// Read one numeric column of a CSV file, in row order
pub fn load_series(path: &Path, column: &str) -> DataResult<Vec<f64>> {
    let file = File::open(path)?;
    read_series(BufReader::new(file), column)
}

/// Read one numeric column from CSV data
///
/// Blank cells become NaN, which the spike detector treats as missing data.
/// Anything else that does not parse as a number is an error.
pub fn read_series<R: Read>(reader: R, column: &str) -> DataResult<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let index = reader
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DataError::MissingColumn(column.to_string()))?;

    let mut values = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let field = record.get(index).unwrap_or("");

        if field.is_empty() {
            values.push(f64::NAN);
            continue;
        }

        let value = field.parse::<f64>().map_err(|_| DataError::InvalidValue {
            row: row + 1,
            column: column.to_string(),
            value: field.to_string(),
        })?;
        values.push(value);
    }

    Ok(values)
}

/// Number of data rows (header excluded) in a CSV file
pub fn count_rows(path: &Path) -> DataResult<usize> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let mut count = 0;
    for result in reader.records() {
        result?;
        count += 1;
    }
    Ok(count)
}
