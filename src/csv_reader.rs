use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::table::{Column, Table};

// Reads a headed, comma-delimited file into a table. A column is numeric when
// every non-empty cell parses as f64; empty numeric cells become NaN.
pub fn read_table(file_path: impl AsRef<Path>) -> Result<Table> {
    let path = file_path.as_ref();
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let table = read_table_from(file)?;
    debug!(path = %path.display(), rows = table.n_rows(), columns = table.n_columns(), "read table");
    Ok(table)
}

pub fn read_table_from<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let records: Vec<StringRecord> = rdr
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;

    let columns = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cells: Vec<&str> = records.iter().map(|r| r.get(i).unwrap_or("")).collect();
            infer_column(name, &cells)
        })
        .collect();

    Table::new(columns)
}

fn infer_column(name: &str, cells: &[&str]) -> Column {
    let mut any_value = false;
    let mut parsed = Vec::with_capacity(cells.len());
    for cell in cells {
        if cell.is_empty() {
            parsed.push(f64::NAN);
            continue;
        }
        match cell.parse::<f64>() {
            Ok(v) => {
                any_value = true;
                parsed.push(v);
            }
            Err(_) => {
                return Column::categorical(name, cells.iter().map(|c| c.to_string()).collect());
            }
        }
    }

    if any_value || cells.is_empty() {
        Column::numeric(name, parsed)
    } else {
        Column::categorical(name, cells.iter().map(|c| c.to_string()).collect())
    }
}
