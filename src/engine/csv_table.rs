use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim, Writer};

use crate::scoring::ScoredTable;
use crate::types::TransactionRecord;

pub const RISK_COLUMN: &str = "fraud_risk";
pub const FLAG_COLUMN: &str = "flagged";

/// An input CSV materialized in memory, header order preserved.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<TransactionRecord>
}

impl RawTable {
    /// Drops a column from the headers and from every record.
    pub fn remove_column(&mut self, column: &str) {
        self.headers.retain(|header| header != column);
        for record in &mut self.records {
            record.remove(column);
        }
    }
}

pub fn read_table(path: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Error opening CSV at path: {}", path.display()))?;

    //NOTE: Spreadsheet exports frequently prefix the first header with a UTF-8 BOM
    let headers: Vec<String> = reader.headers()
        .with_context(|| format!("Error reading CSV headers from: {}", path.display()))?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut records: Vec<TransactionRecord> = Vec::new();

    for (line, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV read error in data row {} of {}", line + 1, path.display()))?;

        records.push(headers.iter().cloned().zip(row.iter().map(str::to_string)).collect());
    }

    Ok(RawTable {
        headers,
        records
    })
}

/// Writes the original columns followed by the risk and flag columns. Rows the
/// encoder dropped keep empty score cells.
pub fn write_scored_csv<W: Write>(table: &ScoredTable, writer: W) -> Result<()> {
    let passthrough: Vec<&str> = table.headers().iter()
        .map(String::as_str)
        .filter(|header| *header != RISK_COLUMN && *header != FLAG_COLUMN)
        .collect();

    let mut output = Writer::from_writer(writer);

    output.write_record(passthrough.iter().copied().chain([RISK_COLUMN, FLAG_COLUMN]))?;

    for (record, score) in table.rows() {
        let (risk, flagged) = match score {
            Some(score) => (format!("{:.6}", score.probability), score.flagged.to_string()),
            None => (String::new(), String::new())
        };

        let cells = passthrough.iter()
            .map(|header| record.raw(header).unwrap_or("").to_string())
            .chain([risk, flagged]);

        output.write_record(cells)?;
    }

    output.flush()?;

    Ok(())
}
