//! Bronze stage: bulk-load CSV inputs into the raw store as text.
//!
//! No validation or coercion happens here. Each file is checksummed,
//! parsed by header name, and loaded into its bronze table with a
//! truncate-and-reload in one transaction.

use std::path::Path;
use std::time::Instant;

use medallion_store::BronzeSink;
use medallion_types::{RawRow, RawTable, TableName};
use sha2::{Digest, Sha256};

use crate::errors::{PipelineError, Stage};
use crate::result::{BronzeReport, BronzeTableReport};

/// A parsed input file and the hex SHA-256 of its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvInput {
    pub rows: RawTable,
    pub checksum: String,
}

fn hex_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Parse one CSV file into a raw table.
///
/// The header row is required and must name every column of `table`;
/// extra columns are ignored and column order is free. Empty cells become
/// NULL, every other cell is kept verbatim.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid CSV, or
/// lacks a required column.
pub fn read_csv_table(path: &Path, table: TableName) -> Result<CsvInput, PipelineError> {
    let bytes = std::fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let checksum = hex_digest(&bytes);

    let csv_err = |source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let headers = reader.headers().map_err(csv_err)?.clone();
    let mut positions = Vec::with_capacity(table.columns().len());
    for column in table.columns() {
        let position = headers
            .iter()
            .position(|h| h.trim() == *column)
            .ok_or_else(|| PipelineError::MissingColumn {
                path: path.to_path_buf(),
                column: (*column).to_string(),
            })?;
        positions.push(position);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(RawRow::new(positions.iter().map(|&i| {
            record.get(i).filter(|cell| !cell.is_empty())
        })));
    }

    Ok(CsvInput {
        rows: RawTable::new(table, rows),
        checksum,
    })
}

/// Load every `<table>.csv` under `input_dir` into bronze.
///
/// Missing files are logged and skipped; the corresponding bronze table is
/// left as it was.
///
/// # Errors
///
/// Returns an error on the first unreadable file or store failure.
pub async fn load_bronze<S: BronzeSink>(
    store: &mut S,
    input_dir: &Path,
) -> Result<BronzeReport, PipelineError> {
    let start = Instant::now();
    store
        .ensure_bronze_schema()
        .await
        .map_err(|e| PipelineError::store(Stage::Bronze, "ensure bronze schema", e))?;

    let mut tables = Vec::with_capacity(TableName::ALL.len());
    for table in TableName::ALL {
        let path = input_dir.join(table.file_name());
        if !path.exists() {
            tracing::warn!(table = %table, path = %path.display(), "Input file not found, skipping");
            tables.push(BronzeTableReport {
                table,
                rows_loaded: None,
                checksum: None,
            });
            continue;
        }

        let input = read_csv_table(&path, table)?;
        tracing::info!(
            table = %table,
            path = %path.display(),
            sha256 = input.checksum.as_str(),
            "Loading input file"
        );
        let loaded = store
            .reload_bronze_table(&input.rows)
            .await
            .map_err(|e| PipelineError::store(Stage::Bronze, format!("reload bronze.{table}"), e))?;
        tracing::info!(table = %table, rows = loaded, "Loaded bronze table");

        tables.push(BronzeTableReport {
            table,
            rows_loaded: Some(loaded),
            checksum: Some(input.checksum),
        });
    }

    Ok(BronzeReport {
        tables,
        duration_secs: start.elapsed().as_secs_f64(),
    })
}
