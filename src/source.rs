//! Tabular input parsing: delimited text and workbook files.
//!
//! Format selection is driven by the file-name suffix: `.csv`/`.tsv`
//! are read through the `csv` crate (with extension-based delimiter
//! resolution and `encoding_rs` decoding), `.xlsx`/`.xls` through
//! `calamine`. Everything lands in a [`RawTable`]: ordered headers and
//! ordered rows of optional scalar cells, with empty cells already
//! collapsed to `None`.

use std::{
    fs::File,
    io::BufReader,
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto};
use encoding_rs::{Encoding, UTF_8};

use crate::{data::Scalar, error::SyncError};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// The unprocessed contents of one uploaded file.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<Scalar>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Workbook,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") | Some("tsv") => Ok(SourceFormat::Delimited),
            Some("xlsx") | Some("xls") => Ok(SourceFormat::Workbook),
            Some(other) => Err(anyhow!(
                "unsupported file extension '.{other}' (expected .csv, .tsv, .xlsx, or .xls)"
            )),
            None => Err(anyhow!(
                "file has no extension (expected .csv, .tsv, .xlsx, or .xls)"
            )),
        }
    }
}

/// Reading options for delimited inputs; ignored for workbooks.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub delimiter: Option<u8>,
    pub encoding: Option<String>,
}

/// Parses `path` into a [`RawTable`]. Any failure is reported as a
/// single `SourceParse` error naming the file.
pub fn read_table(path: &Path, options: &SourceOptions) -> Result<RawTable, SyncError> {
    let parsed = SourceFormat::from_path(path).and_then(|format| match format {
        SourceFormat::Delimited => read_delimited(path, options),
        SourceFormat::Workbook => read_workbook(path),
    });
    parsed.map_err(|err| SyncError::source_parse(path, format!("{err:#}")))
}

pub fn resolve_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

fn read_delimited(path: &Path, options: &SourceOptions) -> Result<RawTable> {
    let delimiter = resolve_delimiter(path, options.delimiter);
    let encoding = resolve_encoding(options.encoding.as_deref())?;
    let file = File::open(path).with_context(|| format!("opening {path:?}"))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = decode_record(&reader.byte_headers()?.clone(), encoding)?;
    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.context("reading row")?;
        let cells = decode_record(&record, encoding)?
            .into_iter()
            .map(|cell| {
                if cell.is_empty() {
                    None
                } else {
                    Some(Scalar::Text(cell))
                }
            })
            .collect();
        rows.push(cells);
    }
    Ok(RawTable { headers, rows })
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            if had_errors {
                Err(anyhow!("failed to decode field with encoding {}", encoding.name()))
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}

fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening workbook {path:?}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook contains no sheets"))?
        .context("reading first worksheet")?;

    let mut rows_iter = range.rows();
    let headers = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| match cell {
                Data::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        None => Vec::new(),
    };

    let rows = rows_iter
        .map(|row| row.iter().map(cell_to_scalar).collect())
        .collect();
    Ok(RawTable { headers, rows })
}

fn cell_to_scalar(cell: &Data) -> Option<Scalar> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Scalar::Text(s.clone())),
        Data::Int(i) => Some(Scalar::Integer(*i)),
        Data::Float(f) => Some(Scalar::Float(*f)),
        Data::Bool(b) => Some(Scalar::Text(b.to_string())),
        Data::DateTime(dt) => Some(Scalar::Float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Scalar::Text(s.clone())),
    }
}
