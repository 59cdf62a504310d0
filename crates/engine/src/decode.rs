//! Turns uploaded spreadsheet files into a [`TabularPayload`].
//!
//! The first row of the first sheet is the header row. Reconciliation never
//! sees the file format, only the decoded payload.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader};
use gridbook_core::Scalar;
use thiserror::Error;

use crate::import::TabularPayload;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("the sheet is empty")]
    EmptySheet,

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
}

pub trait TabularDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TabularPayload, DecodeError>;
}

/// Comma-separated text. Cells stay text; empty cells become [`Scalar::Null`].
#[derive(Debug, Clone, Copy)]
pub struct CsvDecoder {
    pub delimiter: u8,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl TabularDecoder for CsvDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TabularPayload, DecodeError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            // Header row is handled here so it goes through the same path as data.
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => return Err(DecodeError::EmptySheet),
        };

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            Scalar::Null
                        } else {
                            Scalar::text(cell)
                        }
                    })
                    .collect(),
            );
        }
        Ok(TabularPayload::new(headers, rows))
    }
}

/// Excel and OpenDocument workbooks; only the first worksheet is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookDecoder;

impl TabularDecoder for WorkbookDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TabularPayload, DecodeError> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(DecodeError::EmptySheet)??;

        let mut sheet_rows = range.rows();
        let headers = sheet_rows
            .next()
            .ok_or(DecodeError::EmptySheet)?
            .iter()
            .map(|cell| cell_to_scalar(cell).to_cell_string())
            .collect();
        let rows = sheet_rows
            .map(|row| row.iter().map(cell_to_scalar).collect())
            .collect();
        Ok(TabularPayload::new(headers, rows))
    }
}

fn cell_to_scalar(cell: &Data) -> Scalar {
    match cell {
        Data::Empty => Scalar::Null,
        Data::String(s) => Scalar::Text(s.clone()),
        Data::Float(f) => Scalar::Number(*f),
        Data::Int(i) => Scalar::Number(*i as f64),
        Data::Bool(b) => Scalar::Text(b.to_string()),
        other => Scalar::Text(other.to_string()),
    }
}

/// Pick a decoder from the uploaded file's extension.
pub fn decode_upload(file_name: &str, bytes: &[u8]) -> Result<TabularPayload, DecodeError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => CsvDecoder::default().decode(bytes),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => WorkbookDecoder.decode(bytes),
        _ => Err(DecodeError::UnsupportedFormat(file_name.to_string())),
    }
}
