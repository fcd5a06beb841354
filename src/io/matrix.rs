//! CSV matrix ingest and export.
//!
//! Layout: one sample per row, one variable (wavelength) per column. An
//! optional header row carries the variable labels; it is kept so exports can
//! reproduce it.

use std::fs::File;
use std::path::Path;

use nalgebra::DMatrix;

use crate::error::AppError;

/// A numeric matrix with optional column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    pub header: Option<Vec<String>>,
    pub values: DMatrix<f64>,
}

/// Read a numeric CSV file.
pub fn read_matrix_csv(path: &Path, has_header: bool) -> Result<LabeledMatrix, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    parse_matrix(file, has_header).map_err(|e| AppError::new(2, format!("{}: {e}", path.display())))
}

/// Write a matrix as CSV, with the header row if given.
pub fn write_matrix_csv(
    path: &Path,
    header: Option<&[String]>,
    values: &DMatrix<f64>,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    if let Some(header) = header {
        if header.len() != values.ncols() {
            return Err(AppError::new(
                2,
                format!(
                    "Header has {} labels but the matrix has {} columns.",
                    header.len(),
                    values.ncols()
                ),
            ));
        }
        writer
            .write_record(header)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;
    }

    for row in values.row_iter() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

fn parse_matrix<R: std::io::Read>(reader: R, has_header: bool) -> Result<LabeledMatrix, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header = if has_header {
        let headers = reader
            .headers()
            .map_err(|e| format!("Failed to read CSV headers: {e}"))?;
        Some(headers.iter().map(str::to_string).collect::<Vec<_>>())
    } else {
        None
    };

    let mut values = Vec::new();
    let mut n_rows = 0;
    let mut n_cols = None;

    for record in reader.records() {
        let record = record.map_err(|e| format!("Malformed CSV: {e}"))?;
        let line = record.position().map_or(0, |p| p.line());

        if *n_cols.get_or_insert(record.len()) != record.len() {
            return Err(format!(
                "Line {line}: expected {} fields, found {}.",
                n_cols.unwrap_or_default(),
                record.len()
            ));
        }
        for (col, field) in record.iter().enumerate() {
            let v: f64 = field
                .parse()
                .map_err(|_| format!("Line {line}, column {}: '{field}' is not a number.", col + 1))?;
            values.push(v);
        }
        n_rows += 1;
    }

    let n_cols = n_cols.unwrap_or(0);
    if n_rows == 0 || n_cols == 0 {
        return Err("CSV contains no data rows.".to_string());
    }
    if let Some(h) = &header {
        if h.len() != n_cols {
            return Err(format!("Header has {} labels but rows have {n_cols} fields.", h.len()));
        }
    }

    Ok(LabeledMatrix {
        header,
        values: DMatrix::from_row_slice(n_rows, n_cols, &values),
    })
}
