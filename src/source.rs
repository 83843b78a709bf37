//! Identifier Source - reads the identifier column from a tabular input file.

use crate::error::{EnrichError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Where the identifiers live inside the input file. Location is
/// configuration, not logic.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Worksheet to read; None means the first sheet in the workbook.
    pub sheet: Option<String>,
    /// Zero-based column holding the identifiers.
    pub column: usize,
    /// Skip the first row (header).
    pub skip_header: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            column: 0,
            skip_header: false,
        }
    }
}

/// Load the ordered identifier list from a spreadsheet or CSV file. Empty
/// cells are skipped; everything else is kept verbatim as an opaque token.
pub fn load_identifiers(path: &Path, options: &SourceOptions) -> Result<Vec<String>> {
    match file_extension(path).as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_from_workbook(path, options),
        "csv" => load_from_csv(path, options),
        other => Err(EnrichError::Input(format!(
            "Unsupported input format '{}' for {}",
            other,
            path.display()
        ))),
    }
}

fn load_from_workbook(path: &Path, options: &SourceOptions) -> Result<Vec<String>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        EnrichError::Input(format!("Failed to open workbook {}: {}", path.display(), e))
    })?;

    let sheet_name = match &options.sheet {
        Some(name) => name.clone(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| EnrichError::Input(format!("Workbook {} has no sheets", path.display())))?,
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        EnrichError::Input(format!("Failed to read sheet '{}': {}", sheet_name, e))
    })?;

    let mut identifiers = Vec::new();
    for (row_index, row) in range.rows().enumerate() {
        if options.skip_header && row_index == 0 {
            continue;
        }
        let Some(cell) = row.get(options.column) else {
            continue;
        };
        if let Some(value) = cell_string(cell) {
            identifiers.push(value);
        }
    }

    Ok(identifiers)
}

fn load_from_csv(path: &Path, options: &SourceOptions) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.skip_header)
        .flexible(true)
        .from_path(path)
        .map_err(|e| EnrichError::Input(format!("Failed to open CSV {}: {}", path.display(), e)))?;

    let mut identifiers = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            EnrichError::Input(format!("Failed to read CSV record in {}: {}", path.display(), e))
        })?;
        let Some(cell) = record.get(options.column) else {
            continue;
        };
        let cell = cell.trim();
        if !cell.is_empty() {
            identifiers.push(cell.to_string());
        }
    }

    Ok(identifiers)
}

/// Render a cell as an identifier token. Spreadsheets routinely store tax
/// numbers as numerics, so integral floats print without a fraction.
fn cell_string(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(v) => v.to_string(),
        Data::Float(v) => {
            if v.fract() == 0.0 {
                format!("{}", *v as i64)
            } else {
                v.to_string()
            }
        }
        other => other.to_string().trim().to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}
