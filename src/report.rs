//! Report Sink - writes the ordered enrichment table.

use crate::error::{EnrichError, Result};
use crate::resolver::Resolution;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

pub const HEADERS: [&str; 2] = ["ID", "Name"];

/// Write one row per Resolution, in batch order, under an `(ID, Name)`
/// header. Any existing file at `path` is overwritten.
pub fn write_report(path: &Path, resolutions: &[Resolution]) -> Result<()> {
    match file_extension(path).as_str() {
        "xlsx" => write_xlsx(path, resolutions)
            .map_err(|e| EnrichError::Output(format!("Failed to write {}: {}", path.display(), e))),
        "csv" => write_csv(path, resolutions),
        other => Err(EnrichError::Output(format!(
            "Unsupported report format '{}' for {}",
            other,
            path.display()
        ))),
    }
}

fn write_xlsx(path: &Path, resolutions: &[Resolution]) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (index, resolution) in resolutions.iter().enumerate() {
        let row = (index + 1) as u32;
        sheet.write_string(row, 0, &resolution.identifier)?;
        sheet.write_string(row, 1, &resolution.name)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_csv(path: &Path, resolutions: &[Resolution]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        EnrichError::Output(format!("Failed to create CSV {}: {}", path.display(), e))
    })?;

    writer
        .write_record(HEADERS)
        .map_err(|e| EnrichError::Output(format!("Failed to write CSV header: {}", e)))?;

    for resolution in resolutions {
        writer
            .write_record([resolution.identifier.as_str(), resolution.name.as_str()])
            .map_err(|e| {
                EnrichError::Output(format!(
                    "Failed to write CSV row for {}: {}",
                    resolution.identifier, e
                ))
            })?;
    }

    writer.flush()?;
    Ok(())
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}
