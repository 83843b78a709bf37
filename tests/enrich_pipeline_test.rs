//! End-to-end pipeline: identifier file in, ordered report out.

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use inn_enrich::batch::BatchDriver;
use inn_enrich::report;
use inn_enrich::resolver::{Resolution, Resolve};
use inn_enrich::source::{self, SourceOptions};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Resolver stub answering from a fixed table; everything else falls back to
/// the transport-failure row.
struct TableResolver {
    names: HashMap<String, String>,
}

impl TableResolver {
    fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            names: entries
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Resolve for TableResolver {
    async fn resolve(&self, identifier: &str) -> Resolution {
        match self.names.get(identifier) {
            Some(name) => Resolution::resolved(identifier, name),
            None => Resolution::fetch_error(identifier),
        }
    }
}

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("inn_enrich_pipeline_test").join(name);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn csv_in_csv_out_keeps_rows_ordered() -> Result<(), Box<dyn std::error::Error>> {
    let dir = test_dir("csv_roundtrip");
    let input_path = dir.join("identifiers.csv");
    let output_path = dir.join("report.csv");

    fs::write(&input_path, "INN\n12345\n67890\n")?;

    let options = SourceOptions {
        skip_header: true,
        ..SourceOptions::default()
    };
    let identifiers = source::load_identifiers(&input_path, &options)?;
    assert_eq!(identifiers, vec!["12345", "67890"]);

    let driver = BatchDriver::new(TableResolver::new(&[("12345", "Globex Corp")]));
    let results = driver.run(&identifiers).await;

    report::write_report(&output_path, &results)?;

    let report_contents = fs::read_to_string(&output_path)?;
    assert_eq!(
        report_contents,
        "ID,Name\n12345,Globex Corp\n67890,Not Found\n"
    );

    fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[tokio::test]
async fn xlsx_report_is_readable_as_a_spreadsheet() -> Result<(), Box<dyn std::error::Error>> {
    let dir = test_dir("xlsx_report");
    let input_path = dir.join("identifiers.csv");
    let output_path = dir.join("report.xlsx");

    fs::write(&input_path, "100\n200\n300\n")?;

    let identifiers = source::load_identifiers(&input_path, &SourceOptions::default())?;
    let driver = BatchDriver::new(TableResolver::new(&[
        ("100", "Alpha Plc"),
        ("200", "Beta Ltd"),
        ("300", "Gamma SA"),
    ]));
    let results = driver.run(&identifiers).await;

    report::write_report(&output_path, &results)?;

    let mut workbook = open_workbook_auto(&output_path)?;
    let sheet_name = workbook.sheet_names().first().cloned().unwrap();
    let range = workbook.worksheet_range(&sheet_name)?;
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(Data::to_string).collect())
        .collect();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], vec!["ID", "Name"]);
    assert_eq!(rows[1], vec!["100", "Alpha Plc"]);
    assert_eq!(rows[2], vec!["200", "Beta Ltd"]);
    assert_eq!(rows[3], vec!["300", "Gamma SA"]);

    fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[tokio::test]
async fn batch_length_always_matches_input_length() -> Result<(), Box<dyn std::error::Error>> {
    let dir = test_dir("coverage");
    let input_path = dir.join("identifiers.csv");

    fs::write(&input_path, "1\n2\n3\n4\n5\n")?;

    let identifiers = source::load_identifiers(&input_path, &SourceOptions::default())?;
    let driver = BatchDriver::new(TableResolver::new(&[("2", "Two Corp"), ("4", "Four Corp")]));
    let results = driver.run(&identifiers).await;

    // No identifier is dropped, whatever its outcome.
    assert_eq!(results.len(), identifiers.len());
    for (resolution, identifier) in results.iter().zip(&identifiers) {
        assert_eq!(&resolution.identifier, identifier);
    }

    fs::remove_dir_all(&dir).ok();
    Ok(())
}
