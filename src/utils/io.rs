use crate::inventory::{DocElement, ReportEntry};
use log::{error, info};
use std::fs;
use std::io;
use std::path::Path;

/// Writes the analysis report as CSV, one row per element, with a global
/// 1-based row number. Entries are written in the order given.
pub fn export_report_to_csv(
    entries: &[&ReportEntry],
    output_path: &Path,
    include_line_numbers: bool,
) -> io::Result<()> {
    info!(
        "Exporting {} report rows to CSV: {:?}",
        entries.len(),
        output_path
    );

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = match csv::Writer::from_path(output_path) {
        Ok(writer) => writer,
        Err(e) => {
            error!("Failed to open CSV output {:?}: {}", output_path, e);
            return Err(io::Error::new(io::ErrorKind::Other, e));
        }
    };

    let mut header = vec!["#", "File", "# in class", "Name", "Type", "Description"];
    if include_line_numbers {
        header.push("Line");
    }
    writer.write_record(&header).map_err(csv_error)?;

    for (row_number, entry) in entries.iter().enumerate() {
        let mut record = vec![
            (row_number + 1).to_string(),
            entry.relative_path.clone(),
            entry.item_number.to_string(),
            entry.name.clone(),
            entry.kind.label().to_string(),
            entry.description.clone(),
        ];
        if include_line_numbers {
            record.push(entry.line.to_string());
        }
        writer.write_record(&record).map_err(csv_error)?;
    }

    writer.flush()?;
    info!("Report written to {:?}", output_path);
    Ok(())
}

/// Compact JSON array for the single-file output contract.
pub fn elements_to_json(elements: &[DocElement]) -> io::Result<String> {
    match serde_json::to_string(elements) {
        Ok(json) => Ok(json),
        Err(e) => {
            error!("Failed to serialize elements to JSON: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, e))
        }
    }
}

fn csv_error(e: csv::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}
