pub mod analysis;
pub mod extract;
pub mod inventory;
pub mod parser;
pub mod utils;

use analysis::{AnalyzerOptions, DirectoryAnalyzer};
use inventory::{DocElement, Inventory};
use log::{debug, info};
use parser::{ParseError, PhpParser};
use std::io;
use std::path::Path;

/// Parses one PHP source text and extracts its documentable elements in
/// source order. The only failure is a syntax error in the input.
pub fn extract_from_source(source: &str) -> Result<Vec<DocElement>, ParseError> {
    let mut parser = PhpParser::new();
    let tree = parser.parse(source)?;
    Ok(extract::extract_elements(&tree, source))
}

pub fn process_directory(root_path: &Path, options: &AnalyzerOptions) -> io::Result<Inventory> {
    info!(
        "Processing PHP sources at: {:?} with {} threads",
        root_path, options.num_threads
    );

    let mut analyzer = DirectoryAnalyzer::new(options)?;
    let inventory = analyzer.analyze(root_path)?;

    info!("Inventory built with {} entries", inventory.entry_count());
    Ok(inventory)
}

pub fn analyze_directory(
    root_path: &Path,
    output_path: &Path,
    options: &AnalyzerOptions,
) -> io::Result<()> {
    info!("Starting directory analysis");
    debug!("Root path: {:?}, Output path: {:?}", root_path, output_path);

    let inventory = process_directory(root_path, options)?;

    utils::io::export_report_to_csv(
        &inventory.sorted_entries(),
        output_path,
        options.include_line_numbers,
    )?;

    info!(
        "Analysis complete: {} elements written to {:?}",
        inventory.entry_count(),
        output_path
    );

    Ok(())
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
