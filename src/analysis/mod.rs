pub mod analyzer;
pub mod descriptions;
pub mod processor;

pub use analyzer::DirectoryAnalyzer;

use std::path::PathBuf;

/// Settings for a directory analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub descriptions_dir: PathBuf,
    pub ignore_case: bool,
    pub short_names: bool,
    pub include_line_numbers: bool,
    pub num_threads: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        AnalyzerOptions {
            descriptions_dir: PathBuf::from("descriptions"),
            ignore_case: false,
            short_names: false,
            include_line_numbers: true,
            num_threads: num_cpus::get(),
        }
    }
}
