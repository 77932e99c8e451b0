use crate::extract::extract_elements;
use crate::inventory::DocElement;
use crate::parser::PhpParser;
use crate::utils::names::relative_display_path;
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extraction result for one source file.
pub struct ParsedFile {
    pub relative_path: String,
    pub elements: Vec<DocElement>,
}

pub fn process_directory_parallel(
    root_path: &Path,
    num_threads: usize,
) -> io::Result<Vec<ParsedFile>> {
    info!(
        "Starting parallel source processing with {} threads",
        num_threads
    );

    let files_to_process = collect_php_files(root_path)?;
    info!("Found {} PHP files to process", files_to_process.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let parsed_files = pool.install(|| {
        files_to_process
            .par_iter()
            .filter_map(|path| process_file(path, root_path))
            .collect::<Vec<_>>()
    });

    info!("File processing complete");
    Ok(parsed_files)
}

fn process_file(path: &Path, root_path: &Path) -> Option<ParsedFile> {
    debug!("Processing file: {:?}", path);

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            warn!("Failed to read file {:?}: {}", path, e);
            return None;
        }
    };

    let mut parser = PhpParser::new();
    let elements = match parser.parse(&source) {
        Ok(tree) => extract_elements(&tree, &source),
        Err(e) => {
            // one broken file contributes nothing but never aborts the run
            warn!("Parse error in {}: {}", path.display(), e);
            Vec::new()
        }
    };

    trace!("Extracted {} elements from {:?}", elements.len(), path);
    Some(ParsedFile {
        relative_path: relative_display_path(path, root_path),
        elements,
    })
}

fn collect_php_files(root_path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut visited_files = HashSet::new();
    let mut files_to_process = Vec::new();

    for entry in WalkDir::new(root_path).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();

        if path.is_dir() {
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) != Some("php") {
            trace!("Skipping non-PHP file: {:?}", path);
            continue;
        }

        let canonical_path = match fs::canonicalize(path) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to canonicalize path {:?}: {}", path, e);
                continue;
            }
        };

        if !visited_files.insert(canonical_path) {
            trace!("Skipping already visited file: {:?}", path);
            continue;
        }

        files_to_process.push(path.to_path_buf());
    }

    // deterministic processing order regardless of directory enumeration
    files_to_process.sort();
    Ok(files_to_process)
}
