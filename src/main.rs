use clap::Parser;
use log::info;
use php_docindex::analysis::AnalyzerOptions;
use php_docindex::utils::io::elements_to_json;
use php_docindex::{analyze_directory, extract_from_source, version};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "php_docindex",
    version,
    about = "Extracts documentable elements from PHP sources"
)]
struct Cli {
    /// PHP file to extract from, or a project directory to analyze
    path: PathBuf,

    /// CSV report path for directory analysis
    #[arg(long, default_value = "php_analysis.csv")]
    output: PathBuf,

    /// Directory holding JSON description files
    #[arg(long, default_value = "descriptions")]
    descriptions: PathBuf,

    /// Compare description names case-insensitively
    #[arg(long)]
    ignore_case: bool,

    /// Report class members without their class prefix
    #[arg(long)]
    short_names: bool,

    /// Leave source line numbers out of the report
    #[arg(long)]
    no_line_numbers: bool,

    /// Worker threads for directory analysis
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> io::Result<()> {
    // Initialize logger
    if std::env::var_os("RUST_LOG").is_none() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let cli = Cli::parse();

    if cli.path.is_dir() {
        analyze_tree(&cli)
    } else {
        scan_single_file(&cli.path)
    }
}

// Single-file mode: stdout carries nothing but the JSON array. A file that
// does not parse still produces a well-formed (empty) array, with one
// diagnostic line on stderr.
fn scan_single_file(path: &Path) -> io::Result<()> {
    let source = fs::read_to_string(path)?;

    match extract_from_source(&source) {
        Ok(elements) => {
            println!("{}", elements_to_json(&elements)?);
        }
        Err(e) => {
            eprintln!("Parse error in {}: {}", path.display(), e);
            println!("[]");
        }
    }

    Ok(())
}

fn analyze_tree(cli: &Cli) -> io::Result<()> {
    let num_threads = cli.threads.unwrap_or_else(|| {
        let cpu_count = num_cpus::get();
        info!("Using default thread count: {}", cpu_count);
        cpu_count
    });

    info!("php_docindex v{}", version());
    info!("Analyzing PHP sources at: {:?}", cli.path);
    info!("Using {} threads", num_threads);
    info!("Descriptions directory: {:?}", cli.descriptions);

    let options = AnalyzerOptions {
        descriptions_dir: cli.descriptions.clone(),
        ignore_case: cli.ignore_case,
        short_names: cli.short_names,
        include_line_numbers: !cli.no_line_numbers,
        num_threads,
    };

    let start_time = Instant::now();
    analyze_directory(&cli.path, &cli.output, &options)?;

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2?}", elapsed);
    info!("Report saved to: {:?}", cli.output);

    Ok(())
}
