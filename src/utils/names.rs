// Small name and path helpers shared by lookup and reporting.

use std::path::Path;

/// Collapses any run of leading `$` sigils down to exactly one.
/// An empty name stays empty.
pub fn normalize_variable_name(name: &str) -> String {
    let bare = name.trim_start_matches('$');
    if bare.is_empty() {
        String::new()
    } else {
        format!("${bare}")
    }
}

/// Path relative to the analyzed root, for report display. Falls back to
/// the file name when the path does not live under the root.
pub fn relative_display_path(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(relative) => relative.display().to_string(),
        Err(_) => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    }
}
