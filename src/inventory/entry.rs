use super::ElementKind;
use serde::{Deserialize, Serialize};

/// One row of the directory analysis report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportEntry {
    pub relative_path: String,
    pub name: String,
    pub kind: ElementKind,
    pub description: String,
    // 1 for classes and top-level kinds; class members count up within their class
    pub item_number: usize,
    pub line: usize,
}

impl ReportEntry {
    pub fn new(
        relative_path: String,
        name: String,
        kind: ElementKind,
        description: String,
        item_number: usize,
        line: usize,
    ) -> Self {
        ReportEntry {
            relative_path,
            name,
            kind,
            description,
            item_number,
            line,
        }
    }
}
