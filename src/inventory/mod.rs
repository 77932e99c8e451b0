mod element;
mod entry;

pub use element::{DocElement, ElementKind};
pub use entry::ReportEntry;

use std::collections::HashMap;

/// Aggregated result of a directory analysis run.
#[derive(Debug, Clone)]
pub struct Inventory {
    entries: Vec<ReportEntry>,
    kind_counts: HashMap<ElementKind, usize>,
    // duplicate-name index: occurrences as (relative_path, line)
    occurrences: HashMap<(String, ElementKind), Vec<(String, usize)>>,
}

impl Inventory {
    pub fn new() -> Self {
        Inventory {
            entries: Vec::new(),
            kind_counts: HashMap::new(),
            occurrences: HashMap::new(),
        }
    }

    pub fn add_entry(&mut self, entry: ReportEntry) {
        *self.kind_counts.entry(entry.kind).or_insert(0) += 1;

        if let Some(key) = duplicate_key(&entry) {
            self.occurrences
                .entry(key)
                .or_default()
                .push((entry.relative_path.clone(), entry.line));
        }

        self.entries.push(entry);
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn kind_count(&self, kind: ElementKind) -> usize {
        self.kind_counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Entries ordered for the report: by file path, then source line.
    pub fn sorted_entries(&self) -> Vec<&ReportEntry> {
        let mut sorted: Vec<&ReportEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| {
            (a.relative_path.as_str(), a.line).cmp(&(b.relative_path.as_str(), b.line))
        });
        sorted
    }

    /// Names declared more than once, with every place they occur.
    pub fn duplicates(&self) -> Vec<(&(String, ElementKind), &[(String, usize)])> {
        let mut duplicates: Vec<_> = self
            .occurrences
            .iter()
            .filter(|(_, places)| places.len() > 1)
            .map(|(key, places)| (key, places.as_slice()))
            .collect();
        duplicates.sort_by(|a, b| a.0.0.cmp(&b.0.0));
        duplicates
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Inventory::new()
    }
}

// Classes and top-level constants are expected to recur across a codebase's
// description files, so only the other kinds take part in duplicate tracking.
// Class members are keyed on their unqualified name.
fn duplicate_key(entry: &ReportEntry) -> Option<(String, ElementKind)> {
    match entry.kind {
        ElementKind::Method | ElementKind::Property | ElementKind::ClassConstant => {
            let unqualified = entry.name.rsplit("::").next().unwrap_or(&entry.name);
            Some((unqualified.to_string(), entry.kind))
        }
        ElementKind::Function | ElementKind::Variable => {
            Some((entry.name.clone(), entry.kind))
        }
        ElementKind::Class | ElementKind::Constant => None,
    }
}
