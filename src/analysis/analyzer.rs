use super::AnalyzerOptions;
use super::descriptions::DescriptionManager;
use super::processor;
use crate::inventory::{DocElement, ElementKind, Inventory, ReportEntry};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
struct KindStats {
    total: usize,
    found: usize,
    missing: usize,
    empty: usize,
}

/// Folds per-file extraction results into an Inventory, merging curated
/// descriptions over doc-block ones and keeping per-kind coverage counts.
pub struct DirectoryAnalyzer {
    options: AnalyzerOptions,
    descriptions: DescriptionManager,
    stats: HashMap<ElementKind, KindStats>,
    // class members are numbered within their most recent class
    class_item_counter: usize,
}

impl DirectoryAnalyzer {
    pub fn new(options: &AnalyzerOptions) -> io::Result<Self> {
        let descriptions =
            DescriptionManager::new(&options.descriptions_dir, options.ignore_case)?;

        Ok(DirectoryAnalyzer {
            options: options.clone(),
            descriptions,
            stats: HashMap::new(),
            class_item_counter: 0,
        })
    }

    pub fn analyze(&mut self, root_path: &Path) -> io::Result<Inventory> {
        let parsed_files =
            processor::process_directory_parallel(root_path, self.options.num_threads)?;

        if parsed_files.is_empty() {
            warn!("No PHP files found under {:?}", root_path);
        }

        let mut inventory = Inventory::new();
        for file in &parsed_files {
            debug!(
                "Merging {} elements from {}",
                file.elements.len(),
                file.relative_path
            );
            for element in &file.elements {
                let entry = self.process_element(element, &file.relative_path);
                inventory.add_entry(entry);
            }
        }

        self.descriptions.save_found_descriptions()?;
        self.descriptions.save_empty_descriptions()?;

        self.log_statistics(&inventory);
        Ok(inventory)
    }

    fn process_element(&mut self, element: &DocElement, relative_path: &str) -> ReportEntry {
        self.stat_mut(element.kind).total += 1;

        let (curated_desc, found) = self.descriptions.get_description(
            element.kind,
            &element.name,
            element.short_name.as_deref(),
        );

        let mut description = element.desc.clone();
        if found {
            self.stat_mut(element.kind).found += 1;
            // a curated description wins unless it is empty
            if let Some(desc) = curated_desc {
                if !desc.is_empty() {
                    description = desc;
                }
            }
        } else {
            self.stat_mut(element.kind).missing += 1;
            if !element.desc.trim().is_empty() {
                self.descriptions
                    .record_found(element.kind, &element.name, &element.desc);
            }
        }

        if description.trim().is_empty() {
            self.stat_mut(element.kind).empty += 1;
        }

        let display_name = if self.options.short_names {
            element
                .short_name
                .clone()
                .unwrap_or_else(|| element.name.clone())
        } else {
            element.name.clone()
        };

        let item_number = self.next_item_number(element.kind);

        ReportEntry::new(
            relative_path.to_string(),
            display_name,
            element.kind,
            description,
            item_number,
            element.start_line,
        )
    }

    fn next_item_number(&mut self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Class => {
                self.class_item_counter = 1;
                1
            }
            ElementKind::Method | ElementKind::Property | ElementKind::ClassConstant => {
                let item_number = self.class_item_counter;
                self.class_item_counter += 1;
                item_number
            }
            ElementKind::Function | ElementKind::Variable | ElementKind::Constant => 1,
        }
    }

    fn stat_mut(&mut self, kind: ElementKind) -> &mut KindStats {
        self.stats.entry(kind).or_default()
    }

    fn log_statistics(&self, inventory: &Inventory) {
        info!("Analysis statistics:");
        info!(
            "{:<16} {:>8} {:>8} {:>8} {:>8}",
            "Kind", "Total", "Found", "Missing", "Empty"
        );
        for kind in ElementKind::ALL {
            let stats = self.stats.get(&kind).copied().unwrap_or_default();
            info!(
                "{:<16} {:>8} {:>8} {:>8} {:>8}",
                kind.label(),
                stats.total,
                stats.found,
                stats.missing,
                stats.empty
            );
        }

        let duplicates = inventory.duplicates();
        if !duplicates.is_empty() {
            warn!("{} names are declared more than once:", duplicates.len());
            for ((name, kind), places) in &duplicates {
                let locations: Vec<String> = places
                    .iter()
                    .map(|(file, line)| format!("{file}:{line}"))
                    .collect();
                warn!("  {} '{}' at {}", kind.label(), name, locations.join(", "));
            }
        }

        self.descriptions.log_found_statistics();
    }
}
