use crate::inventory::ElementKind;
use crate::utils::names::normalize_variable_name;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One entry of a JSON description file. `cond: "like"` switches the entry
/// from name equality to case-insensitive containment matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescriptionEntry {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cond: Option<String>,
}

/// Curated element descriptions loaded from a directory of JSON files,
/// one file per element kind. Lookups feed three side channels written
/// back at the end of a run: doc-block descriptions not yet curated
/// (`found_*.json`) and elements with no curated description
/// (`empty_*.json`).
pub struct DescriptionManager {
    descriptions_dir: PathBuf,
    ignore_case: bool,
    descriptions: HashMap<ElementKind, Vec<DescriptionEntry>>,
    found: HashMap<ElementKind, BTreeMap<String, String>>,
    empty: HashMap<ElementKind, BTreeSet<String>>,
    missing: HashMap<ElementKind, BTreeSet<String>>,
}

impl DescriptionManager {
    pub fn new(descriptions_dir: &Path, ignore_case: bool) -> io::Result<Self> {
        if !descriptions_dir.exists() {
            info!("Creating descriptions directory: {:?}", descriptions_dir);
            fs::create_dir_all(descriptions_dir)?;
        }

        let mut descriptions = HashMap::new();
        for kind in ElementKind::ALL {
            let path = descriptions_dir.join(format!("{}.json", kind_stem(kind)));
            let entries = load_description_file(&path);
            debug!("Loaded {} descriptions for kind {}", entries.len(), kind);
            descriptions.insert(kind, entries);
        }

        Ok(DescriptionManager {
            descriptions_dir: descriptions_dir.to_path_buf(),
            ignore_case,
            descriptions,
            found: HashMap::new(),
            empty: HashMap::new(),
            missing: HashMap::new(),
        })
    }

    /// Curated description for an element, plus whether any entry matched.
    /// A match with an empty description still counts as found.
    pub fn get_description(
        &mut self,
        kind: ElementKind,
        name: &str,
        short_name: Option<&str>,
    ) -> (Option<String>, bool) {
        let candidates = search_candidates(kind, name, short_name);

        let mut description = None;
        let mut found = false;
        if let Some(entries) = self.descriptions.get(&kind) {
            for entry in entries {
                if entry.name.is_empty() {
                    continue;
                }
                if self.entry_matches(entry, &candidates) {
                    description = Some(entry.desc.clone());
                    found = true;
                    break;
                }
            }
        }

        self.record_lookup(kind, name, found, description.as_deref());
        (description, found)
    }

    fn entry_matches(&self, entry: &DescriptionEntry, candidates: &[String]) -> bool {
        if entry.cond.as_deref() == Some("like") {
            let entry_name = entry.name.to_lowercase();
            return candidates
                .iter()
                .any(|candidate| entry_name.contains(&candidate.to_lowercase()));
        }

        candidates.iter().any(|candidate| {
            if self.ignore_case {
                entry.name.to_lowercase() == candidate.to_lowercase()
            } else {
                entry.name == *candidate
            }
        })
    }

    fn record_lookup(
        &mut self,
        kind: ElementKind,
        name: &str,
        found: bool,
        description: Option<&str>,
    ) {
        let clean_name = if kind == ElementKind::Variable {
            name.trim_start_matches('$').to_string()
        } else {
            name.to_string()
        };

        if !found {
            debug!("No description entry for {} '{}'", kind, name);
            self.missing.entry(kind).or_default().insert(clean_name.clone());
        }

        // "empty" means no curated description, found or not
        if description.is_none_or(str::is_empty) {
            self.empty.entry(kind).or_default().insert(clean_name);
        }
    }

    /// Remembers a doc-block description for an element the curated files
    /// do not know yet; persisted by `save_found_descriptions`.
    pub fn record_found(&mut self, kind: ElementKind, name: &str, description: &str) {
        if description.trim().is_empty() {
            return;
        }
        self.found
            .entry(kind)
            .or_default()
            .entry(name.to_string())
            .or_insert_with(|| description.to_string());
    }

    pub fn missing_count(&self, kind: ElementKind) -> usize {
        self.missing.get(&kind).map_or(0, BTreeSet::len)
    }

    pub fn save_found_descriptions(&self) -> io::Result<()> {
        for kind in ElementKind::ALL {
            let Some(found) = self.found.get(&kind) else {
                continue;
            };
            if found.is_empty() {
                continue;
            }

            let path = self
                .descriptions_dir
                .join(format!("found_{}.json", kind_stem(kind)));
            let mut entries = load_description_file(&path);
            let existing: HashSet<String> =
                entries.iter().map(|entry| entry.name.clone()).collect();

            let mut added = 0;
            for (name, desc) in found {
                if existing.contains(name) {
                    continue;
                }
                entries.push(DescriptionEntry {
                    name: name.clone(),
                    desc: desc.clone(),
                    cond: None,
                });
                added += 1;
            }

            if added > 0 {
                write_entries(&path, &entries)?;
                info!("Saved {} found descriptions to {:?}", added, path);
            }
        }
        Ok(())
    }

    pub fn save_empty_descriptions(&self) -> io::Result<()> {
        for kind in ElementKind::ALL {
            let Some(names) = self.empty.get(&kind) else {
                continue;
            };
            if names.is_empty() {
                continue;
            }

            let path = self
                .descriptions_dir
                .join(format!("empty_{}.json", kind_stem(kind)));
            let mut entries = load_description_file(&path);
            let existing: HashSet<String> =
                entries.iter().map(|entry| entry.name.clone()).collect();

            let mut added = 0;
            for name in names {
                // variables are stored in their source form, sigil included
                let save_name = if kind == ElementKind::Variable && !name.starts_with('$') {
                    format!("${name}")
                } else {
                    name.clone()
                };
                if existing.contains(&save_name) {
                    continue;
                }
                entries.push(DescriptionEntry {
                    name: save_name,
                    desc: String::new(),
                    cond: None,
                });
                added += 1;
            }

            if added > 0 {
                write_entries(&path, &entries)?;
                info!("Saved {} undescribed elements to {:?}", added, path);
            }
        }
        Ok(())
    }

    pub fn log_found_statistics(&self) {
        let total: usize = self.found.values().map(BTreeMap::len).sum();
        if total == 0 {
            return;
        }

        info!("Doc-block descriptions recorded for reuse:");
        for kind in ElementKind::ALL {
            if let Some(found) = self.found.get(&kind) {
                if !found.is_empty() {
                    info!("  {}: {}", kind.label(), found.len());
                }
            }
        }
        info!("  Total: {}", total);
    }
}

fn kind_stem(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Class => "classes",
        ElementKind::Method => "methods",
        ElementKind::Property => "properties",
        ElementKind::ClassConstant => "class_constants",
        ElementKind::Function => "functions",
        ElementKind::Variable => "variables",
        ElementKind::Constant => "constants",
    }
}

// Names an element may be filed under: the full name; for class members
// also the part after `::` and the bare short name; for variables the
// `$`-normalized form.
fn search_candidates(kind: ElementKind, name: &str, short_name: Option<&str>) -> Vec<String> {
    let mut candidates = Vec::new();
    match kind {
        ElementKind::Method | ElementKind::Property | ElementKind::ClassConstant => {
            candidates.push(name.to_string());
            if let Some((_, member)) = name.rsplit_once("::") {
                candidates.push(member.to_string());
            }
            if let Some(short) = short_name {
                candidates.push(short.to_string());
            }
        }
        ElementKind::Variable => {
            candidates.push(normalize_variable_name(name));
        }
        ElementKind::Class | ElementKind::Function | ElementKind::Constant => {
            candidates.push(name.to_string());
            if let Some(short) = short_name {
                candidates.push(short.to_string());
            }
        }
    }

    let mut unique = Vec::new();
    for candidate in candidates {
        if !candidate.is_empty() && !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

fn load_description_file(path: &Path) -> Vec<DescriptionEntry> {
    if !path.exists() {
        return Vec::new();
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read description file {:?}: {}", path, e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => entries_from_value(value),
        Err(e) => {
            warn!("Failed to parse description file {:?}: {}", path, e);
            Vec::new()
        }
    }
}

// Accepts three file shapes:
//   [{"name": "x", "desc": "..."}]    explicit entries, optionally with cond
//   [{"x": "..."}, {"y": "..."}]      list of single-pair objects
//   {"x": "...", "y": "..."}          one name-to-description map
fn entries_from_value(value: Value) -> Vec<DescriptionEntry> {
    let mut entries = Vec::new();

    match value {
        Value::Array(items) => {
            for item in items {
                let Value::Object(map) = item else { continue };

                if map.contains_key("name") {
                    let name = map
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    if name.is_empty() {
                        continue;
                    }
                    let desc = map
                        .get("desc")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    let cond = map
                        .get("cond")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    entries.push(DescriptionEntry { name, desc, cond });
                } else if map.len() == 1 {
                    for (name, desc) in map {
                        entries.push(DescriptionEntry {
                            name,
                            desc: desc.as_str().unwrap_or_default().to_string(),
                            cond: None,
                        });
                    }
                }
            }
        }
        Value::Object(map) => {
            for (name, desc) in map {
                entries.push(DescriptionEntry {
                    name,
                    desc: desc.as_str().unwrap_or_default().to_string(),
                    cond: None,
                });
            }
        }
        _ => {}
    }

    entries
}

fn write_entries(path: &Path, entries: &[DescriptionEntry]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn manager_with(files: &[(&str, &str)], ignore_case: bool) -> (tempfile::TempDir, DescriptionManager) {
        let dir = tempfile::tempdir().unwrap();
        for (file_name, content) in files {
            fs::write(dir.path().join(file_name), content).unwrap();
        }
        let manager = DescriptionManager::new(dir.path(), ignore_case).unwrap();
        (dir, manager)
    }

    #[test]
    fn creates_missing_descriptions_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("descriptions");
        DescriptionManager::new(&nested, false).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn loads_explicit_entry_format() {
        let (_dir, mut manager) = manager_with(
            &[(
                "classes.json",
                r#"[{"name": "Layer", "desc": "Map layer"}]"#,
            )],
            false,
        );
        let (desc, found) = manager.get_description(ElementKind::Class, "Layer", None);
        assert!(found);
        assert_eq!(desc.as_deref(), Some("Map layer"));
    }

    #[test]
    fn loads_single_pair_list_format() {
        let (_dir, mut manager) = manager_with(
            &[(
                "functions.json",
                r#"[{"render": "Renders output"}, {"boot": "Starts up"}]"#,
            )],
            false,
        );
        let (desc, found) = manager.get_description(ElementKind::Function, "boot", None);
        assert!(found);
        assert_eq!(desc.as_deref(), Some("Starts up"));
    }

    #[test]
    fn loads_plain_map_format() {
        let (_dir, mut manager) = manager_with(
            &[("constants.json", r#"{"MAX_SIZE": "Upper bound"}"#)],
            false,
        );
        let (desc, found) = manager.get_description(ElementKind::Constant, "MAX_SIZE", None);
        assert!(found);
        assert_eq!(desc.as_deref(), Some("Upper bound"));
    }

    #[test]
    fn malformed_description_file_degrades_to_no_entries() {
        let (_dir, mut manager) =
            manager_with(&[("methods.json", "not json at all")], false);
        let (_, found) = manager.get_description(ElementKind::Method, "Foo::bar", Some("bar"));
        assert!(!found);
        assert_eq!(manager.missing_count(ElementKind::Method), 1);
    }

    #[test]
    fn member_lookup_matches_on_unqualified_name() {
        let (_dir, mut manager) = manager_with(
            &[("methods.json", r#"[{"name": "getId", "desc": "Id accessor"}]"#)],
            false,
        );
        let (desc, found) =
            manager.get_description(ElementKind::Method, "Layer::getId", Some("getId"));
        assert!(found);
        assert_eq!(desc.as_deref(), Some("Id accessor"));
    }

    #[test]
    fn property_lookup_matches_sigiled_member_name() {
        let (_dir, mut manager) = manager_with(
            &[("properties.json", r#"[{"name": "$title", "desc": "Display title"}]"#)],
            false,
        );
        let (_, found) =
            manager.get_description(ElementKind::Property, "Layer::$title", Some("title"));
        assert!(found);
    }

    #[test]
    fn variable_lookup_normalizes_the_sigil() {
        let (_dir, mut manager) = manager_with(
            &[("variables.json", r#"[{"name": "$config", "desc": "App config"}]"#)],
            false,
        );
        let (_, found) = manager.get_description(ElementKind::Variable, "$config", None);
        assert!(found);
    }

    #[test]
    fn case_sensitivity_follows_the_ignore_case_flag() {
        let files = [("classes.json", r#"[{"name": "Layer", "desc": "x"}]"#)];

        let (_dir, mut strict) = manager_with(&files, false);
        let (_, found) = strict.get_description(ElementKind::Class, "LAYER", None);
        assert!(!found);

        let (_dir, mut loose) = manager_with(&files, true);
        let (_, found) = loose.get_description(ElementKind::Class, "LAYER", None);
        assert!(found);
    }

    #[test]
    fn like_condition_matches_on_containment() {
        let (_dir, mut manager) = manager_with(
            &[(
                "methods.json",
                r#"[{"name": "generateTemplateReport", "desc": "Builds a report", "cond": "like"}]"#,
            )],
            false,
        );
        let (desc, found) =
            manager.get_description(ElementKind::Method, "X::template", Some("template"));
        assert!(found);
        assert_eq!(desc.as_deref(), Some("Builds a report"));
    }

    #[test]
    fn found_descriptions_persist_and_merge_without_duplicates() {
        let (dir, mut manager) = manager_with(&[], false);

        manager.record_found(ElementKind::Function, "render", "Renders the page.");
        manager.record_found(ElementKind::Function, "render", "Different text, same name.");
        manager.save_found_descriptions().unwrap();

        // a second run re-recording the same name must not duplicate it
        let mut second = DescriptionManager::new(dir.path(), false).unwrap();
        second.record_found(ElementKind::Function, "render", "Renders the page.");
        second.save_found_descriptions().unwrap();

        let saved = load_description_file(&dir.path().join("found_functions.json"));
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "render");
        assert_eq!(saved[0].desc, "Renders the page.");
    }

    #[test]
    fn empty_descriptions_are_saved_with_variable_sigils() {
        let (dir, mut manager) = manager_with(&[], false);

        let (_, found) = manager.get_description(ElementKind::Variable, "$config", None);
        assert!(!found);
        manager.save_empty_descriptions().unwrap();

        let saved = load_description_file(&dir.path().join("empty_variables.json"));
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "$config");
        assert_eq!(saved[0].desc, "");
    }

    #[test]
    fn found_entry_with_empty_description_still_counts_as_found() {
        let (_dir, mut manager) = manager_with(
            &[("classes.json", r#"[{"name": "Layer", "desc": ""}]"#)],
            false,
        );
        let (desc, found) = manager.get_description(ElementKind::Class, "Layer", None);
        assert!(found);
        assert_eq!(desc.as_deref(), Some(""));
        assert_eq!(manager.missing_count(ElementKind::Class), 0);
    }
}
