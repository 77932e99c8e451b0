use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Class,
    Method,
    Property,
    ClassConstant,
    Function,
    Variable,
    Constant,
}

impl ElementKind {
    // Stable iteration order for statistics output.
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Class,
        ElementKind::Method,
        ElementKind::Property,
        ElementKind::ClassConstant,
        ElementKind::Function,
        ElementKind::Variable,
        ElementKind::Constant,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Class => "Class",
            ElementKind::Method => "Method",
            ElementKind::Property => "Property",
            ElementKind::ClassConstant => "Class constant",
            ElementKind::Function => "Function",
            ElementKind::Variable => "Variable",
            ElementKind::Constant => "Constant",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A documentable element extracted from one PHP source file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DocElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "startLine", default)]
    pub start_line: usize,
}

impl Serialize for DocElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        // short_name is omitted entirely when absent, never serialized as null
        let field_count = if self.short_name.is_some() { 5 } else { 4 };
        let mut state = serializer.serialize_struct("DocElement", field_count)?;
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("name", &self.name)?;
        if let Some(short_name) = &self.short_name {
            state.serialize_field("short_name", short_name)?;
        }
        state.serialize_field("desc", &self.desc)?;
        state.serialize_field("startLine", &self.start_line)?;
        state.end()
    }
}

impl DocElement {
    pub fn new(kind: ElementKind, name: String, desc: String, start_line: usize) -> Self {
        DocElement {
            kind,
            name,
            short_name: None,
            desc,
            start_line,
        }
    }

    pub fn with_short_name(mut self, short_name: String) -> Self {
        self.short_name = Some(short_name);
        self
    }

    // Name without any leading `Class::` qualifier.
    pub fn unqualified_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }
}
