use std::path::{Path, PathBuf};

/// One part of a multipart submission.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(PathBuf),
}

/// Ordered multipart form body, built by the forms and turned into an HTTP
/// body by the API client. Kept transport-free so submissions can be
/// inspected in tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    parts: Vec<(String, FormValue)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.parts
            .push((name.to_string(), FormValue::Text(value.into())));
        self
    }

    pub fn flag(&mut self, name: &str, value: bool) -> &mut Self {
        self.text(name, if value { "true" } else { "false" })
    }

    pub fn file(&mut self, name: &str, path: &Path) -> &mut Self {
        self.parts
            .push((name.to_string(), FormValue::File(path.to_path_buf())));
        self
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, v)| match v {
            FormValue::Text(text) if n == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    pub fn into_parts(self) -> Vec<(String, FormValue)> {
        self.parts
    }
}

/// Flattens a list of values into the comma separated form the API expects.
/// Entries are trimmed, blanks dropped and duplicates removed, keeping the
/// first occurrence.
pub fn csv(values: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.join(",")
}

/// Splits free text input ("a, b ,c") into trimmed, non-empty entries.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
