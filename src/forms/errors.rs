use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Field names that server messages are routed onto when the API only
/// returns free-text messages, paired with the form field they land on.
const ROUTABLE_FIELDS: &[(&str, &str)] = &[
    ("title", "title"),
    ("description", "description"),
    ("category", "category"),
    ("content", "content"),
    ("creator", "creator"),
    ("livescore", "livescoreTag"),
];

/// Field-scoped validation messages plus anything that belongs to no field
/// (shown as a general notice).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, String>,
    general: Vec<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.insert(field.into(), message.into());
    }

    pub fn push_general(&mut self, message: impl Into<String>) {
        self.general.push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn clear_field(&mut self, field: &str) {
        self.fields.remove(field);
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.general.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn general(&self) -> &[String] {
        &self.general
    }

    /// Later messages for the same field replace earlier ones.
    pub fn merge(&mut self, other: &FieldErrors) {
        for (field, message) in other.fields() {
            self.insert(field, message);
        }
        self.general.extend(other.general.iter().cloned());
    }

    /// Parses an error body from the content API.
    ///
    /// The structured shape `{"errors": {"field": "message"}}` (or a list of
    /// messages per field) is used as-is. Older endpoints only send
    /// `{"message": [..]}` or `{"message": ".."}`; those messages are matched
    /// against known field names and whatever matches nothing becomes a
    /// general message.
    pub fn from_server_body(body: &Value) -> Self {
        let mut errors = FieldErrors::new();

        if let Some(map) = body.get("errors").and_then(Value::as_object) {
            for (field, message) in map {
                let text = match message {
                    Value::String(s) => s.clone(),
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("; "),
                    other => other.to_string(),
                };
                errors.insert(field.clone(), text);
            }
            if let Some(message) = body.get("message").and_then(Value::as_str) {
                if errors.fields.is_empty() {
                    errors.push_general(message);
                }
            }
            return errors;
        }

        let messages: Vec<String> = match body.get("message").or_else(|| body.get("error")) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        };

        for message in messages {
            errors.route_message(message);
        }
        errors
    }

    fn route_message(&mut self, message: String) {
        let lowered = message.to_lowercase();
        let target = ROUTABLE_FIELDS
            .iter()
            .find(|(needle, _)| lowered.contains(needle))
            .map(|(_, field)| *field);

        match target {
            // one line per field; later matches are kept as general messages
            Some(field) if !self.contains(field) => self.insert(field, message),
            _ => self.push_general(message),
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        parts.extend(self.general.iter().cloned());
        if parts.is_empty() {
            f.write_str("no details")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}
