use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::api::ContentApi;
use crate::error::{AppError, Result};
use crate::models::{Brand, Section};

use super::payload::FormPayload;
use super::FieldErrors;

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z0-9]{2,10}$").expect("valid regex"))
}

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"))
}

fn color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid regex"))
}

/// "Elections 2028: Results!" -> "elections-2028-results"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[derive(Debug, Clone)]
pub struct SectionForm {
    pub brand: Brand,
    pub id: Option<String>,
    pub name: String,
    pub code: String,
    pub slug: String,
    pub color: String,
    /// RFC 3339 timestamp, or empty for sections that never expire
    pub expires_at: String,
    pub display_order: i64,
    pub errors: FieldErrors,
}

impl SectionForm {
    pub fn new(brand: Brand) -> Self {
        Self {
            brand,
            id: None,
            name: String::new(),
            code: String::new(),
            slug: String::new(),
            color: "#000000".to_string(),
            expires_at: String::new(),
            display_order: 0,
            errors: FieldErrors::new(),
        }
    }

    pub fn from_section(brand: Brand, section: &Section) -> Self {
        Self {
            brand,
            id: Some(section.id.clone()),
            name: section.name.clone(),
            code: section.code.clone(),
            slug: section.slug.clone(),
            color: section.color.clone(),
            expires_at: section
                .expires_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            display_order: section.display_order,
            errors: FieldErrors::new(),
        }
    }

    fn parsed_expiry(&self) -> Option<std::result::Result<DateTime<Utc>, chrono::ParseError>> {
        let raw = self.expires_at.trim();
        if raw.is_empty() {
            return None;
        }
        Some(DateTime::parse_from_rfc3339(raw).map(|t| t.with_timezone(&Utc)))
    }

    /// Normalizes code and slug, then checks every field.
    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::new();

        self.code = self.code.trim().to_uppercase();
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.name);
        } else {
            self.slug = self.slug.trim().to_string();
        }

        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        if self.code.is_empty() {
            errors.insert("code", "Code is required");
        } else if !code_re().is_match(&self.code) {
            errors.insert("code", "Code must be 2-10 letters or digits");
        }
        if !slug_re().is_match(&self.slug) {
            errors.insert("slug", "Slug may only contain lowercase letters, digits and hyphens");
        }
        if !color_re().is_match(self.color.trim()) {
            errors.insert("color", "Color must look like #1a2b3c");
        }
        if self.display_order < 0 {
            errors.insert("displayOrder", "Display order cannot be negative");
        }
        if let Some(Err(e)) = self.parsed_expiry() {
            errors.insert("expires_at", format!("Invalid expiry date: {e}"));
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    pub fn to_payload(&self) -> FormPayload {
        let mut payload = FormPayload::new();
        payload
            .text("name", self.name.trim())
            .text("code", self.code.as_str())
            .text("slug", self.slug.as_str())
            .text("color", self.color.trim())
            .text("displayOrder", self.display_order.to_string());
        if let Some(Ok(expires)) = self.parsed_expiry() {
            payload.text("expires_at", expires.to_rfc3339());
        }
        payload
    }

    pub async fn submit<A>(&mut self, api: &A) -> Result<Section>
    where
        A: ContentApi + ?Sized,
    {
        if !self.validate() {
            return Err(AppError::Validation(self.errors.clone()));
        }
        let payload = self.to_payload();
        let result = match &self.id {
            Some(id) => api.update_section(self.brand, id, payload).await,
            None => api.create_section(self.brand, payload).await,
        };
        if let Err(err) = &result {
            if let Some(remote) = err.field_errors() {
                self.errors.merge(remote);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;

    fn form() -> SectionForm {
        let mut form = SectionForm::new(Brand::Ghanapolitan);
        form.name = "Elections 2028: Results!".to_string();
        form.code = " elec ".to_string();
        form.color = "#C0FFEE".to_string();
        form
    }

    #[test]
    fn slug_is_derived_and_code_uppercased() {
        let mut form = form();
        assert!(form.validate(), "{}", form.errors);
        assert_eq!(form.slug, "elections-2028-results");
        assert_eq!(form.code, "ELEC");
    }

    #[test]
    fn rejects_bad_values() {
        let mut form = form();
        form.color = "red".to_string();
        form.slug = "Bad Slug".to_string();
        form.display_order = -1;
        form.expires_at = "next week".to_string();
        assert!(!form.validate());
        for field in ["color", "slug", "displayOrder", "expires_at"] {
            assert!(form.errors.contains(field), "missing {field}");
        }
    }

    #[test]
    fn expiry_is_sent_normalized() {
        let mut form = form();
        form.expires_at = "2030-01-01T00:00:00+02:00".to_string();
        assert!(form.validate());
        assert_eq!(
            form.to_payload().get_text("expires_at"),
            Some("2029-12-31T22:00:00+00:00")
        );
    }

    #[tokio::test]
    async fn submit_creates_then_updates() {
        let api = MockApi::new();
        let mut form = form();
        let created = form.submit(&api).await.unwrap();
        assert_eq!(created.slug, "elections-2028-results");

        let mut edit = SectionForm::from_section(Brand::Ghanapolitan, &created);
        edit.display_order = 4;
        let updated = edit.submit(&api).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.display_order, 4);
        assert_eq!(api.request_count(), 2);
    }
}
