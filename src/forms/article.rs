use std::path::PathBuf;

use serde::Deserialize;

use crate::api::ContentApi;
use crate::error::{AppError, Result};
use crate::models::{Article, ArticleContent, Brand, LiveUpdate};

use super::live_updates::LiveUpdateList;
use super::payload::{csv, FormPayload};
use super::FieldErrors;

const MIN_TITLE_LEN: usize = 5;
const MIN_DESCRIPTION_LEN: usize = 10;

/// Article metadata as written in a draft file, e.g.
///
/// ```toml
/// title = "Live: Test Match"
/// description = "Minute by minute from Accra"
/// category = "Football"
/// live = true
///
/// [[updates]]
/// title = "Kick-off"
/// detail = "<p>We are underway</p>"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticleDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategories: Vec<String>,
    pub tags: Vec<String>,
    pub creator: String,
    pub source_name: Option<String>,
    pub breaking: bool,
    pub headline: bool,
    pub topstory: bool,
    pub live: bool,
    pub section: Option<String>,
    pub livescore_tag: Option<String>,
    pub image: Option<PathBuf>,
    /// Inline rich text for regular articles
    pub content: Option<String>,
    /// Or a path to it, relative to the working directory
    pub content_file: Option<PathBuf>,
    pub updates: Vec<DraftUpdate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DraftUpdate {
    pub title: String,
    pub description: String,
    pub detail: String,
    pub key: bool,
    pub image: Option<String>,
}

/// Create/edit form state for articles of any brand.
///
/// Brand specific fields (multi-valued subcategory, live score tag) are
/// driven by the [`Brand`] capability table rather than separate forms.
#[derive(Debug, Clone)]
pub struct ArticleForm {
    pub brand: Brand,
    /// Set when editing an existing article
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub body_html: String,
    pub category: String,
    pub subcategories: Vec<String>,
    pub tags: Vec<String>,
    pub is_breaking: bool,
    pub is_headline: bool,
    pub is_topstory: bool,
    pub is_live: bool,
    pub section_id: Option<String>,
    pub has_livescore: bool,
    pub livescore_tag: String,
    pub creator: String,
    pub source_name: String,
    pub image: Option<PathBuf>,
    pub existing_image: Option<String>,
    pub updates: LiveUpdateList,
    pub errors: FieldErrors,
}

impl ArticleForm {
    pub fn new(brand: Brand) -> Self {
        Self {
            brand,
            id: None,
            title: String::new(),
            description: String::new(),
            body_html: String::new(),
            category: String::new(),
            subcategories: Vec::new(),
            tags: Vec::new(),
            is_breaking: false,
            is_headline: false,
            is_topstory: false,
            is_live: false,
            section_id: None,
            has_livescore: false,
            livescore_tag: String::new(),
            creator: String::new(),
            source_name: String::new(),
            image: None,
            existing_image: None,
            updates: LiveUpdateList::new(),
            errors: FieldErrors::new(),
        }
    }

    /// Pre-fills the form from a fetched record for editing.
    pub fn from_article(brand: Brand, article: &Article) -> Self {
        let livescore_tag = article.livescore_tag.clone().unwrap_or_default();
        let (body_html, updates) = match &article.content {
            ArticleContent::Html(html) => (html.clone(), LiveUpdateList::new()),
            ArticleContent::Updates(list) => {
                (String::new(), LiveUpdateList::from_updates(list.iter().cloned()))
            }
        };

        Self {
            brand,
            id: Some(article.id.clone()),
            title: article.title.clone(),
            description: article.description.clone(),
            body_html,
            category: article.category.clone(),
            subcategories: article.subcategory.clone(),
            tags: article.tags.clone(),
            is_breaking: article.is_breaking,
            is_headline: article.is_headline,
            is_topstory: article.is_topstory,
            is_live: article.is_live,
            section_id: article.section.as_ref().map(|s| s.id.clone()),
            has_livescore: brand.supports_livescore() && !livescore_tag.is_empty(),
            livescore_tag,
            creator: article.creator.clone(),
            source_name: article.source_name.clone().unwrap_or_default(),
            image: None,
            existing_image: article.image.clone(),
            updates,
            errors: FieldErrors::new(),
        }
    }

    /// Builds a form from a draft file. Updates in the draft are added in
    /// order and must pass the same checks as interactive ones.
    pub fn from_draft(brand: Brand, draft: ArticleDraft) -> Result<Self> {
        let mut form = Self::new(brand);
        form.title = draft.title;
        form.description = draft.description;
        form.set_category(&draft.category);
        for sub in draft.subcategories {
            form.toggle_subcategory(&sub);
        }
        form.tags = draft.tags;
        form.creator = draft.creator;
        form.source_name = draft.source_name.unwrap_or_default();
        form.is_breaking = draft.breaking;
        form.is_headline = draft.headline;
        form.is_topstory = draft.topstory;
        form.is_live = draft.live;
        form.section_id = draft.section;
        if let Some(tag) = draft.livescore_tag.filter(|t| !t.trim().is_empty()) {
            form.has_livescore = true;
            form.livescore_tag = tag;
        }
        form.image = draft.image;
        form.body_html = match (draft.content, draft.content_file) {
            (Some(html), _) => html,
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => String::new(),
        };
        for update in draft.updates {
            let id = form.updates.add(super::UpdateDraft {
                title: update.title,
                description: update.description,
                detail: update.detail,
                image: update.image,
            })?;
            if update.key {
                form.updates.toggle_key(id);
            }
        }
        Ok(form)
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Selecting a category drops subcategories that do not belong to it.
    pub fn set_category(&mut self, category: &str) {
        self.category = category.trim().to_string();
        let options = self.subcategory_options();
        self.subcategories.retain(|s| options.contains(&s.as_str()));
    }

    pub fn subcategory_options(&self) -> &'static [&'static str] {
        let category = Some(self.category.as_str()).filter(|c| !c.is_empty());
        self.brand.subcategories_for(category)
    }

    /// Multi-valued brands toggle membership; single-valued brands replace
    /// the current choice. Options outside the category are ignored.
    pub fn toggle_subcategory(&mut self, subcategory: &str) -> bool {
        let subcategory = subcategory.trim();
        if !self.subcategory_options().contains(&subcategory) {
            tracing::debug!("Ignoring subcategory '{}' for '{}'", subcategory, self.category);
            return false;
        }
        if let Some(index) = self.subcategories.iter().position(|s| s == subcategory) {
            self.subcategories.remove(index);
        } else if self.brand.multi_subcategory() {
            self.subcategories.push(subcategory.to_string());
        } else {
            self.subcategories = vec![subcategory.to_string()];
        }
        true
    }

    /// Runs client-side checks, replacing previous errors. Returns whether
    /// the form may be submitted.
    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::new();

        if self.title.trim().chars().count() < MIN_TITLE_LEN {
            errors.insert(
                "title",
                format!("Title must be at least {MIN_TITLE_LEN} characters"),
            );
        }
        if self.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
            errors.insert(
                "description",
                format!("Description must be at least {MIN_DESCRIPTION_LEN} characters"),
            );
        }
        if self.category.is_empty() {
            errors.insert("category", "Category is required");
        } else if !self.brand.has_category(&self.category) {
            errors.insert(
                "category",
                format!("'{}' is not a {} category", self.category, self.brand.display_name()),
            );
        }

        let options = self.subcategory_options();
        if let Some(bad) = self
            .subcategories
            .iter()
            .find(|s| !options.contains(&s.as_str()))
        {
            errors.insert("subcategory", format!("'{bad}' does not belong to {}", self.category));
        } else if !self.brand.multi_subcategory() && self.subcategories.len() > 1 {
            errors.insert("subcategory", "Only one subcategory may be selected");
        }

        if self.is_live {
            if self.updates.is_empty() {
                errors.insert("content", "A live article needs at least one update");
            }
        } else if self.body_html.trim().is_empty() {
            errors.insert("content", "Content is required");
        }

        if self.creator.trim().is_empty() {
            errors.insert("creator", "Creator is required");
        }

        if self.brand.supports_livescore()
            && self.has_livescore
            && self.livescore_tag.trim().is_empty()
        {
            errors.insert("livescoreTag", "Select the live score match to link");
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    /// Multipart body for the create/update endpoint. Callers validate first.
    pub fn to_payload(&self) -> Result<FormPayload> {
        let mut payload = FormPayload::new();
        payload
            .text("title", self.title.trim())
            .text("description", self.description.trim())
            .text("category", self.category.as_str());

        if self.brand.multi_subcategory() {
            payload.text("subcategory", csv(&self.subcategories));
        } else {
            payload.text(
                "subcategory",
                self.subcategories.first().cloned().unwrap_or_default(),
            );
        }

        payload
            .text("tags", csv(&self.tags))
            .flag("isBreaking", self.is_breaking)
            .flag("isHeadline", self.is_headline)
            .flag("isTopstory", self.is_topstory)
            .flag("isLive", self.is_live)
            .text("creator", self.creator.trim());

        if !self.source_name.trim().is_empty() {
            payload.text("source_name", self.source_name.trim());
        }

        if self.is_live {
            let submission = self.updates.to_submission()?;
            payload
                .text("content", submission.content)
                .text("keyEvents", submission.key_events);
        } else {
            payload.text("content", self.body_html.as_str());
        }

        if let Some(section) = &self.section_id {
            payload.text("section", section.as_str());
        }

        if self.brand.supports_livescore() && self.has_livescore {
            payload.text("livescoreTag", self.livescore_tag.trim());
        }

        if let Some(image) = &self.image {
            payload.file("image", image);
        }

        Ok(payload)
    }

    /// Validates and submits. Client-side failures never reach the network;
    /// server-side field messages are merged into `errors` so the form can be
    /// corrected and resubmitted as is.
    pub async fn submit<A>(&mut self, api: &A) -> Result<Article>
    where
        A: ContentApi + ?Sized,
    {
        if !self.validate() {
            return Err(AppError::Validation(self.errors.clone()));
        }
        let payload = self.to_payload()?;

        let result = match &self.id {
            Some(id) => api.update_article(self.brand, id, payload).await,
            None => api.create_article(self.brand, payload).await,
        };

        match result {
            Ok(article) => {
                tracing::info!("Saved article {} ({})", article.id, article.title);
                Ok(article)
            }
            Err(err) => {
                if let Some(remote) = err.field_errors() {
                    self.errors.merge(remote);
                }
                tracing::warn!("Article submission failed: {}", err);
                Err(err)
            }
        }
    }

    pub fn key_events(&self) -> Vec<LiveUpdate> {
        self.updates.key_events()
    }
}
