use std::path::PathBuf;

use serde::Deserialize;

use crate::api::ContentApi;
use crate::error::{AppError, Result};
use crate::models::{Brand, ContentKind, Post};

use super::payload::{csv, FormPayload};
use super::FieldErrors;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub creator: String,
    pub image: Option<PathBuf>,
    pub content: Option<String>,
    pub content_file: Option<PathBuf>,
}

/// Form for features, opinions and graphics.
#[derive(Debug, Clone)]
pub struct PostForm {
    pub brand: Brand,
    pub kind: ContentKind,
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub body_html: String,
    pub category: String,
    pub tags: Vec<String>,
    pub creator: String,
    pub image: Option<PathBuf>,
    pub errors: FieldErrors,
}

impl PostForm {
    pub fn new(brand: Brand, kind: ContentKind) -> Self {
        Self {
            brand,
            kind,
            id: None,
            title: String::new(),
            description: String::new(),
            body_html: String::new(),
            category: String::new(),
            tags: Vec::new(),
            creator: String::new(),
            image: None,
            errors: FieldErrors::new(),
        }
    }

    pub fn from_post(brand: Brand, kind: ContentKind, post: &Post) -> Self {
        Self {
            id: Some(post.id.clone()),
            title: post.title.clone(),
            description: post.description.clone(),
            body_html: post.content.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            creator: post.creator.clone(),
            ..Self::new(brand, kind)
        }
    }

    pub fn from_draft(brand: Brand, kind: ContentKind, draft: PostDraft) -> Result<Self> {
        let body_html = match (draft.content, draft.content_file) {
            (Some(html), _) => html,
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => String::new(),
        };
        Ok(Self {
            title: draft.title,
            description: draft.description,
            body_html,
            category: draft.category,
            tags: draft.tags,
            creator: draft.creator,
            image: draft.image,
            ..Self::new(brand, kind)
        })
    }

    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::new();
        if self.title.trim().chars().count() < 5 {
            errors.insert("title", "Title must be at least 5 characters");
        }
        // graphics are image-led and may carry no body
        if self.kind != ContentKind::Graphic && self.body_html.trim().is_empty() {
            errors.insert("content", "Content is required");
        }
        if self.kind == ContentKind::Graphic && self.image.is_none() && self.id.is_none() {
            errors.insert("image", "A graphic needs an image");
        }
        if !self.category.is_empty() && !self.brand.has_category(&self.category) {
            errors.insert("category", format!("'{}' is not a valid category", self.category));
        }
        if self.creator.trim().is_empty() {
            errors.insert("creator", "Creator is required");
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    pub fn to_payload(&self) -> FormPayload {
        let mut payload = FormPayload::new();
        payload
            .text("title", self.title.trim())
            .text("description", self.description.trim())
            .text("content", self.body_html.as_str())
            .text("category", self.category.as_str())
            .text("tags", csv(&self.tags))
            .text("creator", self.creator.trim());
        if let Some(image) = &self.image {
            payload.file("image", image);
        }
        payload
    }

    pub async fn submit<A>(&mut self, api: &A) -> Result<Post>
    where
        A: ContentApi + ?Sized,
    {
        if !self.validate() {
            return Err(AppError::Validation(self.errors.clone()));
        }
        let payload = self.to_payload();
        let result = match &self.id {
            Some(id) => api.update_post(self.brand, self.kind, id, payload).await,
            None => api.create_post(self.brand, self.kind, payload).await,
        };
        if let Err(err) = &result {
            if let Some(remote) = err.field_errors() {
                self.errors.merge(remote);
            }
        }
        result
    }
}
