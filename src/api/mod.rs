mod client;
mod envelope;
#[cfg(test)]
pub mod mock;

pub use client::HttpApi;
pub use envelope::Page;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::forms::FormPayload;
use crate::models::{Admin, Article, Brand, ContentKind, Post, Section, Slot};
use crate::store::Session;

/// Paging and filtering for list endpoints. A category or section switches
/// the request to the filter endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
    pub section: Option<String>,
}

impl ListQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            category: None,
            section: None,
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.category.is_some() || self.section.is_some()
    }

    /// Stable key for the query cache.
    pub fn cache_key(&self, brand: Brand, kind: ContentKind) -> String {
        format!(
            "{}/{}?page={}&limit={}&category={}&section={}",
            brand.slug(),
            kind.path_segment(),
            self.page,
            self.limit,
            self.category.as_deref().unwrap_or(""),
            self.section.as_deref().unwrap_or("")
        )
    }
}

/// The remote content service, one method per endpoint the admin uses.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn list_articles(&self, brand: Brand, query: &ListQuery) -> Result<Page<Article>>;
    async fn search_articles(&self, brand: Brand, term: &str, page: u32) -> Result<Page<Article>>;
    async fn article_slot(&self, brand: Brand, slot: Slot) -> Result<Vec<Article>>;
    async fn get_article(&self, brand: Brand, id: &str) -> Result<Article>;
    async fn create_article(&self, brand: Brand, payload: FormPayload) -> Result<Article>;
    async fn update_article(&self, brand: Brand, id: &str, payload: FormPayload)
        -> Result<Article>;
    async fn delete_article(&self, brand: Brand, id: &str) -> Result<()>;

    async fn list_posts(
        &self,
        brand: Brand,
        kind: ContentKind,
        query: &ListQuery,
    ) -> Result<Page<Post>>;
    async fn search_posts(
        &self,
        brand: Brand,
        kind: ContentKind,
        term: &str,
        page: u32,
    ) -> Result<Page<Post>>;
    async fn get_post(&self, brand: Brand, kind: ContentKind, id: &str) -> Result<Post>;
    async fn create_post(&self, brand: Brand, kind: ContentKind, payload: FormPayload)
        -> Result<Post>;
    async fn update_post(
        &self,
        brand: Brand,
        kind: ContentKind,
        id: &str,
        payload: FormPayload,
    ) -> Result<Post>;
    async fn delete_post(&self, brand: Brand, kind: ContentKind, id: &str) -> Result<()>;

    async fn list_sections(&self, brand: Brand) -> Result<Vec<Section>>;
    async fn get_section(&self, brand: Brand, id: &str) -> Result<Section>;
    async fn create_section(&self, brand: Brand, payload: FormPayload) -> Result<Section>;
    async fn update_section(&self, brand: Brand, id: &str, payload: FormPayload)
        -> Result<Section>;
    async fn delete_section(&self, brand: Brand, id: &str) -> Result<()>;

    /// Uploads an image and returns its public URL.
    async fn upload_image(&self, path: &Path) -> Result<String>;

    /// Exchanges credentials with the admin API for a session.
    async fn login(&self, email: &str, password: &str) -> Result<Session>;
    async fn update_profile(&self, name: &str, email: &str) -> Result<Admin>;
}
