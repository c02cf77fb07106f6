//! In-memory stand-in for the content API, used by tests.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::forms::{FieldErrors, FormPayload, FormValue};
use crate::models::{Admin, Article, Brand, ContentKind, LiveUpdate, Post, Role, Section, Slot};
use crate::store::Session;

use super::{ContentApi, ListQuery, Page};

#[derive(Default)]
struct MockState {
    articles: Vec<(Brand, Article)>,
    posts: Vec<(Brand, ContentKind, Post)>,
    sections: Vec<(Brand, Section)>,
    payloads: Vec<FormPayload>,
    requests: usize,
    next_id: u64,
    rejection: Option<(u16, FieldErrors)>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Counts the call and fails it if a rejection was queued.
    fn begin(&mut self) -> Result<()> {
        self.requests += 1;
        match self.rejection.take() {
            Some((status, errors)) => Err(AppError::Rejected { status, errors }),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

/// Mirrors what the API does with a multipart body: every text field lands
/// on the record as a string, and the record is read back with the same
/// tolerant deserializers the client uses for real responses.
fn apply_payload<T>(existing: Option<&T>, id: &str, payload: &FormPayload) -> T
where
    T: Serialize + DeserializeOwned,
{
    let mut map = existing
        .and_then(|e| serde_json::to_value(e).ok())
        .and_then(|v| v.as_object().cloned())
        .unwrap_or_else(Map::new);
    map.insert("id".to_string(), Value::String(id.to_string()));
    map.remove("_id");
    let now = Utc::now().to_rfc3339();
    map.entry("createdAt".to_string())
        .or_insert_with(|| Value::String(now.clone()));
    map.insert("updatedAt".to_string(), Value::String(now));

    for (name, value) in payload.clone().into_parts() {
        let value = match value {
            FormValue::Text(text) => match name.as_str() {
                "displayOrder" => Value::from(text.parse::<i64>().unwrap_or_default()),
                _ => Value::String(text),
            },
            FormValue::File(path) => Value::String(format!(
                "https://cdn.example.com/{}",
                path.file_name().unwrap().to_string_lossy()
            )),
        };
        map.insert(name, value);
    }
    serde_json::from_value(Value::Object(map)).expect("mock record")
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests made through the trait so far.
    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    pub fn last_payload(&self) -> Option<FormPayload> {
        self.state.lock().unwrap().payloads.last().cloned()
    }

    /// Makes the next request fail the way a server-side validation failure
    /// would.
    pub fn reject_next(&self, status: u16, errors: FieldErrors) {
        self.state.lock().unwrap().rejection = Some((status, errors));
    }

    /// Stores an article directly, without counting a request.
    pub fn seed_article(&self, brand: Brand, title: &str, live: bool) -> Article {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id("art");
        let now = Utc::now();
        let updates = (1..=2)
            .map(|n| LiveUpdate {
                content_title: format!("Update {n}"),
                content_description: String::new(),
                content_detail: format!("<p>Update {n}</p>"),
                is_key: n == 2,
                content_published_at: now - Duration::minutes(10 - n),
                image: None,
            })
            .collect::<Vec<_>>();
        let article = Article {
            id,
            title: title.to_string(),
            description: "Seeded description text".to_string(),
            content: if live {
                crate::models::ArticleContent::Updates(updates.clone())
            } else {
                crate::models::ArticleContent::Html("<p>Seeded</p>".to_string())
            },
            category: brand.categories().next().unwrap().to_string(),
            subcategory: Vec::new(),
            tags: vec!["seed".to_string()],
            is_breaking: false,
            is_headline: false,
            is_topstory: false,
            is_live: live,
            section: None,
            livescore_tag: None,
            creator: "Desk".to_string(),
            source_name: None,
            image: None,
            key_events: if live {
                updates.into_iter().filter(|u| u.is_key).collect()
            } else {
                Vec::new()
            },
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.articles.push((brand, article.clone()));
        article
    }

    pub fn seed_post(&self, brand: Brand, kind: ContentKind, title: &str) -> Post {
        let mut state = self.state.lock().unwrap();
        let post = Post {
            id: state.next_id("post"),
            title: title.to_string(),
            description: String::new(),
            content: "<p>Post</p>".to_string(),
            category: String::new(),
            tags: Vec::new(),
            creator: "Desk".to_string(),
            image: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        state.posts.push((brand, kind, post.clone()));
        post
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: u32, limit: u32) -> Page<T> {
    let limit = limit.max(1) as usize;
    let total = items.len();
    let total_pages = total.div_ceil(limit).max(1) as u32;
    let start = (page.max(1) as usize - 1) * limit;
    Page {
        items: items.into_iter().skip(start).take(limit).collect(),
        total: total as u64,
        total_pages,
        current_page: page.max(1),
    }
}

#[async_trait]
impl ContentApi for MockApi {
    async fn list_articles(&self, brand: Brand, query: &ListQuery) -> Result<Page<Article>> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let items: Vec<Article> = state
            .articles
            .iter()
            .filter(|(b, a)| {
                *b == brand
                    && query.category.as_ref().map_or(true, |c| &a.category == c)
                    && query
                        .section
                        .as_ref()
                        .map_or(true, |s| a.section.as_ref().is_some_and(|r| &r.id == s))
            })
            .map(|(_, a)| a.clone())
            .collect();
        Ok(paginate(items, query.page, query.limit))
    }

    async fn search_articles(&self, brand: Brand, term: &str, page: u32) -> Result<Page<Article>> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let term = term.to_lowercase();
        let items = state
            .articles
            .iter()
            .filter(|(b, a)| *b == brand && a.title.to_lowercase().contains(&term))
            .map(|(_, a)| a.clone())
            .collect();
        Ok(paginate(items, page, 20))
    }

    async fn article_slot(&self, brand: Brand, slot: Slot) -> Result<Vec<Article>> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        Ok(state
            .articles
            .iter()
            .filter(|(b, a)| *b == brand && a.in_slot(slot))
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn get_article(&self, brand: Brand, id: &str) -> Result<Article> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        state
            .articles
            .iter()
            .find(|(b, a)| *b == brand && a.id == id)
            .map(|(_, a)| a.clone())
            .ok_or_else(|| AppError::NotFound(format!("article {id}")))
    }

    async fn create_article(&self, brand: Brand, payload: FormPayload) -> Result<Article> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let id = state.next_id("art");
        let article = apply_payload::<Article>(None, &id, &payload).normalize();
        state.payloads.push(payload);
        state.articles.push((brand, article.clone()));
        Ok(article)
    }

    async fn update_article(
        &self,
        brand: Brand,
        id: &str,
        payload: FormPayload,
    ) -> Result<Article> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let index = state
            .articles
            .iter()
            .position(|(b, a)| *b == brand && a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("article {id}")))?;
        let updated =
            apply_payload::<Article>(Some(&state.articles[index].1), id, &payload).normalize();
        state.articles[index].1 = updated.clone();
        state.payloads.push(payload);
        Ok(updated)
    }

    async fn delete_article(&self, brand: Brand, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let before = state.articles.len();
        state.articles.retain(|(b, a)| !(*b == brand && a.id == id));
        if before == state.articles.len() {
            return Err(AppError::NotFound(format!("article {id}")));
        }
        Ok(())
    }

    async fn list_posts(
        &self,
        brand: Brand,
        kind: ContentKind,
        query: &ListQuery,
    ) -> Result<Page<Post>> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let items = state
            .posts
            .iter()
            .filter(|(b, k, _)| *b == brand && *k == kind)
            .map(|(_, _, p)| p.clone())
            .collect();
        Ok(paginate(items, query.page, query.limit))
    }

    async fn search_posts(
        &self,
        brand: Brand,
        kind: ContentKind,
        term: &str,
        page: u32,
    ) -> Result<Page<Post>> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let term = term.to_lowercase();
        let items = state
            .posts
            .iter()
            .filter(|(b, k, p)| *b == brand && *k == kind && p.title.to_lowercase().contains(&term))
            .map(|(_, _, p)| p.clone())
            .collect();
        Ok(paginate(items, page, 20))
    }

    async fn get_post(&self, brand: Brand, kind: ContentKind, id: &str) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        state
            .posts
            .iter()
            .find(|(b, k, p)| *b == brand && *k == kind && p.id == id)
            .map(|(_, _, p)| p.clone())
            .ok_or_else(|| AppError::NotFound(format!("{} {id}", kind.entity_key())))
    }

    async fn create_post(
        &self,
        brand: Brand,
        kind: ContentKind,
        payload: FormPayload,
    ) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let id = state.next_id("post");
        let post = apply_payload::<Post>(None, &id, &payload);
        state.payloads.push(payload);
        state.posts.push((brand, kind, post.clone()));
        Ok(post)
    }

    async fn update_post(
        &self,
        brand: Brand,
        kind: ContentKind,
        id: &str,
        payload: FormPayload,
    ) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let index = state
            .posts
            .iter()
            .position(|(b, k, p)| *b == brand && *k == kind && p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("{} {id}", kind.entity_key())))?;
        let updated = apply_payload::<Post>(Some(&state.posts[index].2), id, &payload);
        state.posts[index].2 = updated.clone();
        state.payloads.push(payload);
        Ok(updated)
    }

    async fn delete_post(&self, brand: Brand, kind: ContentKind, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        state
            .posts
            .retain(|(b, k, p)| !(*b == brand && *k == kind && p.id == id));
        Ok(())
    }

    async fn list_sections(&self, brand: Brand) -> Result<Vec<Section>> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        Ok(state
            .sections
            .iter()
            .filter(|(b, _)| *b == brand)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn get_section(&self, brand: Brand, id: &str) -> Result<Section> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        state
            .sections
            .iter()
            .find(|(b, s)| *b == brand && s.id == id)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| AppError::NotFound(format!("section {id}")))
    }

    async fn create_section(&self, brand: Brand, payload: FormPayload) -> Result<Section> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let id = state.next_id("sec");
        let section = apply_payload::<Section>(None, &id, &payload);
        state.payloads.push(payload);
        state.sections.push((brand, section.clone()));
        Ok(section)
    }

    async fn update_section(
        &self,
        brand: Brand,
        id: &str,
        payload: FormPayload,
    ) -> Result<Section> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        let index = state
            .sections
            .iter()
            .position(|(b, s)| *b == brand && s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("section {id}")))?;
        let updated = apply_payload::<Section>(Some(&state.sections[index].1), id, &payload);
        state.sections[index].1 = updated.clone();
        state.payloads.push(payload);
        Ok(updated)
    }

    async fn delete_section(&self, brand: Brand, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        state.sections.retain(|(b, s)| !(*b == brand && s.id == id));
        Ok(())
    }

    async fn upload_image(&self, path: &Path) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        Ok(format!(
            "https://cdn.example.com/{}",
            path.file_name().unwrap().to_string_lossy()
        ))
    }

    async fn login(&self, email: &str, _password: &str) -> Result<Session> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        Ok(Session {
            admin: Admin {
                id: Some("admin-1".to_string()),
                name: "Test Admin".to_string(),
                email: email.to_string(),
                role: Role::Admin,
            },
            access_token: "token-1".to_string(),
            refresh_token: None,
        })
    }

    async fn update_profile(&self, name: &str, email: &str) -> Result<Admin> {
        let mut state = self.state.lock().unwrap();
        state.begin()?;
        Ok(Admin {
            id: Some("admin-1".to_string()),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Admin,
        })
    }
}
