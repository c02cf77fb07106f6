use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::forms::{FieldErrors, FormPayload, FormValue};
use crate::models::{Admin, Article, Brand, ContentKind, Post, Section, Slot};
use crate::store::Session;

use super::envelope::{self, Page};
use super::{ContentApi, ListQuery};

/// reqwest-backed client for the content API.
pub struct HttpApi {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpApi {
    pub fn new(config: &Config, access_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // joins are relative, so the base must end in a slash
        let mut base = config.api_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            access_token,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn collection(&self, brand: Brand, kind: ContentKind) -> String {
        format!("api/{}/{}", brand.slug(), kind.path_segment())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and returns its JSON body, mapping HTTP and envelope
    /// failures onto [`AppError`].
    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let text = response.text().await?;

        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                Err(_) if !status.is_success() => json!({ "message": text }),
                Err(e) => return Err(e.into()),
            }
        };

        tracing::debug!("{} {}", status.as_u16(), url);

        if status.is_success() {
            envelope::ensure_success(status.as_u16(), &body)?;
            return Ok(body);
        }

        Err(status_error(status.as_u16(), url, &body))
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path)?;
        self.send(self.request(Method::GET, url).query(query)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn submit(&self, method: Method, path: &str, payload: FormPayload) -> Result<Value> {
        let url = self.url(path)?;
        let form = multipart(payload).await?;
        self.send(self.request(method, url).multipart(form)).await
    }

    fn list_query(query: &ListQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        if let Some(section) = &query.section {
            params.push(("section", section.clone()));
        }
        params
    }

    async fn list_page<T: serde::de::DeserializeOwned>(
        &self,
        brand: Brand,
        kind: ContentKind,
        query: &ListQuery,
    ) -> Result<Page<T>> {
        let mut path = self.collection(brand, kind);
        if query.is_filtered() {
            path.push_str("/filter");
        }
        let body = self.get(&path, &Self::list_query(query)).await?;
        envelope::page(&body, kind.list_key())
    }

    async fn search_page<T: serde::de::DeserializeOwned>(
        &self,
        brand: Brand,
        kind: ContentKind,
        term: &str,
        page: u32,
    ) -> Result<Page<T>> {
        let path = format!(
            "{}/search/{}",
            self.collection(brand, kind),
            urlencoding::encode(term.trim())
        );
        let body = self.get(&path, &[("page", page.max(1).to_string())]).await?;
        envelope::page(&body, kind.list_key())
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

async fn multipart(payload: FormPayload) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in payload.into_parts() {
        form = match value {
            FormValue::Text(text) => form.text(name, text),
            FormValue::File(path) => {
                let bytes = tokio::fs::read(&path).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "upload".to_string());
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(mime_for(&path))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

fn session_from_login(body: &Value) -> Result<Session> {
    let data = body.get("data").unwrap_or(body);
    let token = ["accessToken", "token", "access_token"]
        .iter()
        .find_map(|k| data.get(k).or_else(|| body.get(k)).and_then(Value::as_str))
        .ok_or_else(|| AppError::Api("login response has no access token".to_string()))?;
    let refresh_token = ["refreshToken", "refresh_token"]
        .iter()
        .find_map(|k| data.get(k).or_else(|| body.get(k)).and_then(Value::as_str))
        .map(str::to_string);
    let admin: Admin = envelope::entity(body, "admin")?;

    Ok(Session {
        admin,
        access_token: token.to_string(),
        refresh_token,
    })
}

#[async_trait]
impl ContentApi for HttpApi {
    async fn list_articles(&self, brand: Brand, query: &ListQuery) -> Result<Page<Article>> {
        let mut page: Page<Article> = self.list_page(brand, ContentKind::Article, query).await?;
        page.items = page.items.into_iter().map(Article::normalize).collect();
        Ok(page)
    }

    async fn search_articles(&self, brand: Brand, term: &str, page: u32) -> Result<Page<Article>> {
        let mut page: Page<Article> = self
            .search_page(brand, ContentKind::Article, term, page)
            .await?;
        page.items = page.items.into_iter().map(Article::normalize).collect();
        Ok(page)
    }

    async fn article_slot(&self, brand: Brand, slot: Slot) -> Result<Vec<Article>> {
        let path = format!(
            "{}/{}",
            self.collection(brand, ContentKind::Article),
            slot.path_segment()
        );
        let body = self.get(&path, &[]).await?;
        // the headline endpoint returns a single record
        let articles = match slot {
            Slot::Headline => match envelope::entity::<Article>(&body, "article") {
                Ok(article) => vec![article],
                Err(_) => envelope::list(&body, "articles")?,
            },
            _ => envelope::list(&body, "articles")?,
        };
        Ok(articles.into_iter().map(Article::normalize).collect())
    }

    async fn get_article(&self, brand: Brand, id: &str) -> Result<Article> {
        let path = format!("{}/{}", self.collection(brand, ContentKind::Article), id);
        let body = self.get(&path, &[]).await?;
        Ok(envelope::entity::<Article>(&body, "article")?.normalize())
    }

    async fn create_article(&self, brand: Brand, payload: FormPayload) -> Result<Article> {
        let path = self.collection(brand, ContentKind::Article);
        let body = self.submit(Method::POST, &path, payload).await?;
        Ok(envelope::entity::<Article>(&body, "article")?.normalize())
    }

    async fn update_article(
        &self,
        brand: Brand,
        id: &str,
        payload: FormPayload,
    ) -> Result<Article> {
        let path = format!("{}/{}", self.collection(brand, ContentKind::Article), id);
        let body = self.submit(Method::PATCH, &path, payload).await?;
        Ok(envelope::entity::<Article>(&body, "article")?.normalize())
    }

    async fn delete_article(&self, brand: Brand, id: &str) -> Result<()> {
        let path = format!("{}/{}", self.collection(brand, ContentKind::Article), id);
        self.delete(&path).await
    }

    async fn list_posts(
        &self,
        brand: Brand,
        kind: ContentKind,
        query: &ListQuery,
    ) -> Result<Page<Post>> {
        self.list_page(brand, kind, query).await
    }

    async fn search_posts(
        &self,
        brand: Brand,
        kind: ContentKind,
        term: &str,
        page: u32,
    ) -> Result<Page<Post>> {
        self.search_page(brand, kind, term, page).await
    }

    async fn get_post(&self, brand: Brand, kind: ContentKind, id: &str) -> Result<Post> {
        let path = format!("{}/{}", self.collection(brand, kind), id);
        let body = self.get(&path, &[]).await?;
        envelope::entity(&body, kind.entity_key())
    }

    async fn create_post(
        &self,
        brand: Brand,
        kind: ContentKind,
        payload: FormPayload,
    ) -> Result<Post> {
        let path = self.collection(brand, kind);
        let body = self.submit(Method::POST, &path, payload).await?;
        envelope::entity(&body, kind.entity_key())
    }

    async fn update_post(
        &self,
        brand: Brand,
        kind: ContentKind,
        id: &str,
        payload: FormPayload,
    ) -> Result<Post> {
        let path = format!("{}/{}", self.collection(brand, kind), id);
        let body = self.submit(Method::PATCH, &path, payload).await?;
        envelope::entity(&body, kind.entity_key())
    }

    async fn delete_post(&self, brand: Brand, kind: ContentKind, id: &str) -> Result<()> {
        let path = format!("{}/{}", self.collection(brand, kind), id);
        self.delete(&path).await
    }

    async fn list_sections(&self, brand: Brand) -> Result<Vec<Section>> {
        let path = self.collection(brand, ContentKind::Section);
        let body = self.get(&path, &[]).await?;
        envelope::list(&body, ContentKind::Section.list_key())
    }

    async fn get_section(&self, brand: Brand, id: &str) -> Result<Section> {
        let path = format!("{}/{}", self.collection(brand, ContentKind::Section), id);
        let body = self.get(&path, &[]).await?;
        envelope::entity(&body, "section")
    }

    async fn create_section(&self, brand: Brand, payload: FormPayload) -> Result<Section> {
        let path = self.collection(brand, ContentKind::Section);
        let body = self.submit(Method::POST, &path, payload).await?;
        envelope::entity(&body, "section")
    }

    async fn update_section(
        &self,
        brand: Brand,
        id: &str,
        payload: FormPayload,
    ) -> Result<Section> {
        let path = format!("{}/{}", self.collection(brand, ContentKind::Section), id);
        let body = self.submit(Method::PATCH, &path, payload).await?;
        envelope::entity(&body, "section")
    }

    async fn delete_section(&self, brand: Brand, id: &str) -> Result<()> {
        let path = format!("{}/{}", self.collection(brand, ContentKind::Section), id);
        self.delete(&path).await
    }

    async fn upload_image(&self, path: &Path) -> Result<String> {
        let mut payload = FormPayload::new();
        payload.file("image", path);
        let body = self.submit(Method::POST, "image", payload).await?;

        let data = body.get("data").unwrap_or(&body);
        ["url", "imageUrl", "secure_url"]
            .iter()
            .find_map(|k| data.get(k).and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| AppError::Api("upload response has no URL".to_string()))
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let url = self.url("api/admin/login")?;
        let body = self
            .send(
                self.client
                    .post(url)
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        session_from_login(&body)
    }

    async fn update_profile(&self, name: &str, email: &str) -> Result<Admin> {
        let url = self.url("api/admin/profile")?;
        let body = self
            .send(
                self.request(Method::PATCH, url)
                    .json(&json!({ "name": name, "email": email })),
            )
            .await?;
        envelope::entity(&body, "admin")
    }
}

fn status_error(status: u16, url: String, body: &Value) -> AppError {
    let errors = FieldErrors::from_server_body(body);
    match status {
        404 => AppError::NotFound(url),
        401 | 403 => AppError::Unauthorized(errors.to_string()),
        code => AppError::Rejected {
            status: code,
            errors,
        },
    }
}
