mod cache;
mod session;

pub use cache::{CachedQuery, EntityTable, Identified, QueryCache, Tag};
pub use session::{Session, SessionStore};

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crate::api::{ContentApi, ListQuery, Page};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::forms::{ArticleForm, PostForm, SectionForm};
use crate::models::{Admin, Article, Brand, ContentKind, Post, Section, Slot};

/// Everything that changes client state goes through one of these.
#[derive(Debug, Clone)]
pub enum Action {
    SignedIn(Session),
    SignedOut,
    ProfileUpdated(Admin),
    BrandSwitched(Brand),

    ArticlesLoaded { key: String, page: Page<Article> },
    SlotLoaded { slot: Slot, articles: Vec<Article> },
    ArticleLoaded(Article),
    ArticleSaved(Article),
    ArticleDeleted(String),

    PostsLoaded { kind: ContentKind, key: String, page: Page<Post> },
    PostLoaded { kind: ContentKind, post: Post },
    PostSaved { kind: ContentKind, post: Post },
    PostDeleted { kind: ContentKind, id: String },

    SectionsLoaded(Vec<Section>),
    SectionSaved(Section),
    SectionDeleted(String),
}

/// Client state: the signed-in admin plus the normalized content cache for
/// the active brand.
pub struct AppState {
    brand: Brand,
    page_size: u32,
    session: Option<Session>,
    sessions: SessionStore,
    pub articles: EntityTable<Article>,
    pub sections: EntityTable<Section>,
    posts: HashMap<ContentKind, EntityTable<Post>>,
    pub queries: QueryCache,
}

const SECTIONS_KEY: &str = "sections";

fn slot_key(slot: Slot) -> String {
    format!("slot/{}", slot.path_segment())
}

impl AppState {
    /// Restores the persisted session, if any.
    pub fn initialize(config: &Config) -> Self {
        let sessions = SessionStore::new(&config.session_path);
        let session = sessions.load();
        match &session {
            Some(s) => tracing::info!("Restored session for {}", s.admin.email),
            None => tracing::debug!("No stored session at {:?}", sessions.path()),
        }
        Self {
            brand: config.default_brand,
            page_size: config.page_size,
            session,
            sessions,
            articles: EntityTable::new(),
            sections: EntityTable::new(),
            posts: HashMap::new(),
            queries: QueryCache::new(),
        }
    }

    /// Persists the session if one is held, removes the stored one otherwise.
    pub fn teardown(self) -> Result<()> {
        match &self.session {
            Some(session) => self.sessions.save(session),
            None => self.sessions.clear(),
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        tracing::trace!("dispatch {:?}", std::mem::discriminant(&action));
        match action {
            Action::SignedIn(session) => self.session = Some(session),
            Action::SignedOut => {
                self.session = None;
                self.clear_content();
            }
            Action::ProfileUpdated(admin) => {
                if let Some(session) = self.session.as_mut() {
                    session.admin = admin;
                }
            }
            Action::BrandSwitched(brand) => {
                if brand != self.brand {
                    self.brand = brand;
                    self.clear_content();
                }
            }

            Action::ArticlesLoaded { key, page } => {
                let mut tags = vec![Tag::List(ContentKind::Article)];
                tags.extend(
                    page.items
                        .iter()
                        .map(|a| Tag::Entity(ContentKind::Article, a.id.clone())),
                );
                let ids = self.articles.upsert_many(page.items);
                self.queries.store(
                    key,
                    CachedQuery {
                        ids,
                        total: page.total,
                        total_pages: page.total_pages,
                        current_page: page.current_page,
                        tags,
                        fetched_at: Utc::now(),
                        stale: false,
                    },
                );
            }
            Action::SlotLoaded { slot, articles } => {
                let total = articles.len() as u64;
                let ids = self.articles.upsert_many(articles);
                self.queries.store(
                    slot_key(slot),
                    CachedQuery {
                        ids,
                        total,
                        total_pages: 1,
                        current_page: 1,
                        tags: vec![Tag::Slot(slot)],
                        fetched_at: Utc::now(),
                        stale: false,
                    },
                );
            }
            Action::ArticleLoaded(article) => {
                self.articles.upsert(article);
            }
            Action::ArticleSaved(article) => {
                let id = article.id.clone();
                let mut slots: BTreeSet<Slot> = article.slots().into_iter().collect();
                let previous = self.articles.upsert(article);
                let mut tags = vec![Tag::Entity(ContentKind::Article, id)];
                match previous {
                    Some(old) => slots.extend(old.slots()),
                    None => tags.push(Tag::List(ContentKind::Article)),
                }
                tags.extend(slots.into_iter().map(Tag::Slot));
                let hit = self.queries.invalidate(&tags);
                tracing::debug!("Article saved, {} cached queries stale", hit);
            }
            Action::ArticleDeleted(id) => {
                let mut tags = vec![
                    Tag::Entity(ContentKind::Article, id.clone()),
                    Tag::List(ContentKind::Article),
                ];
                if let Some(old) = self.articles.remove(&id) {
                    tags.extend(old.slots().into_iter().map(Tag::Slot));
                }
                self.queries.invalidate(&tags);
                self.queries.forget_id(&id);
            }

            Action::PostsLoaded { kind, key, page } => {
                let mut tags = vec![Tag::List(kind)];
                tags.extend(page.items.iter().map(|p| Tag::Entity(kind, p.id.clone())));
                let ids = self.posts.entry(kind).or_default().upsert_many(page.items);
                self.queries.store(
                    key,
                    CachedQuery {
                        ids,
                        total: page.total,
                        total_pages: page.total_pages,
                        current_page: page.current_page,
                        tags,
                        fetched_at: Utc::now(),
                        stale: false,
                    },
                );
            }
            Action::PostLoaded { kind, post } => {
                self.posts.entry(kind).or_default().upsert(post);
            }
            Action::PostSaved { kind, post } => {
                let id = post.id.clone();
                let previous = self.posts.entry(kind).or_default().upsert(post);
                let mut tags = vec![Tag::Entity(kind, id)];
                if previous.is_none() {
                    tags.push(Tag::List(kind));
                }
                self.queries.invalidate(&tags);
            }
            Action::PostDeleted { kind, id } => {
                if let Some(table) = self.posts.get_mut(&kind) {
                    table.remove(&id);
                }
                self.queries
                    .invalidate(&[Tag::Entity(kind, id.clone()), Tag::List(kind)]);
                self.queries.forget_id(&id);
            }

            Action::SectionsLoaded(sections) => {
                let total = sections.len() as u64;
                let mut tags = vec![Tag::List(ContentKind::Section)];
                tags.extend(
                    sections
                        .iter()
                        .map(|s| Tag::Entity(ContentKind::Section, s.id.clone())),
                );
                let ids = self.sections.upsert_many(sections);
                self.queries.store(
                    SECTIONS_KEY,
                    CachedQuery {
                        ids,
                        total,
                        total_pages: 1,
                        current_page: 1,
                        tags,
                        fetched_at: Utc::now(),
                        stale: false,
                    },
                );
            }
            Action::SectionSaved(section) => {
                let id = section.id.clone();
                self.sections.upsert(section);
                // section order and counts show up in every listing
                self.queries.invalidate(&[
                    Tag::Entity(ContentKind::Section, id),
                    Tag::List(ContentKind::Section),
                ]);
            }
            Action::SectionDeleted(id) => {
                self.sections.remove(&id);
                self.queries.invalidate(&[
                    Tag::Entity(ContentKind::Section, id.clone()),
                    Tag::List(ContentKind::Section),
                ]);
                self.queries.forget_id(&id);
            }
        }
    }

    fn clear_content(&mut self) {
        self.articles.clear();
        self.sections.clear();
        self.posts.clear();
        self.queries.clear();
    }

    // Selectors

    pub fn brand(&self) -> Brand {
        self.brand
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn current_admin(&self) -> Option<&Admin> {
        self.session.as_ref().map(|s| &s.admin)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    pub fn can_manage_sections(&self) -> bool {
        self.current_admin()
            .is_some_and(|a| a.role.can_manage_sections())
    }

    pub fn require_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("run `newsdesk login` first".to_string()))
    }

    /// Articles currently flagged for a slot, most recently changed first.
    /// Computed from the entity table, so saved and deleted records show up
    /// here without any list being patched.
    pub fn slot_view(&self, slot: Slot) -> Vec<&Article> {
        let mut view: Vec<&Article> = self
            .articles
            .values()
            .filter(|a| a.in_slot(slot))
            .collect();
        view.sort_by(|a, b| {
            b.last_modified()
                .cmp(&a.last_modified())
                .then_with(|| a.id.cmp(&b.id))
        });
        view
    }

    pub fn breaking_news(&self) -> Vec<&Article> {
        self.slot_view(Slot::Breaking)
    }

    pub fn top_stories(&self) -> Vec<&Article> {
        self.slot_view(Slot::TopStories)
    }

    pub fn live_articles(&self) -> Vec<&Article> {
        self.slot_view(Slot::Live)
    }

    /// The single most recently updated headline article.
    pub fn headline(&self) -> Option<&Article> {
        self.slot_view(Slot::Headline).into_iter().next()
    }

    /// Records of a cached list query, in server order.
    pub fn cached_articles(&self, key: &str) -> Option<Page<Article>> {
        let query = self.queries.get(key)?;
        Some(Page {
            items: self.articles.resolve(&query.ids).cloned().collect(),
            total: query.total,
            total_pages: query.total_pages,
            current_page: query.current_page,
        })
    }

    pub fn cached_posts(&self, kind: ContentKind, key: &str) -> Option<Page<Post>> {
        let query = self.queries.get(key)?;
        let table = self.posts.get(&kind)?;
        Some(Page {
            items: table.resolve(&query.ids).cloned().collect(),
            total: query.total,
            total_pages: query.total_pages,
            current_page: query.current_page,
        })
    }

    /// Sections by display order, then name.
    pub fn sections_sorted(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.values().collect();
        sections.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        sections
    }

    pub fn active_sections(&self, now: DateTime<Utc>) -> Vec<&Section> {
        self.sections_sorted()
            .into_iter()
            .filter(|s| s.is_active_at(now))
            .collect()
    }

    // Queries and mutations against the API

    pub async fn login<A>(&mut self, api: &A, email: &str, password: &str) -> Result<&Admin>
    where
        A: ContentApi + ?Sized,
    {
        let session = api.login(email, password).await?;
        tracing::info!("Signed in as {} ({})", session.admin.email, session.admin.role.label());
        self.dispatch(Action::SignedIn(session));
        self.current_admin()
            .ok_or_else(|| anyhow::anyhow!("login returned no admin").into())
    }

    pub fn logout(&mut self) {
        self.dispatch(Action::SignedOut);
    }

    pub async fn update_profile<A>(&mut self, api: &A, name: &str, email: &str) -> Result<Admin>
    where
        A: ContentApi + ?Sized,
    {
        self.require_session()?;
        let admin = api.update_profile(name, email).await?;
        self.dispatch(Action::ProfileUpdated(admin.clone()));
        Ok(admin)
    }

    /// Serves a fresh cached page when there is one, fetches otherwise.
    pub async fn load_articles<A>(&mut self, api: &A, query: &ListQuery) -> Result<Page<Article>>
    where
        A: ContentApi + ?Sized,
    {
        let key = query.cache_key(self.brand, ContentKind::Article);
        if self.queries.fresh(&key).is_some() {
            if let Some(page) = self.cached_articles(&key) {
                tracing::debug!("Cache hit for {}", key);
                return Ok(page);
            }
        }
        let page = api.list_articles(self.brand, query).await?;
        self.dispatch(Action::ArticlesLoaded {
            key: key.clone(),
            page,
        });
        self.cached_articles(&key)
            .ok_or_else(|| anyhow::anyhow!("query {key} vanished from cache").into())
    }

    pub async fn search_articles<A>(
        &mut self,
        api: &A,
        term: &str,
        page: u32,
    ) -> Result<Page<Article>>
    where
        A: ContentApi + ?Sized,
    {
        let key = format!("{}/article/search/{}?page={}", self.brand.slug(), term, page);
        let result = api.search_articles(self.brand, term, page).await?;
        self.dispatch(Action::ArticlesLoaded {
            key: key.clone(),
            page: result,
        });
        self.cached_articles(&key)
            .ok_or_else(|| anyhow::anyhow!("query {key} vanished from cache").into())
    }

    pub async fn load_article<A>(&mut self, api: &A, id: &str, force: bool) -> Result<Article>
    where
        A: ContentApi + ?Sized,
    {
        if !force {
            if let Some(article) = self.articles.get(id) {
                return Ok(article.clone());
            }
        }
        let article = api.get_article(self.brand, id).await?;
        self.dispatch(Action::ArticleLoaded(article.clone()));
        Ok(article)
    }

    /// Fetches all four home page slots concurrently. A slot that fails is
    /// logged and left as it was.
    pub async fn refresh_slots<A>(&mut self, api: &A) -> Result<usize>
    where
        A: ContentApi + ?Sized,
    {
        let brand = self.brand;
        let results: Vec<(Slot, Result<Vec<Article>>)> = stream::iter(Slot::ALL)
            .map(|slot| async move { (slot, api.article_slot(brand, slot).await) })
            .buffer_unordered(Slot::ALL.len())
            .collect()
            .await;

        let mut loaded = 0;
        let mut first_error = None;
        for (slot, result) in results {
            match result {
                Ok(articles) => {
                    loaded += 1;
                    self.dispatch(Action::SlotLoaded { slot, articles });
                }
                Err(e) => {
                    tracing::warn!("Failed to load {} slot: {}", slot.label(), e);
                    first_error.get_or_insert(e);
                }
            }
        }
        match (loaded, first_error) {
            (0, Some(e)) => Err(e),
            _ => Ok(loaded),
        }
    }

    pub async fn save_article<A>(&mut self, api: &A, form: &mut ArticleForm) -> Result<Article>
    where
        A: ContentApi + ?Sized,
    {
        self.require_session()?;
        let article = form.submit(api).await?;
        self.dispatch(Action::ArticleSaved(article.clone()));
        Ok(article)
    }

    pub async fn delete_article<A>(&mut self, api: &A, id: &str) -> Result<()>
    where
        A: ContentApi + ?Sized,
    {
        self.require_delete()?;
        api.delete_article(self.brand, id).await?;
        self.dispatch(Action::ArticleDeleted(id.to_string()));
        Ok(())
    }

    pub async fn load_posts<A>(
        &mut self,
        api: &A,
        kind: ContentKind,
        query: &ListQuery,
    ) -> Result<Page<Post>>
    where
        A: ContentApi + ?Sized,
    {
        let key = query.cache_key(self.brand, kind);
        if self.queries.fresh(&key).is_some() {
            if let Some(page) = self.cached_posts(kind, &key) {
                return Ok(page);
            }
        }
        let page = api.list_posts(self.brand, kind, query).await?;
        self.dispatch(Action::PostsLoaded {
            kind,
            key: key.clone(),
            page,
        });
        self.cached_posts(kind, &key)
            .ok_or_else(|| anyhow::anyhow!("query {key} vanished from cache").into())
    }

    pub async fn search_posts<A>(
        &mut self,
        api: &A,
        kind: ContentKind,
        term: &str,
        page: u32,
    ) -> Result<Page<Post>>
    where
        A: ContentApi + ?Sized,
    {
        let key = format!(
            "{}/{}/search/{}?page={}",
            self.brand.slug(),
            kind.path_segment(),
            term,
            page
        );
        let result = api.search_posts(self.brand, kind, term, page).await?;
        self.dispatch(Action::PostsLoaded {
            kind,
            key: key.clone(),
            page: result,
        });
        self.cached_posts(kind, &key)
            .ok_or_else(|| anyhow::anyhow!("query {key} vanished from cache").into())
    }

    pub async fn load_post<A>(&mut self, api: &A, kind: ContentKind, id: &str) -> Result<Post>
    where
        A: ContentApi + ?Sized,
    {
        if let Some(post) = self.posts.get(&kind).and_then(|t| t.get(id)) {
            return Ok(post.clone());
        }
        let post = api.get_post(self.brand, kind, id).await?;
        self.dispatch(Action::PostLoaded {
            kind,
            post: post.clone(),
        });
        Ok(post)
    }

    pub async fn save_post<A>(&mut self, api: &A, form: &mut PostForm) -> Result<Post>
    where
        A: ContentApi + ?Sized,
    {
        self.require_session()?;
        let post = form.submit(api).await?;
        self.dispatch(Action::PostSaved {
            kind: form.kind,
            post: post.clone(),
        });
        Ok(post)
    }

    pub async fn delete_post<A>(&mut self, api: &A, kind: ContentKind, id: &str) -> Result<()>
    where
        A: ContentApi + ?Sized,
    {
        self.require_delete()?;
        api.delete_post(self.brand, kind, id).await?;
        self.dispatch(Action::PostDeleted {
            kind,
            id: id.to_string(),
        });
        Ok(())
    }

    pub async fn load_sections<A>(&mut self, api: &A) -> Result<Vec<Section>>
    where
        A: ContentApi + ?Sized,
    {
        if self.queries.fresh(SECTIONS_KEY).is_none() {
            let sections = api.list_sections(self.brand).await?;
            self.dispatch(Action::SectionsLoaded(sections));
        }
        Ok(self.sections_sorted().into_iter().cloned().collect())
    }

    pub async fn load_section<A>(&mut self, api: &A, id: &str) -> Result<Section>
    where
        A: ContentApi + ?Sized,
    {
        if let Some(section) = self.sections.get(id) {
            return Ok(section.clone());
        }
        let section = api.get_section(self.brand, id).await?;
        self.sections.upsert(section.clone());
        Ok(section)
    }

    pub async fn save_section<A>(&mut self, api: &A, form: &mut SectionForm) -> Result<Section>
    where
        A: ContentApi + ?Sized,
    {
        self.require_section_manager()?;
        let section = form.submit(api).await?;
        self.dispatch(Action::SectionSaved(section.clone()));
        Ok(section)
    }

    pub async fn delete_section<A>(&mut self, api: &A, id: &str) -> Result<()>
    where
        A: ContentApi + ?Sized,
    {
        self.require_section_manager()?;
        api.delete_section(self.brand, id).await?;
        self.dispatch(Action::SectionDeleted(id.to_string()));
        Ok(())
    }

    fn require_delete(&self) -> Result<()> {
        let session = self.require_session()?;
        if !session.admin.role.can_delete_content() {
            return Err(AppError::Unauthorized(format!(
                "role {} cannot delete content",
                session.admin.role.label()
            )));
        }
        Ok(())
    }

    fn require_section_manager(&self) -> Result<()> {
        let session = self.require_session()?;
        if !session.admin.role.can_manage_sections() {
            return Err(AppError::Unauthorized(format!(
                "role {} cannot manage sections",
                session.admin.role.label()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::models::Role;

    fn state(dir: &tempfile::TempDir) -> AppState {
        let config = Config {
            session_path: dir.path().join("session.json").to_string_lossy().to_string(),
            ..Config::default()
        };
        AppState::initialize(&config)
    }

    async fn signed_in(dir: &tempfile::TempDir, api: &MockApi) -> AppState {
        let mut state = state(dir);
        state.login(api, "desk@example.com", "secret").await.unwrap();
        state
    }

    fn article(id: &str, minutes_ago: i64) -> Article {
        let at = Utc::now() - chrono::Duration::minutes(minutes_ago);
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Story {id}"),
            "updatedAt": at.to_rfc3339(),
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn session_survives_teardown_and_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let state = signed_in(&dir, &api).await;
        assert!(state.is_authenticated());
        assert!(state.can_manage_sections());
        state.teardown().unwrap();

        let mut restored = self::state(&dir);
        assert_eq!(
            restored.current_admin().map(|a| a.email.as_str()),
            Some("desk@example.com")
        );
        restored.logout();
        restored.teardown().unwrap();
        assert!(!self::state(&dir).is_authenticated());
    }

    #[tokio::test]
    async fn fresh_queries_are_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        api.seed_article(Brand::Ghanapolitan, "First story", false);
        let mut state = state(&dir);
        let query = ListQuery::page(1, 20);

        let first = state.load_articles(&api, &query).await.unwrap();
        let second = state.load_articles(&api, &query).await.unwrap();
        assert_eq!(first.items, second.items);
        assert_eq!(api.request_count(), 1);
    }

    #[tokio::test]
    async fn saving_an_article_makes_its_lists_stale() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let mut state = signed_in(&dir, &api).await;
        let query = ListQuery::page(1, 20);
        state.load_articles(&api, &query).await.unwrap();

        let mut form = ArticleForm::new(Brand::Ghanapolitan);
        form.title = "Parliament approves budget".to_string();
        form.description = "The house voted late on Friday".to_string();
        form.set_category("News");
        form.body_html = "<p>Details</p>".to_string();
        form.creator = "Desk".to_string();
        form.is_breaking = true;
        let saved = state.save_article(&api, &mut form).await.unwrap();

        let key = query.cache_key(Brand::Ghanapolitan, ContentKind::Article);
        assert!(state.queries.fresh(&key).is_none());
        let page = state.load_articles(&api, &query).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(state.breaking_news()[0].id, saved.id);
    }

    #[test]
    fn derived_views_follow_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);
        let mut old = article("a", 30);
        old.is_headline = true;
        old.is_breaking = true;
        let mut new = article("b", 5);
        new.is_headline = true;
        state.dispatch(Action::SlotLoaded {
            slot: Slot::Headline,
            articles: vec![old.clone(), new.clone()],
        });
        assert_eq!(state.headline().map(|a| a.id.as_str()), Some("b"));
        assert_eq!(state.breaking_news().len(), 1);

        // an edit that unflags breaking drops it from the view immediately
        let mut edited = old.clone();
        edited.is_breaking = false;
        edited.updated_at = Some(Utc::now());
        state.dispatch(Action::ArticleSaved(edited));
        assert!(state.breaking_news().is_empty());
        assert_eq!(state.headline().map(|a| a.id.as_str()), Some("a"));
        assert!(state.queries.fresh(&slot_key(Slot::Headline)).is_none());

        state.dispatch(Action::ArticleDeleted("a".to_string()));
        assert_eq!(state.headline().map(|a| a.id.as_str()), Some("b"));
        assert_eq!(state.queries.get(&slot_key(Slot::Headline)).unwrap().ids, vec!["b"]);
    }

    #[tokio::test]
    async fn refresh_slots_loads_every_slot() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        api.seed_article(Brand::Ghanapolitan, "Live: Derby", true);
        let mut state = state(&dir);
        assert_eq!(state.refresh_slots(&api).await.unwrap(), 4);
        assert_eq!(api.request_count(), 4);
        assert_eq!(state.live_articles().len(), 1);
        assert!(state.top_stories().is_empty());
    }

    #[test]
    fn switching_brand_drops_cached_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);
        state.dispatch(Action::ArticleLoaded(article("a", 1)));
        state.dispatch(Action::BrandSwitched(Brand::Ghanapolitan));
        assert_eq!(state.articles.len(), 1);
        state.dispatch(Action::BrandSwitched(Brand::Ghanascore));
        assert!(state.articles.is_empty());
        assert_eq!(state.brand(), Brand::Ghanascore);
    }

    #[tokio::test]
    async fn writers_cannot_delete() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let seeded = api.seed_article(Brand::Ghanapolitan, "Keep me", false);
        let mut state = signed_in(&dir, &api).await;
        let mut admin = state.current_admin().unwrap().clone();
        admin.role = Role::Writer;
        state.dispatch(Action::ProfileUpdated(admin));

        let err = state.delete_article(&api, &seeded.id).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        // only the login went out
        assert_eq!(api.request_count(), 1);
    }

    #[tokio::test]
    async fn deleted_posts_leave_cached_pages() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let keep = api.seed_post(Brand::Ghanapolitan, ContentKind::Opinion, "Keep");
        let gone = api.seed_post(Brand::Ghanapolitan, ContentKind::Opinion, "Gone");
        api.seed_post(Brand::Ghanapolitan, ContentKind::Feature, "Other kind");
        let mut state = signed_in(&dir, &api).await;
        let query = ListQuery::page(1, 20);

        let page = state
            .load_posts(&api, ContentKind::Opinion, &query)
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        state
            .delete_post(&api, ContentKind::Opinion, &gone.id)
            .await
            .unwrap();
        let key = query.cache_key(Brand::Ghanapolitan, ContentKind::Opinion);
        let cached = state.cached_posts(ContentKind::Opinion, &key).unwrap();
        assert_eq!(cached.items, vec![keep]);
        assert_eq!(cached.total, 1);
        assert!(state.queries.fresh(&key).is_none());
    }

    #[tokio::test]
    async fn sections_sort_and_expire() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockApi::new();
        let mut state = signed_in(&dir, &api).await;
        for (name, order) in [("Elections", 2), ("Budget", 1)] {
            let mut form = SectionForm::new(Brand::Ghanapolitan);
            form.name = name.to_string();
            form.code = name[..3].to_uppercase();
            form.display_order = order;
            state.save_section(&api, &mut form).await.unwrap();
        }
        let names: Vec<String> = state
            .load_sections(&api)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Budget", "Elections"]);
        assert_eq!(state.active_sections(Utc::now()).len(), 2);
    }
}
