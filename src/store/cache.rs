use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{Article, ContentKind, Post, Section, Slot};

pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Article {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Section {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Normalized records of one kind, keyed by id. Every list the client shows
/// is a sequence of ids resolved against this table, so a record patched
/// here is patched everywhere it appears.
#[derive(Debug, Clone)]
pub struct EntityTable<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for EntityTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: Identified> EntityTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server responses are authoritative: the stored record is replaced.
    pub fn upsert(&mut self, record: T) -> Option<T> {
        self.entries.insert(record.id().to_string(), record)
    }

    /// Returns the ids in the order given.
    pub fn upsert_many(&mut self, records: impl IntoIterator<Item = T>) -> Vec<String> {
        records
            .into_iter()
            .map(|record| {
                let id = record.id().to_string();
                self.upsert(record);
                id
            })
            .collect()
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Resolves an id sequence, skipping ids that are no longer present.
    pub fn resolve<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a T> + 'a {
        ids.iter().filter_map(move |id| self.entries.get(id))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// What a cached query depends on. A mutation names the tags it affects and
/// every query sharing one of them goes stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Any list of this kind
    List(ContentKind),
    /// Queries that contain this record
    Entity(ContentKind, String),
    /// Server-side membership of a home page slot
    Slot(Slot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedQuery {
    pub ids: Vec<String>,
    pub total: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub tags: Vec<Tag>,
    pub fetched_at: DateTime<Utc>,
    pub stale: bool,
}

/// Results of list-style requests, stored as id sequences.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: HashMap<String, CachedQuery>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, key: impl Into<String>, query: CachedQuery) {
        self.entries.insert(key.into(), query);
    }

    /// A cached result that has not been invalidated since it was fetched.
    pub fn fresh(&self, key: &str) -> Option<&CachedQuery> {
        self.entries.get(key).filter(|q| !q.stale)
    }

    pub fn get(&self, key: &str) -> Option<&CachedQuery> {
        self.entries.get(key)
    }

    /// Marks every query sharing a tag stale. Returns how many were hit.
    pub fn invalidate(&mut self, tags: &[Tag]) -> usize {
        let mut hit = 0;
        for query in self.entries.values_mut() {
            if !query.stale && query.tags.iter().any(|t| tags.contains(t)) {
                query.stale = true;
                hit += 1;
            }
        }
        hit
    }

    /// Drops a deleted record from every cached sequence.
    pub fn forget_id(&mut self, id: &str) {
        for query in self.entries.values_mut() {
            let before = query.ids.len();
            query.ids.retain(|i| i != id);
            if query.ids.len() != before {
                query.total = query.total.saturating_sub(1);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
