use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::LiveUpdate;

use super::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Editor input for a single update, before it joins the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateDraft {
    pub title: String,
    pub description: String,
    pub detail: String,
    pub image: Option<String>,
}

impl UpdateDraft {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.insert("content_title", "Update title is required");
        }
        if self.detail.trim().is_empty() {
            errors.insert("content_detail", "Update details are required");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
            && self.description.trim().is_empty()
            && self.detail.trim().is_empty()
    }
}

/// A list entry. The id only exists on the client to track entries while
/// they are added, removed and reordered; it is never sent.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveEntry {
    pub id: Uuid,
    pub update: LiveUpdate,
}

/// The two derived fields sent with a live article, taken from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSubmission {
    /// JSON array of every update in list order.
    pub content: String,
    /// JSON array of the key updates, in the same order.
    pub key_events: String,
}

/// Ordered live updates being assembled before a single batched submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveUpdateList {
    entries: Vec<LiveEntry>,
}

impl LiveUpdateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the list from a persisted live article. Order and timestamps are
    /// kept; every entry gets a fresh local id.
    pub fn from_updates(updates: impl IntoIterator<Item = LiveUpdate>) -> Self {
        Self {
            entries: updates
                .into_iter()
                .map(|update| LiveEntry {
                    id: Uuid::new_v4(),
                    update,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LiveEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&LiveEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Appends a new update stamped with the current time.
    pub fn add(&mut self, draft: UpdateDraft) -> Result<Uuid> {
        self.add_at(draft, Utc::now())
    }

    pub fn add_at(&mut self, draft: UpdateDraft, published_at: DateTime<Utc>) -> Result<Uuid> {
        draft.validate().map_err(AppError::Validation)?;

        let id = Uuid::new_v4();
        self.entries.push(LiveEntry {
            id,
            update: LiveUpdate {
                content_title: draft.title.trim().to_string(),
                content_description: draft.description.trim().to_string(),
                content_detail: draft.detail,
                is_key: false,
                content_published_at: published_at,
                image: draft.image,
            },
        });
        tracing::debug!("Added live update {} ({} total)", id, self.entries.len());
        Ok(id)
    }

    /// Replaces the text of an existing update; position, key marker and
    /// publication time stay as they were. Returns false for unknown ids.
    pub fn edit(&mut self, id: Uuid, draft: UpdateDraft) -> Result<bool> {
        draft.validate().map_err(AppError::Validation)?;

        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        entry.update.content_title = draft.title.trim().to_string();
        entry.update.content_description = draft.description.trim().to_string();
        entry.update.content_detail = draft.detail;
        if draft.image.is_some() {
            entry.update.image = draft.image;
        }
        Ok(true)
    }

    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Swaps the entry with its neighbour. Moving past either end, or moving
    /// an unknown id, leaves the list untouched.
    pub fn move_update(&mut self, id: Uuid, direction: Direction) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.entries.len() => index + 1,
            _ => return false,
        };
        self.entries.swap(index, target);
        true
    }

    /// Flips the key-event marker. Returns the new value.
    pub fn toggle_key(&mut self, id: Uuid) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        entry.update.is_key = !entry.update.is_key;
        Some(entry.update.is_key)
    }

    pub fn updates(&self) -> Vec<LiveUpdate> {
        self.entries.iter().map(|e| e.update.clone()).collect()
    }

    pub fn key_events(&self) -> Vec<LiveUpdate> {
        self.entries
            .iter()
            .filter(|e| e.update.is_key)
            .map(|e| e.update.clone())
            .collect()
    }

    /// Serializes the list for submission. Key events are filtered from the
    /// same snapshot so the two fields can never disagree.
    pub fn to_submission(&self) -> Result<LiveSubmission> {
        let snapshot = self.updates();
        let key_events: Vec<&LiveUpdate> = snapshot.iter().filter(|u| u.is_key).collect();
        Ok(LiveSubmission {
            content: serde_json::to_string(&snapshot)?,
            key_events: serde_json::to_string(&key_events)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list_of(titles: &[&str]) -> (LiveUpdateList, Vec<Uuid>) {
        let mut list = LiveUpdateList::new();
        let ids = titles
            .iter()
            .map(|t| list.add(UpdateDraft::new(*t, format!("<p>{t}</p>"))).unwrap())
            .collect();
        (list, ids)
    }

    fn titles(list: &LiveUpdateList) -> Vec<String> {
        list.entries()
            .iter()
            .map(|e| e.update.content_title.clone())
            .collect()
    }

    #[test]
    fn blank_title_or_detail_is_rejected_without_appending() {
        let (mut list, _) = list_of(&["one"]);
        let drafts = [
            UpdateDraft::new("", "<p>x</p>"),
            UpdateDraft::new("   ", "<p>x</p>"),
            UpdateDraft::new("title", ""),
            UpdateDraft::new("title", " \n "),
            UpdateDraft::default(),
        ];
        for draft in drafts {
            let err = list.add(draft).unwrap_err();
            assert!(err.field_errors().is_some());
            assert_eq!(list.len(), 1);
        }
    }

    #[test]
    fn rejection_names_the_missing_fields() {
        let mut list = LiveUpdateList::new();
        let err = list.add(UpdateDraft::default()).unwrap_err();
        let errors = err.field_errors().unwrap();
        assert!(errors.contains("content_title"));
        assert!(errors.contains("content_detail"));
    }

    #[test]
    fn add_appends_with_timestamp() {
        let before = Utc::now();
        let (list, ids) = list_of(&["first", "second"]);
        assert_eq!(titles(&list), ["first", "second"]);
        assert_eq!(list.position(ids[1]), Some(1));
        let update = &list.get(ids[0]).unwrap().update;
        assert!(update.content_published_at >= before);
        assert!(!update.is_key);
    }

    #[test]
    fn move_swaps_only_the_neighbours() {
        let (mut list, ids) = list_of(&["a", "b", "c", "d"]);
        assert!(list.move_update(ids[2], Direction::Up));
        assert_eq!(titles(&list), ["a", "c", "b", "d"]);
        assert!(list.move_update(ids[0], Direction::Down));
        assert_eq!(titles(&list), ["c", "a", "b", "d"]);
    }

    #[test]
    fn moves_past_the_ends_are_noops() {
        let (mut list, ids) = list_of(&["a", "b", "c"]);
        let before = list.clone();
        assert!(!list.move_update(ids[0], Direction::Up));
        assert!(!list.move_update(ids[2], Direction::Down));
        assert!(!list.move_update(Uuid::new_v4(), Direction::Up));
        assert_eq!(list, before);
    }

    #[test]
    fn remove_keeps_relative_order_and_timestamps() {
        let (mut list, ids) = list_of(&["a", "b", "c", "d"]);
        let stamp_d = list.get(ids[3]).unwrap().update.content_published_at;
        assert!(list.remove(ids[1]));
        assert!(!list.remove(ids[1]));
        assert_eq!(titles(&list), ["a", "c", "d"]);
        assert_eq!(list.get(ids[3]).unwrap().update.content_published_at, stamp_d);
    }

    #[test]
    fn mixed_operations_preserve_untouched_order() {
        let (mut list, ids) = list_of(&["a", "b", "c", "d", "e"]);
        list.remove(ids[0]);
        list.move_update(ids[3], Direction::Up); // b c d e -> b d c e
        let f = list.add(UpdateDraft::new("f", "<p>f</p>")).unwrap();
        list.move_update(f, Direction::Down); // already last
        assert_eq!(titles(&list), ["b", "d", "c", "e", "f"]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Remove(usize),
        Up(usize),
        Down(usize),
        ToggleKey(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Add),
            (0usize..16).prop_map(Op::Remove),
            (0usize..16).prop_map(Op::Up),
            (0usize..16).prop_map(Op::Down),
            (0usize..16).prop_map(Op::ToggleKey),
        ]
    }

    fn ids(list: &LiveUpdateList) -> Vec<Uuid> {
        list.entries().iter().map(|e| e.id).collect()
    }

    fn pick(seed: usize, len: usize) -> Option<usize> {
        (len > 0).then(|| seed % len)
    }

    proptest! {
        #[test]
        fn any_operation_sequence_matches_a_plain_vec(ops in prop::collection::vec(op(), 1..40)) {
            let (mut list, mut expected) = list_of(&["a", "b", "c"]);

            for op in ops {
                match op {
                    Op::Add => {
                        let id = list.add(UpdateDraft::new("n", "<p>n</p>")).unwrap();
                        expected.push(id);
                    }
                    Op::Remove(seed) => {
                        if let Some(i) = pick(seed, expected.len()) {
                            prop_assert!(list.remove(expected[i]));
                            expected.remove(i);
                        }
                    }
                    Op::Up(seed) => {
                        if let Some(i) = pick(seed, expected.len()) {
                            prop_assert_eq!(list.move_update(expected[i], Direction::Up), i > 0);
                            if i > 0 {
                                expected.swap(i, i - 1);
                            }
                        }
                    }
                    Op::Down(seed) => {
                        if let Some(i) = pick(seed, expected.len()) {
                            let last = i + 1 == expected.len();
                            prop_assert_eq!(list.move_update(expected[i], Direction::Down), !last);
                            if !last {
                                expected.swap(i, i + 1);
                            }
                        }
                    }
                    Op::ToggleKey(seed) => {
                        if let Some(i) = pick(seed, expected.len()) {
                            prop_assert!(list.toggle_key(expected[i]).is_some());
                        }
                    }
                }
                prop_assert_eq!(ids(&list), expected.clone());
            }

            let key_count = list.entries().iter().filter(|e| e.update.is_key).count();
            let submission = list.to_submission().unwrap();
            let sent: Vec<LiveUpdate> = serde_json::from_str(&submission.key_events).unwrap();
            prop_assert_eq!(sent.len(), key_count);
        }
    }

    #[test]
    fn toggle_key_does_not_move_entry() {
        let (mut list, ids) = list_of(&["a", "b"]);
        assert_eq!(list.toggle_key(ids[1]), Some(true));
        assert_eq!(list.position(ids[1]), Some(1));
        assert_eq!(list.toggle_key(ids[1]), Some(false));
        assert_eq!(list.toggle_key(Uuid::new_v4()), None);
    }

    #[test]
    fn edit_keeps_key_marker_and_position() {
        let (mut list, ids) = list_of(&["a", "b"]);
        list.toggle_key(ids[0]);
        assert!(list
            .edit(ids[0], UpdateDraft::new("a2", "<p>new</p>"))
            .unwrap());
        let entry = list.get(ids[0]).unwrap();
        assert_eq!(entry.update.content_title, "a2");
        assert!(entry.update.is_key);
        assert!(list.edit(ids[0], UpdateDraft::new("", "x")).is_err());
        assert!(!list
            .edit(Uuid::new_v4(), UpdateDraft::new("x", "y"))
            .unwrap());
    }

    #[test]
    fn key_events_always_match_filtered_content() {
        let (mut list, ids) = list_of(&["a", "b", "c", "d"]);
        list.toggle_key(ids[1]);
        list.toggle_key(ids[3]);
        list.move_update(ids[3], Direction::Up);
        list.remove(ids[0]);

        let submission = list.to_submission().unwrap();
        let content: Vec<LiveUpdate> = serde_json::from_str(&submission.content).unwrap();
        let key_events: Vec<LiveUpdate> = serde_json::from_str(&submission.key_events).unwrap();
        let expected: Vec<LiveUpdate> = content.iter().filter(|u| u.is_key).cloned().collect();
        assert_eq!(key_events, expected);
        assert_eq!(key_events.len(), 2);
        assert_eq!(content.len(), 3);
    }

    #[test]
    fn local_ids_are_not_serialized() {
        let (list, _) = list_of(&["a"]);
        let submission = list.to_submission().unwrap();
        assert!(!submission.content.contains("\"id\""));
    }

    #[test]
    fn seeding_from_persisted_updates_keeps_order() {
        let (list, _) = list_of(&["x", "y"]);
        let seeded = LiveUpdateList::from_updates(list.updates());
        assert_eq!(titles(&seeded), ["x", "y"]);
        assert_eq!(seeded.updates(), list.updates());
    }
}
