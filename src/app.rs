use std::time::Duration;

use uuid::Uuid;

use crate::api::ContentApi;
use crate::editor::EditorHandle;
use crate::error::{AppError, Result};
use crate::forms::{ArticleForm, Direction, LiveEntry, UpdateDraft};
use crate::store::AppState;
use crate::tui::EditorAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Description,
    Detail,
}

impl DraftField {
    fn next(self) -> Self {
        match self {
            DraftField::Title => DraftField::Description,
            DraftField::Description => DraftField::Detail,
            DraftField::Detail => DraftField::Title,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DraftField::Title => "Title",
            DraftField::Description => "Description",
            DraftField::Detail => "Details",
        }
    }
}

/// Interactive editor for the updates of one live article.
pub struct LiveEditorApp {
    // Data
    pub form: ArticleForm,

    // UI State
    pub selected_index: usize,
    pub show_help: bool,
    pub draft_field: Option<DraftField>,
    pub draft_title: String,
    pub draft_description: String,
    /// Rich-text detail of the update being written
    pub editor: EditorHandle,
    /// Entry being edited, None when composing a new one
    pub editing: Option<Uuid>,
    pub status: String,
    pub is_submitting: bool,

    ready_timeout: Duration,
}

impl LiveEditorApp {
    pub fn new(form: ArticleForm, editor: EditorHandle, ready_timeout: Duration) -> Self {
        let status = if form.is_edit() {
            format!("Editing \"{}\"", form.title)
        } else {
            format!("New live article \"{}\"", form.title)
        };
        Self {
            form,
            selected_index: 0,
            show_help: false,
            draft_field: None,
            draft_title: String::new(),
            draft_description: String::new(),
            editor,
            editing: None,
            status,
            is_submitting: false,
            ready_timeout,
        }
    }

    pub fn draft_active(&self) -> bool {
        self.draft_field.is_some()
    }

    pub fn entries(&self) -> &[LiveEntry] {
        self.form.updates.entries()
    }

    pub fn selected_entry(&self) -> Option<&LiveEntry> {
        self.entries().get(self.selected_index)
    }

    fn selected_id(&self) -> Option<Uuid> {
        self.selected_entry().map(|e| e.id)
    }

    fn select(&mut self, id: Uuid) {
        if let Some(index) = self.form.updates.position(id) {
            self.selected_index = index;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.entries().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    pub async fn handle_action<A>(
        &mut self,
        action: EditorAction,
        state: &mut AppState,
        api: &A,
    ) -> Result<bool>
    where
        A: ContentApi + ?Sized,
    {
        match action {
            EditorAction::Quit => return Ok(true),

            EditorAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            EditorAction::MoveDown => {
                let len = self.entries().len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            EditorAction::MoveToTop => self.selected_index = 0,

            EditorAction::MoveToBottom => {
                self.selected_index = self.entries().len().saturating_sub(1);
            }

            EditorAction::NewUpdate => {
                self.editing = None;
                self.draft_title.clear();
                self.draft_description.clear();
                self.editor.clear();
                self.draft_field = Some(DraftField::Title);
                self.status = "New update: Tab switches field, Enter adds".to_string();
            }

            EditorAction::EditUpdate => self.start_edit().await,

            EditorAction::RemoveUpdate => {
                if let Some(id) = self.selected_id() {
                    if self.form.updates.remove(id) {
                        self.clamp_selection();
                        self.status = format!("Removed update ({} left)", self.entries().len());
                    }
                }
            }

            EditorAction::ShiftUpdateUp => self.shift(Direction::Up),
            EditorAction::ShiftUpdateDown => self.shift(Direction::Down),

            EditorAction::ToggleKey => {
                if let Some(id) = self.selected_id() {
                    if let Some(is_key) = self.form.updates.toggle_key(id) {
                        self.status = if is_key {
                            "Marked as key event".to_string()
                        } else {
                            "Unmarked key event".to_string()
                        };
                    }
                }
            }

            EditorAction::Submit => self.submit(state, api).await,

            EditorAction::ShowHelp => self.show_help = true,
            EditorAction::HideHelp => self.show_help = false,

            EditorAction::DraftChar(c) => match self.draft_field {
                Some(DraftField::Title) => self.draft_title.push(c),
                Some(DraftField::Description) => self.draft_description.push(c),
                Some(DraftField::Detail) => self.editor.push(c),
                None => {}
            },

            EditorAction::DraftNewline => {
                if self.draft_field == Some(DraftField::Detail) {
                    self.editor.push('\n');
                }
            }

            EditorAction::DraftBackspace => match self.draft_field {
                Some(DraftField::Title) => {
                    self.draft_title.pop();
                }
                Some(DraftField::Description) => {
                    self.draft_description.pop();
                }
                Some(DraftField::Detail) => self.editor.pop(),
                None => {}
            },

            EditorAction::DraftNextField => {
                self.draft_field = self.draft_field.map(DraftField::next);
            }

            EditorAction::DraftConfirm => self.confirm_draft(),

            EditorAction::DraftCancel => {
                self.draft_field = None;
                self.editing = None;
                self.editor.clear();
                self.status = "Draft discarded".to_string();
            }
        }

        Ok(false)
    }

    async fn start_edit(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };
        self.draft_title = entry.update.content_title.clone();
        self.draft_description = entry.update.content_description.clone();
        if !self
            .editor
            .load(&entry.update.content_detail, self.ready_timeout)
            .await
        {
            self.status = "Editor is not ready yet, try again".to_string();
            return;
        }
        self.editing = Some(entry.id);
        self.draft_field = Some(DraftField::Title);
        self.status = "Editing update: Enter saves, Esc cancels".to_string();
    }

    fn shift(&mut self, direction: Direction) {
        if let Some(id) = self.selected_id() {
            if self.form.updates.move_update(id, direction) {
                self.select(id);
            }
        }
    }

    fn confirm_draft(&mut self) {
        let draft = UpdateDraft {
            title: self.draft_title.clone(),
            description: self.draft_description.clone(),
            detail: self.editor.content().to_string(),
            image: None,
        };
        if self.editing.is_none() && draft.is_blank() {
            self.draft_field = None;
            self.status = "Nothing to add".to_string();
            return;
        }
        let result = match self.editing {
            Some(id) => self.form.updates.edit(id, draft).map(|_| id),
            None => self.form.updates.add(draft),
        };
        match result {
            Ok(id) => {
                self.select(id);
                self.status = if self.editing.is_some() {
                    "Update saved".to_string()
                } else {
                    format!("Added update #{}", self.entries().len())
                };
                self.form.errors.clear_field("content");
                self.draft_field = None;
                self.editing = None;
                self.draft_title.clear();
                self.draft_description.clear();
                self.editor.clear();
            }
            // the draft stays open so it can be corrected
            Err(e) => self.status = describe(&e),
        }
    }

    async fn submit<A>(&mut self, state: &mut AppState, api: &A)
    where
        A: ContentApi + ?Sized,
    {
        if self.draft_active() {
            self.status = "Finish or discard the open update first".to_string();
            return;
        }
        self.is_submitting = true;
        let result = state.save_article(api, &mut self.form).await;
        self.is_submitting = false;
        match result {
            Ok(article) => {
                let brand = self.form.brand;
                let selected = self.selected_index;
                self.form = ArticleForm::from_article(brand, &article);
                self.selected_index = selected;
                self.clamp_selection();
                self.status = format!(
                    "Saved \"{}\" with {} updates ({} key)",
                    article.title,
                    article.content.updates().len(),
                    article.key_events.len()
                );
            }
            Err(e) => {
                tracing::warn!("Live article submission failed: {}", e);
                self.status = describe(&e);
            }
        }
    }
}

fn describe(err: &AppError) -> String {
    match err.field_errors() {
        Some(errors) if !errors.is_empty() => errors.to_string(),
        _ => format!("Error: {err}"),
    }
}
