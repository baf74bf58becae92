use crate::api::Backend;
use crate::error::{AppError, Result};
use crate::models::{Note, NoteDraft};
use crate::pagination::{Pagination, NOTES_PER_PAGE};
use crate::validation::validate_note;
use std::time::Duration;
use tokio::time::Instant;

/// Drops a submission while another is in flight or within `cooldown` of the
/// last accepted one.
#[derive(Debug, Clone)]
pub struct SubmitGuard {
    cooldown: Duration,
    in_progress: bool,
    last_accepted: Option<Instant>,
}

impl SubmitGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            in_progress: false,
            last_accepted: None,
        }
    }

    pub fn try_begin(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.in_progress = true;
        self.last_accepted = Some(Instant::now());
        true
    }

    pub fn finish(&mut self) {
        self.in_progress = false;
    }

    pub fn is_busy(&self) -> bool {
        self.in_progress
            || self
                .last_accepted
                .is_some_and(|at| at.elapsed() < self.cooldown)
    }
}

/// Validated draft with surrounding whitespace removed from the title.
pub fn prepare_draft(draft: &NoteDraft) -> Result<NoteDraft> {
    if !validate_note(&draft.title, &draft.content).is_empty() {
        return Err(AppError::Validation(
            "Please provide both title and content".to_string(),
        ));
    }
    Ok(NoteDraft {
        title: draft.title.trim().to_string(),
        content: draft.content.clone(),
    })
}

/// The user's notes, newest first.
pub async fn load_notes(backend: &dyn Backend) -> Result<Vec<Note>> {
    let mut notes: Vec<Note> = backend
        .get_notes()
        .await?
        .into_iter()
        .map(Note::from)
        .collect();
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(notes)
}

pub async fn create_note(backend: &dyn Backend, draft: &NoteDraft) -> Result<String> {
    backend.save_note(&draft.title, &draft.content).await?;
    Ok("Note created successfully!".to_string())
}

pub async fn update_note(backend: &dyn Backend, note_id: &str, draft: &NoteDraft) -> Result<String> {
    let draft = prepare_draft(draft)?;
    backend
        .update_note(note_id, &draft.title, &draft.content)
        .await?;
    Ok("Note updated successfully!".to_string())
}

pub async fn delete_note(backend: &dyn Backend, title: &str) -> Result<String> {
    backend.delete_note(title).await?;
    Ok(format!("\"{}\" deleted successfully!", title))
}

/// Notes screen state: the loaded list, search filter, page and the create
/// guard.
#[derive(Debug, Clone)]
pub struct NoteBook {
    notes: Vec<Note>,
    query: String,
    page: usize,
    selected: usize,
    guard: SubmitGuard,
}

impl NoteBook {
    pub fn new(submit_cooldown: Duration) -> Self {
        Self {
            notes: Vec::new(),
            query: String::new(),
            page: 1,
            selected: 0,
            guard: SubmitGuard::new(submit_cooldown),
        }
    }

    pub fn set_notes(&mut self, notes: Vec<Note>) {
        self.notes = notes;
        self.clamp_selection();
    }

    pub fn all(&self) -> &[Note] {
        &self.notes
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Changing the search always goes back to the first page.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.page = 1;
        self.selected = 0;
    }

    pub fn filtered(&self) -> Vec<&Note> {
        let needle = self.query.to_lowercase();
        self.notes
            .iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&needle)
                    || note.content.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.filtered().len(), NOTES_PER_PAGE)
    }

    pub fn visible(&self) -> Vec<&Note> {
        let filtered = self.filtered();
        self.pagination().slice(&filtered).to_vec()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Note> {
        self.visible().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible().len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        self.page = self.pagination().next().current_page();
        self.selected = 0;
    }

    pub fn previous_page(&mut self) {
        self.page = self.pagination().previous().current_page();
        self.selected = 0;
    }

    fn clamp_selection(&mut self) {
        self.page = self.pagination().current_page();
        let visible = self.visible().len();
        if self.selected >= visible {
            self.selected = visible.saturating_sub(1);
        }
    }

    /// Validate `draft` and claim the submit guard. `Ok(None)` means the
    /// submission was a duplicate and must be dropped.
    pub fn begin_create(&mut self, draft: &NoteDraft) -> Result<Option<NoteDraft>> {
        let prepared = prepare_draft(draft)?;
        if !self.guard.try_begin() {
            return Ok(None);
        }
        Ok(Some(prepared))
    }

    pub fn finish_create(&mut self) {
        self.guard.finish();
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_busy()
    }
}
