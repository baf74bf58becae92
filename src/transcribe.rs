//! Lecture capture. Speech recognition happens outside this program; while
//! the recorder is listening, dictated (typed or pasted) text is appended to
//! the running transcript.

use crate::api::Backend;
use crate::error::{AppError, Result};
use crate::models::{NoteDraft, Transcript};
use crate::notes::prepare_draft;
use crate::pagination::{Pagination, TRANSCRIPTS_PER_PAGE};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
}

#[derive(Debug, Clone)]
pub struct Recorder {
    state: RecorderState,
    transcript: String,
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            transcript: String::new(),
            accumulated: Duration::ZERO,
            running_since: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Start a fresh recording; any previous transcript and time are dropped.
    pub fn start(&mut self) {
        self.transcript.clear();
        self.accumulated = Duration::ZERO;
        self.running_since = Some(Instant::now());
        self.state = RecorderState::Recording;
    }

    pub fn pause(&mut self) {
        if self.state == RecorderState::Recording {
            self.bank_running_time();
            self.state = RecorderState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == RecorderState::Paused {
            self.running_since = Some(Instant::now());
            self.state = RecorderState::Recording;
        }
    }

    pub fn stop(&mut self) {
        self.bank_running_time();
        self.state = RecorderState::Idle;
    }

    fn bank_running_time(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.running_since.map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// Elapsed recording time as MM:SS.
    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.elapsed())
    }

    /// Add dictated text. Ignored unless recording.
    pub fn dictate(&mut self, text: &str) -> bool {
        if !self.is_listening() {
            return false;
        }
        self.transcript.push_str(text);
        true
    }

    pub fn backspace(&mut self) {
        if self.is_listening() {
            self.transcript.pop();
        }
    }

    /// Clear transcript and timer after a save or on "clear all".
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Checks done before a transcript is sent.
pub fn validate_transcript(title: &str, content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("No transcript to save".to_string()));
    }
    if title.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter a title for your transcript".to_string(),
        ));
    }
    Ok(())
}

pub async fn save_transcript(backend: &dyn Backend, title: &str, content: &str) -> Result<String> {
    validate_transcript(title, content)?;
    backend.save_transcript(title.trim(), content).await?;
    Ok("Transcript saved successfully!".to_string())
}

/// Saved transcripts, newest first.
pub async fn load_transcripts(backend: &dyn Backend) -> Result<Vec<Transcript>> {
    let mut transcripts: Vec<Transcript> = backend
        .get_transcribed_notes()
        .await?
        .into_iter()
        .map(Transcript::from)
        .collect();
    transcripts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(transcripts)
}

pub async fn update_transcript(backend: &dyn Backend, id: &str, draft: &NoteDraft) -> Result<String> {
    let draft = prepare_draft(draft)?;
    backend.update_note(id, &draft.title, &draft.content).await?;
    Ok("Transcript updated successfully!".to_string())
}

pub async fn delete_transcript(backend: &dyn Backend, title: &str) -> Result<String> {
    backend.delete_note(title).await?;
    Ok(format!("\"{}\" deleted successfully!", title))
}

/// Saved transcripts list with paging and selection.
#[derive(Debug, Clone, Default)]
pub struct TranscriptShelf {
    items: Vec<Transcript>,
    page: usize,
    selected: usize,
}

impl TranscriptShelf {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            selected: 0,
        }
    }

    pub fn set_items(&mut self, items: Vec<Transcript>) {
        self.items = items;
        self.page = self.pagination().current_page();
        let visible = self.visible().len();
        if self.selected >= visible {
            self.selected = visible.saturating_sub(1);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.items.len(), TRANSCRIPTS_PER_PAGE)
    }

    pub fn visible(&self) -> &[Transcript] {
        self.pagination().slice(&self.items)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Transcript> {
        self.visible().get(self.selected)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{raw_note, MockBackend};

    #[tokio::test(start_paused = true)]
    async fn test_recorder_timer_excludes_pauses() {
        let mut recorder = Recorder::new();
        recorder.start();
        tokio::time::advance(Duration::from_secs(65)).await;
        recorder.pause();
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(recorder.elapsed_label(), "01:05");

        recorder.resume();
        tokio::time::advance(Duration::from_secs(5)).await;
        recorder.stop();
        tokio::time::advance(Duration::from_secs(100)).await;
        assert_eq!(recorder.elapsed_label(), "01:10");
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_resets_previous_recording() {
        let mut recorder = Recorder::new();
        recorder.start();
        recorder.dictate("first lecture");
        tokio::time::advance(Duration::from_secs(10)).await;
        recorder.stop();

        recorder.start();
        assert_eq!(recorder.transcript(), "");
        assert_eq!(recorder.elapsed_label(), "00:00");
    }

    #[test]
    fn test_dictation_only_while_recording() {
        let mut recorder = Recorder::new();
        assert!(!recorder.dictate("ignored"));
        recorder.start();
        assert!(recorder.dictate("Osmosis moves water"));
        recorder.pause();
        assert!(!recorder.dictate(" more"));
        assert_eq!(recorder.transcript(), "Osmosis moves water");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00");
        assert_eq!(format_elapsed(Duration::from_secs(3599)), "59:59");
        assert_eq!(format_elapsed(Duration::from_secs(3600)), "60:00");
    }

    #[tokio::test]
    async fn test_save_validation_order() {
        let backend = MockBackend::new();
        let err = save_transcript(&backend, "", "  ").await.unwrap_err();
        assert_eq!(err.to_string(), "No transcript to save");
        let err = save_transcript(&backend, " ", "words").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a title for your transcript");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_trims_title() {
        let backend = MockBackend::new();
        save_transcript(&backend, "  Lecture 4 ", "words").await.unwrap();
        assert_eq!(backend.calls(), vec!["save_transcript:Lecture 4"]);
    }

    #[tokio::test]
    async fn test_shelf_pages_by_three() {
        let backend = MockBackend::new().with_transcripts(
            (1..=7)
                .map(|i| {
                    raw_note(
                        &i.to_string(),
                        &format!("Lecture {}", i),
                        "text",
                        &format!("2024-01-0{}T00:00:00Z", i),
                    )
                })
                .collect(),
        );
        let mut shelf = TranscriptShelf::new();
        shelf.set_items(load_transcripts(&backend).await.unwrap());

        assert_eq!(shelf.pagination().total_pages(), 3);
        assert_eq!(shelf.visible()[0].title, "Lecture 7");
        shelf.next_page();
        shelf.next_page();
        assert_eq!(shelf.visible().len(), 1);
        assert_eq!(shelf.selected().map(|t| t.title.as_str()), Some("Lecture 1"));
    }
}
