//! In-memory backend for tests. Records every call by endpoint name and can
//! be told to fail any endpoint.

use crate::api::types::{RawAttempt, RawNote, RawUser};
use crate::api::{Backend, QuizPayload};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<String>,
    failing: HashSet<&'static str>,
    session_user: Option<RawUser>,
    notes: Vec<RawNote>,
    transcripts: Vec<RawNote>,
    quiz: Option<QuizPayload>,
    analysis: HashMap<String, Vec<RawAttempt>>,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

pub fn raw_user(name: &str, email: &str) -> RawUser {
    RawUser {
        id: "user-1".to_string(),
        name: name.to_string(),
        email: email.to_string(),
    }
}

pub fn raw_note(id: &str, title: &str, content: &str, created_at: &str) -> RawNote {
    RawNote {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        kind: None,
        created_at: created_at.parse().unwrap(),
    }
}

pub fn raw_attempt(score: f64, created_at: &str) -> RawAttempt {
    RawAttempt {
        score,
        created_at: created_at.parse().unwrap(),
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, user: RawUser) -> Self {
        self.state.lock().unwrap().session_user = Some(user);
        self
    }

    pub fn with_notes(self, notes: Vec<RawNote>) -> Self {
        self.state.lock().unwrap().notes = notes;
        self
    }

    pub fn with_transcripts(self, transcripts: Vec<RawNote>) -> Self {
        self.state.lock().unwrap().transcripts = transcripts;
        self
    }

    pub fn with_quiz(self, quiz: QuizPayload) -> Self {
        self.state.lock().unwrap().quiz = Some(quiz);
        self
    }

    pub fn with_analysis(self, title: &str, attempts: Vec<RawAttempt>) -> Self {
        self.state
            .lock()
            .unwrap()
            .analysis
            .insert(title.to_string(), attempts);
        self
    }

    pub fn failing(self, endpoint: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(endpoint);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.split(':').next() == Some(endpoint))
            .count()
    }

    /// Record the call and fail if the endpoint was marked as failing.
    fn record(&self, endpoint: &'static str, detail: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if detail.is_empty() {
            state.calls.push(endpoint.to_string());
        } else {
            state.calls.push(format!("{}:{}", endpoint, detail));
        }
        if state.failing.contains(endpoint) {
            return Err(AppError::Http {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn verify(&self) -> Result<RawUser> {
        self.record("verify", "")?;
        self.state
            .lock()
            .unwrap()
            .session_user
            .clone()
            .ok_or_else(|| AppError::Http {
                status: 401,
                message: "Unauthorized".to_string(),
            })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<RawUser> {
        self.record("sign_in", email)?;
        if password == "wrong" {
            return Err(AppError::Http {
                status: 401,
                message: "Invalid credentials".to_string(),
            });
        }
        Ok(raw_user("Sam Student", email))
    }

    async fn sign_up(&self, _name: &str, email: &str, _password: &str) -> Result<String> {
        self.record("sign_up", email)?;
        Ok("OTP sent to your email".to_string())
    }

    async fn verify_sign_up(&self, email: &str, otp: &str) -> Result<Option<RawUser>> {
        self.record("verify_sign_up", otp)?;
        if otp != "123456" {
            return Err(AppError::Application("Invalid OTP".to_string()));
        }
        Ok(Some(raw_user("Sam Student", email)))
    }

    async fn sign_out(&self) -> Result<()> {
        self.record("sign_out", "")
    }

    async fn forgot_password(&self, email: &str) -> Result<String> {
        self.record("forgot_password", email)?;
        Ok("Password reset OTP sent".to_string())
    }

    async fn reset_password(&self, email: &str, _otp: &str, _new_password: &str) -> Result<String> {
        self.record("reset_password", email)?;
        Ok("Password reset successfully".to_string())
    }

    async fn get_notes(&self) -> Result<Vec<RawNote>> {
        self.record("get_notes", "")?;
        Ok(self.state.lock().unwrap().notes.clone())
    }

    async fn get_transcribed_notes(&self) -> Result<Vec<RawNote>> {
        self.record("get_transcribed_notes", "")?;
        Ok(self.state.lock().unwrap().transcripts.clone())
    }

    async fn save_note(&self, title: &str, _content: &str) -> Result<String> {
        self.record("save_note", title)?;
        Ok("Note saved".to_string())
    }

    async fn save_transcript(&self, title: &str, _content: &str) -> Result<String> {
        self.record("save_transcript", title)?;
        Ok("Transcript saved".to_string())
    }

    async fn update_note(&self, note_id: &str, _title: &str, _content: &str) -> Result<String> {
        self.record("update_note", note_id)?;
        Ok("Note updated".to_string())
    }

    async fn delete_note(&self, title: &str) -> Result<String> {
        self.record("delete_note", title)?;
        Ok("Note deleted".to_string())
    }

    async fn get_quiz(&self, title: &str, _question_count: u32) -> Result<QuizPayload> {
        self.record("get_quiz", title)?;
        self.state
            .lock()
            .unwrap()
            .quiz
            .clone()
            .ok_or_else(|| AppError::Application("Failed to generate quiz".to_string()))
    }

    async fn submit_score(&self, title: &str, score: u8) -> Result<()> {
        self.record("submit_score", &format!("{}={}", title, score))
    }

    async fn quiz_analysis(&self, title: &str) -> Result<Vec<RawAttempt>> {
        self.record("quiz_analysis", title)?;
        // Titles starting with "broken" fail, to exercise partial failures.
        if title.starts_with("broken") {
            return Err(AppError::Application("analysis failed".to_string()));
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .analysis
            .get(title)
            .cloned()
            .unwrap_or_default())
    }
}
