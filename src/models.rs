use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/initials/svg?seed=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Note,
    Transcript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSource {
    pub kind: SourceKind,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<Question>,
    pub source: Option<QuizSource>,
}

/// Selected option per question id. Missing ids are unanswered.
pub type AnswerMap = BTreeMap<u32, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Manual,
    Transcribed,
}

impl NoteKind {
    pub fn from_wire(kind: Option<&str>) -> Self {
        match kind {
            Some("transcribed") => NoteKind::Transcribed,
            _ => NoteKind::Manual,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NoteKind::Manual => "manual",
            NoteKind::Transcribed => "transcribed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub kind: NoteKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub title: String,
    pub score: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl User {
    pub fn new(id: String, name: String, email: String) -> Self {
        let avatar = format!("{}{}", AVATAR_BASE_URL, name);
        Self {
            id,
            name,
            email,
            avatar,
        }
    }

    /// Up to two uppercase initials, for the header badge.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(|c| c.to_uppercase())
            .collect()
    }
}

/// Registration data held between sign-up and OTP verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSignup {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Loading,
    SignIn,
    SignUp,
    VerifyEmail,
    ForgotPassword,
    ResetPassword,
    Home,
    Notes,
    NoteView,
    NoteEditor,
    DeleteConfirm,
    Transcribe,
    Quizzes,
    Quiz,
    QuizResults,
    Analytics,
    QuitConfirm,
}

impl AppState {
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            AppState::Loading
                | AppState::SignIn
                | AppState::SignUp
                | AppState::VerifyEmail
                | AppState::ForgotPassword
                | AppState::ResetPassword
                | AppState::QuitConfirm
        )
    }
}
