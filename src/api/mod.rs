pub mod client;
#[cfg(test)]
pub mod mock;
pub mod types;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use types::{RawAttempt, RawNote, RawUser};

pub use client::ApiClient;

/// Raw quiz as returned by the generator: either already a list of loosely
/// shaped question objects, or a string holding JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizPayload {
    Questions(Vec<Value>),
    Text(String),
}

/// Every backend endpoint the client consumes. All calls share one
/// cookie-bearing session.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn verify(&self) -> Result<RawUser>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<RawUser>;
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<String>;
    async fn verify_sign_up(&self, email: &str, otp: &str) -> Result<Option<RawUser>>;
    async fn sign_out(&self) -> Result<()>;
    async fn forgot_password(&self, email: &str) -> Result<String>;
    async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> Result<String>;

    async fn get_notes(&self) -> Result<Vec<RawNote>>;
    async fn get_transcribed_notes(&self) -> Result<Vec<RawNote>>;
    async fn save_note(&self, title: &str, content: &str) -> Result<String>;
    async fn save_transcript(&self, title: &str, content: &str) -> Result<String>;
    async fn update_note(&self, note_id: &str, title: &str, content: &str) -> Result<String>;
    async fn delete_note(&self, title: &str) -> Result<String>;

    async fn get_quiz(&self, title: &str, question_count: u32) -> Result<QuizPayload>;
    async fn submit_score(&self, title: &str, score: u8) -> Result<()>;
    async fn quiz_analysis(&self, title: &str) -> Result<Vec<RawAttempt>>;
}
