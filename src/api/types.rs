//! Wire shapes of the StuNotes backend. Fields the backend may omit are
//! defaulted so a partial body still decodes.

use crate::models::{Note, NoteKind, QuizResult, Transcript, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Ids arrive as Mongo object-id strings or plain numbers.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUser {
    #[serde(default, alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        User::new(raw.id, raw.name, raw.email)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNote {
    #[serde(rename = "_id", default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: DateTime<Utc>,
}

impl From<RawNote> for Note {
    fn from(raw: RawNote) -> Self {
        Note {
            date: raw.created_at.format("%Y-%m-%d").to_string(),
            kind: NoteKind::from_wire(raw.kind.as_deref()),
            id: raw.id,
            title: raw.title,
            content: raw.content,
            created_at: raw.created_at,
        }
    }
}

impl From<RawNote> for Transcript {
    fn from(raw: RawNote) -> Self {
        Transcript {
            id: raw.id,
            title: raw.title,
            content: raw.content,
            created_at: raw.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttempt {
    #[serde(default)]
    pub score: f64,
    #[serde(rename = "createdAt", default)]
    pub created_at: DateTime<Utc>,
}

impl RawAttempt {
    pub fn into_result(self, title: &str) -> QuizResult {
        QuizResult {
            title: title.to_string(),
            score: self.score.round().clamp(0.0, 100.0) as u8,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub notes: Option<Vec<RawNote>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuizResponse {
    #[serde(default)]
    pub quiz: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub quizzes: Option<Vec<RawAttempt>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct OtpVerification<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EmailOnly<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset<'a> {
    pub email: &'a str,
    pub otp: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct NoteBody<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate<'a> {
    pub note_id: &'a str,
    pub title: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest<'a> {
    pub title: &'a str,
    pub question_count: u32,
}

#[derive(Debug, Serialize)]
pub struct ScoreBody<'a> {
    pub title: &'a str,
    pub score: u8,
}

#[derive(Debug, Serialize)]
pub struct TitleOnly<'a> {
    pub title: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_note_into_note() {
        let raw: RawNote = serde_json::from_str(
            r##"{"_id":"abc123","title":"Cells","content":"# Mitosis","createdAt":"2024-03-05T10:20:30.000Z"}"##,
        )
        .unwrap();
        let note: Note = raw.into();
        assert_eq!(note.id, "abc123");
        assert_eq!(note.date, "2024-03-05");
        assert_eq!(note.kind, NoteKind::Manual);
    }

    #[test]
    fn test_numeric_user_id_accepted() {
        let raw: RawUser =
            serde_json::from_str(r#"{"id":42,"name":"Sam","email":"sam@example.com"}"#).unwrap();
        assert_eq!(raw.id, "42");
    }

    #[test]
    fn test_attempt_score_is_clamped() {
        let raw: RawAttempt =
            serde_json::from_str(r#"{"score":104.6,"createdAt":"2024-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(raw.into_result("Cells").score, 100);
    }

    #[test]
    fn test_request_bodies_use_camel_case() {
        let body = serde_json::to_value(QuizRequest {
            title: "Cells",
            question_count: 10,
        })
        .unwrap();
        assert_eq!(body["questionCount"], 10);

        let body = serde_json::to_value(NoteUpdate {
            note_id: "1",
            title: "t",
            content: "c",
        })
        .unwrap();
        assert_eq!(body["noteId"], "1");

        let body = serde_json::to_value(PasswordReset {
            email: "a@b.co",
            otp: "123456",
            new_password: "Secret123",
        })
        .unwrap();
        assert_eq!(body["newPassword"], "Secret123");
    }
}
