use crate::api::types::*;
use crate::api::{Backend, QuizPayload};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::logger;
use crate::utils::truncate_string;
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

fn require_success(success: bool, message: Option<String>, fallback: &str) -> Result<String> {
    if success {
        Ok(message.unwrap_or_default())
    } else {
        Err(AppError::Application(
            message.unwrap_or_else(|| fallback.to_string()),
        ))
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<StatusResponse>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| truncate_string(text.trim(), MAX_ERROR_BODY));
        logger::warn(&format!("Backend returned {}: {}", status, message));
        return Err(AppError::Http {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&text)
        .map_err(|e| AppError::Parse(format!("unexpected response from backend: {}", e)))
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL with the title appended as one percent-encoded path segment.
    fn title_url(&self, path: &str, title: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| AppError::Config(format!("invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("backend URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(title);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http.get(self.url(path)).send().await?;
        read_json(response).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, body).await
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn verify(&self) -> Result<RawUser> {
        let body: UserResponse = self.get("/api/auth/verify").await?;
        match body.user {
            Some(user) if body.success => Ok(user),
            _ => Err(AppError::Application(
                body.message
                    .unwrap_or_else(|| "No existing session found".to_string()),
            )),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<RawUser> {
        let body: UserResponse = self
            .post("/api/auth/signIn", &Credentials { email, password })
            .await?;
        body.user.ok_or_else(|| {
            AppError::Application(body.message.unwrap_or_else(|| "Sign in failed".to_string()))
        })
    }

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<String> {
        let body: StatusResponse = self
            .post(
                "/api/auth/signUp",
                &Registration {
                    name,
                    email,
                    password,
                },
            )
            .await?;
        require_success(body.success, body.message, "Failed to send OTP")
    }

    async fn verify_sign_up(&self, email: &str, otp: &str) -> Result<Option<RawUser>> {
        let body: UserResponse = self
            .post("/api/auth/verifySignUp", &OtpVerification { email, otp })
            .await?;
        if !body.success {
            return Err(AppError::Application(
                body.message
                    .unwrap_or_else(|| "OTP verification failed".to_string()),
            ));
        }
        Ok(body.user)
    }

    async fn sign_out(&self) -> Result<()> {
        let response = self.http.get(self.url("/api/auth/signOut")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
                message: String::new(),
            });
        }
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<String> {
        let body: StatusResponse = self
            .post("/api/auth/forgotPassword", &EmailOnly { email })
            .await?;
        require_success(body.success, body.message, "Failed to send reset code")
    }

    async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> Result<String> {
        let body: StatusResponse = self
            .post(
                "/api/auth/resetPassword",
                &PasswordReset {
                    email,
                    otp,
                    new_password,
                },
            )
            .await?;
        require_success(body.success, body.message, "Failed to reset password")
    }

    async fn get_notes(&self) -> Result<Vec<RawNote>> {
        let body: NotesResponse = self.get("/api/transcribe/getNotes").await?;
        match body.notes {
            Some(notes) => Ok(notes),
            None if body.success => Ok(Vec::new()),
            None => Err(AppError::Application(
                body.message.unwrap_or_else(|| "Failed to load notes".to_string()),
            )),
        }
    }

    async fn get_transcribed_notes(&self) -> Result<Vec<RawNote>> {
        let body: NotesResponse = self.get("/api/transcribe/getTranscribedNotes").await?;
        match body.notes {
            Some(notes) => Ok(notes),
            None if body.success => Ok(Vec::new()),
            None => Err(AppError::Application(
                body.message
                    .unwrap_or_else(|| "Failed to load transcripts".to_string()),
            )),
        }
    }

    async fn save_note(&self, title: &str, content: &str) -> Result<String> {
        let body: StatusResponse = self
            .post("/api/transcribe/saveNotes", &NoteBody { title, content })
            .await?;
        require_success(body.success, body.message, "Failed to create note")
    }

    async fn save_transcript(&self, title: &str, content: &str) -> Result<String> {
        let body: StatusResponse = self
            .post("/api/transcribe/saveTranscribeNotes", &NoteBody { title, content })
            .await?;
        require_success(body.success, body.message, "Failed to save transcript")
    }

    async fn update_note(&self, note_id: &str, title: &str, content: &str) -> Result<String> {
        let body: StatusResponse = self
            .send(
                Method::PUT,
                "/api/transcribe/updateNote",
                &NoteUpdate {
                    note_id,
                    title,
                    content,
                },
            )
            .await?;
        require_success(body.success, body.message, "Failed to update note")
    }

    async fn delete_note(&self, title: &str) -> Result<String> {
        let url = self.title_url("/api/transcribe/deleteNote", title)?;
        let response = self.http.delete(url).send().await?;
        let body: StatusResponse = read_json(response).await?;
        require_success(body.success, body.message, "Failed to delete note")
    }

    async fn get_quiz(&self, title: &str, question_count: u32) -> Result<QuizPayload> {
        let body: QuizResponse = self
            .post(
                "/api/transcribe/getQuiz",
                &QuizRequest {
                    title,
                    question_count,
                },
            )
            .await?;
        match body.quiz {
            Some(Value::Array(items)) => Ok(QuizPayload::Questions(items)),
            Some(Value::String(text)) => Ok(QuizPayload::Text(text)),
            Some(other) => Err(AppError::Parse(format!(
                "Unexpected backend response format: {}",
                truncate_string(&other.to_string(), MAX_ERROR_BODY)
            ))),
            None => Err(AppError::Application(
                body.message
                    .unwrap_or_else(|| "Failed to generate quiz".to_string()),
            )),
        }
    }

    async fn submit_score(&self, title: &str, score: u8) -> Result<()> {
        let body: StatusResponse = self
            .post("/api/transcribe/score", &ScoreBody { title, score })
            .await?;
        require_success(body.success, body.message, "Unknown error").map(|_| ())
    }

    async fn quiz_analysis(&self, title: &str) -> Result<Vec<RawAttempt>> {
        let body: AnalysisResponse = self
            .post("/api/transcribe/quizAnalysis", &TitleOnly { title })
            .await?;
        if !body.success {
            return Err(AppError::Application(
                body.message
                    .unwrap_or_else(|| "Failed to load quiz analysis".to_string()),
            ));
        }
        Ok(body.quizzes.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        let config = Config::from_lookup(|key| match key {
            "STUNOTES_BACKEND_URL" => Some("https://api.example.com".to_string()),
            _ => None,
        })
        .unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_joins_base_and_path() {
        assert_eq!(
            client().url("/api/auth/verify"),
            "https://api.example.com/api/auth/verify"
        );
    }

    #[test]
    fn test_title_url_encodes_segment() {
        let url = client()
            .title_url("/api/transcribe/deleteNote", "Week 3 / Cells?")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/transcribe/deleteNote/Week%203%20%2F%20Cells%3F"
        );
    }

    #[test]
    fn test_require_success_uses_fallback() {
        let err = require_success(false, None, "Failed to create note").unwrap_err();
        assert_eq!(err.to_string(), "Failed to create note");
        assert_eq!(
            require_success(true, Some("Saved".into()), "x").unwrap(),
            "Saved"
        );
    }
}
