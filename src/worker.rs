//! Backend calls run here, off the UI loop. Each request is handled on its
//! own task and answered on the response channel.

use crate::analytics;
use crate::api::Backend;
use crate::auth::{AuthOutcome, AuthSession};
use crate::error::Result;
use crate::logger;
use crate::models::{Note, NoteDraft, Quiz, QuizResult, QuizSource, Transcript, User};
use crate::notes;
use crate::quiz::{self, ScoreReport};
use crate::transcribe;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub enum ApiRequest {
    CheckSession,
    SignIn { email: String, password: String },
    SignUp { name: String, email: String, password: String },
    VerifySignUp { otp: String },
    ResendOtp,
    SignOut,
    ForgotPassword { email: String },
    ResetPassword { email: String, otp: String, new_password: String },
    LoadNotes,
    CreateNote { draft: NoteDraft },
    UpdateNote { id: String, draft: NoteDraft },
    DeleteNote { title: String },
    LoadTranscripts,
    SaveTranscript { title: String, content: String },
    UpdateTranscript { id: String, draft: NoteDraft },
    DeleteTranscript { title: String },
    GenerateQuiz { ticket: u64, source: QuizSource, question_count: u32 },
    SubmitScore(ScoreReport),
    LoadAnalytics,
}

#[derive(Debug)]
pub enum ApiResponse {
    Session(Option<User>),
    SignedIn { outcome: AuthOutcome, user: Option<User> },
    SignUpStarted(Result<String>),
    SignUpVerified { result: Result<String>, user: Option<User> },
    OtpResent(Result<String>),
    SignedOut,
    ResetCodeSent { email: String, result: Result<String> },
    PasswordReset(Result<String>),
    NotesLoaded(Result<Vec<Note>>),
    NoteCreated(Result<String>),
    NoteUpdated(Result<String>),
    NoteDeleted(Result<String>),
    TranscriptsLoaded(Result<Vec<Transcript>>),
    TranscriptSaved(Result<String>),
    TranscriptUpdated(Result<String>),
    TranscriptDeleted(Result<String>),
    QuizGenerated { ticket: u64, result: Result<Quiz> },
    ScoreSubmitted(Result<()>),
    AnalyticsLoaded(Result<Vec<QuizResult>>),
}

/// Perform one request against the backend.
pub async fn handle_request(
    backend: &dyn Backend,
    auth: &AuthSession,
    request: ApiRequest,
) -> ApiResponse {
    match request {
        ApiRequest::CheckSession => ApiResponse::Session(auth.check_session().await),
        ApiRequest::SignIn { email, password } => {
            let outcome = auth.sign_in(&email, &password).await;
            ApiResponse::SignedIn {
                outcome,
                user: auth.user().await,
            }
        }
        ApiRequest::SignUp {
            name,
            email,
            password,
        } => ApiResponse::SignUpStarted(auth.sign_up(&name, &email, &password).await),
        ApiRequest::VerifySignUp { otp } => {
            let result = auth.verify_sign_up(&otp).await;
            ApiResponse::SignUpVerified {
                result,
                user: auth.user().await,
            }
        }
        ApiRequest::ResendOtp => ApiResponse::OtpResent(auth.resend_otp().await),
        ApiRequest::SignOut => {
            auth.sign_out().await;
            ApiResponse::SignedOut
        }
        ApiRequest::ForgotPassword { email } => {
            let result = auth.forgot_password(&email).await;
            ApiResponse::ResetCodeSent { email, result }
        }
        ApiRequest::ResetPassword {
            email,
            otp,
            new_password,
        } => ApiResponse::PasswordReset(auth.reset_password(&email, &otp, &new_password).await),
        ApiRequest::LoadNotes => ApiResponse::NotesLoaded(notes::load_notes(backend).await),
        ApiRequest::CreateNote { draft } => {
            ApiResponse::NoteCreated(notes::create_note(backend, &draft).await)
        }
        ApiRequest::UpdateNote { id, draft } => {
            ApiResponse::NoteUpdated(notes::update_note(backend, &id, &draft).await)
        }
        ApiRequest::DeleteNote { title } => {
            ApiResponse::NoteDeleted(notes::delete_note(backend, &title).await)
        }
        ApiRequest::LoadTranscripts => {
            ApiResponse::TranscriptsLoaded(transcribe::load_transcripts(backend).await)
        }
        ApiRequest::SaveTranscript { title, content } => ApiResponse::TranscriptSaved(
            transcribe::save_transcript(backend, &title, &content).await,
        ),
        ApiRequest::UpdateTranscript { id, draft } => ApiResponse::TranscriptUpdated(
            transcribe::update_transcript(backend, &id, &draft).await,
        ),
        ApiRequest::DeleteTranscript { title } => {
            ApiResponse::TranscriptDeleted(transcribe::delete_transcript(backend, &title).await)
        }
        ApiRequest::GenerateQuiz {
            ticket,
            source,
            question_count,
        } => ApiResponse::QuizGenerated {
            ticket,
            result: quiz::generate_quiz(backend, source, question_count).await,
        },
        ApiRequest::SubmitScore(report) => {
            ApiResponse::ScoreSubmitted(quiz::submit_score(backend, &report).await)
        }
        ApiRequest::LoadAnalytics => {
            ApiResponse::AnalyticsLoaded(analytics::collect_results(backend).await)
        }
    }
}

/// Run one request on its own task.
pub fn dispatch(
    backend: Arc<dyn Backend>,
    auth: AuthSession,
    request: ApiRequest,
    tx: UnboundedSender<ApiResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let response = handle_request(backend.as_ref(), &auth, request).await;
        if tx.send(response).is_err() {
            logger::log("Response channel closed, dropping response");
        }
    })
}

/// Forward requests from `rx` until the sender side is dropped. Requests do
/// not wait for each other.
pub fn spawn_api_worker(
    backend: Arc<dyn Backend>,
    auth: AuthSession,
    mut rx: UnboundedReceiver<ApiRequest>,
    tx: UnboundedSender<ApiResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            logger::log(&format!("Worker received {}", request_name(&request)));
            dispatch(backend.clone(), auth.clone(), request, tx.clone());
        }
        logger::log("Worker channel disconnected, exiting");
    })
}

fn request_name(request: &ApiRequest) -> &'static str {
    match request {
        ApiRequest::CheckSession => "CheckSession",
        ApiRequest::SignIn { .. } => "SignIn",
        ApiRequest::SignUp { .. } => "SignUp",
        ApiRequest::VerifySignUp { .. } => "VerifySignUp",
        ApiRequest::ResendOtp => "ResendOtp",
        ApiRequest::SignOut => "SignOut",
        ApiRequest::ForgotPassword { .. } => "ForgotPassword",
        ApiRequest::ResetPassword { .. } => "ResetPassword",
        ApiRequest::LoadNotes => "LoadNotes",
        ApiRequest::CreateNote { .. } => "CreateNote",
        ApiRequest::UpdateNote { .. } => "UpdateNote",
        ApiRequest::DeleteNote { .. } => "DeleteNote",
        ApiRequest::LoadTranscripts => "LoadTranscripts",
        ApiRequest::SaveTranscript { .. } => "SaveTranscript",
        ApiRequest::UpdateTranscript { .. } => "UpdateTranscript",
        ApiRequest::DeleteTranscript { .. } => "DeleteTranscript",
        ApiRequest::GenerateQuiz { .. } => "GenerateQuiz",
        ApiRequest::SubmitScore(_) => "SubmitScore",
        ApiRequest::LoadAnalytics => "LoadAnalytics",
    }
}
