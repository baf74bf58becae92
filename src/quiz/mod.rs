pub mod normalizer;
pub mod session;

pub use normalizer::normalize_quiz;
pub use session::{QuizPhase, QuizSession, ScoreReport};

use crate::api::Backend;
use crate::error::Result;
use crate::logger;
use crate::models::{Question, Quiz, QuizSource};

/// Question counts offered when generating a quiz.
pub const QUESTION_COUNT_CHOICES: [u32; 4] = [5, 10, 15, 20];

pub fn build_quiz(source: QuizSource, questions: Vec<Question>) -> Quiz {
    Quiz {
        title: format!("AI Quiz: {}", source.title),
        questions,
        source: Some(source),
    }
}

/// Ask the backend for a quiz on `source` and normalize what comes back.
pub async fn generate_quiz(
    backend: &dyn Backend,
    source: QuizSource,
    question_count: u32,
) -> Result<Quiz> {
    let payload = backend.get_quiz(&source.title, question_count).await?;
    let questions = normalize_quiz(payload)?;
    logger::log(&format!(
        "Generated {} questions for {:?}",
        questions.len(),
        source.title
    ));
    Ok(build_quiz(source, questions))
}

pub async fn submit_score(backend: &dyn Backend, report: &ScoreReport) -> Result<()> {
    backend.submit_score(&report.title, report.score).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;
    use crate::api::QuizPayload;
    use crate::error::AppError;
    use crate::models::SourceKind;
    use serde_json::json;

    fn source(title: &str) -> QuizSource {
        QuizSource {
            kind: SourceKind::Note,
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_quiz_normalizes_payload() {
        let backend = MockBackend::new().with_quiz(QuizPayload::Questions(vec![
            json!({"question": "Powerhouse?", "options": ["Nucleus", "Mitochondria"], "correct": 1}),
            json!({"question": "Bad", "options": ["A", "B", "C", "D"]}),
        ]));
        let quiz = generate_quiz(&backend, source("Cells"), 10).await.unwrap();
        assert_eq!(quiz.title, "AI Quiz: Cells");
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.source.map(|s| s.kind), Some(SourceKind::Note));
        assert_eq!(backend.calls(), vec!["get_quiz:Cells"]);
    }

    #[tokio::test]
    async fn test_generate_quiz_parse_failure() {
        let backend =
            MockBackend::new().with_quiz(QuizPayload::Text("```json\nnot json\n```".to_string()));
        let err = generate_quiz(&backend, source("Cells"), 5).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn test_submit_score_uses_stripped_title() {
        let backend = MockBackend::new();
        let report = ScoreReport {
            title: session::strip_quiz_prefix("AI Quiz: Cells").to_string(),
            score: 75,
        };
        submit_score(&backend, &report).await.unwrap();
        assert_eq!(backend.calls(), vec!["submit_score:Cells=75"]);
    }
}
