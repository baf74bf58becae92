use crate::error::{AppError, Result};
use crate::models::{AnswerMap, Question, Quiz};

const TITLE_PREFIXES: [&str; 2] = ["AI Quiz: ", "Quiz: "];

#[derive(Debug, Clone, PartialEq)]
pub enum QuizPhase {
    Idle,
    InProgress { index: usize, answers: AnswerMap },
    Results { score: u8, answers: AnswerMap },
}

/// Score to report to the backend once a quiz is finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub title: String,
    pub score: u8,
}

/// One row of the results review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub id: u32,
    pub question: String,
    pub chosen: Option<String>,
    pub correct: String,
    pub is_correct: bool,
}

/// Title without the generator's "AI Quiz: " / "Quiz: " prefix, so the score
/// is stored against the note it came from.
pub fn strip_quiz_prefix(title: &str) -> &str {
    TITLE_PREFIXES
        .iter()
        .find_map(|prefix| title.strip_prefix(prefix))
        .unwrap_or(title)
}

/// round(100 * correct / total); an empty quiz scores 0.
pub fn calculate_score(questions: &[Question], answers: &AnswerMap) -> u8 {
    if questions.is_empty() {
        return 0;
    }
    let correct = questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct))
        .count();
    (100.0 * correct as f64 / questions.len() as f64).round() as u8
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    quiz: Option<Quiz>,
    phase: QuizPhase,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            quiz: None,
            phase: QuizPhase::Idle,
        }
    }

    /// Begin `quiz` from the first question, discarding whatever was running.
    pub fn start(&mut self, quiz: Quiz) {
        self.quiz = Some(quiz);
        self.phase = QuizPhase::InProgress {
            index: 0,
            answers: AnswerMap::new(),
        };
    }

    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        self.quiz.as_ref().map_or(&[], |q| q.questions.as_slice())
    }

    pub fn current_index(&self) -> Option<usize> {
        match &self.phase {
            QuizPhase::InProgress { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|i| self.questions().get(i))
    }

    pub fn answers(&self) -> Option<&AnswerMap> {
        match &self.phase {
            QuizPhase::InProgress { answers, .. } | QuizPhase::Results { answers, .. } => {
                Some(answers)
            }
            QuizPhase::Idle => None,
        }
    }

    pub fn selected_option(&self, question_id: u32) -> Option<usize> {
        self.answers().and_then(|a| a.get(&question_id).copied())
    }

    pub fn is_answered(&self, question_id: u32) -> bool {
        self.selected_option(question_id).is_some()
    }

    pub fn answered_count(&self) -> usize {
        self.answers().map_or(0, |a| a.len())
    }

    pub fn current_is_answered(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.is_answered(q.id))
    }

    pub fn score(&self) -> Option<u8> {
        match &self.phase {
            QuizPhase::Results { score, .. } => Some(*score),
            _ => None,
        }
    }

    /// Record `option` for `question_id`, replacing an earlier choice.
    pub fn answer(&mut self, question_id: u32, option: usize) -> Result<()> {
        let option_count = self
            .questions()
            .iter()
            .find(|q| q.id == question_id)
            .map(|q| q.options.len())
            .ok_or_else(|| {
                AppError::Validation(format!("Unknown question {}", question_id))
            })?;
        if option >= option_count {
            return Err(AppError::Validation(format!(
                "Option {} out of range for question {}",
                option + 1,
                question_id
            )));
        }
        match &mut self.phase {
            QuizPhase::InProgress { answers, .. } => {
                answers.insert(question_id, option);
                Ok(())
            }
            _ => Err(AppError::Validation("No quiz in progress".to_string())),
        }
    }

    /// Advance one question. On the last question this finishes the quiz and
    /// returns the score to report.
    pub fn next(&mut self) -> Option<ScoreReport> {
        let total = self.questions().len();
        let QuizPhase::InProgress { index, answers } = &mut self.phase else {
            return None;
        };

        if *index + 1 < total {
            *index += 1;
            return None;
        }

        let answers = std::mem::take(answers);
        let score = calculate_score(self.questions(), &answers);
        self.phase = QuizPhase::Results { score, answers };

        self.quiz.as_ref().map(|quiz| ScoreReport {
            title: strip_quiz_prefix(&quiz.title).to_string(),
            score,
        })
    }

    pub fn previous(&mut self) {
        if let QuizPhase::InProgress { index, .. } = &mut self.phase {
            *index = index.saturating_sub(1);
        }
    }

    pub fn jump_to(&mut self, target: usize) {
        let total = self.questions().len();
        if let QuizPhase::InProgress { index, .. } = &mut self.phase
            && target < total
        {
            *index = target;
        }
    }

    /// Restart the current quiz with no answers.
    pub fn retake(&mut self) {
        if self.quiz.is_some() {
            self.phase = QuizPhase::InProgress {
                index: 0,
                answers: AnswerMap::new(),
            };
        }
    }

    /// Leave the quiz entirely.
    pub fn exit(&mut self) {
        self.quiz = None;
        self.phase = QuizPhase::Idle;
    }

    pub fn reset(&mut self) {
        self.exit();
    }

    /// Percentage of questions reached, counting the current one.
    pub fn progress_percent(&self) -> u16 {
        let total = self.questions().len();
        match self.current_index() {
            Some(index) if total > 0 => ((index + 1) * 100 / total) as u16,
            _ if matches!(self.phase, QuizPhase::Results { .. }) => 100,
            _ => 0,
        }
    }

    pub fn review(&self) -> Vec<QuestionReview> {
        let answers = self.answers();
        self.questions()
            .iter()
            .map(|q| {
                let chosen_index = answers.and_then(|a| a.get(&q.id).copied());
                QuestionReview {
                    id: q.id,
                    question: q.question.clone(),
                    chosen: chosen_index.and_then(|i| q.options.get(i).cloned()),
                    correct: q.options.get(q.correct).cloned().unwrap_or_default(),
                    is_correct: chosen_index == Some(q.correct),
                }
            })
            .collect()
    }

    pub fn correct_count(&self) -> usize {
        self.review().iter().filter(|r| r.is_correct).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;

    fn question(id: u32, correct: usize) -> Question {
        Question {
            id,
            kind: QuestionKind::MultipleChoice,
            question: format!("Question {}", id),
            options: vec!["w".into(), "x".into(), "y".into(), "z".into()],
            correct,
        }
    }

    fn quiz(title: &str, n: u32) -> Quiz {
        Quiz {
            title: title.to_string(),
            questions: (1..=n).map(|id| question(id, 1)).collect(),
            source: None,
        }
    }

    #[test]
    fn test_three_of_four_scores_75() {
        let mut session = QuizSession::new();
        session.start(quiz("AI Quiz: Cells", 4));
        for id in 1..=4 {
            let option = if id == 4 { 0 } else { 1 };
            session.answer(id, option).unwrap();
            let report = session.next();
            if id < 4 {
                assert!(report.is_none());
            } else {
                assert_eq!(
                    report,
                    Some(ScoreReport {
                        title: "Cells".to_string(),
                        score: 75
                    })
                );
            }
        }
        assert_eq!(session.score(), Some(75));
        assert_eq!(session.correct_count(), 3);
    }

    #[test]
    fn test_score_rounds() {
        let questions: Vec<Question> = (1..=3).map(|id| question(id, 0)).collect();
        let mut answers = AnswerMap::new();
        answers.insert(1, 0);
        answers.insert(2, 0);
        assert_eq!(calculate_score(&questions, &answers), 67);
        assert_eq!(calculate_score(&[], &answers), 0);
    }

    #[test]
    fn test_strip_quiz_prefix() {
        assert_eq!(strip_quiz_prefix("AI Quiz: Photosynthesis"), "Photosynthesis");
        assert_eq!(strip_quiz_prefix("Quiz: Cells"), "Cells");
        assert_eq!(strip_quiz_prefix("Cells"), "Cells");
    }

    #[test]
    fn test_answer_rejects_bad_option_or_question() {
        let mut session = QuizSession::new();
        session.start(quiz("Cells", 2));
        assert!(session.answer(1, 4).is_err());
        assert!(session.answer(9, 0).is_err());
        assert!(!session.is_answered(1));
        session.answer(1, 2).unwrap();
        session.answer(1, 3).unwrap();
        assert_eq!(session.selected_option(1), Some(3));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut session = QuizSession::new();
        session.start(quiz("Cells", 3));
        session.previous();
        assert_eq!(session.current_index(), Some(0));
        session.jump_to(2);
        assert_eq!(session.current_index(), Some(2));
        session.jump_to(7);
        assert_eq!(session.current_index(), Some(2));
        session.previous();
        assert_eq!(session.current_index(), Some(1));
    }

    #[test]
    fn test_progress_percent() {
        let mut session = QuizSession::new();
        assert_eq!(session.progress_percent(), 0);
        session.start(quiz("Cells", 4));
        assert_eq!(session.progress_percent(), 25);
        session.jump_to(3);
        assert_eq!(session.progress_percent(), 100);
    }

    #[test]
    fn test_retake_clears_answers() {
        let mut session = QuizSession::new();
        session.start(quiz("Cells", 1));
        session.answer(1, 1).unwrap();
        session.next();
        assert_eq!(session.score(), Some(100));

        session.retake();
        assert_eq!(session.current_index(), Some(0));
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.quiz().map(|q| q.title.as_str()), Some("Cells"));
    }

    #[test]
    fn test_start_replaces_running_quiz() {
        let mut session = QuizSession::new();
        session.start(quiz("Old", 3));
        session.answer(1, 0).unwrap();
        session.start(quiz("New", 2));
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.questions().len(), 2);
    }

    #[test]
    fn test_exit_returns_to_idle() {
        let mut session = QuizSession::new();
        session.start(quiz("Cells", 2));
        session.exit();
        assert_eq!(session.phase(), &QuizPhase::Idle);
        assert!(session.next().is_none());
        assert!(session.answer(1, 0).is_err());
    }

    #[test]
    fn test_review_marks_chosen_and_correct() {
        let mut session = QuizSession::new();
        session.start(quiz("Cells", 2));
        session.answer(1, 1).unwrap();
        session.next();
        session.next();
        let review = session.review();
        assert!(review[0].is_correct);
        assert_eq!(review[0].chosen.as_deref(), Some("x"));
        assert_eq!(review[1].chosen, None);
        assert_eq!(review[1].correct, "x");
    }
}
