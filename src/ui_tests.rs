//! Rendering checks against ratatui's in-memory backend.

use crate::api::mock::raw_note;
use crate::app::{AnalyticsStatus, App, DeleteTarget, ToastKind};
use crate::analytics::AnalyticsView;
use crate::config::Config;
use crate::models::{AppState, Note, Question, QuestionKind, QuizSource, SourceKind, User};
use crate::quiz::build_quiz;
use crate::storage::LocalStore;
use crate::theme::ThemeContext;
use crate::ui;
use ratatui::{backend::TestBackend, Terminal};

fn test_app() -> App {
    let config = Config::from_lookup(|_| None).unwrap();
    let mut app = App::new(&config, ThemeContext::load(LocalStore::in_memory()));
    app.take_requests();
    app
}

fn signed_in_app() -> App {
    let mut app = test_app();
    app.user = Some(User::new(
        "u1".into(),
        "Sam Student".into(),
        "sam@example.com".into(),
    ));
    app.state = AppState::Home;
    app
}

fn notes() -> Vec<Note> {
    vec![
        Note::from(raw_note("2", "Week 3", "Photosynthesis", "2024-03-08T10:00:00Z")),
        Note::from(raw_note("1", "Cells", "# Cells\nThe mitochondria", "2024-03-01T10:00:00Z")),
    ]
}

/// Render `app` and return the screen as one string per row.
fn render(app: &App) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
    terminal.draw(|f| ui::draw(f, app)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect()
}

fn screen_contains(screen: &[String], needle: &str) -> bool {
    screen.iter().any(|row| row.contains(needle))
}

#[test]
fn test_sign_in_screen() {
    let mut app = test_app();
    app.state = AppState::SignIn;
    app.sign_in.password.set("Secret123");
    let screen = render(&app);

    assert!(screen_contains(&screen, "Welcome back to StuNotes"));
    assert!(screen_contains(&screen, "Forgot password?"));
    assert!(screen_contains(&screen, "*********"));
    assert!(!screen_contains(&screen, "Secret123"));
}

#[test]
fn test_home_shows_user_and_menu() {
    let app = signed_in_app();
    let screen = render(&app);

    assert!(screen_contains(&screen, "Sam Student (SS)"));
    assert!(screen_contains(&screen, "Transcribe"));
    assert!(screen_contains(&screen, "Signed in as sam@example.com"));
}

#[test]
fn test_notes_list_with_pagination_summary() {
    let mut app = signed_in_app();
    app.state = AppState::Notes;
    app.notes.set_notes(notes());
    let screen = render(&app);

    assert!(screen_contains(&screen, "> Week 3"));
    assert!(screen_contains(&screen, "Cells"));
    assert!(screen_contains(&screen, "Showing 1 to 2 of 2 notes"));
}

#[test]
fn test_empty_notes_hint() {
    let mut app = signed_in_app();
    app.state = AppState::Notes;
    let screen = render(&app);
    assert!(screen_contains(&screen, "No notes yet. Press n to create your first note."));
}

#[test]
fn test_delete_confirmation_overlays_list() {
    let mut app = signed_in_app();
    app.notes.set_notes(notes());
    app.state = AppState::DeleteConfirm;
    app.delete_target = Some(DeleteTarget {
        kind: SourceKind::Note,
        title: "Week 3".to_string(),
        return_to: AppState::Notes,
    });
    let screen = render(&app);

    assert!(screen_contains(&screen, "Delete note \"Week 3\"?"));
    assert!(screen_contains(&screen, "My Notes"));
}

fn quiz_app() -> App {
    let mut app = signed_in_app();
    let questions = vec![
        Question {
            id: 1,
            kind: QuestionKind::MultipleChoice,
            question: "Powerhouse of the cell?".into(),
            options: vec!["Nucleus".into(), "Mitochondria".into()],
            correct: 1,
        },
        Question {
            id: 2,
            kind: QuestionKind::MultipleChoice,
            question: "Which cells have walls?".into(),
            options: vec!["Plant".into(), "Animal".into()],
            correct: 0,
        },
    ];
    app.quiz.start(build_quiz(
        QuizSource {
            kind: SourceKind::Note,
            title: "Cells".into(),
        },
        questions,
    ));
    app.state = AppState::Quiz;
    app
}

#[test]
fn test_quiz_question_screen() {
    let app = quiz_app();
    let screen = render(&app);

    assert!(screen_contains(&screen, "AI Quiz: Cells"));
    assert!(screen_contains(&screen, "Question 1 of 2"));
    assert!(screen_contains(&screen, "Powerhouse of the cell?"));
    assert!(screen_contains(&screen, "B. Mitochondria"));
}

#[test]
fn test_results_screen_reviews_answers() {
    let mut app = quiz_app();
    app.quiz.answer(1, 1).unwrap();
    app.quiz.next();
    app.quiz.answer(2, 1).unwrap();
    app.quiz.next();
    app.state = AppState::QuizResults;
    let screen = render(&app);

    assert!(screen_contains(&screen, "50%"));
    assert!(screen_contains(&screen, "1 of 2 correct"));
    assert!(screen_contains(&screen, "Correct answer: Plant"));
}

#[test]
fn test_analytics_empty_range() {
    let mut app = signed_in_app();
    app.state = AppState::Analytics;
    app.analytics = AnalyticsStatus::Ready(AnalyticsView::new(Vec::new()));
    let screen = render(&app);
    assert!(screen_contains(&screen, "No quiz attempts in this period"));
    assert!(screen_contains(&screen, "All time"));
}

#[test]
fn test_analytics_failure_message() {
    let mut app = signed_in_app();
    app.state = AppState::Analytics;
    app.analytics = AnalyticsStatus::Failed("Service unavailable".into());
    let screen = render(&app);
    assert!(screen_contains(&screen, "Could not load quiz results"));
    assert!(screen_contains(&screen, "Service unavailable"));
}

#[test]
fn test_toasts_render_over_screen() {
    let mut app = signed_in_app();
    app.toast(ToastKind::Success, "Note created successfully!");
    let screen = render(&app);
    assert!(screen_contains(&screen, "Note created successfully!"));
}

#[test]
fn test_quit_confirmation_keeps_previous_screen() {
    let mut app = signed_in_app();
    app.previous_state = AppState::Home;
    app.state = AppState::QuitConfirm;
    let screen = render(&app);
    assert!(screen_contains(&screen, "Quit StuNotes?"));
    assert!(screen_contains(&screen, "Menu"));
}
