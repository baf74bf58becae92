pub mod layout;
mod analytics;
mod auth;
mod home;
mod notes;
mod quiz;
mod summary;
mod transcribe;

pub use analytics::draw_analytics;
pub use auth::{
    draw_forgot_password, draw_reset_password, draw_sign_in, draw_sign_up, draw_verify_email,
};
pub use home::draw_home;
pub use layout::draw_toasts;
pub use notes::{draw_delete_confirmation, draw_note_editor, draw_note_view, draw_notes};
pub use quiz::{draw_quit_confirmation, draw_quiz, draw_quiz_picker};
pub use summary::draw_results;
pub use transcribe::draw_transcribe;

use crate::app::App;
use crate::models::AppState;
use crate::theme::Palette;
use ratatui::{layout::Alignment, style::Style, widgets::Paragraph, Frame};

fn draw_screen(f: &mut Frame, app: &App, state: AppState, palette: &Palette) {
    match state {
        AppState::Loading => {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(palette.muted))
                .alignment(Alignment::Center);
            f.render_widget(loading, layout::centered_rect(20, 1, f.area()));
        }
        AppState::SignIn => draw_sign_in(f, app, palette),
        AppState::SignUp => draw_sign_up(f, app, palette),
        AppState::VerifyEmail => draw_verify_email(f, app, palette),
        AppState::ForgotPassword => draw_forgot_password(f, app, palette),
        AppState::ResetPassword => draw_reset_password(f, app, palette),
        AppState::Home => draw_home(f, app, palette),
        AppState::Notes => draw_notes(f, app, palette),
        AppState::NoteView => draw_note_view(f, app, palette),
        AppState::NoteEditor => draw_note_editor(f, app, palette),
        AppState::DeleteConfirm => {
            if let Some(target) = &app.delete_target {
                draw_screen(f, app, target.return_to, palette);
            }
            draw_delete_confirmation(f, app, palette);
        }
        AppState::Transcribe => draw_transcribe(f, app, palette),
        AppState::Quizzes => draw_quiz_picker(f, app, palette),
        AppState::Quiz => draw_quiz(f, app, palette),
        AppState::QuizResults => draw_results(f, app, palette),
        AppState::Analytics => draw_analytics(f, app, palette),
        AppState::QuitConfirm => {
            if app.previous_state != AppState::QuitConfirm {
                draw_screen(f, app, app.previous_state, palette);
            }
            draw_quit_confirmation(f, palette);
        }
    }
}

/// Render the current screen with notifications on top.
pub fn draw(f: &mut Frame, app: &App) {
    let palette = app.theme.palette();
    draw_screen(f, app, app.state, &palette);
    draw_toasts(f, &app.toasts, &palette);
}
