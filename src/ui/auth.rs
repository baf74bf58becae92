use crate::app::{App, ResetFocus, SignInFocus, SignUpFocus};
use crate::input::TextInput;
use crate::theme::Palette;
use crate::ui::layout::{centered_rect, help_line};
use crate::validation::{self, Field, FormErrors};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

enum Row<'a> {
    Input {
        label: &'a str,
        input: &'a TextInput,
        masked: bool,
        focused: bool,
        error: Option<&'a str>,
    },
    Toggle {
        label: &'a str,
        checked: bool,
        focused: bool,
        error: Option<&'a str>,
    },
    Action {
        label: &'a str,
        focused: bool,
        primary: bool,
    },
    Text(Line<'a>),
}

impl Row<'_> {
    fn height(&self) -> u16 {
        match self {
            Row::Input { .. } => 4,
            Row::Toggle { .. } => 2,
            Row::Action { .. } | Row::Text(_) => 1,
        }
    }
}

fn input_row<'a>(
    label: &'a str,
    input: &'a TextInput,
    focused: bool,
    errors: &'a FormErrors,
    field: Field,
) -> Row<'a> {
    Row::Input {
        label,
        input,
        masked: matches!(field, Field::Password | Field::ConfirmPassword),
        focused,
        error: errors.get(field),
    }
}

/// Lay rows out top to bottom inside a centred card titled `title`.
fn draw_form(f: &mut Frame, title: &str, rows: Vec<Row<'_>>, palette: &Palette) {
    let height: u16 = rows.iter().map(Row::height).sum::<u16>() + 4;
    let card = centered_rect(60, height, f.area());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    let inner = block.inner(card);
    f.render_widget(block, card);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            rows.iter()
                .map(|r| Constraint::Length(r.height()))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner);

    for (row, area) in rows.into_iter().zip(chunks.iter()) {
        draw_row(f, row, *area, palette);
    }
}

fn draw_row(f: &mut Frame, row: Row<'_>, area: Rect, palette: &Palette) {
    match row {
        Row::Input {
            label,
            input,
            masked,
            focused,
            error,
        } => {
            let field_area = Rect { height: 3, ..area };
            let border = if error.is_some() {
                palette.danger
            } else if focused {
                palette.accent
            } else {
                palette.border
            };
            let shown = if masked {
                input.masked()
            } else {
                input.value().to_string()
            };
            let field = Paragraph::new(shown).style(Style::default().fg(palette.fg)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(label),
            );
            f.render_widget(field, field_area);
            if focused {
                let x = field_area.x + 1 + input.cursor() as u16;
                f.set_cursor_position((x.min(field_area.right().saturating_sub(2)), field_area.y + 1));
            }
            if let Some(error) = error {
                let line = Paragraph::new(error).style(Style::default().fg(palette.danger));
                f.render_widget(line, Rect { y: area.y + 3, height: 1, ..area });
            }
        }
        Row::Toggle {
            label,
            checked,
            focused,
            error,
        } => {
            let mark = if checked { "[x]" } else { "[ ]" };
            let style = if focused {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.fg)
            };
            let mut lines = vec![Line::from(Span::styled(format!("{} {}", mark, label), style))];
            if let Some(error) = error {
                lines.push(Line::from(Span::styled(error, Style::default().fg(palette.danger))));
            }
            f.render_widget(Paragraph::new(lines), area);
        }
        Row::Action {
            label,
            focused,
            primary,
        } => {
            let style = match (focused, primary) {
                (true, _) => Style::default()
                    .fg(palette.highlight)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                (false, true) => Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
                (false, false) => Style::default().fg(palette.muted),
            };
            let text = if primary {
                format!("[ {} ]", label)
            } else {
                label.to_string()
            };
            f.render_widget(
                Paragraph::new(Span::styled(text, style)).alignment(Alignment::Center),
                area,
            );
        }
        Row::Text(line) => {
            f.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
        }
    }
}

fn message_row<'a>(message: Option<&'a str>, busy: Option<&'a str>, palette: &Palette) -> Row<'a> {
    match (busy, message) {
        (Some(busy), _) => Row::Text(Line::from(Span::styled(
            busy,
            Style::default().fg(palette.muted),
        ))),
        (None, Some(message)) => Row::Text(Line::from(Span::styled(
            message,
            Style::default().fg(palette.danger),
        ))),
        (None, None) => Row::Text(Line::default()),
    }
}

fn footer_row<'a>(keys: &[(&str, &str)], palette: &Palette) -> Row<'a> {
    Row::Text(help_line(keys, palette).alignment(Alignment::Center))
}

pub fn draw_sign_in(f: &mut Frame, app: &App, palette: &Palette) {
    let form = &app.sign_in;
    let rows = vec![
        Row::Text(
            Line::from(Span::styled(
                "Welcome back to StuNotes",
                Style::default().fg(palette.muted),
            ))
            .alignment(Alignment::Center),
        ),
        input_row("Email", &form.email, form.focus == SignInFocus::Email, &form.errors, Field::Email),
        input_row(
            "Password",
            &form.password,
            form.focus == SignInFocus::Password,
            &form.errors,
            Field::Password,
        ),
        message_row(form.message.as_deref(), app.busy.as_deref(), palette),
        Row::Action {
            label: "Sign in",
            focused: form.focus == SignInFocus::Submit,
            primary: true,
        },
        Row::Action {
            label: "Don't have an account? Create one",
            focused: form.focus == SignInFocus::CreateAccount,
            primary: false,
        },
        Row::Action {
            label: "Forgot password?",
            focused: form.focus == SignInFocus::ForgotPassword,
            primary: false,
        },
        footer_row(&[("Tab", "Next"), ("Enter", "Select"), ("Esc", "Quit")], palette),
    ];
    draw_form(f, "Sign in", rows, palette);
}

pub fn draw_sign_up(f: &mut Frame, app: &App, palette: &Palette) {
    let form = &app.sign_up;
    let strength = validation::password_strength(form.password.value());
    let strength_line = if form.password.is_empty() {
        Line::default()
    } else {
        let color = match strength {
            0..=2 => palette.danger,
            3 => palette.warning,
            _ => palette.success,
        };
        Line::from(vec![
            Span::styled("Strength: ", Style::default().fg(palette.muted)),
            Span::styled(
                format!(
                    "{} {}",
                    "■".repeat(strength as usize),
                    validation::strength_label(strength)
                ),
                Style::default().fg(color),
            ),
        ])
    };
    let rows = vec![
        input_row("Full name", &form.name, form.focus == SignUpFocus::Name, &form.errors, Field::Name),
        input_row("Email", &form.email, form.focus == SignUpFocus::Email, &form.errors, Field::Email),
        input_row(
            "Password",
            &form.password,
            form.focus == SignUpFocus::Password,
            &form.errors,
            Field::Password,
        ),
        Row::Text(strength_line),
        input_row(
            "Confirm password",
            &form.confirm,
            form.focus == SignUpFocus::Confirm,
            &form.errors,
            Field::ConfirmPassword,
        ),
        Row::Toggle {
            label: "I agree to the Terms of Service and Privacy Policy",
            checked: form.agreed,
            focused: form.focus == SignUpFocus::Terms,
            error: form.errors.get(Field::Terms),
        },
        message_row(form.message.as_deref(), app.busy.as_deref(), palette),
        Row::Action {
            label: "Create account",
            focused: form.focus == SignUpFocus::Submit,
            primary: true,
        },
        Row::Action {
            label: "Already have an account? Sign in",
            focused: form.focus == SignUpFocus::SignIn,
            primary: false,
        },
        footer_row(&[("Tab", "Next"), ("Space", "Toggle"), ("Esc", "Back")], palette),
    ];
    draw_form(f, "Create account", rows, palette);
}

pub fn draw_verify_email(f: &mut Frame, app: &App, palette: &Palette) {
    let email = app.pending_email.as_deref().unwrap_or("your email");
    let digits: String = (0..validation::OTP_LENGTH)
        .map(|i| {
            app.verify
                .input
                .value()
                .chars()
                .nth(i)
                .map_or("_ ".to_string(), |c| format!("{} ", c))
        })
        .collect();
    let rows = vec![
        Row::Text(Line::from(vec![
            Span::styled("We sent a 6-digit code to ", Style::default().fg(palette.muted)),
            Span::styled(email, Style::default().fg(palette.fg).add_modifier(Modifier::BOLD)),
        ])),
        Row::Text(Line::default()),
        Row::Text(
            Line::from(Span::styled(
                digits.trim_end().to_string(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
        ),
        Row::Text(Line::default()),
        message_row(app.verify.message.as_deref(), app.busy.as_deref(), palette),
        footer_row(
            &[("Enter", "Verify"), ("Ctrl+R", "Resend code"), ("Esc", "Back")],
            palette,
        ),
    ];
    draw_form(f, "Verify your email", rows, palette);
}

pub fn draw_forgot_password(f: &mut Frame, app: &App, palette: &Palette) {
    let form = &app.forgot;
    let rows = vec![
        Row::Text(Line::from(Span::styled(
            "Enter your email and we'll send you a reset code.",
            Style::default().fg(palette.muted),
        ))),
        input_row("Email", &form.input, true, &form.errors, Field::Email),
        message_row(form.message.as_deref(), app.busy.as_deref(), palette),
        footer_row(&[("Enter", "Send code"), ("Esc", "Back to sign in")], palette),
    ];
    draw_form(f, "Forgot password", rows, palette);
}

pub fn draw_reset_password(f: &mut Frame, app: &App, palette: &Palette) {
    let form = &app.reset;
    let rows = vec![
        Row::Text(Line::from(vec![
            Span::styled("Reset code sent to ", Style::default().fg(palette.muted)),
            Span::styled(form.email.as_str(), Style::default().fg(palette.fg)),
        ])),
        input_row("Reset code", &form.otp, form.focus == ResetFocus::Otp, &form.errors, Field::Otp),
        input_row(
            "New password",
            &form.password,
            form.focus == ResetFocus::Password,
            &form.errors,
            Field::Password,
        ),
        input_row(
            "Confirm new password",
            &form.confirm,
            form.focus == ResetFocus::Confirm,
            &form.errors,
            Field::ConfirmPassword,
        ),
        message_row(form.message.as_deref(), app.busy.as_deref(), palette),
        footer_row(&[("Tab", "Next"), ("Enter", "Reset"), ("Esc", "Back")], palette),
    ];
    draw_form(f, "Reset password", rows, palette);
}
