use crate::app::{App, TranscribeFocus};
use crate::theme::Palette;
use crate::transcribe::RecorderState;
use crate::ui::layout::{calculate_screen_chunks, draw_header, draw_help, pagination_line};
use crate::utils::{format_date, truncate_string};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw_transcribe(f: &mut Frame, app: &App, palette: &Palette) {
    let layout = calculate_screen_chunks(f.area());
    draw_header(f, layout.header_area, "Live Transcription", None, palette);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout.body_area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(columns[0]);

    let border = |focus: TranscribeFocus| {
        Style::default().fg(if app.transcribe_focus == focus {
            palette.accent
        } else {
            palette.border
        })
    };

    let (status, color) = match app.recorder.state() {
        RecorderState::Idle => ("Ready to record", palette.muted),
        RecorderState::Recording => ("● Recording", palette.danger),
        RecorderState::Paused => ("Paused", palette.warning),
    };
    let status_line = Line::from(vec![
        Span::styled(status, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("   {}", app.recorder.elapsed_label()),
            Style::default().fg(palette.fg),
        ),
        Span::styled(
            format!("   {} words", app.recorder.transcript().split_whitespace().count()),
            Style::default().fg(palette.muted),
        ),
    ]);
    let status = Paragraph::new(status_line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title("Recorder"),
    );
    f.render_widget(status, left[0]);

    let title = Paragraph::new(app.transcript_title.value().to_string())
        .style(Style::default().fg(palette.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border(TranscribeFocus::Title))
                .title("Title"),
        );
    f.render_widget(title, left[1]);
    if app.transcribe_focus == TranscribeFocus::Title {
        f.set_cursor_position((
            left[1].x + 1 + app.transcript_title.cursor() as u16,
            left[1].y + 1,
        ));
    }

    let transcript = if app.recorder.transcript().is_empty() {
        let hint = match app.recorder.state() {
            RecorderState::Recording => "Listening... type to dictate.",
            _ => "Press Ctrl+R to start recording.",
        };
        Text::from(Span::styled(hint, Style::default().fg(palette.muted)))
    } else {
        Text::from(app.recorder.transcript().to_string())
    };
    let transcript = Paragraph::new(transcript)
        .style(Style::default().fg(palette.fg))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border(TranscribeFocus::Dictation))
                .title("Transcript"),
        );
    f.render_widget(transcript, left[2]);

    let saved_focused = app.transcribe_focus == TranscribeFocus::Saved;
    let mut saved = Text::default();
    if app.transcripts.is_empty() {
        saved.push_line(Line::from(Span::styled(
            "No saved transcripts yet.",
            Style::default().fg(palette.muted),
        )));
    }
    for (i, t) in app.transcripts.visible().iter().enumerate() {
        let selected = saved_focused && i == app.transcripts.selected_index();
        let style = if selected {
            Style::default()
                .fg(palette.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD)
        };
        saved.push_line(Line::from(vec![
            Span::styled(if selected { "> " } else { "  " }, style),
            Span::styled(t.title.clone(), style),
        ]));
        saved.push_line(Line::from(Span::styled(
            format!("    {}", format_date(&t.created_at)),
            Style::default().fg(palette.muted),
        )));
        saved.push_line(Line::from(Span::styled(
            format!("    {}", truncate_string(&t.content.replace('\n', " "), 40)),
            Style::default().fg(palette.muted),
        )));
        saved.push_line(Line::from(""));
    }
    saved.push_line(pagination_line(&app.transcripts.pagination(), palette));
    let saved = Paragraph::new(saved).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border(TranscribeFocus::Saved))
            .title(format!("Saved Transcripts ({})", app.transcripts.len())),
    );
    f.render_widget(saved, columns[1]);

    let record_label = match app.recorder.state() {
        RecorderState::Idle => "Record",
        _ => "Stop",
    };
    let pause_label = match app.recorder.state() {
        RecorderState::Paused => "Resume",
        _ => "Pause",
    };
    let keys: &[(&str, &str)] = if saved_focused {
        &[
            ("Enter", "Open"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("z", "Quiz"),
            ("←/→", "Page"),
            ("Tab", "Focus"),
            ("Esc", "Back"),
        ]
    } else {
        &[
            ("Ctrl+R", record_label),
            ("Ctrl+P", pause_label),
            ("Ctrl+S", "Save"),
            ("Ctrl+L", "Clear"),
            ("Tab", "Focus"),
            ("Esc", "Back"),
        ]
    };
    draw_help(f, layout.help_area, keys, palette);
}
