use crate::app::App;
use crate::quiz::QUESTION_COUNT_CHOICES;
use crate::theme::Palette;
use crate::ui::layout::{calculate_screen_chunks, centered_rect, draw_header, draw_help};
use crate::utils::truncate_string;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

const OPTION_LABELS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Source note list plus question count, or the spinner while a quiz is
/// being generated.
pub fn draw_quiz_picker(f: &mut Frame, app: &App, palette: &Palette) {
    let layout = calculate_screen_chunks(f.area());
    draw_header(f, layout.header_area, "AI Quizzes", None, palette);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(layout.body_area);

    let notes = app.notes.all();
    let items: Vec<ListItem> = if notes.is_empty() {
        vec![ListItem::new(Span::styled(
            "No notes available. Create a note first to generate a quiz.",
            Style::default().fg(palette.muted),
        ))]
    } else {
        notes
            .iter()
            .enumerate()
            .map(|(i, note)| {
                let selected = i == app.picker_selected;
                let style = if selected {
                    Style::default()
                        .fg(palette.highlight)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.fg)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(if selected { "> " } else { "  " }, style),
                    Span::styled(truncate_string(&note.title, 50), style),
                    Span::styled(format!("  {}", note.date), Style::default().fg(palette.muted)),
                ]))
            })
            .collect()
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title("Select a note"),
    );
    f.render_widget(list, chunks[0]);

    let counts: Vec<Span> = QUESTION_COUNT_CHOICES
        .iter()
        .enumerate()
        .flat_map(|(i, count)| {
            let style = if i == app.picker_count {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(palette.fg)
            };
            [Span::styled(format!(" {} ", count), style), Span::from(" ")]
        })
        .collect();
    let mut count_line = vec![Span::styled("Questions: ", Style::default().fg(palette.muted))];
    count_line.extend(counts);
    let count = Paragraph::new(Line::from(count_line)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );
    f.render_widget(count, chunks[1]);

    if let Some(generating) = &app.generating {
        let rect = centered_rect(56, 7, f.area());
        let text = vec![
            Line::from(Span::styled(
                "Generating AI Quiz...",
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                truncate_string(&generating.title, 48),
                Style::default().fg(palette.fg),
            )),
            Line::from(Span::styled("Esc to cancel", Style::default().fg(palette.muted))),
        ];
        let dialog = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(dialog, rect);
    }

    draw_help(
        f,
        layout.help_area,
        &[
            ("↑/↓", "Note"),
            ("←/→", "Questions"),
            ("Enter", "Generate"),
            ("r", "Refresh"),
            ("Esc", "Back"),
        ],
        palette,
    );
}

pub fn draw_quiz(f: &mut Frame, app: &App, palette: &Palette) {
    let layout = calculate_screen_chunks(f.area());
    let session = &app.quiz;
    let (Some(quiz), Some(question), Some(index)) = (
        session.quiz(),
        session.current_question(),
        session.current_index(),
    ) else {
        return;
    };

    let progress = format!(
        "Question {} of {}  ·  {} answered",
        index + 1,
        session.questions().len(),
        session.answered_count()
    );
    draw_header(f, layout.header_area, &quiz.title, Some(progress.as_str()), palette);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length((question.options.len() as u16) * 2 + 2),
        ])
        .split(layout.body_area);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(palette.accent))
        .percent(session.progress_percent());
    f.render_widget(gauge, chunks[0]);

    let question_text = Paragraph::new(Text::from(question.question.as_str()))
        .style(Style::default().fg(palette.fg).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title("Question"),
        );
    f.render_widget(question_text, chunks[1]);

    let chosen = session.selected_option(question.id);
    let mut options = Text::default();
    for (i, option) in question.options.iter().enumerate() {
        let label = OPTION_LABELS.get(i).copied().unwrap_or('?');
        let is_chosen = chosen == Some(i);
        let is_cursor = app.option_cursor == i;
        let style = match (is_chosen, is_cursor) {
            (true, _) => Style::default()
                .fg(palette.success)
                .add_modifier(Modifier::BOLD),
            (false, true) => Style::default().fg(palette.highlight),
            (false, false) => Style::default().fg(palette.fg),
        };
        let mark = if is_chosen { "(•)" } else { "( )" };
        let pointer = if is_cursor { "> " } else { "  " };
        options.push_line(Line::from(vec![
            Span::styled(pointer, style),
            Span::styled(format!("{} {}. ", mark, label), style),
            Span::styled(option.clone(), style),
        ]));
        options.push_line(Line::from(""));
    }
    let options = Paragraph::new(options).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title("Options"),
    );
    f.render_widget(options, chunks[2]);

    let last = index + 1 == session.questions().len();
    draw_help(
        f,
        layout.help_area,
        &[
            ("A-D", "Answer"),
            ("←", "Previous"),
            ("→", if last { "Finish" } else { "Next" }),
            ("Tab", "Next unanswered"),
            ("Esc", "Exit quiz"),
        ],
        palette,
    );
}

pub fn draw_quit_confirmation(f: &mut Frame, palette: &Palette) {
    crate::ui::layout::draw_confirm(f, "Quit", "Quit StuNotes?", palette);
}
