use crate::app::App;
use crate::analytics::Band;
use crate::theme::Palette;
use crate::ui::layout::{calculate_screen_chunks, draw_header, draw_help};
use crate::utils::truncate_string;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn verdict(score: u8) -> &'static str {
    match Band::of(score) {
        Band::Excellent => "Excellent work!",
        Band::Good => "Good job!",
        Band::Fair => "Not bad, keep practicing.",
        Band::NeedsWork => "Keep studying and try again.",
    }
}

pub fn draw_results(f: &mut Frame, app: &App, palette: &Palette) {
    let layout = calculate_screen_chunks(f.area());
    let session = &app.quiz;
    let title = session.quiz().map_or("Quiz Results", |q| q.title.as_str());
    draw_header(f, layout.header_area, title, Some("Results"), palette);

    let score = session.score().unwrap_or(0);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(layout.body_area);

    let score_color = match Band::of(score) {
        Band::Excellent | Band::Good => palette.success,
        Band::Fair => palette.warning,
        Band::NeedsWork => palette.danger,
    };
    let header = vec![
        Line::from(Span::styled(
            format!("{}%", score),
            Style::default()
                .fg(score_color)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{} of {} correct",
                session.correct_count(),
                session.questions().len()
            ),
            Style::default().fg(palette.fg),
        )),
        Line::from(Span::styled(verdict(score), Style::default().fg(palette.muted))),
    ];
    let score_block = Paragraph::new(header).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(score_color)),
    );
    f.render_widget(score_block, chunks[0]);

    let mut review = Text::default();
    for (i, item) in session.review().iter().enumerate() {
        let (mark, color) = if item.is_correct {
            ("✓", palette.success)
        } else {
            ("✗", palette.danger)
        };
        review.push_line(Line::from(vec![
            Span::styled(format!("{} ", mark), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("{}. {}", i + 1, truncate_string(&item.question, 70)),
                Style::default().fg(palette.fg),
            ),
        ]));
        let chosen = item.chosen.as_deref().unwrap_or("No answer");
        review.push_line(Line::from(Span::styled(
            format!("   Your answer: {}", truncate_string(chosen, 60)),
            Style::default().fg(color),
        )));
        if !item.is_correct {
            review.push_line(Line::from(Span::styled(
                format!("   Correct answer: {}", truncate_string(&item.correct, 60)),
                Style::default().fg(palette.success),
            )));
        }
        review.push_line(Line::from(""));
    }
    let review = Paragraph::new(review)
        .wrap(Wrap { trim: true })
        .scroll((app.results_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title("Review"),
        );
    f.render_widget(review, chunks[1]);

    draw_help(
        f,
        layout.help_area,
        &[
            ("r", "Retake"),
            ("a", "Analytics"),
            ("↑/↓", "Scroll"),
            ("Enter", "Back to quizzes"),
        ],
        palette,
    );
}
