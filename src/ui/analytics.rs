use crate::analytics::{performance_bands, score_distribution, AnalyticsView, Band, TimeRange};
use crate::app::{AnalyticsStatus, App};
use crate::theme::Palette;
use crate::ui::layout::{calculate_screen_chunks, draw_header, draw_help, pagination_line};
use crate::utils::{format_date_time, truncate_string};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{BarChart, Block, Borders, Paragraph, Sparkline},
    Frame,
};

pub fn draw_analytics(f: &mut Frame, app: &App, palette: &Palette) {
    let layout = calculate_screen_chunks(f.area());
    let range = match &app.analytics {
        AnalyticsStatus::Ready(view) => view.range(),
        _ => TimeRange::All,
    };
    draw_header(f, layout.header_area, "Analytics", Some(range.label()), palette);

    match &app.analytics {
        AnalyticsStatus::Loading => {
            let loading = Paragraph::new("Loading analytics...")
                .style(Style::default().fg(palette.muted))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(loading, layout.body_area);
        }
        AnalyticsStatus::Failed(message) => {
            let error = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Could not load quiz results",
                    Style::default()
                        .fg(palette.danger)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(message.as_str(), Style::default().fg(palette.muted))),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(error, layout.body_area);
        }
        AnalyticsStatus::Ready(view) => draw_dashboard(f, view, layout.body_area, palette, Utc::now()),
    }

    draw_help(
        f,
        layout.help_area,
        &[
            ("t", "Time range"),
            ("←/→", "Page"),
            ("r", "Reload"),
            ("Esc", "Back"),
        ],
        palette,
    );
}

fn draw_dashboard(
    f: &mut Frame,
    view: &AnalyticsView,
    area: Rect,
    palette: &Palette,
    now: DateTime<Utc>,
) {
    let filtered = view.filtered(now);
    if filtered.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(Span::styled(
                "No quiz attempts in this period",
                Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Take a quiz to start tracking your progress.",
                Style::default().fg(palette.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(8),
        ])
        .split(area);

    draw_summary_cards(f, view, rows[0], palette, now);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    // Oldest first so the line reads left to right.
    let mut chronological = filtered.clone();
    chronological.sort_by_key(|r| r.created_at);
    let scores: Vec<u64> = chronological.iter().map(|r| u64::from(r.score)).collect();
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title("Score progression"),
        )
        .data(&scores)
        .max(100)
        .style(Style::default().fg(palette.accent));
    f.render_widget(sparkline, middle[0]);

    let distribution = score_distribution(&filtered);
    let bars: Vec<(&str, u64)> = distribution
        .iter()
        .map(|(bucket, count)| (bucket.as_str(), *count))
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title("Score distribution"),
        )
        .data(bars.as_slice())
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(palette.accent))
        .value_style(
            Style::default()
                .fg(palette.fg)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );
    f.render_widget(chart, middle[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[2]);

    let mut bands = Text::default();
    for (band, count) in performance_bands(&filtered) {
        let color = match band {
            Band::Excellent | Band::Good => palette.success,
            Band::Fair => palette.warning,
            Band::NeedsWork => palette.danger,
        };
        bands.push_line(Line::from(vec![
            Span::styled(format!("{:<22}", band.label()), Style::default().fg(color)),
            Span::styled(format!("{}", count), Style::default().fg(palette.fg)),
        ]));
    }
    let bands = Paragraph::new(bands).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title("Performance"),
    );
    f.render_widget(bands, bottom[0]);

    let mut recent = Text::default();
    for result in view.recent_page(now) {
        let color = match Band::of(result.score) {
            Band::Excellent | Band::Good => palette.success,
            Band::Fair => palette.warning,
            Band::NeedsWork => palette.danger,
        };
        recent.push_line(Line::from(vec![
            Span::styled(format!("{:>3}%  ", result.score), Style::default().fg(color)),
            Span::styled(truncate_string(&result.title, 28), Style::default().fg(palette.fg)),
            Span::styled(
                format!("  {}", format_date_time(&result.created_at)),
                Style::default().fg(palette.muted),
            ),
        ]));
    }
    recent.push_line(pagination_line(&view.pagination(now), palette));
    let recent = Paragraph::new(recent).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title("Recent attempts"),
    );
    f.render_widget(recent, bottom[1]);
}

fn draw_summary_cards(
    f: &mut Frame,
    view: &AnalyticsView,
    area: Rect,
    palette: &Palette,
    now: DateTime<Utc>,
) {
    let summary = view.summary(now);
    let trend_color = if summary.trend > 0 {
        palette.success
    } else if summary.trend < 0 {
        palette.danger
    } else {
        palette.muted
    };
    let cards = [
        ("Total quizzes", summary.total.to_string(), palette.fg),
        ("Average score", format!("{}%", summary.average), palette.fg),
        ("Best score", format!("{}%", summary.highest), palette.success),
        ("Trend", format!("{:+}%", summary.trend), trend_color),
    ];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    for ((label, value, color), column) in cards.into_iter().zip(columns.iter()) {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(label, Style::default().fg(palette.muted))),
            Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        );
        f.render_widget(card, *column);
    }
}
