use crate::app::{Toast, ToastKind};
use crate::pagination::{PageItem, Pagination};
use crate::theme::Palette;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct ScreenLayout {
    pub header_area: Rect,
    pub body_area: Rect,
    pub help_area: Rect,
}

pub fn calculate_screen_chunks(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    ScreenLayout {
        header_area: chunks[0],
        body_area: chunks[1],
        help_area: chunks[2],
    }
}

/// A `width` x `height` box centred in `area`, clipped to it.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn draw_header(f: &mut Frame, area: Rect, title: &str, right: Option<&str>, palette: &Palette) {
    let mut spans = vec![Span::styled(
        title.to_string(),
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(right) = right {
        spans.push(Span::styled(
            format!("  ·  {}", right),
            Style::default().fg(palette.muted),
        ));
    }
    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        );
    f.render_widget(header, area);
}

/// Key hints as "key action" pairs, keys highlighted.
pub fn help_line(keys: &[(&str, &str)], palette: &Palette) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, action)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::from("  "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {}", action),
            Style::default().fg(palette.fg),
        ));
    }
    Line::from(spans)
}

pub fn draw_help(f: &mut Frame, area: Rect, keys: &[(&str, &str)], palette: &Palette) {
    let help = Paragraph::new(help_line(keys, palette))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        );
    f.render_widget(help, area);
}

/// "‹ 1 2 … 7 ›" with the current page highlighted. Empty when everything
/// fits on one page.
pub fn pagination_line(pagination: &Pagination, palette: &Palette) -> Line<'static> {
    if !pagination.is_visible() {
        return Line::default();
    }
    let enabled = Style::default().fg(palette.fg);
    let disabled = Style::default().fg(palette.muted);
    let mut spans = vec![Span::styled(
        "‹ ",
        if pagination.has_previous() { enabled } else { disabled },
    )];
    for item in pagination.visible_pages() {
        match item {
            PageItem::Page(page) if page == pagination.current_page() => spans.push(Span::styled(
                format!("[{}] ", page),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            PageItem::Page(page) => spans.push(Span::styled(format!("{} ", page), enabled)),
            PageItem::Ellipsis => spans.push(Span::styled("… ", disabled)),
        }
    }
    spans.push(Span::styled(
        "›",
        if pagination.has_next() { enabled } else { disabled },
    ));
    Line::from(spans)
}

fn toast_color(kind: ToastKind, palette: &Palette) -> ratatui::style::Color {
    match kind {
        ToastKind::Success => palette.success,
        ToastKind::Info => palette.accent,
        ToastKind::Warning => palette.warning,
        ToastKind::Error => palette.danger,
    }
}

/// Stack notifications in the top-right corner, newest at the bottom.
pub fn draw_toasts(f: &mut Frame, toasts: &[Toast], palette: &Palette) {
    let area = f.area();
    let width = 44.min(area.width);
    let mut y = area.y + 1;
    for toast in toasts {
        let height = 3;
        if y + height > area.bottom() {
            break;
        }
        let rect = Rect {
            x: area.right().saturating_sub(width + 1),
            y,
            width,
            height,
        };
        let color = toast_color(toast.kind, palette);
        let widget = Paragraph::new(toast.message.as_str())
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(widget, rect);
        y += height;
    }
}

/// Single-line yes/no dialog over the current screen.
pub fn draw_confirm(f: &mut Frame, title: &str, message: &str, palette: &Palette) {
    let rect = centered_rect(56, 7, f.area());
    let text = vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(palette.fg),
        )),
        Line::from(""),
        help_line(&[("y", "Yes"), ("n", "No")], palette),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!(" {} ", title),
                    Style::default()
                        .fg(palette.warning)
                        .add_modifier(Modifier::BOLD),
                ))
                .border_style(Style::default().fg(palette.warning)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(dialog, rect);
}
