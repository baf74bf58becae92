use crate::app::{App, HomeItem, HOME_ITEMS};
use crate::theme::Palette;
use crate::ui::layout::{calculate_screen_chunks, draw_header, draw_help};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

fn item_detail(app: &App, item: HomeItem) -> String {
    match item {
        HomeItem::Theme => format!("{} (current: {})", item.description(), app.theme.mode().as_str()),
        _ => item.description().to_string(),
    }
}

pub fn draw_home(f: &mut Frame, app: &App, palette: &Palette) {
    let layout = calculate_screen_chunks(f.area());

    let who = app
        .user
        .as_ref()
        .map(|u| format!("{} ({})", u.name, u.initials()));
    draw_header(f, layout.header_area, "StuNotes", who.as_deref(), palette);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(layout.body_area);

    let items: Vec<ListItem> = HOME_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let shortcut = if i < 4 {
                format!("{} ", i + 1)
            } else {
                "  ".to_string()
            };
            let style = if i == app.home_selected {
                Style::default()
                    .fg(palette.highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.fg)
            };
            let marker = if i == app.home_selected { "> " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(shortcut, Style::default().fg(palette.muted)),
                Span::styled(item.label(), style),
            ]))
        })
        .collect();
    let menu = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title("Menu"),
    );
    f.render_widget(menu, columns[0]);

    let selected = HOME_ITEMS[app.home_selected.min(HOME_ITEMS.len() - 1)];
    let mut details = vec![
        Line::from(Span::styled(
            selected.label(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(item_detail(app, selected), Style::default().fg(palette.fg))),
    ];
    if let Some(user) = &app.user {
        details.push(Line::from(""));
        details.push(Line::from(Span::styled(
            format!("Signed in as {}", user.email),
            Style::default().fg(palette.muted),
        )));
    }
    let detail = Paragraph::new(details).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title("Details"),
    );
    f.render_widget(detail, columns[1]);

    draw_help(
        f,
        layout.help_area,
        &[
            ("↑/↓", "Navigate"),
            ("Enter", "Open"),
            ("1-4", "Jump"),
            ("t", "Theme"),
            ("q", "Quit"),
        ],
        palette,
    );
}
