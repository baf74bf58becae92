use crate::app::{App, EditorFocus};
use crate::models::{NoteKind, SourceKind};
use crate::theme::Palette;
use crate::ui::layout::{
    calculate_screen_chunks, draw_confirm, draw_header, draw_help, pagination_line,
};
use crate::utils::markdown::render_markdown;
use crate::utils::{truncate_string, wrapped_cursor_position};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const PREVIEW_CHARS: usize = 80;

pub fn draw_notes(f: &mut Frame, app: &App, palette: &Palette) {
    let layout = calculate_screen_chunks(f.area());
    let count = format!("{} notes", app.notes.all().len());
    draw_header(f, layout.header_area, "My Notes", Some(count.as_str()), palette);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(layout.body_area);

    let search_border = if app.search_active {
        palette.accent
    } else {
        palette.border
    };
    let query = if app.search.is_empty() && !app.search_active {
        Span::styled("Press / to search notes...", Style::default().fg(palette.muted))
    } else {
        Span::styled(app.search.value().to_string(), Style::default().fg(palette.fg))
    };
    let search = Paragraph::new(Line::from(query)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(search_border))
            .title("Search"),
    );
    f.render_widget(search, chunks[0]);
    if app.search_active {
        f.set_cursor_position((chunks[0].x + 1 + app.search.cursor() as u16, chunks[0].y + 1));
    }

    let visible = app.notes.visible();
    let mut text = Text::default();
    if visible.is_empty() {
        let message = if app.notes.all().is_empty() {
            "No notes yet. Press n to create your first note."
        } else {
            "No notes match your search."
        };
        text.push_line(Line::from(Span::styled(message, Style::default().fg(palette.muted))));
    }
    for (i, note) in visible.iter().enumerate() {
        let selected = i == app.notes.selected_index();
        let title_style = if selected {
            Style::default()
                .fg(palette.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD)
        };
        let marker = if selected { "> " } else { "  " };
        let badge = match note.kind {
            NoteKind::Transcribed => Span::styled(" [transcribed]", Style::default().fg(palette.accent)),
            NoteKind::Manual => Span::from(""),
        };
        text.push_line(Line::from(vec![
            Span::styled(marker, title_style),
            Span::styled(note.title.clone(), title_style),
            badge,
            Span::styled(format!("  {}", note.date), Style::default().fg(palette.muted)),
        ]));
        let preview = note.content.replace('\n', " ");
        text.push_line(Line::from(Span::styled(
            format!("    {}", truncate_string(&preview, PREVIEW_CHARS)),
            Style::default().fg(palette.muted),
        )));
        text.push_line(Line::from(""));
    }
    let list = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border)),
    );
    f.render_widget(list, chunks[1]);

    let pagination = app.notes.pagination();
    let mut footer = vec![];
    if pagination.total_items() > 0 {
        footer.push(Line::from(Span::styled(
            pagination.summary("notes"),
            Style::default().fg(palette.muted),
        )));
    }
    footer.push(pagination_line(&pagination, palette));
    f.render_widget(Paragraph::new(footer), chunks[2]);

    let keys: &[(&str, &str)] = if app.search_active {
        &[("Enter/Esc", "Done")]
    } else {
        &[
            ("n", "New"),
            ("Enter", "Open"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("z", "Quiz"),
            ("/", "Search"),
            ("←/→", "Page"),
            ("Esc", "Back"),
        ]
    };
    draw_help(f, layout.help_area, keys, palette);
}

pub fn draw_note_view(f: &mut Frame, app: &App, palette: &Palette) {
    let layout = calculate_screen_chunks(f.area());
    let Some(viewing) = &app.viewing else {
        return;
    };
    draw_header(f, layout.header_area, &viewing.title, Some(viewing.date.as_str()), palette);

    let content = render_markdown(&viewing.content, palette.accent);
    let body = Paragraph::new(content)
        .style(Style::default().fg(palette.fg))
        .wrap(Wrap { trim: false })
        .scroll((app.view_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        );
    f.render_widget(body, layout.body_area);

    draw_help(
        f,
        layout.help_area,
        &[("↑/↓", "Scroll"), ("e", "Edit"), ("z", "Take quiz"), ("Esc", "Back")],
        palette,
    );
}

fn editor_title(kind: SourceKind, editing: bool) -> &'static str {
    match (kind, editing) {
        (SourceKind::Note, false) => "Create New Note",
        (SourceKind::Note, true) => "Edit Note",
        (SourceKind::Transcript, _) => "Edit Transcript",
    }
}

pub fn draw_note_editor(f: &mut Frame, app: &App, palette: &Palette) {
    let layout = calculate_screen_chunks(f.area());
    let Some(editor) = &app.editor else {
        return;
    };
    let mode = if editor.preview { "Preview" } else { "Write" };
    draw_header(
        f,
        layout.header_area,
        editor_title(editor.kind, editor.id.is_some()),
        Some(mode),
        palette,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(layout.body_area);

    let focus_border = |focused: bool| {
        Style::default().fg(if focused { palette.accent } else { palette.border })
    };

    let title_focused = editor.focus == EditorFocus::Title && !editor.preview;
    let title = Paragraph::new(editor.title.value().to_string())
        .style(Style::default().fg(palette.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_border(title_focused))
                .title("Title"),
        );
    f.render_widget(title, chunks[0]);

    let content_area = chunks[1];
    if editor.preview {
        let preview = Paragraph::new(render_markdown(editor.content.value(), palette.accent))
            .style(Style::default().fg(palette.fg))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(focus_border(false))
                    .title("Preview"),
            );
        f.render_widget(preview, content_area);
    } else {
        draw_content_input(f, app, content_area, palette);
    }

    if title_focused {
        f.set_cursor_position((chunks[0].x + 1 + editor.title.cursor() as u16, chunks[0].y + 1));
    }

    let busy = app.busy.is_some() || app.notes.is_submitting();
    let save_label = if busy { "Saving..." } else { "Save" };
    draw_help(
        f,
        layout.help_area,
        &[
            ("Ctrl+S", save_label),
            ("Ctrl+P", "Preview"),
            ("Tab", "Switch field"),
            ("Esc", "Cancel"),
        ],
        palette,
    );
}

/// Markdown source with the cursor kept in view.
fn draw_content_input(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let Some(editor) = &app.editor else {
        return;
    };
    let focused = editor.focus == EditorFocus::Content;
    let text_width = area.width.saturating_sub(2).max(1) as usize;
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let (cursor_line, cursor_col) =
        wrapped_cursor_position(editor.content.value(), editor.content.cursor(), text_width);
    let scroll = cursor_line.saturating_sub(visible_height - 1) as u16;

    let body = if editor.content.is_empty() {
        Text::from(Span::styled(
            "Write your note in markdown...",
            Style::default().fg(palette.muted),
        ))
    } else {
        Text::from(editor.content.value().to_string())
    };
    let content = Paragraph::new(body)
        .style(Style::default().fg(palette.fg))
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused {
                    palette.accent
                } else {
                    palette.border
                }))
                .title("Content (markdown)"),
        );
    f.render_widget(content, area);

    if focused {
        let x = area.x + 1 + cursor_col as u16;
        let y = area.y + 1 + (cursor_line as u16).saturating_sub(scroll);
        f.set_cursor_position((x, y));
    }
}

pub fn draw_delete_confirmation(f: &mut Frame, app: &App, palette: &Palette) {
    let Some(target) = &app.delete_target else {
        return;
    };
    let noun = match target.kind {
        SourceKind::Note => "note",
        SourceKind::Transcript => "transcript",
    };
    let message = format!(
        "Delete {} \"{}\"? This cannot be undone.",
        noun,
        truncate_string(&target.title, 30)
    );
    draw_confirm(f, "Delete", &message, palette);
}
