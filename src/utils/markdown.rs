//! Small markdown renderer for note bodies. Handles headings, lists, block
//! quotes, fenced code, rules, pipe tables and `**bold**` / `*italic*` /
//! `` `code` `` inline spans.

use lazy_static::lazy_static;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;

lazy_static! {
    static ref NUMBERED_ITEM: Regex = Regex::new(r"^(\d+)\.\s+(.*)$").unwrap();
    static ref HEADING: Regex = Regex::new(r"^(#{1,6})\s+(.*)$").unwrap();
    static ref INLINE: Regex = Regex::new(r"\*\*(.+?)\*\*|\*(.+?)\*|`([^`]+)`").unwrap();
}

pub fn render_markdown(content: &str, accent: Color) -> Vec<Line<'static>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut out: Vec<Line<'static>> = Vec::new();
    let mut in_code_block = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            i += 1;
            continue;
        }
        if in_code_block {
            out.push(Line::from(Span::styled(
                format!("    {}", line),
                Style::default().add_modifier(Modifier::DIM),
            )));
            i += 1;
            continue;
        }

        if is_table_row(line) && i + 1 < lines.len() && is_table_separator(lines[i + 1]) {
            let mut rows = vec![split_table_row(line)];
            i += 2;
            while i < lines.len() && is_table_row(lines[i]) && !is_table_separator(lines[i]) {
                rows.push(split_table_row(lines[i]));
                i += 1;
            }
            render_table(&rows, &mut out);
            continue;
        }

        out.push(render_line(trimmed, line, accent));
        i += 1;
    }

    out
}

fn render_line(trimmed: &str, raw: &str, accent: Color) -> Line<'static> {
    if trimmed.is_empty() {
        return Line::from("");
    }

    if let Some(caps) = HEADING.captures(trimmed) {
        let level = caps.get(1).map_or(1, |m| m.as_str().len());
        let text = caps.get(2).map_or("", |m| m.as_str()).to_string();
        let mut style = Style::default().fg(accent).add_modifier(Modifier::BOLD);
        if level == 1 {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        return Line::from(Span::styled(text, style));
    }

    if trimmed.chars().all(|c| c == '-' || c == '*' || c == '_') && trimmed.len() >= 3 {
        return Line::from(Span::styled(
            "─".repeat(40),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    if let Some(quote) = trimmed.strip_prefix("> ").or(trimmed.strip_prefix('>')) {
        let mut spans = vec![Span::styled("│ ", Style::default().fg(accent))];
        spans.extend(
            inline_spans(quote)
                .into_iter()
                .map(|s| s.patch_style(Style::default().add_modifier(Modifier::ITALIC))),
        );
        return Line::from(spans);
    }

    if let Some(item) = trimmed.strip_prefix("- ").or(trimmed.strip_prefix("* ")) {
        let indent = " ".repeat(2 + leading_spaces(raw));
        let mut spans = vec![Span::from(format!("{}• ", indent))];
        spans.extend(inline_spans(item));
        return Line::from(spans);
    }

    if let Some(caps) = NUMBERED_ITEM.captures(trimmed) {
        let number = caps.get(1).map_or("", |m| m.as_str());
        let item = caps.get(2).map_or("", |m| m.as_str());
        let mut spans = vec![Span::from(format!("  {}. ", number))];
        spans.extend(inline_spans(item));
        return Line::from(spans);
    }

    Line::from(inline_spans(raw))
}

fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}

fn inline_spans(text: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Span::from(text[last..whole.start()].to_string()));
        }
        if let Some(bold) = caps.get(1) {
            spans.push(Span::styled(
                bold.as_str().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        } else if let Some(italic) = caps.get(2) {
            spans.push(Span::styled(
                italic.as_str().to_string(),
                Style::default().add_modifier(Modifier::ITALIC),
            ));
        } else if let Some(code) = caps.get(3) {
            spans.push(Span::styled(
                code.as_str().to_string(),
                Style::default().add_modifier(Modifier::REVERSED),
            ));
        }
        last = whole.end();
    }

    if last < text.len() || spans.is_empty() {
        spans.push(Span::from(text[last..].to_string()));
    }
    spans
}

fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|') || (trimmed.contains('|') && trimmed.ends_with('|'))
}

fn is_table_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('|')
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

fn split_table_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// Tables become "Header: value" blocks per row so they survive narrow panes.
fn render_table(rows: &[Vec<String>], out: &mut Vec<Line<'static>>) {
    let Some((headers, body)) = rows.split_first() else {
        return;
    };

    if body.is_empty() {
        out.push(Line::from(Span::styled(
            headers.join(" │ "),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        return;
    }

    for (n, row) in body.iter().enumerate() {
        if n > 0 {
            out.push(Line::from(""));
        }
        for (col, cell) in row.iter().enumerate() {
            let header = headers.get(col).map(String::as_str).unwrap_or("?");
            let mut spans = vec![Span::styled(
                format!("{}: ", header),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            spans.extend(inline_spans(cell));
            out.push(Line::from(spans));
        }
    }
}
