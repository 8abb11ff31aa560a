use crate::app::{App, Focus};
use crate::episodes::{is_active, parse_pub_date};
use crate::util::fit_line;
use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Format a pubDate as local `YYYY-MM-DD HH:MM`, falling back to the raw text.
pub fn format_pub_date(raw: &str) -> String {
    parse_pub_date(raw)
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Render the episode list panel.
///
/// Scrolls by whole episodes starting at `app.list.scroll`, and records how
/// many fit in `app.list.visible_items` for navigation.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    // Layout can produce zero-sized rects during resize
    if area.width < 3 || area.height < 3 {
        return;
    }

    let border_style = if app.focus == Focus::Episodes {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let title = match app.active_source() {
        Some(source) => format!("Episodes - {}", source.title),
        None => "Episodes".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    let mut lines: Vec<Line<'static>> = Vec::with_capacity(inner_height);
    lines.push(header_line(app, inner_width));
    lines.push(Line::from(""));

    if app.episodes().is_empty() {
        lines.push(Line::from(Span::styled(
            "No episodes in this source",
            app.style("empty_state"),
        )));
        app.list.visible_items = 0;
        f.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    // Collect rows to draw first; previews need `&mut App` for the cache
    let rows: Vec<(usize, String, String, bool, bool)> = app
        .derived()
        .skip(app.list.scroll)
        .map(|(index, episode)| {
            (
                index,
                fit_line(&episode.title, inner_width.saturating_sub(2)),
                format_pub_date(&episode.pub_date),
                episode.read,
                is_active(episode, app.active_item.as_ref()),
            )
        })
        .collect();

    let mut visible_items = 0;
    for (index, title, date, read, active) in rows {
        let preview = app.digest_preview(index);
        // Title, date, preview, separator
        let needed = 3 + preview.len();
        if lines.len() + needed > inner_height && visible_items > 0 {
            break;
        }

        let title_style = if active {
            app.style("episode_active")
        } else if read {
            app.style("episode_read")
        } else {
            app.style("episode_title")
        };
        let marker = if active { "▶ " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(marker, title_style),
            Span::styled(title, title_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", date),
            app.style("episode_date"),
        )));
        for line in preview.iter() {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(line.spans.iter().map(|s| {
                if read {
                    s.clone().patch_style(app.style("episode_read"))
                } else {
                    s.clone()
                }
            }));
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(Span::styled(
            "─".repeat(inner_width),
            app.style("episode_separator"),
        )));
        visible_items += 1;
    }
    app.list.visible_items = visible_items;

    let shown_all = app.list.scroll + visible_items >= app.derived_len();
    if app.has_more() && shown_all && lines.len() < inner_height {
        let remaining = app.episodes().len() - app.derived_len();
        lines.push(Line::from(Span::styled(
            format!(" Load more ({} remaining) ", remaining),
            app.style("load_more"),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// "N in total", sort order and action hints.
fn header_line(app: &App, width: usize) -> Line<'static> {
    let total = app.episodes().len();
    let hints = fit_line(
        &format!("  {}  [s]ort  [A] mark all read", app.list.order.name()),
        width.saturating_sub(12),
    );
    Line::from(vec![
        Span::styled(format!("{} in total", total), app.style("list_count")),
        Span::styled(hints, app.style("list_header")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pub_date_fallback() {
        assert_eq!(format_pub_date("not a date"), "not a date");
        assert_eq!(format_pub_date(""), "");
    }

    #[test]
    fn test_format_pub_date_shape() {
        let formatted = format_pub_date("2024-01-03T12:30:00Z");
        // Local offset varies; the shape does not
        assert_eq!(formatted.len(), "2024-01-03 12:30".len());
        assert_eq!(&formatted[4..5], "-");
        assert_eq!(&formatted[13..14], ":");
    }
}
