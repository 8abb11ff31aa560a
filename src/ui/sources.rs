use crate::app::{App, Focus};
use crate::util::fit_line;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the source list panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Sources;
    // Borders plus the unread suffix
    let max_title = area.width.saturating_sub(10) as usize;

    let items: Vec<ListItem> = if app.sources.is_empty() {
        vec![ListItem::new(Span::styled(
            "No sources loaded",
            app.style("empty_state"),
        ))]
    } else {
        app.sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let unread = source.unread_count();
                let mut content = fit_line(&source.title, max_title);
                if unread > 0 {
                    content.push_str(&format!(" ({})", unread));
                }

                let style = if i == app.selected_source {
                    app.style("source_selected")
                } else if unread > 0 {
                    app.style("source_unread")
                } else {
                    app.style("source_normal")
                };

                ListItem::new(Line::from(Span::styled(content, style)))
            })
            .collect()
    };

    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let title = format!("Sources ({})", app.sources.len());
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    f.render_widget(list, area);
}
