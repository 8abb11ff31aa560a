use crate::app::{App, Focus};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.focus {
            Focus::Sources => Cow::Borrowed("[j/k]source [Tab]episodes [A]ll read [?]help [q]uit"),
            Focus::Episodes => Cow::Borrowed(
                "[←/→]prev/next [j/k]scroll [s]ort [L]oad more [A]ll read [Esc]clear [?]help [q]uit",
            ),
        }
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
