//! Handling of events from background tasks.

use crate::app::{App, AppEvent};

/// Apply an event from the store to the application state.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::SourceUpdated(update) => {
            let changed = update.changed;
            let title = app
                .sources
                .iter()
                .find(|s| s.id == update.source_id)
                .map(|s| s.title.clone());
            app.apply_source_update(update);
            // Single mark-read updates are routine; only report bulk changes
            if changed > 1 {
                if let Some(title) = title {
                    app.set_status(format!("Marked {} episodes read in {}", changed, title));
                }
            }
        }
    }
}
