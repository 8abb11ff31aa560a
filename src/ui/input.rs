//! Keyboard input handling.
//!
//! Overlays capture all keys while visible; otherwise keys resolve through
//! the keybinding registry for the focused panel.

use crate::app::{App, ConfirmAction, Focus};
use crate::episodes::Direction;
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Map the focused panel to its keybinding context.
fn focus_to_context(focus: Focus) -> KbContext {
    match focus {
        Focus::Sources => KbContext::Sources,
        Focus::Episodes => KbContext::Episodes,
    }
}

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if app.show_help {
        return handle_help_input(app, code);
    }

    if app.pending_confirm.is_some() {
        return handle_confirm_input(app, code);
    }

    let context = focus_to_context(app.focus);
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };
    tracing::trace!(?action, ?context, "Key resolved");

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::NextEpisode => app.navigate(Direction::Next),
        KbAction::PreviousEpisode => app.navigate(Direction::Previous),
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::ClearSelection => app.clear_selection(),
        KbAction::ToggleSort => app.toggle_sort(),
        KbAction::MarkAllRead => app.request_mark_all_read(),
        KbAction::LoadMore => {
            if !app.load_more() {
                app.set_status("No more episodes");
            }
        }
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
    }
    app.needs_redraw = true;
    Action::Continue
}

/// Keys while the help overlay is visible: j/k scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Keys while a confirmation is pending: y confirms, n/Esc cancel.
fn handle_confirm_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(ConfirmAction::MarkAllRead { source_id, .. }) = app.pending_confirm.take() {
                app.mark_all_read(&source_id);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Action::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::episodes::{Episode, Source};
    use crate::store::{StoreAction, StoreHandle};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn ep(guid: &str, date: &str) -> Episode {
        Episode {
            title: guid.to_string(),
            guid: Some(guid.to_string()),
            pub_date: date.to_string(),
            ..Default::default()
        }
    }

    fn test_app(config: Config) -> (App, mpsc::Receiver<StoreAction>) {
        let (tx, rx) = mpsc::channel(8);
        let sources = vec![
            Source {
                id: "one".to_string(),
                title: "One".to_string(),
                url: None,
                episodes: Arc::new(vec![ep("a", "2024-01-01"), ep("b", "2024-01-02")]),
            },
            Source {
                id: "two".to_string(),
                title: "Two".to_string(),
                url: None,
                episodes: Arc::new(Vec::new()),
            },
        ];
        (App::new(sources, StoreHandle::from_sender(tx), &config), rx)
    }

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_input(app, code, KeyModifiers::NONE)
    }

    fn active(app: &App) -> Option<&str> {
        app.active_item.as_ref().and_then(|e| e.guid.as_deref())
    }

    #[test]
    fn test_arrow_keys_navigate() {
        let (mut app, _rx) = test_app(Config::default());
        press(&mut app, KeyCode::Right);
        assert_eq!(active(&app), Some("b"));
        press(&mut app, KeyCode::Right);
        assert_eq!(active(&app), Some("a"));
        press(&mut app, KeyCode::Left);
        assert_eq!(active(&app), Some("b"));
        press(&mut app, KeyCode::Esc);
        assert_eq!(active(&app), None);
    }

    #[test]
    fn test_arrows_navigate_from_source_panel() {
        let (mut app, _rx) = test_app(Config::default());
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Sources);
        press(&mut app, KeyCode::Right);
        assert_eq!(active(&app), Some("b"));
    }

    #[test]
    fn test_j_moves_source_when_focused() {
        let (mut app, _rx) = test_app(Config::default());
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_source, 1);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.selected_source, 0);
    }

    #[test]
    fn test_quit() {
        let (mut app, _rx) = test_app(Config::default());
        assert!(matches!(press(&mut app, KeyCode::Char('q')), Action::Quit));
    }

    #[test]
    fn test_confirm_flow() {
        let config = Config {
            confirm_mark_all_read: true,
            ..Config::default()
        };
        let (mut app, mut rx) = test_app(config);

        press(&mut app, KeyCode::Char('A'));
        assert!(app.pending_confirm.is_some());
        // Other keys are swallowed while the dialog is up
        press(&mut app, KeyCode::Right);
        assert_eq!(active(&app), None);

        press(&mut app, KeyCode::Char('y'));
        assert!(app.pending_confirm.is_none());
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreAction::ReadAll {
                source_id: "one".to_string()
            }
        );
    }

    #[test]
    fn test_confirm_cancel() {
        let config = Config {
            confirm_mark_all_read: true,
            ..Config::default()
        };
        let (mut app, mut rx) = test_app(config);
        press(&mut app, KeyCode::Char('A'));
        press(&mut app, KeyCode::Esc);
        assert!(app.pending_confirm.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_help_overlay_captures_keys() {
        let (mut app, _rx) = test_app(Config::default());
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        assert!(matches!(press(&mut app, KeyCode::Char('q')), Action::Continue));
        assert!(!app.show_help);
    }

    #[test]
    fn test_load_more_when_exhausted_sets_status() {
        let (mut app, _rx) = test_app(Config::default());
        press(&mut app, KeyCode::Char('L'));
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "No more episodes");
    }
}
