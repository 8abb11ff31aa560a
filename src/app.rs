use crate::config::Config;
use crate::digest::to_digest;
use crate::episodes::{self, Direction, Episode, SortOrder, Source};
use crate::keybindings::KeybindingRegistry;
use crate::store::{SourceUpdate, StoreAction, StoreHandle};
use crate::theme::{StyleMap, ThemeVariant};
use crate::ui::preview::render_digest;
use ratatui::style::Style;
use ratatui::text::Line;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// Events
// ============================================================================

/// Events delivered to the UI loop from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// The store changed a source's episodes.
    SourceUpdated(SourceUpdate),
}

// ============================================================================
// View and Focus
// ============================================================================

/// Which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sources,
    Episodes,
}

/// Pending confirmation for actions that touch many episodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    MarkAllRead { source_id: String, title: String },
}

/// View state owned by the episode panel. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeListState {
    /// Pages currently shown (at least 1).
    pub page: usize,
    pub order: SortOrder,
    /// Index of the first derived episode drawn at the top of the panel.
    pub scroll: usize,
    /// Rows that fit in the panel at the last render.
    pub visible_items: usize,
}

impl EpisodeListState {
    fn new(order: SortOrder) -> Self {
        Self {
            page: 1,
            order,
            scroll: 0,
            visible_items: 0,
        }
    }
}

// ============================================================================
// Navigation Listener
// ============================================================================

/// Keyboard navigation bound to one derivation of the episode list.
///
/// A listener is registered for each derived list and released when the list
/// is derived again or the app tears down, so there is never more than one
/// live listener and none outlives the list it navigates. The active episode
/// is passed in at event time rather than captured.
pub struct NavigationListener {
    episodes: Arc<Vec<Episode>>,
    derived: Arc<[usize]>,
    generation: u64,
}

impl NavigationListener {
    fn register(episodes: Arc<Vec<Episode>>, derived: Arc<[usize]>, generation: u64) -> Self {
        tracing::trace!(generation, items = derived.len(), "Navigation listener registered");
        Self {
            episodes,
            derived,
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolve a navigation signal to (derived index, episode).
    pub fn handle(&self, active: Option<&Episode>, direction: Direction) -> Option<(usize, Episode)> {
        let list: Vec<&Episode> = self.derived.iter().map(|&i| &self.episodes[i]).collect();
        let index = episodes::step(&list, active, direction)?;
        Some((index, list[index].clone()))
    }
}

impl Drop for NavigationListener {
    fn drop(&mut self) {
        tracing::trace!(generation = self.generation, "Navigation listener released");
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
pub struct App {
    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    // Data (props from the store)
    pub sources: Vec<Source>,
    pub selected_source: usize,

    // UI state
    pub focus: Focus,
    pub list: EpisodeListState,
    pub page_size: usize,
    pub digest_lines: usize,
    pub mark_read_on_select: bool,
    pub confirm_mark_all_read: bool,

    /// Selected episode. Kept as-is when the list is re-derived, even if it
    /// no longer appears in it.
    pub active_item: Option<Episode>,

    /// Indices into the selected source's episodes, in display order.
    derived: Arc<[usize]>,
    listener: Option<NavigationListener>,
    listener_generation: u64,

    /// Rendered digest previews keyed by episode index in the selected
    /// source. Cleared whenever that source, its episodes, or the theme change.
    digest_cache: HashMap<usize, Arc<Vec<Line<'static>>>>,

    store: StoreHandle,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    /// Dirty flag to skip unnecessary frame renders.
    pub needs_redraw: bool,

    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub pending_confirm: Option<ConfirmAction>,
}

impl App {
    pub fn new(sources: Vec<Source>, store: StoreHandle, config: &Config) -> Self {
        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        });

        let mut keybindings = KeybindingRegistry::new();
        let warnings = keybindings.apply_overrides(&config.keybindings);
        for warning in &warnings {
            tracing::warn!(warning = %warning, "Keybinding override ignored");
        }

        let mut app = Self {
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            keybindings,
            sources,
            selected_source: 0,
            focus: Focus::Episodes,
            list: EpisodeListState::new(config.sort_order()),
            page_size: config.page_size.max(1),
            digest_lines: config.digest_lines,
            mark_read_on_select: config.mark_read_on_select,
            confirm_mark_all_read: config.confirm_mark_all_read,
            active_item: None,
            derived: Arc::from(Vec::new()),
            listener: None,
            listener_generation: 0,
            digest_cache: HashMap::new(),
            store,
            status_message: None,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
            pending_confirm: None,
        };

        if let Some(first) = warnings.into_iter().next() {
            app.set_status(first);
        }
        app.rederive();
        app
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.digest_cache.clear();
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant and return its name.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    // ------------------------------------------------------------------------
    // Derived list
    // ------------------------------------------------------------------------

    pub fn active_source(&self) -> Option<&Source> {
        self.sources.get(self.selected_source)
    }

    /// All episodes of the selected source, unsorted.
    pub fn episodes(&self) -> &[Episode] {
        self.active_source()
            .map(|s| s.episodes.as_slice())
            .unwrap_or(&[])
    }

    /// Displayed episodes in order, paired with their index in `episodes()`.
    pub fn derived(&self) -> impl Iterator<Item = (usize, &Episode)> + '_ {
        let episodes = self.episodes();
        self.derived.iter().map(move |&i| (i, &episodes[i]))
    }

    pub fn derived_len(&self) -> usize {
        self.derived.len()
    }

    /// Whether a "load more" control should be shown.
    pub fn has_more(&self) -> bool {
        episodes::has_more(self.episodes().len(), self.list.page, self.page_size)
    }

    pub fn listener_generation(&self) -> Option<u64> {
        self.listener.as_ref().map(NavigationListener::generation)
    }

    /// Recompute the displayed list and re-register the navigation listener.
    ///
    /// The active episode is left untouched.
    pub fn rederive(&mut self) {
        let episodes = self
            .active_source()
            .map(|s| Arc::clone(&s.episodes))
            .unwrap_or_default();
        let indices =
            episodes::derive_indices(&episodes, self.list.order, self.list.page, self.page_size);
        self.derived = Arc::from(indices);

        // Release the old listener before the new one exists
        self.listener = None;
        self.listener_generation = self.listener_generation.wrapping_add(1);
        self.listener = Some(NavigationListener::register(
            episodes,
            Arc::clone(&self.derived),
            self.listener_generation,
        ));

        self.list.scroll = self.list.scroll.min(self.derived.len().saturating_sub(1));
        self.needs_redraw = true;
    }

    /// Release the navigation listener.
    pub fn teardown(&mut self) {
        self.listener = None;
    }

    // ------------------------------------------------------------------------
    // View state operations
    // ------------------------------------------------------------------------

    /// Switch the active source. Resets scroll and page; keeps the active episode.
    pub fn select_source(&mut self, index: usize) {
        if index == self.selected_source || index >= self.sources.len() {
            return;
        }
        self.selected_source = index;
        self.list.page = 1;
        self.list.scroll = 0;
        self.digest_cache.clear();
        self.rederive();
        tracing::debug!(
            source = %self.sources[index].title,
            episodes = self.sources[index].episodes.len(),
            "Selected source"
        );
    }

    /// Flip newest/oldest first. Scroll returns to the top.
    pub fn toggle_sort(&mut self) {
        self.list.order = self.list.order.toggle();
        self.list.scroll = 0;
        self.rederive();
        self.set_status(format!("Sorted {}", self.list.order.name()));
    }

    /// Grow the visible window by one page. Returns false if nothing remains.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.list.page += 1;
        self.rederive();
        tracing::debug!(page = self.list.page, shown = self.derived.len(), "Loaded more episodes");
        true
    }

    /// Handle a next/previous signal through the current listener.
    pub fn navigate(&mut self, direction: Direction) {
        let Some(listener) = self.listener.as_ref() else {
            return;
        };
        let Some((index, episode)) = listener.handle(self.active_item.as_ref(), direction) else {
            return;
        };
        self.set_active_item(Some(episode));
        self.ensure_visible(index);
    }

    /// Setter for the active episode.
    ///
    /// When `mark_read_on_select` is set, an unread episode is also reported
    /// to the store.
    pub fn set_active_item(&mut self, item: Option<Episode>) {
        if let Some(episode) = item.as_ref() {
            if self.mark_read_on_select && !episode.read {
                if let (Some(source), Some(key)) = (self.active_source(), episode.key()) {
                    self.store.dispatch(StoreAction::MarkRead {
                        source_id: source.id.clone(),
                        key,
                    });
                }
            }
        }
        self.active_item = item;
        self.needs_redraw = true;
    }

    pub fn clear_selection(&mut self) {
        self.set_active_item(None);
    }

    /// Ask to mark the selected source read, confirming first if configured.
    pub fn request_mark_all_read(&mut self) {
        let Some(source) = self.active_source() else {
            return;
        };
        if self.confirm_mark_all_read {
            self.pending_confirm = Some(ConfirmAction::MarkAllRead {
                source_id: source.id.clone(),
                title: source.title.clone(),
            });
        } else {
            let id = source.id.clone();
            self.mark_all_read(&id);
        }
    }

    /// Dispatch "read all" for a source. Fire-and-forget.
    pub fn mark_all_read(&mut self, source_id: &str) {
        self.store.dispatch(StoreAction::ReadAll {
            source_id: source_id.to_string(),
        });
        self.set_status("Marking all episodes as read");
    }

    /// Replace a source's episodes with the store's version.
    pub fn apply_source_update(&mut self, update: SourceUpdate) {
        let Some(pos) = self.sources.iter().position(|s| s.id == update.source_id) else {
            tracing::debug!(source_id = %update.source_id, "Update for unknown source ignored");
            return;
        };
        self.sources[pos].episodes = update.episodes;

        if pos == self.selected_source {
            // Refresh the active episode's copy so its read state is current
            if let Some(active) = self.active_item.as_ref() {
                let fresh = self.sources[pos]
                    .episodes
                    .iter()
                    .find(|e| e.same_identity(active))
                    .cloned();
                if let Some(fresh) = fresh {
                    self.active_item = Some(fresh);
                }
            }
            self.digest_cache.clear();
            self.rederive();
        }
        self.needs_redraw = true;
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sources => Focus::Episodes,
            Focus::Episodes => Focus::Sources,
        };
    }

    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Sources => self.select_source(self.selected_source + 1),
            Focus::Episodes => self.scroll_down(),
        }
    }

    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Sources => {
                if let Some(prev) = self.selected_source.checked_sub(1) {
                    self.select_source(prev);
                }
            }
            Focus::Episodes => self.scroll_up(),
        }
    }

    pub fn scroll_down(&mut self) {
        // The load-more row counts as one more item
        let rows = self.derived.len() + usize::from(self.has_more());
        if self.list.scroll + 1 < rows {
            self.list.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.list.scroll = self.list.scroll.saturating_sub(1);
    }

    /// Adjust scroll so the derived item at `index` is on screen.
    pub fn ensure_visible(&mut self, index: usize) {
        if index < self.list.scroll {
            self.list.scroll = index;
        } else if self.list.visible_items > 0 && index >= self.list.scroll + self.list.visible_items
        {
            self.list.scroll = index + 1 - self.list.visible_items;
        }
    }

    // ------------------------------------------------------------------------
    // Digest previews
    // ------------------------------------------------------------------------

    /// Styled digest preview for an episode of the selected source.
    pub fn digest_preview(&mut self, episode_index: usize) -> Arc<Vec<Line<'static>>> {
        if let Some(lines) = self.digest_cache.get(&episode_index) {
            return Arc::clone(lines);
        }
        let description = self
            .episodes()
            .get(episode_index)
            .and_then(|e| e.description.as_deref());
        let digest = to_digest(description);
        let lines = Arc::new(render_digest(&digest, &self.theme, self.digest_lines));
        self.digest_cache.insert(episode_index, Arc::clone(&lines));
        lines
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Drop the status message once it has expired. Returns true if cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, at)) = &self.status_message {
            if at.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episodes::EpisodeKey;
    use tokio::sync::mpsc;

    fn ep(guid: &str, date: &str) -> Episode {
        Episode {
            title: guid.to_uppercase(),
            guid: Some(guid.to_string()),
            pub_date: date.to_string(),
            description: Some(format!("<p>About {}</p>", guid)),
            ..Default::default()
        }
    }

    fn source(id: &str, episodes: Vec<Episode>) -> Source {
        Source {
            id: id.to_string(),
            title: id.to_uppercase(),
            url: None,
            episodes: Arc::new(episodes),
        }
    }

    fn test_app(config: Config) -> (App, mpsc::Receiver<StoreAction>) {
        let (tx, rx) = mpsc::channel(16);
        let sources = vec![
            source(
                "news",
                vec![
                    ep("a", "2024-01-01"),
                    ep("b", "2024-01-03"),
                    ep("c", "2024-01-02"),
                ],
            ),
            source("talk", vec![ep("x", "2023-05-01")]),
            source("empty", Vec::new()),
        ];
        (App::new(sources, StoreHandle::from_sender(tx), &config), rx)
    }

    fn derived_guids(app: &App) -> Vec<String> {
        app.derived()
            .map(|(_, e)| e.guid.clone().unwrap_or_default())
            .collect()
    }

    fn active_guid(app: &App) -> Option<String> {
        app.active_item.as_ref().and_then(|e| e.guid.clone())
    }

    #[test]
    fn test_initial_derivation_newest_first() {
        let (app, _rx) = test_app(Config::default());
        assert_eq!(derived_guids(&app), ["b", "c", "a"]);
        assert!(app.active_item.is_none());
        assert!(!app.has_more());
    }

    #[test]
    fn test_navigation_walks_derived_list() {
        let (mut app, _rx) = test_app(Config::default());
        app.navigate(Direction::Next);
        assert_eq!(active_guid(&app).as_deref(), Some("b"));
        app.navigate(Direction::Next);
        app.navigate(Direction::Next);
        assert_eq!(active_guid(&app).as_deref(), Some("a"));
        app.navigate(Direction::Next);
        assert_eq!(active_guid(&app).as_deref(), Some("a"));
        app.navigate(Direction::Previous);
        assert_eq!(active_guid(&app).as_deref(), Some("c"));
    }

    #[test]
    fn test_selection_dispatches_mark_read() {
        let (mut app, mut rx) = test_app(Config::default());
        app.navigate(Direction::Next);
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreAction::MarkRead {
                source_id: "news".to_string(),
                key: EpisodeKey::Guid("b".to_string()),
            }
        );
    }

    #[test]
    fn test_mark_read_on_select_disabled() {
        let config = Config {
            mark_read_on_select: false,
            ..Config::default()
        };
        let (mut app, mut rx) = test_app(config);
        app.navigate(Direction::Next);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stale_selection_is_kept_after_source_change() {
        let (mut app, _rx) = test_app(Config::default());
        app.navigate(Direction::Next);
        app.select_source(1);

        assert_eq!(active_guid(&app).as_deref(), Some("b"));
        assert_eq!(derived_guids(&app), ["x"]);
        // Stale active item: navigation is a no-op
        app.navigate(Direction::Next);
        assert_eq!(active_guid(&app).as_deref(), Some("b"));

        app.clear_selection();
        app.navigate(Direction::Next);
        assert_eq!(active_guid(&app).as_deref(), Some("x"));
    }

    #[test]
    fn test_rederive_replaces_listener() {
        let (mut app, _rx) = test_app(Config::default());
        let first = app.listener_generation().unwrap();
        app.toggle_sort();
        let second = app.listener_generation().unwrap();
        assert!(second > first);
        app.teardown();
        assert_eq!(app.listener_generation(), None);
    }

    #[test]
    fn test_toggle_sort_resets_scroll() {
        let (mut app, _rx) = test_app(Config::default());
        app.scroll_down();
        assert_eq!(app.list.scroll, 1);
        app.toggle_sort();
        assert_eq!(app.list.scroll, 0);
        assert_eq!(derived_guids(&app), ["a", "c", "b"]);
    }

    #[test]
    fn test_source_change_resets_scroll_and_page() {
        let config = Config {
            page_size: 1,
            ..Config::default()
        };
        let (mut app, _rx) = test_app(config);
        assert!(app.load_more());
        app.scroll_down();
        assert_eq!(app.list.page, 2);

        app.select_source(1);
        assert_eq!(app.list.page, 1);
        assert_eq!(app.list.scroll, 0);
    }

    #[test]
    fn test_load_more_extends_prefix() {
        let config = Config {
            page_size: 2,
            ..Config::default()
        };
        let (mut app, _rx) = test_app(config);
        assert_eq!(derived_guids(&app), ["b", "c"]);
        assert!(app.has_more());
        assert!(app.load_more());
        assert_eq!(derived_guids(&app), ["b", "c", "a"]);
        assert!(!app.has_more());
        assert!(!app.load_more());
    }

    #[test]
    fn test_empty_source() {
        let (mut app, _rx) = test_app(Config::default());
        app.select_source(2);
        assert_eq!(app.derived_len(), 0);
        app.navigate(Direction::Next);
        assert!(app.active_item.is_none());
        app.scroll_down();
        assert_eq!(app.list.scroll, 0);
    }

    #[test]
    fn test_mark_all_read_dispatches_for_active_source() {
        let (mut app, mut rx) = test_app(Config::default());
        app.select_source(1);
        app.request_mark_all_read();
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreAction::ReadAll {
                source_id: "talk".to_string()
            }
        );
        assert!(app.pending_confirm.is_none());
    }

    #[test]
    fn test_mark_all_read_confirmation() {
        let config = Config {
            confirm_mark_all_read: true,
            ..Config::default()
        };
        let (mut app, mut rx) = test_app(config);
        app.request_mark_all_read();
        assert!(rx.try_recv().is_err());
        assert_eq!(
            app.pending_confirm,
            Some(ConfirmAction::MarkAllRead {
                source_id: "news".to_string(),
                title: "NEWS".to_string()
            })
        );
    }

    #[test]
    fn test_source_update_refreshes_list_and_active_item() {
        let (mut app, _rx) = test_app(Config::default());
        app.navigate(Direction::Next);

        let mut updated: Vec<Episode> = app.episodes().to_vec();
        for e in &mut updated {
            e.read = true;
        }
        app.apply_source_update(SourceUpdate {
            source_id: "news".to_string(),
            episodes: Arc::new(updated),
            changed: 3,
        });

        assert!(app.derived().all(|(_, e)| e.read));
        assert!(app.active_item.as_ref().is_some_and(|e| e.read));
    }

    #[test]
    fn test_ensure_visible() {
        let (mut app, _rx) = test_app(Config::default());
        app.list.visible_items = 2;
        app.ensure_visible(2);
        assert_eq!(app.list.scroll, 1);
        app.ensure_visible(0);
        assert_eq!(app.list.scroll, 0);
    }

    #[test]
    fn test_digest_preview_is_cached() {
        let (mut app, _rx) = test_app(Config::default());
        let first = app.digest_preview(0);
        let second = app.digest_preview(0);
        assert!(Arc::ptr_eq(&first, &second));
        app.cycle_theme();
        let third = app.digest_preview(0);
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_status_expires() {
        let (mut app, _rx) = test_app(Config::default());
        app.set_status("hello");
        assert!(!app.clear_expired_status());
        app.status_message = Some(("old".into(), Instant::now() - Duration::from_secs(4)));
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }
}
