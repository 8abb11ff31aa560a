//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role and its `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Source list --
    pub source_normal: Style,
    pub source_selected: Style,
    pub source_unread: Style,

    // -- Episode list --
    pub episode_title: Style,
    pub episode_read: Style,
    pub episode_active: Style,
    pub episode_date: Style,
    pub episode_separator: Style,
    pub list_count: Style,
    pub list_header: Style,
    pub load_more: Style,
    pub empty_state: Style,

    // -- Digest preview --
    pub digest_body: Style,
    pub digest_heading: Style,
    pub digest_strong: Style,
    pub digest_emphasis: Style,
    pub digest_code: Style,
    pub digest_link: Style,
    pub digest_image: Style,
    pub digest_quote: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub overlay_heading: Style,
    pub overlay_hint: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            source_normal: Style::default(),
            source_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            source_unread: Style::default().add_modifier(Modifier::BOLD),

            episode_title: Style::default().add_modifier(Modifier::BOLD),
            episode_read: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            episode_active: Style::default().bg(Color::Blue).fg(Color::White),
            episode_date: Style::default().fg(Color::DarkGray),
            episode_separator: Style::default().fg(Color::DarkGray),
            list_count: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            list_header: Style::default().fg(Color::Gray),
            load_more: Style::default()
                .bg(Color::Black)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            empty_state: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            digest_body: Style::default().fg(Color::Gray),
            digest_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            digest_strong: Style::default().add_modifier(Modifier::BOLD),
            digest_emphasis: Style::default().add_modifier(Modifier::ITALIC),
            digest_code: Style::default().fg(Color::Yellow),
            digest_link: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
            digest_image: Style::default().fg(Color::Blue),
            digest_quote: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            overlay_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            overlay_hint: Style::default().fg(Color::DarkGray),
        }
    }

    fn light() -> Self {
        Self {
            source_normal: Style::default().fg(Color::Black),
            source_selected: Style::default().bg(Color::Blue).fg(Color::White),
            source_unread: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            episode_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            episode_read: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
            episode_active: Style::default().bg(Color::LightBlue).fg(Color::Black),
            episode_date: Style::default().fg(Color::DarkGray),
            episode_separator: Style::default().fg(Color::Gray),
            list_count: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            list_header: Style::default().fg(Color::DarkGray),
            load_more: Style::default()
                .bg(Color::Black)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            empty_state: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),

            digest_body: Style::default().fg(Color::DarkGray),
            digest_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            digest_strong: Style::default().add_modifier(Modifier::BOLD),
            digest_emphasis: Style::default().add_modifier(Modifier::ITALIC),
            digest_code: Style::default().fg(Color::Magenta),
            digest_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            digest_image: Style::default().fg(Color::Blue),
            digest_quote: Style::default().fg(Color::Gray),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            overlay_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            overlay_hint: Style::default().fg(Color::DarkGray),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// Resolves role names (e.g. `"episode_active"`) to their concrete `Style`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 25] = [
    "source_normal",
    "source_selected",
    "source_unread",
    "episode_title",
    "episode_read",
    "episode_active",
    "episode_date",
    "episode_separator",
    "list_count",
    "list_header",
    "load_more",
    "empty_state",
    "digest_body",
    "digest_heading",
    "digest_strong",
    "digest_emphasis",
    "digest_code",
    "digest_link",
    "digest_image",
    "digest_quote",
    "status_bar",
    "panel_border",
    "panel_border_focused",
    "overlay_heading",
    "overlay_hint",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 25] = [
            p.source_normal,
            p.source_selected,
            p.source_unread,
            p.episode_title,
            p.episode_read,
            p.episode_active,
            p.episode_date,
            p.episode_separator,
            p.list_count,
            p.list_header,
            p.load_more,
            p.empty_state,
            p.digest_body,
            p.digest_heading,
            p.digest_strong,
            p.digest_emphasis,
            p.digest_code,
            p.digest_link,
            p.digest_image,
            p.digest_quote,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
            p.overlay_heading,
            p.overlay_hint,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

impl Default for StyleMap {
    fn default() -> Self {
        Self::from_palette(&ThemeVariant::Dark.palette())
    }
}
