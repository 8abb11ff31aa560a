//! Unicode-aware text helpers for terminal rendering.

mod text;

pub use text::{display_width, fit_line, strip_control_chars, truncate_to_width};
