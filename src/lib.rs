//! castlist: a terminal episode list for feed and podcast sources.
//!
//! The crate is split into pure logic that can be tested without a terminal
//! and the ratatui shell that drives it:
//!
//! - [`episodes`] - episode model, list derivation and keyboard selection
//! - [`digest`] - HTML description to Markdown-like digest conversion
//! - [`store`] - the task that owns the library and applies read-state actions
//! - [`app`] - application state shared by input handling and rendering
//! - [`ui`] - event loop, input dispatch and widgets

pub mod app;
pub mod config;
pub mod digest;
pub mod episodes;
pub mod keybindings;
pub mod store;
pub mod theme;
pub mod ui;
pub mod util;
