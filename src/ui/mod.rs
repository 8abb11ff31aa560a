//! Terminal user interface.
//!
//! - `loop_runner` - main event loop and terminal management
//! - `input` - keyboard dispatch through the keybinding registry
//! - `events` - store event processing
//! - `render` - layout and overlays
//! - `sources` - source list panel
//! - `episodes` - episode list panel
//! - `preview` - styled digest previews
//! - `status` - status bar
//! - `help` - keybinding overlay

mod episodes;
mod events;
mod help;
mod input;
mod loop_runner;
pub mod preview;
mod render;
mod sources;
mod status;

pub use episodes::format_pub_date;
pub use loop_runner::{run, Action};
