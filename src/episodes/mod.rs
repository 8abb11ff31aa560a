//! Episode model and the pure list logic behind the episode panel.
//!
//! - [`types`] - `Episode`, `Source`, `Library` and episode identity
//! - [`derive`] - sorting and pagination of a source's episodes
//! - [`selection`] - next/previous navigation over a derived list
//!
//! Nothing here depends on the terminal, so the behaviour can be tested
//! directly.

mod derive;
mod selection;
mod types;

pub use derive::{
    derive, derive_indices, has_more, window_len, SortOrder, DEFAULT_PAGE_SIZE,
};
pub use selection::{is_active, position_of, step, Direction};
pub use types::{parse_pub_date, Episode, EpisodeKey, Library, LibraryError, Source};
