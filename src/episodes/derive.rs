//! Ordered, paginated view of a source's episodes.

use super::Episode;
use std::cmp::Reverse;

/// Episodes added to the visible window per "load more".
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Display order of the episode list.
///
/// The legacy boolean flag for this is named `is_ascend`, but `true` selects
/// newest-first. [`SortOrder::from_ascend_flag`] keeps that mapping in one
/// place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    /// `true` selects newest-first.
    pub fn from_ascend_flag(is_ascend: bool) -> Self {
        if is_ascend {
            Self::NewestFirst
        } else {
            Self::OldestFirst
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::NewestFirst => Self::OldestFirst,
            Self::OldestFirst => Self::NewestFirst,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NewestFirst => "newest first",
            Self::OldestFirst => "oldest first",
        }
    }
}

/// Number of episodes visible after `page` pages.
pub fn window_len(page: usize, page_size: usize) -> usize {
    page_size.saturating_mul(page)
}

/// Whether episodes remain beyond the visible window.
pub fn has_more(total: usize, page: usize, page_size: usize) -> bool {
    total > window_len(page, page_size)
}

/// Indices into `episodes` in display order, truncated to the visible window.
///
/// Sorting is by publication timestamp and stable in both directions: equal
/// timestamps keep their input order. Unparseable dates sort after every
/// valid one when oldest-first, and therefore first when newest-first.
pub fn derive_indices(
    episodes: &[Episode],
    order: SortOrder,
    page: usize,
    page_size: usize,
) -> Vec<usize> {
    let mut keyed: Vec<(usize, (bool, Option<i64>))> = episodes
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let ts = e.published();
            (i, (ts.is_none(), ts))
        })
        .collect();

    match order {
        SortOrder::OldestFirst => keyed.sort_by_key(|(_, key)| *key),
        SortOrder::NewestFirst => keyed.sort_by_key(|(_, key)| Reverse(*key)),
    }

    keyed.truncate(window_len(page, page_size));
    keyed.into_iter().map(|(i, _)| i).collect()
}

/// Derive the displayed list.
///
/// `ascending == true` shows newest-first (see [`SortOrder::from_ascend_flag`]).
/// The result holds at most `page_size * page` episodes and is a pure
/// function of its inputs.
pub fn derive(
    episodes: &[Episode],
    ascending: bool,
    page: usize,
    page_size: usize,
) -> Vec<&Episode> {
    derive_indices(
        episodes,
        SortOrder::from_ascend_flag(ascending),
        page,
        page_size,
    )
    .into_iter()
    .map(|i| &episodes[i])
    .collect()
}
