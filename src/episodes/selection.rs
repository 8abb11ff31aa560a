//! Keyboard navigation over a derived episode list.
//!
//! The active episode is owned by the caller. These functions only answer
//! "which element becomes active"; they never clear a stale selection.

use super::Episode;

/// Navigation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Position of `active` in `derived`, matched by identity.
pub fn position_of<E: AsRef<Episode>>(derived: &[E], active: &Episode) -> Option<usize> {
    derived
        .iter()
        .position(|e| e.as_ref().same_identity(active))
}

/// Whether `item` is the active episode.
pub fn is_active(item: &Episode, active: Option<&Episode>) -> bool {
    active.is_some_and(|a| item.same_identity(a))
}

/// Index of the element that should become active, or `None` for no change.
///
/// With nothing active, either direction selects the first element. An
/// active episode that is no longer in `derived` (stale) leaves the
/// selection unchanged, as does stepping past either end.
pub fn step<E: AsRef<Episode>>(
    derived: &[E],
    active: Option<&Episode>,
    direction: Direction,
) -> Option<usize> {
    let Some(active) = active else {
        return if derived.is_empty() { None } else { Some(0) };
    };

    let index = position_of(derived, active)?;
    match direction {
        Direction::Next if index + 1 < derived.len() => Some(index + 1),
        Direction::Previous if index > 0 => Some(index - 1),
        _ => None,
    }
}

impl AsRef<Episode> for Episode {
    fn as_ref(&self) -> &Episode {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(guid: &str) -> Episode {
        Episode {
            title: guid.to_uppercase(),
            guid: Some(guid.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_next_without_active_selects_first() {
        let list = vec![ep("a"), ep("b")];
        assert_eq!(step(&list, None, Direction::Next), Some(0));
        assert_eq!(step(&list, None, Direction::Previous), Some(0));
    }

    #[test]
    fn test_empty_list_is_noop() {
        let list: Vec<Episode> = Vec::new();
        assert_eq!(step(&list, None, Direction::Next), None);
        assert_eq!(step(&list, Some(&ep("a")), Direction::Next), None);
    }

    #[test]
    fn test_next_and_previous_move_by_one() {
        let list = vec![ep("a"), ep("b"), ep("c")];
        assert_eq!(step(&list, Some(&ep("b")), Direction::Next), Some(2));
        assert_eq!(step(&list, Some(&ep("b")), Direction::Previous), Some(0));
    }

    #[test]
    fn test_ends_are_noops() {
        let list = vec![ep("a"), ep("b"), ep("c")];
        assert_eq!(step(&list, Some(&ep("c")), Direction::Next), None);
        assert_eq!(step(&list, Some(&ep("a")), Direction::Previous), None);
    }

    #[test]
    fn test_stale_active_is_noop() {
        let list = vec![ep("a"), ep("b")];
        assert_eq!(step(&list, Some(&ep("zz")), Direction::Next), None);
        assert_eq!(step(&list, Some(&ep("zz")), Direction::Previous), None);
    }

    #[test]
    fn test_link_identity_when_guid_missing() {
        let by_link = |link: &str| Episode {
            link: Some(link.to_string()),
            ..Default::default()
        };
        let list = vec![by_link("https://e/1"), by_link("https://e/2")];
        assert_eq!(
            step(&list, Some(&by_link("https://e/1")), Direction::Next),
            Some(1)
        );
        assert!(is_active(&list[1], Some(&by_link("https://e/2"))));
        assert!(!is_active(&list[1], None));
    }

    #[test]
    fn test_works_over_references() {
        let owned = vec![ep("a"), ep("b")];
        let refs: Vec<&Episode> = owned.iter().collect();
        assert_eq!(step(&refs, Some(&ep("a")), Direction::Next), Some(1));
    }
}
