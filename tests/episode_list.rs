//! Integration tests for the episode list: derivation, keyboard selection
//! and digests, exercised through the public API.

use castlist::digest::to_digest;
use castlist::episodes::{derive, has_more, step, Direction, Episode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn episode(id: usize, date: &str) -> Episode {
    Episode {
        title: format!("Episode {}", id),
        guid: Some(format!("guid-{}", id)),
        pub_date: date.to_string(),
        ..Default::default()
    }
}

fn guids(list: &[&Episode]) -> Vec<String> {
    list.iter()
        .map(|e| e.guid.clone().unwrap_or_default())
        .collect()
}

/// Few distinct dates so that ties are common.
fn date_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => (1u32..=5).prop_map(|d| format!("2024-01-0{}", d)),
        1 => Just("not a date".to_string()),
        1 => Just(String::new()),
    ]
}

fn episodes_strategy() -> impl Strategy<Value = Vec<Episode>> {
    prop::collection::vec(date_strategy(), 0..40).prop_map(|dates| {
        dates
            .iter()
            .enumerate()
            .map(|(i, d)| episode(i, d))
            .collect()
    })
}

// ============================================================================
// Derivation
// ============================================================================

#[test]
fn test_documented_example() {
    let episodes = vec![
        Episode {
            title: "A".to_string(),
            pub_date: "2024-01-01".to_string(),
            ..Default::default()
        },
        Episode {
            title: "B".to_string(),
            pub_date: "2024-01-03".to_string(),
            ..Default::default()
        },
        Episode {
            title: "C".to_string(),
            pub_date: "2024-01-02".to_string(),
            ..Default::default()
        },
    ];
    let titles: Vec<&str> = derive(&episodes, true, 1, 20)
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(titles, ["B", "C", "A"]);

    let titles: Vec<&str> = derive(&episodes, false, 1, 20)
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(titles, ["A", "C", "B"]);
}

#[test]
fn test_first_page_of_larger_source() {
    let episodes: Vec<Episode> = (0..45)
        .map(|i| episode(i, &format!("2024-02-{:02}", (i % 28) + 1)))
        .collect();
    assert_eq!(derive(&episodes, true, 1, 20).len(), 20);
    assert!(has_more(episodes.len(), 1, 20));
    assert_eq!(derive(&episodes, true, 3, 20).len(), 45);
    assert!(!has_more(episodes.len(), 3, 20));
}

#[test]
fn test_empty_source() {
    let episodes: Vec<Episode> = Vec::new();
    assert!(derive(&episodes, true, 1, 20).is_empty());
    assert!(!has_more(0, 1, 20));
}

proptest! {
    #[test]
    fn derived_length_is_window_or_total(
        episodes in episodes_strategy(),
        ascending in any::<bool>(),
        page in 1usize..5,
        page_size in 1usize..15,
    ) {
        let derived = derive(&episodes, ascending, page, page_size);
        prop_assert_eq!(derived.len(), episodes.len().min(page * page_size));
    }

    #[test]
    fn derived_is_sorted_with_stable_ties(
        episodes in episodes_strategy(),
        ascending in any::<bool>(),
    ) {
        let derived = derive(&episodes, ascending, 1, 1000);
        for pair in derived.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (ka, kb) = (a.published(), b.published());
            // Invalid dates count as oldest
            let ordered = if ascending {
                match (ka, kb) {
                    (Some(x), Some(y)) => x >= y,
                    (None, Some(_)) => true,
                    (Some(_), None) => false,
                    (None, None) => true,
                }
            } else {
                match (ka, kb) {
                    (Some(x), Some(y)) => x <= y,
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (None, None) => true,
                }
            };
            prop_assert!(ordered, "{:?} before {:?}", a.pub_date, b.pub_date);

            if ka == kb {
                let ia = episodes.iter().position(|e| e.guid == a.guid);
                let ib = episodes.iter().position(|e| e.guid == b.guid);
                prop_assert!(ia < ib, "tie order changed");
            }
        }
    }

    #[test]
    fn next_page_extends_as_prefix(
        episodes in episodes_strategy(),
        ascending in any::<bool>(),
        page in 1usize..4,
        page_size in 1usize..10,
    ) {
        let shorter = guids(&derive(&episodes, ascending, page, page_size));
        let longer = guids(&derive(&episodes, ascending, page + 1, page_size));
        prop_assert_eq!(&longer[..shorter.len()], &shorter[..]);
    }

    #[test]
    fn next_walks_whole_list_then_stops(episodes in episodes_strategy()) {
        let derived = derive(&episodes, true, 1, 1000);
        let mut active: Option<Episode> = None;
        let mut visited = Vec::new();
        while let Some(i) = step(&derived, active.as_ref(), Direction::Next) {
            visited.push(i);
            active = Some(derived[i].clone());
        }
        let expected: Vec<usize> = (0..derived.len()).collect();
        prop_assert_eq!(visited, expected);
    }
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_selection_edges() {
    let episodes = vec![
        episode(0, "2024-01-01"),
        episode(1, "2024-01-02"),
        episode(2, "2024-01-03"),
    ];
    let derived = derive(&episodes, true, 1, 20);

    assert_eq!(step(&derived, None, Direction::Next), Some(0));
    assert_eq!(step(&derived, Some(derived[2]), Direction::Next), None);
    assert_eq!(step(&derived, Some(derived[0]), Direction::Previous), None);
    assert_eq!(step(&derived, Some(derived[1]), Direction::Previous), Some(0));
}

#[test]
fn test_selection_matches_by_identity_not_value() {
    let episodes = vec![episode(0, "2024-01-01"), episode(1, "2024-01-02")];
    let derived = derive(&episodes, false, 1, 20);

    // Same guid, different read state and title
    let mut stale_copy = episodes[0].clone();
    stale_copy.read = true;
    stale_copy.title = "Renamed".to_string();
    assert_eq!(step(&derived, Some(&stale_copy), Direction::Next), Some(1));
}

// ============================================================================
// Digest
// ============================================================================

#[test]
fn test_digest_anchor_label_prefers_title() {
    assert_eq!(
        to_digest(Some("<p>Hi <a href='x' title='Site'>there</a></p>")),
        "Hi [Site](x)"
    );
    assert_eq!(
        to_digest(Some("<p>Hi <a href='x'>there</a></p>")),
        "Hi [there](x)"
    );
}

#[test]
fn test_digest_absent_description() {
    assert_eq!(to_digest(None), "");
    assert_eq!(to_digest(Some("")), "");
}
