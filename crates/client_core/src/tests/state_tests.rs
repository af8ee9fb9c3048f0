use super::*;
use shared::domain::{CardId, SetId};
use shared::protocol::CardSummary;

use crate::sort::{SortDirection, SortKey};

fn sample_set(id: &str, name: &str) -> SetSummary {
    SetSummary {
        id: SetId::new(id),
        name: name.to_string(),
        release_date: "1999-01-09".to_string(),
        images: None,
    }
}

fn sample_card(id: &str, name: &str) -> CardSummary {
    CardSummary {
        id: CardId::new(id),
        name: name.to_string(),
        supertype: Some("Pokémon".to_string()),
        types: Some(vec!["Fire".to_string()]),
        set: None,
        images: None,
    }
}

fn browse_state() -> ViewerState {
    let state = reduce(
        &ViewerState::default(),
        Action::SetsLoaded(vec![sample_set("base1", "Base")]),
    );
    let state = reduce(&state, Action::SetSelected(sample_set("base1", "Base")));
    reduce(
        &state,
        Action::CardsLoaded {
            cards: vec![sample_card("base1-4", "Charizard")],
            total_count: 45,
        },
    )
}

#[test]
fn selecting_a_set_resets_page_and_clears_listing() {
    let state = reduce(
        &ViewerState::default(),
        Action::CardsFailed("old error".to_string()),
    );
    let state = reduce(&state, Action::SetSelected(sample_set("base1", "Base")));

    assert_eq!(state.mode.page(), Some(1));
    assert!(state.loading);
    assert!(state.cards.items().is_empty());
    assert_eq!(state.cards.error(), None);
}

#[test]
fn loading_a_card_page_recomputes_total_pages() {
    let state = browse_state();

    assert!(!state.loading);
    assert_eq!(state.cards.items().len(), 1);
    match &state.mode {
        ViewMode::SetBrowse {
            page, total_pages, ..
        } => {
            assert_eq!(*page, 1);
            assert_eq!(*total_pages, 3);
        }
        other => panic!("unexpected mode: {other:?}"),
    }
}

#[test]
fn total_pages_rounds_up_and_handles_empty_sets() {
    assert_eq!(total_pages(45), 3);
    assert_eq!(total_pages(40), 2);
    assert_eq!(total_pages(1), 1);
    assert_eq!(total_pages(0), 0);
}

#[test]
fn pagination_is_enabled_exactly_within_bounds() {
    let mut state = browse_state();

    assert!(!state.can_go_previous());
    assert!(state.can_go_next());

    state = reduce(&state, Action::PageRequested(3));
    let state = reduce(
        &state,
        Action::CardsLoaded {
            cards: vec![sample_card("base1-44", "Last One")],
            total_count: 45,
        },
    );
    assert!(state.can_go_previous());
    assert!(!state.can_go_next());
}

#[test]
fn next_is_disabled_when_the_set_is_empty() {
    let state = reduce(
        &ViewerState::default(),
        Action::SetSelected(sample_set("void", "Void")),
    );
    let state = reduce(
        &state,
        Action::CardsLoaded {
            cards: Vec::new(),
            total_count: 0,
        },
    );
    assert!(!state.can_go_next());
    assert!(!state.can_go_previous());
}

#[test]
fn page_request_is_ignored_outside_set_browse() {
    let state = reduce(&ViewerState::default(), Action::PageRequested(2));
    assert_eq!(state.mode, ViewMode::Home);
    assert!(!state.loading);
}

#[test]
fn editing_the_search_term_clears_has_searched() {
    let state = reduce(
        &ViewerState::default(),
        Action::SearchSubmitted("charizard".to_string()),
    );
    assert!(state.has_searched);

    let state = reduce(&state, Action::SearchTermEdited("charm".to_string()));
    assert!(!state.has_searched);
    assert_eq!(state.search_term, "charm");
}

#[test]
fn submitting_a_search_clears_the_set_selection() {
    let state = browse_state();
    let state = reduce(&state, Action::SearchSubmitted("pikachu".to_string()));

    assert_eq!(state.mode.selected_set(), None);
    assert_eq!(
        state.mode,
        ViewMode::SearchResults {
            term: "pikachu".to_string()
        }
    );
    assert!(state.loading);
    assert!(state.has_searched);
}

#[test]
fn failed_fetch_replaces_listing_with_sole_error_entry() {
    let state = browse_state();
    let state = reduce(&state, Action::CardsFailed("boom".to_string()));

    assert_eq!(state.cards.error(), Some("boom"));
    assert!(state.cards.items().is_empty());
    assert!(!state.cards.is_empty(), "an error entry is not an empty list");
    assert!(!state.loading);
}

#[test]
fn going_home_resets_the_view_but_keeps_catalog_and_preferences() {
    let state = browse_state();
    let state = reduce(&state, Action::SearchTermEdited("chariz".to_string()));
    let state = reduce(
        &state,
        Action::FavoriteToggled(CardId::new("base1-4")),
    );
    let state = reduce(
        &state,
        Action::SortChanged(SortSpec {
            key: SortKey::ReleaseDate,
            direction: SortDirection::Descending,
        }),
    );

    let state = reduce(&state, Action::WentHome);

    assert_eq!(state.mode, ViewMode::Home);
    assert!(state.cards.items().is_empty());
    assert_eq!(state.search_term, "");
    assert!(!state.has_searched);
    assert!(!state.loading);
    // Catalog and user preferences survive the reset.
    assert_eq!(state.sets.len(), 1);
    assert!(state.is_favorite(&CardId::new("base1-4")));
    assert_eq!(state.sort.key, SortKey::ReleaseDate);
}

#[test]
fn favorite_toggle_round_trips() {
    let card_id = CardId::new("base1-4");
    let state = reduce(
        &ViewerState::default(),
        Action::FavoriteToggled(card_id.clone()),
    );
    assert!(state.is_favorite(&card_id));

    let state = reduce(&state, Action::FavoriteToggled(card_id.clone()));
    assert!(!state.is_favorite(&card_id));
    assert_eq!(state.favorites, ViewerState::default().favorites);
}

#[test]
fn empty_search_notice_requires_a_completed_valid_search() {
    let state = reduce(
        &ViewerState::default(),
        Action::SearchSubmitted("zzz".to_string()),
    );
    let state = reduce(&state, Action::SearchLoaded(Vec::new()));
    assert!(state.shows_empty_search_notice());

    // Typing again withdraws the notice before the next search runs.
    let state = reduce(&state, Action::SearchTermEdited("zzzz".to_string()));
    assert!(!state.shows_empty_search_notice());
}
