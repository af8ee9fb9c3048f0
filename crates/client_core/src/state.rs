//! Single-snapshot view state and the actions that transition it.

use std::collections::HashSet;

use shared::domain::CardId;
use shared::protocol::{CardSummary, SetSummary};

use crate::sort::SortSpec;

/// Cards requested per page and the divisor for the total page count. The
/// two must stay in lockstep.
pub const PAGE_SIZE: u32 = 20;

/// Minimum search term length, in characters, before a search is issued.
pub const MIN_SEARCH_LEN: usize = 3;

/// Total page count for a set listing: `ceil(total_count / PAGE_SIZE)`.
pub fn total_pages(total_count: u64) -> u32 {
    total_count.div_ceil(u64::from(PAGE_SIZE)) as u32
}

/// Which collection the viewer is presenting. Exactly one is active.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    Home,
    SetBrowse {
        set: SetSummary,
        page: u32,
        total_pages: u32,
    },
    SearchResults {
        term: String,
    },
}

impl ViewMode {
    pub fn selected_set(&self) -> Option<&SetSummary> {
        match self {
            ViewMode::SetBrowse { set, .. } => Some(set),
            _ => None,
        }
    }

    pub fn page(&self) -> Option<u32> {
        match self {
            ViewMode::SetBrowse { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// The displayed card collection. A failed fetch replaces the whole listing,
/// with the error message as its sole entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CardListing {
    Items(Vec<CardSummary>),
    Failed(String),
}

impl CardListing {
    pub fn items(&self) -> &[CardSummary] {
        match self {
            CardListing::Items(cards) => cards,
            CardListing::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CardListing::Items(_) => None,
            CardListing::Failed(message) => Some(message),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CardListing::Items(cards) if cards.is_empty())
    }
}

impl Default for CardListing {
    fn default() -> Self {
        CardListing::Items(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub mode: ViewMode,
    pub sets: Vec<SetSummary>,
    pub sets_loading: bool,
    pub cards: CardListing,
    pub search_term: String,
    pub has_searched: bool,
    pub favorites: HashSet<CardId>,
    pub sort: SortSpec,
    pub loading: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            mode: ViewMode::Home,
            sets: Vec::new(),
            sets_loading: false,
            cards: CardListing::default(),
            search_term: String::new(),
            has_searched: false,
            favorites: HashSet::new(),
            sort: SortSpec::default(),
            loading: false,
        }
    }
}

impl ViewerState {
    pub fn can_go_previous(&self) -> bool {
        matches!(self.mode, ViewMode::SetBrowse { page, .. } if page > 1)
    }

    pub fn can_go_next(&self) -> bool {
        matches!(
            self.mode,
            ViewMode::SetBrowse {
                page, total_pages, ..
            } if page < total_pages
        )
    }

    /// Whether a "no cards found" notice applies: a completed search for a
    /// valid term that produced an empty listing. Editing the term clears
    /// `has_searched` and therefore this notice.
    pub fn shows_empty_search_notice(&self) -> bool {
        self.has_searched
            && self.search_term.chars().count() >= MIN_SEARCH_LEN
            && self.cards.is_empty()
    }

    pub fn is_favorite(&self, card_id: &CardId) -> bool {
        self.favorites.contains(card_id)
    }
}

/// Explicit state transitions. Requests themselves live in the controller;
/// these only describe how the snapshot changes.
#[derive(Debug, Clone)]
pub enum Action {
    SetsRequested,
    SetsLoaded(Vec<SetSummary>),
    SetsLoadFailed(String),
    SetSelected(SetSummary),
    PageRequested(u32),
    CardsLoaded {
        cards: Vec<CardSummary>,
        total_count: u64,
    },
    SearchTermEdited(String),
    SearchSubmitted(String),
    SearchLoaded(Vec<CardSummary>),
    CardsFailed(String),
    SortChanged(SortSpec),
    FavoriteToggled(CardId),
    WentHome,
}

/// Pure transition function: the previous snapshot plus one action yields
/// the next snapshot. Never performs IO.
pub fn reduce(state: &ViewerState, action: Action) -> ViewerState {
    let mut next = state.clone();
    match action {
        Action::SetsRequested => {
            next.sets_loading = true;
        }
        Action::SetsLoaded(sets) => {
            next.sets = sets;
            next.sets_loading = false;
        }
        Action::SetsLoadFailed(_) => {
            // The startup listing stays empty; the message travels by event.
            next.sets_loading = false;
        }
        Action::SetSelected(set) => {
            next.mode = ViewMode::SetBrowse {
                set,
                page: 1,
                total_pages: 1,
            };
            next.cards = CardListing::default();
            next.loading = true;
        }
        Action::PageRequested(page) => {
            if let ViewMode::SetBrowse {
                page: current_page, ..
            } = &mut next.mode
            {
                *current_page = page;
                next.loading = true;
            }
        }
        Action::CardsLoaded { cards, total_count } => {
            next.cards = CardListing::Items(cards);
            next.loading = false;
            if let ViewMode::SetBrowse { total_pages: n, .. } = &mut next.mode {
                *n = total_pages(total_count);
            }
        }
        Action::SearchTermEdited(text) => {
            next.search_term = text;
            next.has_searched = false;
        }
        Action::SearchSubmitted(term) => {
            next.mode = ViewMode::SearchResults { term: term.clone() };
            next.search_term = term;
            next.has_searched = true;
            next.loading = true;
        }
        Action::SearchLoaded(cards) => {
            next.cards = CardListing::Items(cards);
            next.loading = false;
        }
        Action::CardsFailed(message) => {
            next.cards = CardListing::Failed(message);
            next.loading = false;
        }
        Action::SortChanged(spec) => {
            next.sort = spec;
        }
        Action::FavoriteToggled(card_id) => {
            if !next.favorites.remove(&card_id) {
                next.favorites.insert(card_id);
            }
        }
        Action::WentHome => {
            next.mode = ViewMode::Home;
            next.cards = CardListing::default();
            next.search_term.clear();
            next.has_searched = false;
            next.loading = false;
        }
    }
    next
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
