//! Pure sort projection over the currently displayed collection.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use shared::protocol::{parse_release_date, CardSummary, SetSummary};

use crate::state::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    ReleaseDate,
    SetName,
    PrimaryType,
}

impl SortKey {
    /// The key menu offered for the collection currently on screen: sets are
    /// sortable by name or release date, cards by name, type, or owning set.
    pub fn options_for(mode: &ViewMode) -> &'static [SortKey] {
        match mode {
            ViewMode::Home => &[SortKey::Name, SortKey::ReleaseDate],
            ViewMode::SetBrowse { .. } | ViewMode::SearchResults { .. } => {
                &[SortKey::Name, SortKey::PrimaryType, SortKey::SetName]
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::ReleaseDate => "release-date",
            SortKey::SetName => "set-name",
            SortKey::PrimaryType => "type",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "name" => Ok(SortKey::Name),
            "release-date" | "released" => Ok(SortKey::ReleaseDate),
            "set-name" | "set" => Ok(SortKey::SetName),
            "type" => Ok(SortKey::PrimaryType),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// Comparable value extracted per entry. Dates compare chronologically;
/// anything missing compares as the empty string (or the epoch-less `None`
/// date), matching the catalog's sparse payloads.
enum SortValue<'a> {
    Text(&'a str),
    Date(Option<NaiveDate>),
}

fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
        (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
        // Mixed kinds cannot happen: both sides are extracted with the same key.
        (SortValue::Text(_), SortValue::Date(_)) => Ordering::Less,
        (SortValue::Date(_), SortValue::Text(_)) => Ordering::Greater,
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn set_sort_value(set: &SetSummary, key: SortKey) -> SortValue<'_> {
    match key {
        SortKey::Name => SortValue::Text(&set.name),
        SortKey::ReleaseDate => SortValue::Date(set.release_date_parsed()),
        // Card-only keys have no counterpart on a set; everything ties.
        SortKey::SetName | SortKey::PrimaryType => SortValue::Text(""),
    }
}

fn card_sort_value(card: &CardSummary, key: SortKey) -> SortValue<'_> {
    match key {
        SortKey::Name => SortValue::Text(&card.name),
        SortKey::PrimaryType => SortValue::Text(card.primary_type()),
        SortKey::SetName => SortValue::Text(
            card.set
                .as_ref()
                .map(|set| set.name.as_str())
                .unwrap_or_default(),
        ),
        // Release context inherited from the owning set.
        SortKey::ReleaseDate => SortValue::Date(
            card.set
                .as_ref()
                .and_then(|set| set.release_date.as_deref())
                .and_then(parse_release_date),
        ),
    }
}

/// Returns a newly ordered copy; the input slice is left untouched. The sort
/// is stable, so entries with equal keys keep their fetched order.
pub fn sort_sets(sets: &[SetSummary], spec: SortSpec) -> Vec<SetSummary> {
    let mut ordered = sets.to_vec();
    ordered.sort_by(|a, b| {
        directed(
            compare_values(&set_sort_value(a, spec.key), &set_sort_value(b, spec.key)),
            spec.direction,
        )
    });
    ordered
}

/// Card counterpart of [`sort_sets`]; same ordering contract.
pub fn sort_cards(cards: &[CardSummary], spec: SortSpec) -> Vec<CardSummary> {
    let mut ordered = cards.to_vec();
    ordered.sort_by(|a, b| {
        directed(
            compare_values(&card_sort_value(a, spec.key), &card_sort_value(b, spec.key)),
            spec.direction,
        )
    });
    ordered
}
