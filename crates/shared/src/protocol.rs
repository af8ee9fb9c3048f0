use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CardId, SetId};

/// A themed release grouping many cards, as returned by `GET /sets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSummary {
    pub id: SetId,
    pub name: String,
    /// ISO date string, e.g. `"1999-01-09"`.
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<SetImages>,
}

impl SetSummary {
    /// Release date parsed for chronological comparison. `None` when the
    /// wire value is not a valid ISO date.
    pub fn release_date_parsed(&self) -> Option<NaiveDate> {
        parse_release_date(&self.release_date)
    }
}

/// Parse an ISO `YYYY-MM-DD` release date.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// A single catalog item belonging to exactly one set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub id: CardId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<CardSetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<CardImages>,
}

impl CardSummary {
    /// First element of the type list, the sort key for "sort by type".
    pub fn primary_type(&self) -> &str {
        self.types
            .as_deref()
            .and_then(|types| types.first())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// The owning set reference embedded in a card payload. Carries the card's
/// release context inherited from its set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSetRef {
    pub id: SetId,
    pub name: String,
    #[serde(
        rename = "releaseDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetListResponse {
    pub data: Vec<SetSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPageResponse {
    pub data: Vec<CardSummary>,
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSearchResponse {
    pub data: Vec<CardSummary>,
}

/// Error envelope the catalog provider attaches to non-2xx responses.
/// Parsed best-effort; a body that fails to parse falls back to the raw
/// status line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}
