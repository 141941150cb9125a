//! Wire contract shared by the proxy and the client.
//!
//! The upstream backend answers `POST /api/recommendations` with an
//! `ApiResponse` envelope.  `success` is the discriminant: when it is true
//! the playlist details and recommendation list must both be present, when
//! it is false `error` carries a user-facing message.  Both sides decode into
//! these types and call [`ApiResponse::validate`] before trusting a payload.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path of the recommendation endpoint, on both the proxy and the upstream.
pub const RECOMMENDATIONS_PATH: &str = "/api/recommendations";

/// Prefix the upstream backend accepts for playlist links.
pub const PLAYLIST_URL_PREFIX: &str = "https://open.spotify.com/playlist/";

/// Body sent to the proxy and forwarded upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub playlist_url: Option<String>,
}

impl RecommendationRequest {
    pub fn new(playlist_url: impl Into<String>) -> Self {
        Self {
            playlist_url: Some(playlist_url.into()),
        }
    }

    /// The URL if present and not blank.
    pub fn playlist_url(&self) -> Option<&str> {
        self.playlist_url.as_deref().filter(|u| !is_blank(u))
    }
}

/// Error envelope returned by the proxy for every non-200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_details: Option<PlaylistDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecommendationMetadata>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDetails {
    pub name: String,
    pub owner: String,
    pub total_tracks: u32,
    #[serde(default)]
    pub album_art: Option<String>,
}

/// One recommended track.  `id` is unique within a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub release_date: String,
    pub popularity: u8,
    pub duration_ms: u64,
    pub duration_readable: String,
    #[serde(default)]
    pub preview_url: Option<String>,
    pub external_url: String,
    pub uri: String,
    #[serde(default)]
    pub album_art: Option<String>,
}

/// Provenance counters.  Display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationMetadata {
    pub total_tracks_analyzed: u32,
    pub reddit_posts_found: u32,
    pub recommendations_requested: u32,
    pub recommendations_found: u32,
}

/// Ways a decoded `ApiResponse` can break the envelope invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("successful response is missing playlist_details")]
    MissingPlaylistDetails,
    #[error("successful response is missing recommendations")]
    MissingRecommendations,
    #[error("recommendation {id} has popularity {popularity}, expected 0-100")]
    PopularityOutOfRange { id: String, popularity: u8 },
    #[error("recommendation id {0} appears more than once")]
    DuplicateId(String),
}

impl ApiResponse {
    /// Check the envelope invariants.  Failed envelopes are always valid;
    /// their payload fields are never read.
    pub fn validate(&self) -> Result<(), ContractError> {
        if !self.success {
            return Ok(());
        }
        if self.playlist_details.is_none() {
            return Err(ContractError::MissingPlaylistDetails);
        }
        let recommendations = self
            .recommendations
            .as_ref()
            .ok_or(ContractError::MissingRecommendations)?;

        let mut seen = HashSet::with_capacity(recommendations.len());
        for rec in recommendations {
            if rec.popularity > 100 {
                return Err(ContractError::PopularityOutOfRange {
                    id: rec.id.clone(),
                    popularity: rec.popularity,
                });
            }
            if !seen.insert(rec.id.as_str()) {
                return Err(ContractError::DuplicateId(rec.id.clone()));
            }
        }
        Ok(())
    }

    /// Error message of a failed envelope, ignoring blank strings.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !is_blank(e))
    }
}

impl PlaylistDetails {
    pub fn tracks_label(&self) -> String {
        format!("{} tracks analyzed", self.total_tracks)
    }
}

impl RecommendationMetadata {
    pub fn reddit_label(&self) -> String {
        format!(
            "Based on {} Reddit recommendations",
            self.reddit_posts_found
        )
    }
}

impl Recommendation {
    /// Release date as "Month Year".
    ///
    /// Spotify reports dates at day, month or year precision; year-only dates
    /// come back as the bare year and anything unparseable is shown verbatim.
    pub fn release_label(&self) -> String {
        let raw = self.release_date.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.format("%B %Y").to_string();
        }
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
            return date.format("%B %Y").to_string();
        }
        raw.to_string()
    }
}

/// True for empty or whitespace-only input.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Whether `url` has the shape the upstream accepts.  Advisory only.
pub fn looks_like_playlist_url(url: &str) -> bool {
    url.trim().starts_with(PLAYLIST_URL_PREFIX)
}
