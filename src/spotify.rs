use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

const API_BASE: &str = "https://api.spotify.com/v1";

/// The subset of the recently-played response this job consumes. Every
/// nested leaf is optional: the provider owns the payload shape, and a
/// missing field is a data-quality problem for the validator, not a
/// decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct RecentlyPlayed {
    #[serde(default)]
    pub items: Vec<PlayedItem>,
}

#[derive(Debug, Deserialize)]
pub struct PlayedItem {
    pub track: Option<TrackObject>,
    pub played_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackObject {
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistObject {
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("request to spotify failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("spotify returned status {0}")]
    Status(StatusCode),
}

#[async_trait]
pub trait RecentlyPlayedClient {
    /// Fetch plays strictly after `after_ms` (unix milliseconds). The API
    /// caps the page at 50 items and no further pages are requested.
    async fn recently_played_after(&self, after_ms: i64)
        -> Result<RecentlyPlayed, SpotifyError>;
}

pub struct SpotifyFetcher {
    http: reqwest::Client,
    token: String,
}

impl SpotifyFetcher {
    pub fn new(token: String) -> Self {
        SpotifyFetcher {
            http: reqwest::Client::new(),
            token,
        }
    }
}

#[async_trait]
impl RecentlyPlayedClient for SpotifyFetcher {
    async fn recently_played_after(
        &self,
        after_ms: i64,
    ) -> Result<RecentlyPlayed, SpotifyError> {
        let url = format!("{}/me/player/recently-played", API_BASE);
        let response = self
            .http
            .get(&url)
            .query(&[("after", after_ms.to_string())])
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SpotifyError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod test {
    use super::RecentlyPlayed;

    #[test]
    fn deserializes_consumed_subset() {
        let payload = r#"{
            "items": [
                {
                    "track": {
                        "name": "A",
                        "artists": [{"name": "X"}, {"name": "Y"}],
                        "duration_ms": 201000
                    },
                    "played_at": "2024-03-14T10:00:00.000Z",
                    "context": null
                }
            ],
            "limit": 50
        }"#;

        let parsed: RecentlyPlayed = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.items.len(), 1);
        let item = &parsed.items[0];
        assert_eq!(item.played_at.as_deref(), Some("2024-03-14T10:00:00.000Z"));
        let track = item.track.as_ref().unwrap();
        assert_eq!(track.name.as_deref(), Some("A"));
        assert_eq!(track.artists[0].name.as_deref(), Some("X"));
    }

    #[test]
    fn missing_items_defaults_to_empty() {
        let parsed: RecentlyPlayed = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn partial_item_keeps_absent_fields_none() {
        let payload = r#"{"items": [{"track": {"artists": []}, "played_at": null}]}"#;
        let parsed: RecentlyPlayed = serde_json::from_str(payload).unwrap();
        let item = &parsed.items[0];
        assert!(item.played_at.is_none());
        assert!(item.track.as_ref().unwrap().name.is_none());
    }
}
