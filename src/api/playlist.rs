use crate::api::models::Track;
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::{debug, info};

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("song list request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("song list endpoint answered {0}")]
    Status(reqwest::StatusCode),
    #[error("song list payload could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Fetch the ordered song list. Issued once at startup; there is no retry.
pub async fn fetch_tracks(url: &str) -> Result<Vec<Track>, PlaylistError> {
    debug!(%url, "requesting song list");
    let response = HTTP_CLIENT
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(PlaylistError::Request)?;

    let status = response.status();
    if !status.is_success() {
        return Err(PlaylistError::Status(status));
    }

    let tracks = response
        .json::<Vec<Track>>()
        .await
        .map_err(PlaylistError::Decode)?;
    info!(count = tracks.len(), "songs loaded");
    Ok(tracks)
}
