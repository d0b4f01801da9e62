//! Song list endpoint client and its data model.

pub mod models;
pub mod playlist;

pub use models::Track;
pub use playlist::{fetch_tracks, PlaylistError};
