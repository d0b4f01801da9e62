//! Player tunables.

/// Song list endpoint used when `POCKETWAVE_PLAYLIST_URL` is not set at build time.
const DEFAULT_PLAYLIST_URL: &str = "https://pi.cerberus-acrux.ts.net/s2/list/songs";

pub const LAST_INDEX_KEY: &str = "pocketwave.last_index";
pub const LAST_TIME_KEY: &str = "pocketwave.last_time";
pub const VISUALIZER_CANVAS_ID: &str = "visualizer-canvas";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub playlist_url: String,
    /// Remaining seconds at which the next track starts buffering.
    pub preload_threshold_secs: f64,
    /// Analyser transform window. Must be a power of two in `32..=32768`.
    pub fft_size: u32,
    pub bar_width_scale: f64,
    pub bar_gap: f64,
    /// Bar height in pixels per unit of analyser magnitude (0..=255).
    pub bar_height_scale: f64,
    pub canvas_id: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playlist_url: option_env!("POCKETWAVE_PLAYLIST_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(DEFAULT_PLAYLIST_URL)
                .to_string(),
            preload_threshold_secs: 30.0,
            fft_size: 128,
            bar_width_scale: 2.5,
            bar_gap: 1.0,
            bar_height_scale: 0.5,
            canvas_id: VISUALIZER_CANVAS_ID.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_player_constants() {
        let config = PlayerConfig::default();
        assert_eq!(config.preload_threshold_secs, 30.0);
        assert_eq!(config.fft_size, 128);
        assert_eq!(config.bar_height_scale, 0.5);
        assert!(!config.playlist_url.is_empty());
    }
}
