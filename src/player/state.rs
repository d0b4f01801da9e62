use crate::player::effects::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No active element.
    #[default]
    Idle,
    /// A play request is in flight for the active element.
    Loading,
    Playing,
    Paused,
}

/// Everything the controller knows about the current playback.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    pub current_index: Option<usize>,
    pub active: Option<ElementId>,
    /// Index of the track buffered ahead for the active element, if any.
    pub preloaded: Option<usize>,
    pub phase: Phase,
    /// Set when a track is selected, cleared once enough data is buffered.
    pub buffering: bool,
    pub duration: f64,
    pub current_time: f64,
    pub buffered_percent: f64,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn remaining(&self) -> Option<f64> {
        (self.duration > 0.0).then(|| self.duration - self.current_time)
    }

    pub(crate) fn reset_timing(&mut self) {
        self.duration = 0.0;
        self.current_time = 0.0;
        self.buffered_percent = 0.0;
    }
}
