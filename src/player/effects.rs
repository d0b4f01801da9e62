//! Messages exchanged between the controller, the session and the platform.

use crate::api::Track;

/// Identity of one audio element created by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Side effects requested by a controller transition, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEffect {
    /// Pause, detach and drop the element, including its analyser source.
    Release(ElementId),
    /// Create the active element for `track`. It is not played yet.
    Load { id: ElementId, track: Track },
    /// Buffer `track` ahead of time without playing it.
    Preload(Track),
    DropPreload,
    Play(ElementId),
    Pause(ElementId),
    Seek { id: ElementId, position: f64 },
    /// Route the element through the analyser and keep the bars drawing.
    AttachVisualizer(ElementId),
    PublishNowPlaying(Track),
    PublishPlaybackState { playing: bool },
    PersistIndex(usize),
    PersistOffset(f64),
    ClearSavedPosition,
}

/// Notifications raised by an audio element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    MetadataLoaded { duration: f64 },
    CanPlayThrough,
    /// End of the trailing buffered range, if anything is buffered.
    Progress { buffered_end: Option<f64> },
    TimeUpdate { position: f64 },
    Ended,
    /// Paused outside the app, e.g. by the OS or a headset.
    Paused,
    PlayResolved,
    PlayRejected { reason: String },
}

/// Transport actions coming from the OS media session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub enum RemoteAction {
    Play,
    Pause,
    NextTrack,
    PreviousTrack,
    SeekTo(f64),
}

/// Anything the platform feeds back into the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    Media(ElementId, MediaEvent),
    Remote(RemoteAction),
}

/// User-facing operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    Select { index: usize, autoplay: bool },
    TogglePause,
    Next,
    Previous,
    Seek(f64),
}
