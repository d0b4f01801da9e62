//! Playback transitions.
//!
//! Every operation updates [`PlaybackState`] and returns the side effects the
//! session has to carry out. Nothing here touches the browser.

use crate::api::Track;
use crate::config::PlayerConfig;
use crate::db::SavedPosition;
use crate::player::effects::{
    ElementId, MediaEvent, PlayerCommand, PlayerEffect, RemoteAction,
};
use crate::player::state::{Phase, PlaybackState};
use tracing::{debug, error, info, warn};

pub struct PlayerController {
    tracks: Vec<Track>,
    loaded: bool,
    state: PlaybackState,
    next_element: u64,
    preload_threshold: f64,
}

impl PlayerController {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            loaded: false,
            state: PlaybackState::default(),
            next_element: 0,
            preload_threshold: config.preload_threshold_secs,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_index.and_then(|index| self.tracks.get(index))
    }

    /// Install the fetched song list and cue the last played position.
    pub fn load_playlist(&mut self, tracks: Vec<Track>, saved: SavedPosition) -> Vec<PlayerEffect> {
        if self.loaded {
            warn!("song list already loaded, ignoring reload");
            return Vec::new();
        }
        self.loaded = true;
        self.tracks = tracks;

        if self.tracks.is_empty() {
            warn!("no songs found");
            return vec![PlayerEffect::ClearSavedPosition];
        }

        let restored = saved.index.filter(|index| *index < self.tracks.len());
        let mut effects = self.select(restored.unwrap_or(0), false);
        if restored.is_some() {
            if let Some(offset) = saved.offset {
                debug!(offset, "restoring last playback offset");
                effects.extend(self.seek(offset));
            }
        }
        effects
    }

    pub fn handle(&mut self, command: PlayerCommand) -> Vec<PlayerEffect> {
        match command {
            PlayerCommand::Select { index, autoplay } => self.select(index, autoplay),
            PlayerCommand::TogglePause => self.toggle_pause(),
            PlayerCommand::Next => self.next(),
            PlayerCommand::Previous => self.previous(),
            PlayerCommand::Seek(position) => self.seek(position),
        }
    }

    pub fn select(&mut self, index: usize, autoplay: bool) -> Vec<PlayerEffect> {
        if self.tracks.is_empty() {
            warn!(index, "no songs loaded yet");
            return Vec::new();
        }
        let Some(track) = self.tracks.get(index).cloned() else {
            warn!(index, len = self.tracks.len(), "invalid track index");
            return Vec::new();
        };

        let mut effects = Vec::new();
        if let Some(previous) = self.state.active.take() {
            effects.push(PlayerEffect::Release(previous));
        }

        let id = self.allocate_element();
        self.state.current_index = Some(index);
        self.state.active = Some(id);
        self.state.buffering = true;
        self.state.reset_timing();
        info!(index, title = %track.title, autoplay, "selecting track");

        effects.push(PlayerEffect::PersistIndex(index));
        effects.push(PlayerEffect::Load {
            id,
            track: track.clone(),
        });
        if self.state.preloaded.take().is_some() {
            effects.push(PlayerEffect::DropPreload);
        }
        effects.push(PlayerEffect::PublishNowPlaying(track));

        if autoplay {
            self.state.phase = Phase::Loading;
            effects.push(PlayerEffect::Play(id));
        } else {
            self.state.phase = Phase::Paused;
            effects.push(PlayerEffect::PublishPlaybackState { playing: false });
        }
        effects
    }

    pub fn toggle_pause(&mut self) -> Vec<PlayerEffect> {
        match self.state.phase {
            Phase::Playing | Phase::Loading => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle => Vec::new(),
        }
    }

    pub fn pause(&mut self) -> Vec<PlayerEffect> {
        let Some(id) = self.state.active else {
            return Vec::new();
        };
        match self.state.phase {
            Phase::Playing | Phase::Loading => {
                self.state.phase = Phase::Paused;
                vec![
                    PlayerEffect::Pause(id),
                    PlayerEffect::PublishPlaybackState { playing: false },
                ]
            }
            Phase::Paused | Phase::Idle => Vec::new(),
        }
    }

    pub fn resume(&mut self) -> Vec<PlayerEffect> {
        let Some(id) = self.state.active else {
            return Vec::new();
        };
        if self.state.phase != Phase::Paused {
            return Vec::new();
        }
        self.state.phase = Phase::Loading;
        vec![PlayerEffect::Play(id)]
    }

    pub fn next(&mut self) -> Vec<PlayerEffect> {
        let len = self.tracks.len();
        if len == 0 {
            warn!("no songs for next");
            return Vec::new();
        }
        let index = self.state.current_index.map_or(0, |current| (current + 1) % len);
        self.select(index, true)
    }

    pub fn previous(&mut self) -> Vec<PlayerEffect> {
        let len = self.tracks.len();
        if len == 0 {
            warn!("no songs for previous");
            return Vec::new();
        }
        let index = self
            .state
            .current_index
            .map_or(len - 1, |current| (current + len - 1) % len);
        self.select(index, true)
    }

    pub fn seek(&mut self, position: f64) -> Vec<PlayerEffect> {
        let Some(id) = self.state.active else {
            return Vec::new();
        };
        if !position.is_finite() {
            warn!(position, "ignoring non-finite seek target");
            return Vec::new();
        }
        self.state.current_time = position;
        vec![PlayerEffect::Seek { id, position }]
    }

    pub fn handle_remote(&mut self, action: RemoteAction) -> Vec<PlayerEffect> {
        debug!(?action, "media session action");
        match action {
            RemoteAction::Play => self.resume(),
            RemoteAction::Pause => self.pause(),
            RemoteAction::NextTrack => self.next(),
            RemoteAction::PreviousTrack => self.previous(),
            RemoteAction::SeekTo(position) => self.seek(position),
        }
    }

    pub fn handle_media_event(&mut self, id: ElementId, event: MediaEvent) -> Vec<PlayerEffect> {
        if self.state.active != Some(id) {
            debug!(?id, ?event, "ignoring event from released element");
            return Vec::new();
        }

        match event {
            MediaEvent::MetadataLoaded { duration } => {
                self.state.duration = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    0.0
                };
                Vec::new()
            }
            MediaEvent::CanPlayThrough => {
                self.state.buffering = false;
                Vec::new()
            }
            MediaEvent::Progress { buffered_end } => {
                if let Some(end) = buffered_end {
                    if self.state.duration > 0.0 && end.is_finite() {
                        self.state.buffered_percent =
                            (end / self.state.duration * 100.0).clamp(0.0, 100.0);
                    }
                }
                Vec::new()
            }
            MediaEvent::TimeUpdate { position } => {
                if !position.is_finite() {
                    return Vec::new();
                }
                self.state.current_time = position;
                let mut effects = vec![PlayerEffect::PersistOffset(position)];
                if self
                    .state
                    .remaining()
                    .is_some_and(|remaining| remaining <= self.preload_threshold)
                {
                    effects.extend(self.preload_next());
                }
                effects
            }
            MediaEvent::Ended => {
                debug!(?id, "track ended, advancing");
                self.next()
            }
            MediaEvent::Paused => {
                if self.state.phase == Phase::Playing {
                    self.state.phase = Phase::Paused;
                    vec![PlayerEffect::PublishPlaybackState { playing: false }]
                } else {
                    Vec::new()
                }
            }
            MediaEvent::PlayResolved => match self.state.phase {
                Phase::Loading => {
                    self.state.phase = Phase::Playing;
                    vec![
                        PlayerEffect::AttachVisualizer(id),
                        PlayerEffect::PublishPlaybackState { playing: true },
                    ]
                }
                // Paused while the request was pending.
                Phase::Paused => vec![PlayerEffect::Pause(id)],
                Phase::Playing | Phase::Idle => Vec::new(),
            },
            MediaEvent::PlayRejected { reason } => {
                error!(%reason, "playback failed");
                self.state.buffering = false;
                if self.state.phase == Phase::Loading {
                    self.state.phase = Phase::Paused;
                    vec![PlayerEffect::PublishPlaybackState { playing: false }]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Buffer the following track once per active element.
    fn preload_next(&mut self) -> Vec<PlayerEffect> {
        if self.state.preloaded.is_some() {
            return Vec::new();
        }
        let Some(current) = self.state.current_index else {
            return Vec::new();
        };
        let len = self.tracks.len();
        if len == 0 {
            return Vec::new();
        }
        let next = (current + 1) % len;
        if next == current {
            return Vec::new();
        }
        let Some(track) = self.tracks.get(next).cloned() else {
            return Vec::new();
        };
        debug!(next, title = %track.title, "preloading next track");
        self.state.preloaded = Some(next);
        vec![PlayerEffect::Preload(track)]
    }

    fn allocate_element(&mut self) -> ElementId {
        self.next_element += 1;
        ElementId(self.next_element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(n: usize) -> Track {
        Track {
            id: format!("song-{n}"),
            title: format!("Song {n}"),
            artist: "Artist".to_string(),
            image: format!("https://img.example/{n}.jpg"),
            url: format!("https://cdn.example/{n}.mp3"),
        }
    }

    fn controller_with(count: usize) -> PlayerController {
        let mut controller = PlayerController::new(&PlayerConfig::default());
        controller.load_playlist((0..count).map(track).collect(), SavedPosition::default());
        controller
    }

    fn active(controller: &PlayerController) -> ElementId {
        controller.state().active.expect("active element")
    }

    fn start_playing(controller: &mut PlayerController, index: usize) -> ElementId {
        controller.select(index, true);
        let id = active(controller);
        controller.handle_media_event(id, MediaEvent::PlayResolved);
        id
    }

    #[test]
    fn selecting_valid_index_sets_current_and_persists() {
        for len in 1..5 {
            for index in 0..len {
                let mut controller = controller_with(len);
                let effects = controller.select(index, false);
                assert_eq!(controller.current_track(), Some(&track(index)));
                assert!(effects.contains(&PlayerEffect::PersistIndex(index)));
            }
        }
    }

    #[test]
    fn out_of_range_select_changes_nothing() {
        let mut controller = controller_with(3);
        let before = controller.state().clone();
        for index in [3, 4, 100, usize::MAX] {
            assert!(controller.select(index, true).is_empty());
            assert_eq!(controller.state(), &before);
        }
    }

    #[test]
    fn switching_releases_previous_before_loading_next() {
        let mut controller = controller_with(3);
        let first = active(&controller);
        let effects = controller.select(2, true);

        let release = effects
            .iter()
            .position(|e| *e == PlayerEffect::Release(first))
            .expect("previous element released");
        let load = effects
            .iter()
            .position(|e| matches!(e, PlayerEffect::Load { .. }))
            .expect("new element loaded");
        assert!(release < load);
        assert_ne!(active(&controller), first);
    }

    #[test]
    fn next_and_previous_wrap_around() {
        for len in 1..6 {
            let mut controller = controller_with(len);
            controller.select(len - 1, false);
            controller.next();
            assert_eq!(controller.state().current_index, Some(0));

            controller.previous();
            assert_eq!(controller.state().current_index, Some(len - 1));
        }
    }

    #[test]
    fn empty_playlist_makes_navigation_no_ops() {
        let mut controller = PlayerController::new(&PlayerConfig::default());
        let effects = controller.load_playlist(Vec::new(), SavedPosition::default());
        assert_eq!(effects, vec![PlayerEffect::ClearSavedPosition]);

        assert!(controller.next().is_empty());
        assert!(controller.previous().is_empty());
        assert!(controller.select(0, true).is_empty());
        assert_eq!(controller.state(), &PlaybackState::default());
    }

    #[test]
    fn restore_uses_saved_index_and_offset() {
        let mut controller = PlayerController::new(&PlayerConfig::default());
        let effects = controller.load_playlist(
            (0..4).map(track).collect(),
            SavedPosition {
                index: Some(2),
                offset: Some(75.5),
            },
        );
        let id = active(&controller);

        assert_eq!(controller.state().current_index, Some(2));
        assert_eq!(controller.state().phase, Phase::Paused);
        assert!(!effects.contains(&PlayerEffect::Play(id)));
        assert_eq!(
            effects.last(),
            Some(&PlayerEffect::Seek {
                id,
                position: 75.5
            })
        );
    }

    #[test]
    fn restore_with_invalid_index_falls_back_without_seek() {
        let mut controller = PlayerController::new(&PlayerConfig::default());
        let effects = controller.load_playlist(
            (0..2).map(track).collect(),
            SavedPosition {
                index: Some(9),
                offset: Some(12.0),
            },
        );
        assert_eq!(controller.state().current_index, Some(0));
        assert!(!effects
            .iter()
            .any(|e| matches!(e, PlayerEffect::Seek { .. })));
    }

    #[test]
    fn second_playlist_load_is_ignored() {
        let mut controller = controller_with(2);
        assert!(controller
            .load_playlist(vec![track(9)], SavedPosition::default())
            .is_empty());
        assert_eq!(controller.tracks().len(), 2);
    }

    #[test]
    fn toggle_pause_keeps_index() {
        let mut controller = controller_with(3);
        let id = start_playing(&mut controller, 1);
        assert!(controller.state().is_playing());

        let effects = controller.toggle_pause();
        assert_eq!(effects[0], PlayerEffect::Pause(id));
        assert!(!controller.state().is_playing());
        assert_eq!(controller.state().current_index, Some(1));

        let effects = controller.toggle_pause();
        assert_eq!(effects, vec![PlayerEffect::Play(id)]);
        assert_eq!(controller.state().phase, Phase::Loading);
    }

    #[test]
    fn toggle_without_active_element_is_no_op() {
        let mut controller = PlayerController::new(&PlayerConfig::default());
        assert!(controller.toggle_pause().is_empty());
    }

    #[test]
    fn play_success_attaches_visualizer() {
        let mut controller = controller_with(2);
        controller.select(0, true);
        let id = active(&controller);
        let effects = controller.handle_media_event(id, MediaEvent::PlayResolved);
        assert_eq!(
            effects,
            vec![
                PlayerEffect::AttachVisualizer(id),
                PlayerEffect::PublishPlaybackState { playing: true },
            ]
        );
    }

    #[test]
    fn play_rejection_leaves_player_paused() {
        let mut controller = controller_with(2);
        controller.select(0, true);
        let id = active(&controller);
        controller.handle_media_event(
            id,
            MediaEvent::PlayRejected {
                reason: "NotAllowedError".to_string(),
            },
        );
        assert_eq!(controller.state().phase, Phase::Paused);
        assert!(!controller.state().is_playing());
        assert!(!controller.state().buffering);
    }

    #[test]
    fn late_play_success_after_pause_is_undone() {
        let mut controller = controller_with(2);
        controller.select(0, true);
        let id = active(&controller);
        controller.toggle_pause();
        let effects = controller.handle_media_event(id, MediaEvent::PlayResolved);
        assert_eq!(effects, vec![PlayerEffect::Pause(id)]);
        assert_eq!(controller.state().phase, Phase::Paused);
    }

    #[test]
    fn ended_advances_with_autoplay() {
        let mut controller = controller_with(2);
        let first = start_playing(&mut controller, 0);
        let effects = controller.handle_media_event(first, MediaEvent::Ended);
        let second = active(&controller);

        assert_eq!(controller.state().current_index, Some(1));
        assert!(effects.contains(&PlayerEffect::Release(first)));
        assert!(effects.contains(&PlayerEffect::Play(second)));
    }

    #[test]
    fn events_from_released_elements_are_ignored() {
        let mut controller = controller_with(3);
        let stale = start_playing(&mut controller, 0);
        controller.select(1, true);
        let before = controller.state().clone();

        assert!(controller
            .handle_media_event(stale, MediaEvent::Ended)
            .is_empty());
        assert!(controller
            .handle_media_event(stale, MediaEvent::TimeUpdate { position: 10.0 })
            .is_empty());
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn time_updates_persist_and_preload_once_near_end() {
        let mut controller = controller_with(3);
        let id = start_playing(&mut controller, 0);
        controller.handle_media_event(id, MediaEvent::MetadataLoaded { duration: 200.0 });

        let early = controller.handle_media_event(id, MediaEvent::TimeUpdate { position: 100.0 });
        assert_eq!(early, vec![PlayerEffect::PersistOffset(100.0)]);

        let near_end = controller.handle_media_event(id, MediaEvent::TimeUpdate { position: 171.0 });
        assert_eq!(
            near_end,
            vec![
                PlayerEffect::PersistOffset(171.0),
                PlayerEffect::Preload(track(1)),
            ]
        );

        let later = controller.handle_media_event(id, MediaEvent::TimeUpdate { position: 180.0 });
        assert_eq!(later, vec![PlayerEffect::PersistOffset(180.0)]);
    }

    #[test]
    fn no_preload_before_duration_is_known() {
        let mut controller = controller_with(3);
        let id = start_playing(&mut controller, 0);
        let effects = controller.handle_media_event(id, MediaEvent::TimeUpdate { position: 0.0 });
        assert_eq!(effects, vec![PlayerEffect::PersistOffset(0.0)]);
    }

    #[test]
    fn preload_wraps_and_skips_single_track() {
        let mut controller = controller_with(3);
        let id = start_playing(&mut controller, 2);
        controller.handle_media_event(id, MediaEvent::MetadataLoaded { duration: 20.0 });
        let effects = controller.handle_media_event(id, MediaEvent::TimeUpdate { position: 1.0 });
        assert!(effects.contains(&PlayerEffect::Preload(track(0))));

        let mut solo = controller_with(1);
        let id = start_playing(&mut solo, 0);
        solo.handle_media_event(id, MediaEvent::MetadataLoaded { duration: 20.0 });
        let effects = solo.handle_media_event(id, MediaEvent::TimeUpdate { position: 1.0 });
        assert_eq!(effects, vec![PlayerEffect::PersistOffset(1.0)]);
    }

    #[test]
    fn switching_track_drops_preload() {
        let mut controller = controller_with(3);
        let id = start_playing(&mut controller, 0);
        controller.handle_media_event(id, MediaEvent::MetadataLoaded { duration: 10.0 });
        controller.handle_media_event(id, MediaEvent::TimeUpdate { position: 1.0 });
        assert_eq!(controller.state().preloaded, Some(1));

        let effects = controller.next();
        assert!(effects.contains(&PlayerEffect::DropPreload));
        assert_eq!(controller.state().preloaded, None);
    }

    #[test]
    fn buffered_percent_is_clamped() {
        let mut controller = controller_with(1);
        let id = active(&controller);
        controller.handle_media_event(id, MediaEvent::Progress { buffered_end: Some(5.0) });
        assert_eq!(controller.state().buffered_percent, 0.0);

        controller.handle_media_event(id, MediaEvent::MetadataLoaded { duration: 50.0 });
        controller.handle_media_event(id, MediaEvent::Progress { buffered_end: Some(25.0) });
        assert_eq!(controller.state().buffered_percent, 50.0);

        controller.handle_media_event(id, MediaEvent::Progress { buffered_end: Some(80.0) });
        assert_eq!(controller.state().buffered_percent, 100.0);
    }

    #[test]
    fn can_play_through_clears_buffering() {
        let mut controller = controller_with(1);
        let id = active(&controller);
        assert!(controller.state().buffering);
        controller.handle_media_event(id, MediaEvent::CanPlayThrough);
        assert!(!controller.state().buffering);
    }

    #[test]
    fn external_pause_is_reflected() {
        let mut controller = controller_with(1);
        let id = start_playing(&mut controller, 0);
        let effects = controller.handle_media_event(id, MediaEvent::Paused);
        assert_eq!(
            effects,
            vec![PlayerEffect::PublishPlaybackState { playing: false }]
        );
        assert_eq!(controller.state().phase, Phase::Paused);
    }

    #[test]
    fn seek_requires_active_and_finite_target() {
        let mut idle = PlayerController::new(&PlayerConfig::default());
        assert!(idle.seek(10.0).is_empty());

        let mut controller = controller_with(1);
        let id = active(&controller);
        assert!(controller.seek(f64::NAN).is_empty());
        assert_eq!(
            controller.seek(42.0),
            vec![PlayerEffect::Seek { id, position: 42.0 }]
        );
        assert_eq!(controller.state().current_time, 42.0);
    }

    #[test]
    fn remote_play_and_pause_are_idempotent() {
        let mut controller = controller_with(2);
        let id = start_playing(&mut controller, 0);
        assert!(controller.handle_remote(RemoteAction::Play).is_empty());

        assert_eq!(
            controller.handle_remote(RemoteAction::Pause)[0],
            PlayerEffect::Pause(id)
        );
        assert!(controller.handle_remote(RemoteAction::Pause).is_empty());
        assert_eq!(
            controller.handle_remote(RemoteAction::Play),
            vec![PlayerEffect::Play(id)]
        );
    }

    #[test]
    fn remote_track_actions_navigate() {
        let mut controller = controller_with(3);
        controller.handle_remote(RemoteAction::PreviousTrack);
        assert_eq!(controller.state().current_index, Some(2));
        controller.handle_remote(RemoteAction::NextTrack);
        assert_eq!(controller.state().current_index, Some(0));
    }
}
