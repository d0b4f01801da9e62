use crate::api::Track;
use crate::config::PlayerConfig;
use crate::db::PositionStore;
use crate::player::controller::PlayerController;
use crate::player::effects::{ElementId, PlayerCommand, PlayerEffect, PlayerInput};
use crate::player::state::PlaybackState;
use tracing::warn;

/// Platform side of playback: audio elements, analyser graph and media session.
///
/// Calls never fail from the caller's point of view. Asynchronous outcomes
/// (play results, element events) come back as [`PlayerInput`]s.
pub trait MediaDriver {
    fn load(&mut self, id: ElementId, track: &Track);
    fn release(&mut self, id: ElementId);
    fn preload(&mut self, track: &Track);
    fn drop_preload(&mut self);
    fn play(&mut self, id: ElementId);
    fn pause(&mut self, id: ElementId);
    fn seek(&mut self, id: ElementId, position: f64);
    fn attach_visualizer(&mut self, id: ElementId);
    fn publish_now_playing(&mut self, track: &Track);
    fn publish_playback_state(&mut self, playing: bool);
}

/// Binds the controller to a driver and a position store.
pub struct Player<D, S> {
    controller: PlayerController,
    driver: D,
    store: S,
}

impl<D: MediaDriver, S: PositionStore> Player<D, S> {
    pub fn new(config: &PlayerConfig, driver: D, store: S) -> Self {
        Self {
            controller: PlayerController::new(config),
            driver,
            store,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        self.controller.state()
    }

    pub fn tracks(&self) -> &[Track] {
        self.controller.tracks()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.controller.current_track()
    }

    #[cfg(test)]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Install the fetched song list and cue the stored position.
    pub fn restore(&mut self, tracks: Vec<Track>) {
        let saved = self.store.load();
        let effects = self.controller.load_playlist(tracks, saved);
        self.apply(effects);
    }

    pub fn command(&mut self, command: PlayerCommand) {
        let effects = self.controller.handle(command);
        self.apply(effects);
    }

    pub fn input(&mut self, input: PlayerInput) {
        let effects = match input {
            PlayerInput::Media(id, event) => self.controller.handle_media_event(id, event),
            PlayerInput::Remote(action) => self.controller.handle_remote(action),
        };
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<PlayerEffect>) {
        for effect in effects {
            match effect {
                PlayerEffect::Release(id) => self.driver.release(id),
                PlayerEffect::Load { id, track } => self.driver.load(id, &track),
                PlayerEffect::Preload(track) => self.driver.preload(&track),
                PlayerEffect::DropPreload => self.driver.drop_preload(),
                PlayerEffect::Play(id) => self.driver.play(id),
                PlayerEffect::Pause(id) => self.driver.pause(id),
                PlayerEffect::Seek { id, position } => self.driver.seek(id, position),
                PlayerEffect::AttachVisualizer(id) => self.driver.attach_visualizer(id),
                PlayerEffect::PublishNowPlaying(track) => self.driver.publish_now_playing(&track),
                PlayerEffect::PublishPlaybackState { playing } => {
                    self.driver.publish_playback_state(playing)
                }
                PlayerEffect::PersistIndex(index) => {
                    if let Err(err) = self.store.save_index(index) {
                        warn!(%err, index, "failed to persist last played index");
                    }
                }
                PlayerEffect::PersistOffset(seconds) => {
                    if let Err(err) = self.store.save_offset(seconds) {
                        warn!(%err, seconds, "failed to persist playback offset");
                    }
                }
                PlayerEffect::ClearSavedPosition => {
                    if let Err(err) = self.store.clear() {
                        warn!(%err, "failed to clear saved position");
                    }
                }
            }
        }
    }
}
