// Off the web there is no audio element to drive; calls are only traced.
use crate::api::Track;
use crate::player::{ElementId, MediaDriver};
use tracing::debug;

#[derive(Debug, Default)]
pub struct LoggingDriver;

impl MediaDriver for LoggingDriver {
    fn load(&mut self, id: ElementId, track: &Track) {
        debug!(?id, url = %track.url, "load");
    }

    fn release(&mut self, id: ElementId) {
        debug!(?id, "release");
    }

    fn preload(&mut self, track: &Track) {
        debug!(url = %track.url, "preload");
    }

    fn drop_preload(&mut self) {}

    fn play(&mut self, id: ElementId) {
        debug!(?id, "play requested without an audio backend");
    }

    fn pause(&mut self, id: ElementId) {
        debug!(?id, "pause");
    }

    fn seek(&mut self, id: ElementId, position: f64) {
        debug!(?id, position, "seek");
    }

    fn attach_visualizer(&mut self, _id: ElementId) {}

    fn publish_now_playing(&mut self, track: &Track) {
        debug!(title = %track.title, "now playing");
    }

    fn publish_playback_state(&mut self, _playing: bool) {}
}
