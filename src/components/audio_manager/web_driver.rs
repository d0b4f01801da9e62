// Browser media driver: one HtmlAudioElement per active track, events fed back
// through the player's event sink.
use super::analyser_graph::AnalyserGraph;
use super::media_session::{self, MediaSessionActions};
use super::EventSink;
use crate::api::Track;
use crate::config::PlayerConfig;
use crate::player::{ElementId, MediaDriver, MediaEvent, PlayerInput};
use crate::visualizer::BarStyle;
use tracing::{debug, error, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, HtmlAudioElement, HtmlCanvasElement};

fn new_audio_element(url: &str) -> Option<HtmlAudioElement> {
    let audio = match HtmlAudioElement::new_with_src(url) {
        Ok(audio) => audio,
        Err(err) => {
            error!(?err, %url, "failed to create audio element");
            return None;
        }
    };
    // Anonymous CORS keeps the analyser allowed to read samples.
    audio.set_cross_origin(Some("anonymous"));
    let _ = audio.set_attribute("playsinline", "true");
    Some(audio)
}

fn describe_js_error(err: &JsValue) -> String {
    match err.dyn_ref::<js_sys::Error>() {
        Some(error) => format!("{}: {}", String::from(error.name()), String::from(error.message())),
        None => format!("{err:?}"),
    }
}

fn trailing_buffered_end(audio: &HtmlAudioElement) -> Option<f64> {
    let ranges = audio.buffered();
    let len = ranges.length();
    if len == 0 {
        return None;
    }
    ranges.end(len - 1).ok()
}

/// The element receiving transport commands, with the listeners it owns.
struct ActiveElement {
    id: ElementId,
    audio: HtmlAudioElement,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
}

impl ActiveElement {
    fn new(id: ElementId, track: &Track, sink: &EventSink) -> Option<Self> {
        let audio = new_audio_element(&track.url)?;
        let mut element = Self {
            id,
            audio,
            listeners: Vec::new(),
        };

        element.listen("loadedmetadata", sink, |audio| MediaEvent::MetadataLoaded {
            duration: audio.duration(),
        });
        element.listen("canplaythrough", sink, |_| MediaEvent::CanPlayThrough);
        element.listen("progress", sink, |audio| MediaEvent::Progress {
            buffered_end: trailing_buffered_end(audio),
        });
        element.listen("timeupdate", sink, |audio| MediaEvent::TimeUpdate {
            position: audio.current_time(),
        });
        element.listen("ended", sink, |_| MediaEvent::Ended);
        element.listen("pause", sink, |_| MediaEvent::Paused);

        Some(element)
    }

    fn listen(
        &mut self,
        event: &'static str,
        sink: &EventSink,
        read: impl Fn(&HtmlAudioElement) -> MediaEvent + 'static,
    ) {
        let audio = self.audio.clone();
        let id = self.id;
        let sink = sink.clone();
        let callback = Closure::wrap(
            Box::new(move || sink(PlayerInput::Media(id, read(&audio)))) as Box<dyn FnMut()>,
        );
        match self
            .audio
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        {
            Ok(()) => self.listeners.push((event, callback)),
            Err(err) => warn!(?err, event, "failed to attach media listener"),
        }
    }
}

impl Drop for ActiveElement {
    fn drop(&mut self) {
        for (event, callback) in self.listeners.drain(..) {
            let _ = self
                .audio
                .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
        let _ = self.audio.pause();
        self.audio.set_src("");
        self.audio.load();
        debug!(id = ?self.id, "audio element released");
    }
}

pub struct WebMediaDriver {
    sink: EventSink,
    active: Option<ActiveElement>,
    preloaded: Option<HtmlAudioElement>,
    graph: AnalyserGraph,
    session_actions: Option<MediaSessionActions>,
    canvas_id: String,
    fft_size: u32,
    style: BarStyle,
}

impl WebMediaDriver {
    pub fn new(config: &PlayerConfig, sink: EventSink) -> Self {
        Self {
            sink,
            active: None,
            preloaded: None,
            graph: AnalyserGraph::default(),
            session_actions: None,
            canvas_id: config.canvas_id.clone(),
            fft_size: config.fft_size,
            style: BarStyle::from_config(config),
        }
    }

    fn active_for(&self, id: ElementId) -> Option<&ActiveElement> {
        self.active.as_ref().filter(|active| active.id == id)
    }

    fn canvas(&self) -> Option<HtmlCanvasElement> {
        window()?
            .document()?
            .get_element_by_id(&self.canvas_id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()
    }
}

impl MediaDriver for WebMediaDriver {
    fn load(&mut self, id: ElementId, track: &Track) {
        if let Some(previous) = self.active.take() {
            warn!(previous = ?previous.id, "replacing an element that was not released");
            self.graph.detach(previous.id);
        }
        self.active = ActiveElement::new(id, track, &self.sink);
    }

    fn release(&mut self, id: ElementId) {
        self.graph.detach(id);
        if self.active_for(id).is_some() {
            self.active = None;
        }
    }

    fn preload(&mut self, track: &Track) {
        if let Some(audio) = new_audio_element(&track.url) {
            audio.set_preload("auto");
            self.preloaded = Some(audio);
        }
    }

    fn drop_preload(&mut self) {
        // Not aborted: the new active element may be served from its response.
        self.preloaded = None;
    }

    fn play(&mut self, id: ElementId) {
        let sink = self.sink.clone();
        let Some(active) = self.active_for(id) else {
            // The element could not be created; end the pending request.
            sink(PlayerInput::Media(
                id,
                MediaEvent::PlayRejected {
                    reason: "audio element unavailable".to_string(),
                },
            ));
            return;
        };
        match active.audio.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                let event = match wasm_bindgen_futures::JsFuture::from(promise).await {
                    Ok(_) => MediaEvent::PlayResolved,
                    Err(err) => MediaEvent::PlayRejected {
                        reason: describe_js_error(&err),
                    },
                };
                sink(PlayerInput::Media(id, event));
            }),
            Err(err) => sink(PlayerInput::Media(
                id,
                MediaEvent::PlayRejected {
                    reason: describe_js_error(&err),
                },
            )),
        }
    }

    fn pause(&mut self, id: ElementId) {
        if let Some(active) = self.active_for(id) {
            if let Err(err) = active.audio.pause() {
                warn!(?err, "pause failed");
            }
        }
    }

    fn seek(&mut self, id: ElementId, position: f64) {
        if let Some(active) = self.active_for(id) {
            active.audio.set_current_time(position);
        }
    }

    fn attach_visualizer(&mut self, id: ElementId) {
        let Some(canvas) = self.canvas() else {
            return;
        };
        let Some(audio) = self.active_for(id).map(|active| active.audio.clone()) else {
            return;
        };
        self.graph
            .attach(id, &audio, canvas, self.fft_size, self.style);
    }

    fn publish_now_playing(&mut self, track: &Track) {
        if self.session_actions.is_none() {
            self.session_actions = media_session::register_actions(&self.sink);
        }
        media_session::publish_now_playing(track);
    }

    fn publish_playback_state(&mut self, playing: bool) {
        media_session::publish_playback_state(playing);
    }
}
