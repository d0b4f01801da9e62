// OS media session bridge. The Media Session API is not in stable web-sys,
// so it is reached through js_sys::Reflect.
use super::EventSink;
use crate::api::Track;
use crate::player::{PlayerInput, RemoteAction};
use js_sys::{Array, Function, Object, Reflect};
use tracing::debug;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::window;

fn media_session() -> Option<JsValue> {
    let navigator = window()?.navigator();
    let session = Reflect::get(&navigator, &JsValue::from_str("mediaSession")).ok()?;
    (!session.is_undefined() && !session.is_null()).then_some(session)
}

fn set(target: &JsValue, key: &str, value: &JsValue) {
    let _ = Reflect::set(target, &JsValue::from_str(key), value);
}

pub fn publish_now_playing(track: &Track) {
    let Some(session) = media_session() else {
        return;
    };
    let Some(constructor) = Reflect::get(&js_sys::global(), &JsValue::from_str("MediaMetadata"))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
    else {
        return;
    };

    let init = Object::new();
    set(&init, "title", &JsValue::from_str(&track.title));
    set(&init, "artist", &JsValue::from_str(&track.artist));
    let artwork = Array::new();
    if let Some(src) = track.artwork() {
        let image = Object::new();
        set(&image, "src", &JsValue::from_str(src));
        artwork.push(&image);
    }
    set(&init, "artwork", &artwork);

    match Reflect::construct(&constructor, &Array::of1(&init)) {
        Ok(metadata) => set(&session, "metadata", &metadata),
        Err(err) => debug!(?err, "media session rejected metadata"),
    }
}

pub fn publish_playback_state(playing: bool) {
    if let Some(session) = media_session() {
        let state = if playing { "playing" } else { "paused" };
        set(&session, "playbackState", &JsValue::from_str(state));
    }
}

/// Keeps the registered action callbacks alive.
pub struct MediaSessionActions {
    _handlers: Vec<Closure<dyn FnMut(JsValue)>>,
}

type ActionParser = fn(&JsValue) -> Option<RemoteAction>;

/// Route OS transport buttons into the player.
pub fn register_actions(sink: &EventSink) -> Option<MediaSessionActions> {
    let session = media_session()?;
    let set_action_handler = Reflect::get(&session, &JsValue::from_str("setActionHandler"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;

    let actions: [(&str, ActionParser); 5] = [
        ("play", |_| Some(RemoteAction::Play)),
        ("pause", |_| Some(RemoteAction::Pause)),
        ("nexttrack", |_| Some(RemoteAction::NextTrack)),
        ("previoustrack", |_| Some(RemoteAction::PreviousTrack)),
        ("seekto", |details| {
            Reflect::get(details, &JsValue::from_str("seekTime"))
                .ok()?
                .as_f64()
                .map(RemoteAction::SeekTo)
        }),
    ];

    let mut handlers = Vec::with_capacity(actions.len());
    for (name, parse) in actions {
        let sink = sink.clone();
        let callback = Closure::wrap(Box::new(move |details: JsValue| {
            if let Some(action) = parse(&details) {
                sink(PlayerInput::Remote(action));
            }
        }) as Box<dyn FnMut(JsValue)>);

        // Browsers throw for actions they do not support.
        if set_action_handler
            .call2(&session, &JsValue::from_str(name), callback.as_ref().unchecked_ref())
            .is_err()
        {
            debug!(name, "media session action unsupported");
            continue;
        }
        handlers.push(callback);
    }

    Some(MediaSessionActions {
        _handlers: handlers,
    })
}
