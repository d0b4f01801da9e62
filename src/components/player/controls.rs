use crate::api::Track;
use crate::components::{Icon, IconKind, NowPlaying, PlayerHandle};
use crate::player::{Phase, PlayerCommand};
use crate::utils::{format_time, percent_of};
use dioxus::prelude::*;

/// Play/Pause button - completely isolated component
#[component]
pub(super) fn PlayPauseButton() -> Element {
    let player = use_context::<PlayerHandle>();
    let now_playing = use_context::<Signal<NowPlaying>>();
    let phase = now_playing.read().state.phase;
    let playing = now_playing.read().state.is_playing();

    rsx! {
        button {
            id: "play-pause-btn",
            r#type: "button",
            class: "transport-btn primary",
            disabled: phase == Phase::Idle,
            onclick: move |_| player.command(PlayerCommand::TogglePause),
            if playing {
                Icon { kind: IconKind::Pause, class: "icon-lg".to_string() }
            } else if phase == Phase::Loading {
                Icon { kind: IconKind::Loader, class: "icon-lg".to_string() }
            } else {
                Icon { kind: IconKind::Play, class: "icon-lg".to_string() }
            }
        }
    }
}

#[component]
pub(super) fn PrevButton() -> Element {
    let player = use_context::<PlayerHandle>();
    let tracks = use_context::<Signal<Vec<Track>>>();
    let has_tracks = !tracks.read().is_empty();

    rsx! {
        button {
            id: "prev-btn",
            r#type: "button",
            class: "transport-btn",
            disabled: !has_tracks,
            onclick: move |_| player.command(PlayerCommand::Previous),
            Icon { kind: IconKind::Previous, class: "icon".to_string() }
        }
    }
}

#[component]
pub(super) fn NextButton() -> Element {
    let player = use_context::<PlayerHandle>();
    let tracks = use_context::<Signal<Vec<Track>>>();
    let has_tracks = !tracks.read().is_empty();

    rsx! {
        button {
            id: "next-btn",
            r#type: "button",
            class: "transport-btn",
            disabled: !has_tracks,
            onclick: move |_| player.command(PlayerCommand::Next),
            Icon { kind: IconKind::Next, class: "icon".to_string() }
        }
    }
}

/// Seek range with elapsed/total time and the buffered share behind it.
#[component]
pub(super) fn SeekBar() -> Element {
    let player = use_context::<PlayerHandle>();
    let now_playing = use_context::<Signal<NowPlaying>>();
    let state = now_playing.read().state.clone();

    let duration = state.duration.max(0.0);
    let elapsed_label = format_time(state.current_time);
    let duration_label = format_time(duration);
    let played = percent_of(state.current_time, duration);
    let buffered = state.buffered_percent;
    let position = state.current_time;

    let on_seek = move |e: Event<FormData>| {
        if let Ok(target) = e.value().parse::<f64>() {
            player.command(PlayerCommand::Seek(target));
        }
    };

    rsx! {
        div { class: "seek",
            span { class: "time", "{elapsed_label}" }
            div { class: "seek-track",
                div { class: "seek-buffered", style: "width: {buffered}%" }
                input {
                    r#type: "range",
                    min: "0",
                    max: "{duration}",
                    step: "0.1",
                    value: "{position}",
                    disabled: duration <= 0.0,
                    style: "--played: {played}%",
                    oninput: on_seek,
                }
            }
            span { class: "time", "{duration_label}" }
        }
    }
}
