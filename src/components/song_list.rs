use crate::api::Track;
use crate::components::{Icon, IconKind, NowPlaying, PlayerHandle, SongListOpen};
use crate::player::PlayerCommand;
use dioxus::prelude::*;

/// Overlay listing every song; choosing one starts it and closes the list.
#[component]
pub fn SongList() -> Element {
    let player = use_context::<PlayerHandle>();
    let tracks = use_context::<Signal<Vec<Track>>>();
    let now_playing = use_context::<Signal<NowPlaying>>();
    let mut open = use_context::<SongListOpen>().0;

    if !open() {
        return rsx! {};
    }

    let current = now_playing.read().state.current_index;
    let list = tracks();

    rsx! {
        div {
            class: "song-list-backdrop",
            onclick: move |_| open.set(false),
            div {
                class: "song-list",
                onclick: move |e: MouseEvent| e.stop_propagation(),
                div { class: "song-list-header",
                    h2 { "Songs" }
                    button {
                        r#type: "button",
                        class: "icon-btn",
                        aria_label: "Close song list",
                        onclick: move |_| open.set(false),
                        Icon { kind: IconKind::Close, class: "icon".to_string() }
                    }
                }
                ul {
                    for (index, track) in list.into_iter().enumerate() {
                        li { key: "{index}-{track.id}",
                            button {
                                r#type: "button",
                                class: if current == Some(index) { "song-row active" } else { "song-row" },
                                onclick: {
                                    let player = player.clone();
                                    move |_| {
                                        player.command(PlayerCommand::Select {
                                            index,
                                            autoplay: true,
                                        });
                                        open.set(false);
                                    }
                                },
                                span { class: "song-row-title", "{track.title}" }
                                if !track.artist.is_empty() {
                                    span { class: "song-row-artist", "{track.artist}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
