use crate::components::{Icon, IconKind, NowPlaying};
use dioxus::prelude::*;

mod controls;

use controls::{NextButton, PlayPauseButton, PrevButton, SeekBar};

/// Artwork, title and artist of the current song.
#[component]
pub fn NowPlayingCard() -> Element {
    let now_playing = use_context::<Signal<NowPlaying>>();
    let NowPlaying { state, track } = now_playing();

    rsx! {
        div { class: "now-playing",
            {match track {
                Some(track) => rsx! {
                    div { class: "artwork",
                        {match track.artwork() {
                            Some(url) => rsx! {
                                img { src: "{url}", alt: "{track.title}", loading: "lazy" }
                            },
                            None => rsx! {
                                div { class: "artwork-placeholder",
                                    Icon { kind: IconKind::Music, class: "icon-xl".to_string() }
                                }
                            },
                        }}
                        if state.buffering {
                            div { class: "artwork-overlay",
                                Icon { kind: IconKind::Loader, class: "icon-lg".to_string() }
                            }
                        }
                    }
                    div { class: "track-info",
                        h2 { class: "track-title", "{track.title}" }
                        if !track.artist.is_empty() {
                            p { class: "track-artist", "{track.artist}" }
                        }
                    }
                },
                None => rsx! {
                    div { class: "artwork",
                        div { class: "artwork-placeholder",
                            Icon { kind: IconKind::Music, class: "icon-xl".to_string() }
                        }
                    }
                    div { class: "track-info",
                        h2 { class: "track-title muted", "Nothing playing" }
                    }
                },
            }}
        }
    }
}

#[component]
pub fn TransportBar() -> Element {
    rsx! {
        div { class: "transport-bar",
            SeekBar {}
            div { class: "transport",
                PrevButton {}
                PlayPauseButton {}
                NextButton {}
            }
        }
    }
}
