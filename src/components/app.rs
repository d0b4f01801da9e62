use crate::api::{fetch_tracks, Track};
use crate::components::{
    Icon, IconKind, NowPlaying, NowPlayingCard, PlayerHandle, SongList, TransportBar,
    VisualizerCanvas,
};
use crate::config::PlayerConfig;
use dioxus::prelude::*;
use tracing::{error, info};

/// Whether the song list overlay is showing.
#[derive(Clone, Copy)]
pub struct SongListOpen(pub Signal<bool>);

#[component]
pub fn PlayerShell() -> Element {
    let config = use_hook(PlayerConfig::default);
    let now_playing = use_signal(NowPlaying::default);
    let tracks = use_signal(Vec::<Track>::new);
    let mut playlist_loading = use_signal(|| true);
    let mut load_error = use_signal(|| None::<String>);
    let mut show_song_list = use_signal(|| false);

    let player = use_hook({
        let config = config.clone();
        move || PlayerHandle::new(&config, now_playing, tracks)
    });

    // Provide state via context
    use_context_provider({
        let config = config.clone();
        move || config
    });
    use_context_provider({
        let player = player.clone();
        move || player
    });
    use_context_provider(|| now_playing);
    use_context_provider(|| tracks);
    use_context_provider(|| SongListOpen(show_song_list));

    // Fetch the song list once on mount
    use_effect({
        let player = player.clone();
        let url = config.playlist_url.clone();
        move || {
            let player = player.clone();
            let url = url.clone();
            spawn(async move {
                match fetch_tracks(&url).await {
                    Ok(list) => {
                        info!(count = list.len(), "playlist loaded");
                        player.restore(list);
                    }
                    Err(err) => {
                        error!(%err, "failed to load playlist");
                        load_error.set(Some(err.to_string()));
                    }
                }
                playlist_loading.set(false);
            });
        }
    });

    let has_tracks = !tracks.read().is_empty();

    rsx! {
        div { class: "app",
            header { class: "app-header",
                h1 { class: "app-title", "PocketWave" }
                button {
                    r#type: "button",
                    class: "icon-btn",
                    aria_label: "Song list",
                    disabled: !has_tracks,
                    onclick: move |_| {
                        let open = show_song_list();
                        show_song_list.set(!open);
                    },
                    Icon { kind: IconKind::List, class: "icon".to_string() }
                }
            }
            main { class: "stage",
                NowPlayingCard {}
                VisualizerCanvas {}
                if playlist_loading() {
                    div { class: "status",
                        Icon { kind: IconKind::Loader, class: "icon".to_string() }
                        span { "Loading songs..." }
                    }
                } else if let Some(message) = load_error() {
                    div { class: "status error", "Could not load songs: {message}" }
                } else if !has_tracks {
                    div { class: "status", "No songs available" }
                }
            }
            footer { class: "app-footer", TransportBar {} }
            SongList {}
        }
    }
}
