//! Audio Manager - owns the player outside of the component render cycle.
//! DOM callbacks reach it through a weak event sink and defer their work to a
//! fresh task, so no callback re-enters a borrow.

use crate::api::Track;
use crate::config::PlayerConfig;
use crate::player::{PlaybackState, Player, PlayerCommand};
use dioxus::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
mod analyser_graph;
#[cfg(target_arch = "wasm32")]
mod media_session;
#[cfg(not(target_arch = "wasm32"))]
mod native_driver;
#[cfg(target_arch = "wasm32")]
mod web_driver;

#[cfg(target_arch = "wasm32")]
use crate::db::LocalPositionStore;
#[cfg(not(target_arch = "wasm32"))]
use crate::db::MemoryPositionStore;
#[cfg(target_arch = "wasm32")]
use crate::player::PlayerInput;
#[cfg(target_arch = "wasm32")]
use dioxus::core::{Runtime, RuntimeGuard};
#[cfg(not(target_arch = "wasm32"))]
use native_driver::LoggingDriver;
#[cfg(target_arch = "wasm32")]
use std::rc::Weak;
#[cfg(target_arch = "wasm32")]
use tracing::warn;
#[cfg(target_arch = "wasm32")]
use web_driver::WebMediaDriver;

#[cfg(target_arch = "wasm32")]
pub type PlatformPlayer = Player<WebMediaDriver, LocalPositionStore>;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformPlayer = Player<LoggingDriver, MemoryPositionStore>;

/// Callback the browser side uses to hand events back to the player.
#[cfg(target_arch = "wasm32")]
pub(crate) type EventSink = Rc<dyn Fn(PlayerInput)>;

/// Snapshot the UI renders from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NowPlaying {
    pub state: PlaybackState,
    pub track: Option<Track>,
}

fn publish(player: &PlatformPlayer, mut view: Signal<NowPlaying>) {
    let next = NowPlaying {
        state: player.state().clone(),
        track: player.current_track().cloned(),
    };
    if *view.peek() != next {
        view.set(next);
    }
}

/// Shared handle to the page's single player.
#[derive(Clone)]
pub struct PlayerHandle {
    player: Rc<RefCell<PlatformPlayer>>,
    view: Signal<NowPlaying>,
    tracks: Signal<Vec<Track>>,
}

impl PlayerHandle {
    #[cfg(target_arch = "wasm32")]
    pub fn new(
        config: &PlayerConfig,
        view: Signal<NowPlaying>,
        tracks: Signal<Vec<Track>>,
    ) -> Self {
        let runtime = Runtime::current();
        let player = Rc::new_cyclic(|weak: &Weak<RefCell<PlatformPlayer>>| {
            let weak = weak.clone();
            let sink: EventSink = Rc::new(move |input: PlayerInput| {
                let weak = weak.clone();
                let runtime = runtime.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let Some(player) = weak.upgrade() else {
                        return;
                    };
                    let _guard = RuntimeGuard::new(runtime);
                    let Ok(mut player) = player.try_borrow_mut() else {
                        warn!(?input, "player busy, dropping input");
                        return;
                    };
                    player.input(input);
                    publish(&player, view);
                });
            });
            RefCell::new(Player::new(
                config,
                WebMediaDriver::new(config, sink),
                LocalPositionStore,
            ))
        });

        Self {
            player,
            view,
            tracks,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(
        config: &PlayerConfig,
        view: Signal<NowPlaying>,
        tracks: Signal<Vec<Track>>,
    ) -> Self {
        Self {
            player: Rc::new(RefCell::new(Player::new(
                config,
                LoggingDriver,
                MemoryPositionStore::default(),
            ))),
            view,
            tracks,
        }
    }

    /// Install the fetched song list and cue the last played position.
    pub fn restore(&self, tracks: Vec<Track>) {
        let mut player = self.player.borrow_mut();
        player.restore(tracks);
        let mut list = self.tracks;
        list.set(player.tracks().to_vec());
        publish(&player, self.view);
    }

    pub fn command(&self, command: PlayerCommand) {
        let mut player = self.player.borrow_mut();
        player.command(command);
        publish(&player, self.view);
    }
}
