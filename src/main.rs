use dioxus::prelude::*;

mod api;
mod components;
mod config;
mod db;
mod player;
mod utils;
mod visualizer;

use components::PlayerShell;

const APP_CSS: Asset = asset!("/assets/styling/app.css");

fn main() {
    dioxus::logger::initialize_default();
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Meta { name: "viewport", content: "width=device-width, initial-scale=1" }
        // Theme color for mobile browsers
        document::Meta { name: "theme-color", content: "#101014" }
        document::Meta { name: "mobile-web-app-capable", content: "yes" }
        document::Meta { name: "apple-mobile-web-app-title", content: "PocketWave" }
        document::Title { "PocketWave" }

        document::Stylesheet { href: APP_CSS }

        PlayerShell {}
    }
}
