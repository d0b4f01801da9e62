use crate::config::PlayerConfig;
use dioxus::prelude::*;

/// Canvas the analyser graph draws into. Stays mounted for the page's
/// lifetime so the render loop never holds a detached canvas.
#[component]
pub fn VisualizerCanvas() -> Element {
    let config = use_context::<PlayerConfig>();

    rsx! {
        canvas {
            id: "{config.canvas_id}",
            class: "visualizer",
        }
    }
}
