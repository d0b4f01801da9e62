// Page-wide audio context, per-element analyser graph and the bar render loop.
use crate::player::ElementId;
use crate::visualizer::{layout_bars, BarStyle};
use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    window, AnalyserNode, AudioContext, CanvasRenderingContext2d, HtmlAudioElement,
    HtmlCanvasElement, MediaElementAudioSourceNode,
};

thread_local! {
    static AUDIO_CONTEXT: OnceCell<Option<AudioContext>> = const { OnceCell::new() };
}

/// The single audio context for the page. Created on first use, never recreated.
fn audio_context() -> Option<AudioContext> {
    AUDIO_CONTEXT.with(|cell| {
        cell.get_or_init(|| match AudioContext::new() {
            Ok(context) => Some(context),
            Err(err) => {
                warn!(?err, "audio context unavailable, visualizer disabled");
                None
            }
        })
        .clone()
    })
}

/// A self-rescheduling animation frame loop. Dropping it cancels the pending frame.
pub struct RenderTask {
    frame: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl RenderTask {
    pub fn start(mut draw: impl FnMut() + 'static) -> Option<Self> {
        let win = window()?;
        let frame = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

        let next_frame = frame.clone();
        let reschedule = Rc::downgrade(&callback);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            draw();
            let (Some(callback), Some(win)) = (reschedule.upgrade(), window()) else {
                return;
            };
            let id = callback
                .borrow()
                .as_ref()
                .and_then(|cb| win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
            next_frame.set(id);
        }) as Box<dyn FnMut()>));

        let id = callback
            .borrow()
            .as_ref()
            .and_then(|cb| win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
        frame.set(id);

        Some(Self { frame, callback })
    }
}

impl Drop for RenderTask {
    fn drop(&mut self) {
        if let (Some(id), Some(win)) = (self.frame.take(), window()) {
            let _ = win.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
    }
}

struct AttachedGraph {
    id: ElementId,
    source: MediaElementAudioSourceNode,
    analyser: AnalyserNode,
    _render: RenderTask,
}

impl Drop for AttachedGraph {
    fn drop(&mut self) {
        let _ = self.source.disconnect();
        let _ = self.analyser.disconnect();
    }
}

/// Source → analyser → destination chain for the active element.
#[derive(Default)]
pub struct AnalyserGraph {
    attached: Option<AttachedGraph>,
}

impl AnalyserGraph {
    /// Start drawing `audio`'s spectrum into `canvas`.
    ///
    /// A media element can feed only one source node, so an existing graph for
    /// the same element is kept and only the context is resumed.
    pub fn attach(
        &mut self,
        id: ElementId,
        audio: &HtmlAudioElement,
        canvas: HtmlCanvasElement,
        fft_size: u32,
        style: BarStyle,
    ) {
        let Some(context) = audio_context() else {
            return;
        };
        let _ = context.resume();

        if self.attached.as_ref().is_some_and(|graph| graph.id == id) {
            return;
        }
        self.attached = None;

        match build_graph(&context, id, audio, canvas, fft_size, style) {
            Ok(graph) => {
                debug!(?id, fft_size, "analyser graph attached");
                self.attached = Some(graph);
            }
            Err(err) => warn!(?err, "failed to build analyser graph"),
        }
    }

    pub fn detach(&mut self, id: ElementId) {
        if self.attached.as_ref().is_some_and(|graph| graph.id == id) {
            self.attached = None;
        }
    }
}

fn build_graph(
    context: &AudioContext,
    id: ElementId,
    audio: &HtmlAudioElement,
    canvas: HtmlCanvasElement,
    fft_size: u32,
    style: BarStyle,
) -> Result<AttachedGraph, wasm_bindgen::JsValue> {
    let source = context.create_media_element_source(audio)?;
    let analyser = context.create_analyser()?;
    analyser.set_fft_size(fft_size);
    source.connect_with_audio_node(&analyser)?;
    analyser.connect_with_audio_node(&context.destination())?;

    let surface = canvas
        .get_context("2d")?
        .ok_or_else(|| wasm_bindgen::JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let mut samples = vec![0u8; analyser.frequency_bin_count() as usize];
    let reader = analyser.clone();

    let render = RenderTask::start(move || {
        reader.get_byte_frequency_data(&mut samples);
        let width = canvas.client_width().max(0) as u32;
        let height = canvas.client_height().max(0) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        surface.clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
        for bar in layout_bars(&samples, f64::from(width), f64::from(height), style) {
            surface.set_fill_style_str(&bar.fill_style());
            surface.fill_rect(bar.x, bar.y, bar.width, bar.height);
        }
    })
    .ok_or_else(|| wasm_bindgen::JsValue::from_str("animation frames unavailable"))?;

    Ok(AttachedGraph {
        id,
        source,
        analyser,
        _render: render,
    })
}
