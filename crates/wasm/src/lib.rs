mod host;

use replay_lens_core::{RecorderConfig, RecorderSession};
use replay_lens_protocol::Segment;
use wasm_bindgen::prelude::*;

pub use host::{PerformanceClock, WindowEvents, WindowHost};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// A viewport recording bound to the page's `window`.
///
/// Created by the SDK bootstrap with an optional JSON config; the transport
/// drains it with `flush()`.
#[wasm_bindgen]
pub struct Recorder {
    session: RecorderSession<WindowHost>,
}

#[wasm_bindgen]
impl Recorder {
    /// Attach listeners and start recording.
    #[wasm_bindgen(constructor)]
    pub fn start(config_json: Option<String>) -> Result<Recorder, JsError> {
        let config = match config_json.as_deref() {
            Some(json) => {
                RecorderConfig::from_json(json).map_err(|e| JsError::new(&e.to_string()))?
            }
            None => RecorderConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
        let events = WindowEvents::new(window.clone());
        let clock = PerformanceClock::new(&window);
        let session = RecorderSession::start(
            &config,
            WindowHost::new(window),
            &events,
            Box::new(clock),
        )
        .map_err(|e| {
            web_sys::console::error_1(&format!("replay-lens: {e}").into());
            JsError::new(&e.to_string())
        })?;
        Ok(Recorder { session })
    }

    /// Detach all listeners. Buffered records remain available to `flush`.
    pub fn stop(&mut self) {
        self.session.stop();
    }

    #[wasm_bindgen(getter)]
    pub fn recording(&self) -> bool {
        self.session.is_recording()
    }

    /// Number of records waiting for the next flush.
    pub fn buffered(&self) -> usize {
        self.session.records().len()
    }

    /// Drain buffered records as a JSON segment.
    pub fn flush(&self) -> Result<String, JsError> {
        segment_json(&self.session.flush())
    }
}

fn segment_json(segment: &Segment) -> Result<String, JsError> {
    serde_json::to_string(segment).map_err(|e| JsError::new(&e.to_string()))
}
