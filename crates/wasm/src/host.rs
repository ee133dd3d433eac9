use replay_lens_core::clock::Clock;
use replay_lens_core::host::{
    Environment, EventHandler, EventSource, EventTarget, GeometryHost, HostEventKind,
    RawVisualViewport, Subscription,
};
use replay_lens_core::RecorderError;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Performance, Window};

const PROBE_STYLE: &str =
    "position:absolute;top:-9999px;width:100px;height:100px;overflow:scroll;";

/// Geometry read straight from the page's `window`.
pub struct WindowHost {
    window: Window,
}

impl WindowHost {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl GeometryHost for WindowHost {
    fn inner_width(&self) -> Option<f64> {
        self.window.inner_width().ok().and_then(|v| v.as_f64())
    }

    fn inner_height(&self) -> Option<f64> {
        self.window.inner_height().ok().and_then(|v| v.as_f64())
    }

    fn scroll_x(&self) -> Option<f64> {
        self.window.scroll_x().ok().or_else(|| {
            let root = self.window.document()?.document_element()?;
            Some(f64::from(root.scroll_left()))
        })
    }

    fn scroll_y(&self) -> Option<f64> {
        self.window.scroll_y().ok().or_else(|| {
            let root = self.window.document()?.document_element()?;
            Some(f64::from(root.scroll_top()))
        })
    }

    fn visual_viewport(&self) -> Option<RawVisualViewport> {
        let vv = self.window.visual_viewport()?;
        Some(RawVisualViewport {
            scale: Some(vv.scale()),
            width: Some(vv.width()),
            height: Some(vv.height()),
            offset_left: Some(vv.offset_left()),
            offset_top: Some(vv.offset_top()),
            page_left: Some(vv.page_left()),
            page_top: Some(vv.page_top()),
        })
    }

    fn environment(&self) -> Environment {
        let navigator = self.window.navigator();
        let user_agent = navigator.user_agent().unwrap_or_default();
        let platform = navigator.platform().unwrap_or_default();
        Environment::from_user_agent(&user_agent, &platform)
    }

    fn measure_scrollbar_width(&self) -> Option<f64> {
        let document = self.window.document()?;
        let body = document.body()?;
        let probe = document
            .create_element("div")
            .ok()?
            .dyn_into::<web_sys::HtmlElement>()
            .ok()?;
        probe.set_attribute("style", PROBE_STYLE).ok()?;
        body.append_child(&probe).ok()?;
        let width = probe.offset_width() - probe.client_width();
        probe.remove();
        Some(f64::from(width))
    }
}

/// DOM event listeners on `window` and `window.visualViewport`.
pub struct WindowEvents {
    window: Window,
}

impl WindowEvents {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn target(&self, kind: HostEventKind) -> Result<web_sys::EventTarget, RecorderError> {
        match kind.target() {
            EventTarget::Window => Ok(self.window.clone().into()),
            EventTarget::VisualViewport => self
                .window
                .visual_viewport()
                .map(Into::into)
                .ok_or_else(|| RecorderError::ListenerAttach {
                    event: kind,
                    reason: "visualViewport is undefined".into(),
                }),
        }
    }
}

impl EventSource for WindowEvents {
    fn subscribe(
        &self,
        kind: HostEventKind,
        handler: EventHandler,
    ) -> Result<Subscription, RecorderError> {
        let target = self.target(kind)?;
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
            handler(kind);
        });
        target
            .add_event_listener_with_callback(kind.dom_name(), closure.as_ref().unchecked_ref())
            .map_err(|e| RecorderError::ListenerAttach {
                event: kind,
                reason: format!("{e:?}"),
            })?;

        Ok(Subscription::new(kind, move || {
            let _ = target.remove_event_listener_with_callback(
                kind.dom_name(),
                closure.as_ref().unchecked_ref(),
            );
            drop(closure);
        }))
    }
}

/// Epoch milliseconds from `performance.timeOrigin + performance.now()`.
///
/// Monotonic for the lifetime of the page. Falls back to `Date.now()` when
/// the Performance API is unavailable.
pub struct PerformanceClock {
    performance: Option<Performance>,
}

impl PerformanceClock {
    pub fn new(window: &Window) -> Self {
        Self {
            performance: window.performance(),
        }
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(perf) => perf.time_origin() + perf.now(),
            None => js_sys::Date::now(),
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn performance_clock_never_goes_backwards() {
        let window = web_sys::window().expect("window");
        let clock = PerformanceClock::new(&window);
        let mut last = clock.now_ms();
        for _ in 0..1000 {
            let now = clock.now_ms();
            assert!(now >= last);
            last = now;
        }
        // Anchored to the epoch, not to page load.
        assert!((last - js_sys::Date::now()).abs() < 60_000.0);
    }
}
