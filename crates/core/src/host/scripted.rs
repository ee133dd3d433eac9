//! Deterministic in-memory page used by tests and the scenario runner.
//!
//! Models a layout viewport scrolled over a document, with a visual viewport
//! that can be pinch-zoomed and panned inside it. Gesture helpers mutate the
//! model and then synchronously dispatch the events a browser would fire, in
//! browser order.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use super::{
    Environment, EventHandler, EventSource, EventTarget, GeometryHost, HostEventKind,
    RawVisualViewport, Subscription,
};
use crate::error::RecorderError;

/// Initial page geometry and host capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostSetup {
    pub inner_width: f64,
    pub inner_height: f64,
    pub document_width: f64,
    pub document_height: f64,
    pub environment: Environment,
    /// Result of the offscreen scrollbar probe; `None` if the probe fails.
    pub scrollbar_width: Option<f64>,
    /// Whether `window.visualViewport` exists.
    pub visual_viewport: bool,
    /// Report `innerWidth`/`innerHeight` as the zoomed visible size, as some
    /// mobile browsers do, and fire `resize` on pinch-zoom.
    pub inner_size_tracks_zoom: bool,
}

impl HostSetup {
    /// A touch device with a document four viewports tall.
    pub fn mobile(width: u32, height: u32) -> Self {
        Self {
            inner_width: f64::from(width),
            inner_height: f64::from(height),
            document_width: f64::from(width),
            document_height: f64::from(height) * 4.0,
            ..Self::default()
        }
    }
}

impl Default for HostSetup {
    fn default() -> Self {
        Self {
            inner_width: 1280.0,
            inner_height: 720.0,
            document_width: 1280.0,
            document_height: 3000.0,
            environment: Environment::default(),
            scrollbar_width: None,
            visual_viewport: true,
            inner_size_tracks_zoom: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PageState {
    layout_width: f64,
    layout_height: f64,
    document_width: f64,
    document_height: f64,
    scroll_x: f64,
    scroll_y: f64,
    scale: f64,
    offset_left: f64,
    offset_top: f64,
}

impl PageState {
    fn visual_width(&self) -> f64 {
        self.layout_width / self.scale
    }

    fn visual_height(&self) -> f64 {
        self.layout_height / self.scale
    }

    fn clamp_scroll(&mut self) {
        let max_x = (self.document_width - self.layout_width).max(0.0);
        let max_y = (self.document_height - self.layout_height).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    fn clamp_offsets(&mut self) {
        let max_left = (self.layout_width - self.visual_width()).max(0.0);
        let max_top = (self.layout_height - self.visual_height()).max(0.0);
        self.offset_left = self.offset_left.clamp(0.0, max_left);
        self.offset_top = self.offset_top.clamp(0.0, max_top);
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, HostEventKind, EventHandler)>,
}

pub struct ScriptedHost {
    setup: HostSetup,
    page: RefCell<PageState>,
    listeners: Rc<RefCell<Listeners>>,
    failing: RefCell<HashSet<HostEventKind>>,
    unreadable: Cell<bool>,
}

impl ScriptedHost {
    pub fn new(setup: HostSetup) -> Self {
        let mut page = PageState {
            layout_width: setup.inner_width.max(0.0),
            layout_height: setup.inner_height.max(0.0),
            document_width: setup.document_width,
            document_height: setup.document_height,
            scroll_x: 0.0,
            scroll_y: 0.0,
            scale: 1.0,
            offset_left: 0.0,
            offset_top: 0.0,
        };
        page.clamp_scroll();
        Self {
            setup,
            page: RefCell::new(page),
            listeners: Rc::new(RefCell::new(Listeners::default())),
            failing: RefCell::new(HashSet::new()),
            unreadable: Cell::new(false),
        }
    }

    pub fn setup(&self) -> &HostSetup {
        &self.setup
    }

    /// Current pinch-zoom scale.
    pub fn scale(&self) -> f64 {
        self.page.borrow().scale
    }

    /// Layout scroll position, unrounded.
    pub fn layout_scroll(&self) -> (f64, f64) {
        let page = self.page.borrow();
        (page.scroll_x, page.scroll_y)
    }

    /// Visual viewport offset inside the layout viewport.
    pub fn visual_offset(&self) -> (f64, f64) {
        let page = self.page.borrow();
        (page.offset_left, page.offset_top)
    }

    pub fn listener_count(&self, kind: HostEventKind) -> usize {
        self.listeners
            .borrow()
            .entries
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    /// Make every geometry field read as undefined until reset.
    pub fn set_unreadable(&self, unreadable: bool) {
        self.unreadable.set(unreadable);
    }

    /// Refuse future subscriptions for `kind`, as a host lacking that API.
    pub fn fail_subscriptions_for(&self, kind: HostEventKind) {
        self.failing.borrow_mut().insert(kind);
    }

    /// Fire `kind` to every listener attached to it, in attach order.
    pub fn dispatch(&self, kind: HostEventKind) {
        // Handlers may read geometry or detach, so release the borrow first.
        let handlers: Vec<EventHandler> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(kind);
        }
    }

    /// Change the layout viewport size (window resize, keyboard, toolbar).
    pub fn resize(&self, width: f64, height: f64) {
        {
            let mut page = self.page.borrow_mut();
            page.layout_width = width.max(0.0);
            page.layout_height = height.max(0.0);
            page.clamp_scroll();
            page.clamp_offsets();
        }
        self.dispatch(HostEventKind::WindowResize);
        if self.setup.visual_viewport {
            self.dispatch(HostEventKind::VisualViewportResize);
        }
    }

    /// Programmatic layout scroll, clamped to the document bounds.
    pub fn scroll_to(&self, x: f64, y: f64) {
        let moved = {
            let mut page = self.page.borrow_mut();
            let before = (page.scroll_x, page.scroll_y);
            page.scroll_x = x;
            page.scroll_y = y;
            page.clamp_scroll();
            before != (page.scroll_x, page.scroll_y)
        };
        if moved {
            self.dispatch(HostEventKind::WindowScroll);
        }
    }

    pub fn scroll_by(&self, dx: f64, dy: f64) {
        let (x, y) = self.layout_scroll();
        self.scroll_to(x + dx, y + dy);
    }

    /// Pinch to `scale` (clamped to at least 1.0), keeping the visual
    /// viewport inside the layout viewport.
    pub fn pinch_zoom(&self, scale: f64) {
        let (zoomed, panned) = {
            let mut page = self.page.borrow_mut();
            let before_scale = page.scale;
            let before_offset = (page.offset_left, page.offset_top);
            page.scale = if scale.is_finite() { scale.max(1.0) } else { 1.0 };
            page.clamp_offsets();
            (
                before_scale != page.scale,
                before_offset != (page.offset_left, page.offset_top),
            )
        };
        if !zoomed {
            return;
        }
        if self.setup.visual_viewport {
            self.dispatch(HostEventKind::VisualViewportResize);
            if panned {
                self.dispatch(HostEventKind::VisualViewportScroll);
            }
        }
        if self.setup.inner_size_tracks_zoom {
            self.dispatch(HostEventKind::WindowResize);
        }
    }

    /// Pan the zoomed visual viewport. Layout scroll does not move.
    pub fn pinch_scroll(&self, dx: f64, dy: f64) {
        let panned = {
            let mut page = self.page.borrow_mut();
            let before = (page.offset_left, page.offset_top);
            page.offset_left += dx;
            page.offset_top += dy;
            page.clamp_offsets();
            before != (page.offset_left, page.offset_top)
        };
        if panned && self.setup.visual_viewport {
            self.dispatch(HostEventKind::VisualViewportScroll);
        }
    }

    fn readable(&self, v: f64) -> Option<f64> {
        (!self.unreadable.get()).then_some(v)
    }
}

impl GeometryHost for ScriptedHost {
    fn inner_width(&self) -> Option<f64> {
        let page = self.page.borrow();
        let w = if self.setup.inner_size_tracks_zoom {
            page.visual_width().round()
        } else {
            page.layout_width
        };
        self.readable(w)
    }

    fn inner_height(&self) -> Option<f64> {
        let page = self.page.borrow();
        let h = if self.setup.inner_size_tracks_zoom {
            page.visual_height().round()
        } else {
            page.layout_height
        };
        self.readable(h)
    }

    fn scroll_x(&self) -> Option<f64> {
        self.readable(self.page.borrow().scroll_x)
    }

    fn scroll_y(&self) -> Option<f64> {
        self.readable(self.page.borrow().scroll_y)
    }

    fn visual_viewport(&self) -> Option<RawVisualViewport> {
        if !self.setup.visual_viewport {
            return None;
        }
        if self.unreadable.get() {
            return Some(RawVisualViewport::default());
        }
        let page = self.page.borrow();
        Some(RawVisualViewport {
            scale: Some(page.scale),
            width: Some(page.visual_width()),
            height: Some(page.visual_height()),
            offset_left: Some(page.offset_left),
            offset_top: Some(page.offset_top),
            page_left: Some(page.scroll_x + page.offset_left),
            page_top: Some(page.scroll_y + page.offset_top),
        })
    }

    fn environment(&self) -> Environment {
        self.setup.environment
    }

    fn measure_scrollbar_width(&self) -> Option<f64> {
        self.setup.scrollbar_width
    }

    fn supports_visual_viewport(&self) -> bool {
        self.setup.visual_viewport
    }
}

impl EventSource for ScriptedHost {
    fn subscribe(
        &self,
        kind: HostEventKind,
        handler: EventHandler,
    ) -> Result<Subscription, RecorderError> {
        if self.failing.borrow().contains(&kind) {
            return Err(RecorderError::ListenerAttach {
                event: kind,
                reason: "addEventListener is not available".into(),
            });
        }
        if kind.target() == EventTarget::VisualViewport && !self.setup.visual_viewport {
            return Err(RecorderError::ListenerAttach {
                event: kind,
                reason: "visualViewport is undefined".into(),
            });
        }

        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, kind, handler));
            id
        };
        let weak: Weak<RefCell<Listeners>> = Rc::downgrade(&self.listeners);
        Ok(Subscription::new(kind, move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.borrow_mut().entries.retain(|(i, _, _)| *i != id);
            }
        }))
    }
}

impl std::fmt::Debug for ScriptedHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedHost")
            .field("setup", &self.setup)
            .field("page", &*self.page.borrow())
            .field("listeners", &self.total_listeners())
            .finish()
    }
}
