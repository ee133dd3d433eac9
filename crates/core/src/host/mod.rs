//! Boundary between the recorder and the page it runs in.
//!
//! The recorder never touches browser globals directly. It reads geometry
//! through [`GeometryHost`] and listens for events through [`EventSource`],
//! so a real `window` binding and the in-memory [`ScriptedHost`] are
//! interchangeable.

pub mod environment;
pub mod scripted;

use std::rc::Rc;

use crate::error::RecorderError;

pub use environment::{Browser, Environment, Platform};
pub use scripted::{HostSetup, ScriptedHost};

/// Raw visual-viewport fields as the host exposes them.
///
/// Any field may be unreadable mid-transition; the geometry reader rejects
/// the whole sample in that case.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawVisualViewport {
    pub scale: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub offset_left: Option<f64>,
    pub offset_top: Option<f64>,
    pub page_left: Option<f64>,
    pub page_top: Option<f64>,
}

/// Live geometry of the host page. Every call reads current state.
///
/// `None` (or a non-finite value) means the field could not be read.
pub trait GeometryHost {
    fn inner_width(&self) -> Option<f64>;
    fn inner_height(&self) -> Option<f64>;
    fn scroll_x(&self) -> Option<f64>;
    fn scroll_y(&self) -> Option<f64>;

    /// `None` when the visual-viewport facility does not exist on this host.
    fn visual_viewport(&self) -> Option<RawVisualViewport>;

    fn environment(&self) -> Environment;

    /// Width of the platform scrollbar, measured with an offscreen probe
    /// (outer width minus client width of a scrollable container).
    fn measure_scrollbar_width(&self) -> Option<f64>;

    fn supports_visual_viewport(&self) -> bool {
        self.visual_viewport().is_some()
    }
}

impl<H: GeometryHost + ?Sized> GeometryHost for Rc<H> {
    fn inner_width(&self) -> Option<f64> {
        (**self).inner_width()
    }

    fn inner_height(&self) -> Option<f64> {
        (**self).inner_height()
    }

    fn scroll_x(&self) -> Option<f64> {
        (**self).scroll_x()
    }

    fn scroll_y(&self) -> Option<f64> {
        (**self).scroll_y()
    }

    fn visual_viewport(&self) -> Option<RawVisualViewport> {
        (**self).visual_viewport()
    }

    fn environment(&self) -> Environment {
        (**self).environment()
    }

    fn measure_scrollbar_width(&self) -> Option<f64> {
        (**self).measure_scrollbar_width()
    }

    fn supports_visual_viewport(&self) -> bool {
        (**self).supports_visual_viewport()
    }
}

/// The host events the recorder listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    WindowResize,
    WindowScroll,
    VisualViewportResize,
    VisualViewportScroll,
}

/// Object an event listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    VisualViewport,
}

impl HostEventKind {
    pub const WINDOW: [HostEventKind; 2] = [Self::WindowResize, Self::WindowScroll];
    pub const VISUAL_VIEWPORT: [HostEventKind; 2] =
        [Self::VisualViewportResize, Self::VisualViewportScroll];

    pub fn target(self) -> EventTarget {
        match self {
            Self::WindowResize | Self::WindowScroll => EventTarget::Window,
            Self::VisualViewportResize | Self::VisualViewportScroll => EventTarget::VisualViewport,
        }
    }

    /// DOM event type name (`"resize"` or `"scroll"`).
    pub fn dom_name(self) -> &'static str {
        match self {
            Self::WindowResize | Self::VisualViewportResize => "resize",
            Self::WindowScroll | Self::VisualViewportScroll => "scroll",
        }
    }
}

impl std::fmt::Display for HostEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let target = match self.target() {
            EventTarget::Window => "window",
            EventTarget::VisualViewport => "visualViewport",
        };
        write!(f, "{target}.{}", self.dom_name())
    }
}

pub type EventHandler = Rc<dyn Fn(HostEventKind)>;

/// A source of host events that hands out detachable subscriptions.
pub trait EventSource {
    fn subscribe(
        &self,
        kind: HostEventKind,
        handler: EventHandler,
    ) -> Result<Subscription, RecorderError>;
}

/// Handle for an attached listener. Detaches on [`Subscription::detach`] or
/// when dropped.
pub struct Subscription {
    kind: HostEventKind,
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(kind: HostEventKind, detach: impl FnOnce() + 'static) -> Self {
        Self {
            kind,
            detach: Some(Box::new(detach)),
        }
    }

    pub fn kind(&self) -> HostEventKind {
        self.kind
    }

    pub fn detach(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("attached", &self.detach.is_some())
            .finish()
    }
}
