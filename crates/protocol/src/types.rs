use serde::{Deserialize, Serialize};

/// Layout-viewport size in CSS pixels, after scrollbar correction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewportResizeData {
    pub width: u32,
    pub height: u32,
}

impl ViewportResizeData {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Layout-viewport scroll offset in CSS pixels.
///
/// Taken from the window/document scroll position, so it does not move when
/// only the visual viewport is panned inside a pinch-zoomed page. Negative
/// values are possible on hosts that report overscroll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrollData {
    pub x: i32,
    pub y: i32,
}

impl ScrollData {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Geometry of the visual viewport (the rectangle actually visible after
/// pinch-zoom).
///
/// `width`/`height` are in CSS pixels post-zoom, so
/// `width * scale ≈ layout width`. `offset_left`/`offset_top` are relative to
/// the layout viewport origin; `page_left`/`page_top` are relative to the
/// document origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualViewportData {
    pub scale: f64,
    pub width: f64,
    pub height: f64,
    pub offset_left: f64,
    pub offset_top: f64,
    pub page_left: f64,
    pub page_top: f64,
}

impl VisualViewportData {
    /// Width of the layout viewport implied by this visual viewport.
    pub fn layout_width(&self) -> f64 {
        self.width * self.scale
    }

    /// Height of the layout viewport implied by this visual viewport.
    pub fn layout_height(&self) -> f64 {
        self.height * self.scale
    }

    pub fn is_zoomed(&self) -> bool {
        self.scale > 1.0
    }
}
