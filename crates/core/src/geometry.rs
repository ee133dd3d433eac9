//! Fresh, unmemoized geometry readings from the host.

use replay_lens_protocol::{ScrollData, ViewportResizeData, VisualViewportData};

use crate::host::GeometryHost;

/// Outcome of a single geometry read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading<T> {
    Value(T),
    /// At least one field was unreadable. The sample must be dropped.
    Partial,
    /// The host has no such facility (visual viewport only).
    Unsupported,
}

impl<T> Reading<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Partial | Self::Unsupported => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Self::Value(v) => Reading::Value(f(v)),
            Self::Partial => Reading::Partial,
            Self::Unsupported => Reading::Unsupported,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

fn to_px(v: f64) -> u32 {
    v.round().max(0.0).min(f64::from(u32::MAX)) as u32
}

fn to_offset(v: f64) -> i32 {
    v.round()
        .clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// `innerWidth`/`innerHeight` minus the scrollbar correction.
pub fn read_layout_viewport<H: GeometryHost + ?Sized>(
    host: &H,
    correction: u32,
) -> Reading<ViewportResizeData> {
    let (Some(w), Some(h)) = (finite(host.inner_width()), finite(host.inner_height())) else {
        return Reading::Partial;
    };
    Reading::Value(ViewportResizeData::new(
        to_px(w).saturating_sub(correction),
        to_px(h).saturating_sub(correction),
    ))
}

/// Layout scroll offset from the window/document scroll position.
///
/// Never derived from visual-viewport page offsets: those move with
/// pinch-zoom panning, layout scroll does not.
pub fn read_scroll_offset<H: GeometryHost + ?Sized>(host: &H) -> Reading<ScrollData> {
    let (Some(x), Some(y)) = (finite(host.scroll_x()), finite(host.scroll_y())) else {
        return Reading::Partial;
    };
    Reading::Value(ScrollData::new(to_offset(x), to_offset(y)))
}

pub fn read_visual_viewport<H: GeometryHost + ?Sized>(host: &H) -> Reading<VisualViewportData> {
    let Some(raw) = host.visual_viewport() else {
        return Reading::Unsupported;
    };
    let fields = (
        finite(raw.scale).filter(|s| *s > 0.0),
        finite(raw.width),
        finite(raw.height),
        finite(raw.offset_left),
        finite(raw.offset_top),
        finite(raw.page_left),
        finite(raw.page_top),
    );
    let (
        Some(scale),
        Some(width),
        Some(height),
        Some(offset_left),
        Some(offset_top),
        Some(page_left),
        Some(page_top),
    ) = fields
    else {
        return Reading::Partial;
    };
    Reading::Value(VisualViewportData {
        scale,
        width,
        height,
        offset_left,
        offset_top,
        page_left,
        page_top,
    })
}
