//! Decides whether a fresh measurement is worth a record.
//!
//! Each tracked quantity is a small state machine: `Unset` until the first
//! good reading, then `Tracked(last)`. A new reading is emitted only when it
//! differs from `last` in any field (exact comparison, no tolerance band).

use replay_lens_protocol::{RecordData, ScrollData, ViewportResizeData, VisualViewportData};
use tracing::{trace, warn};

use crate::geometry::{self, Reading};
use crate::host::{GeometryHost, HostEventKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackState<T> {
    Unset,
    Tracked(T),
}

/// What a tracker did with an observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First value this session; stored as the comparison baseline.
    Baseline,
    Changed,
    Unchanged,
}

impl Observation {
    pub fn should_emit(self) -> bool {
        self == Self::Changed
    }
}

#[derive(Debug, Clone)]
pub struct Tracker<T> {
    state: TrackState<T>,
}

impl<T: PartialEq> Tracker<T> {
    pub fn new() -> Self {
        Self {
            state: TrackState::Unset,
        }
    }

    pub fn state(&self) -> &TrackState<T> {
        &self.state
    }

    pub fn last(&self) -> Option<&T> {
        match &self.state {
            TrackState::Unset => None,
            TrackState::Tracked(v) => Some(v),
        }
    }

    pub fn observe(&mut self, value: T) -> Observation {
        let outcome = match &self.state {
            TrackState::Unset => Observation::Baseline,
            TrackState::Tracked(last) if *last == value => return Observation::Unchanged,
            TrackState::Tracked(_) => Observation::Changed,
        };
        self.state = TrackState::Tracked(value);
        outcome
    }
}

impl<T: PartialEq> Default for Tracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-session change detection for layout size, layout scroll and, when
/// enabled, visual-viewport geometry.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    correction: u32,
    visual_enabled: bool,
    layout: Tracker<ViewportResizeData>,
    scroll: Tracker<ScrollData>,
    visual: Tracker<VisualViewportData>,
}

impl ChangeDetector {
    pub fn new(correction: u32, visual_enabled: bool) -> Self {
        Self {
            correction,
            visual_enabled,
            layout: Tracker::new(),
            scroll: Tracker::new(),
            visual: Tracker::new(),
        }
    }

    pub fn correction(&self) -> u32 {
        self.correction
    }

    pub fn visual_enabled(&self) -> bool {
        self.visual_enabled
    }

    pub fn layout(&self) -> &Tracker<ViewportResizeData> {
        &self.layout
    }

    pub fn scroll(&self) -> &Tracker<ScrollData> {
        &self.scroll
    }

    pub fn visual(&self) -> &Tracker<VisualViewportData> {
        &self.visual
    }

    /// Take the recording-start baseline for every tracked quantity.
    ///
    /// Returns the baseline values when `emit_baseline` is set, otherwise
    /// nothing.
    pub fn prime<H: GeometryHost + ?Sized>(
        &mut self,
        host: &H,
        emit_baseline: bool,
    ) -> Vec<RecordData> {
        let mut kinds = vec![HostEventKind::WindowResize, HostEventKind::WindowScroll];
        if self.visual_enabled {
            kinds.push(HostEventKind::VisualViewportResize);
        }
        kinds
            .into_iter()
            .filter_map(|kind| {
                let data = self.measure(kind, host)?;
                let observation = self.observe(data);
                (emit_baseline && observation == Observation::Baseline).then_some(data)
            })
            .collect()
    }

    /// Evaluate one host event. Returns the record payload to emit, if any.
    pub fn on_event<H: GeometryHost + ?Sized>(
        &mut self,
        kind: HostEventKind,
        host: &H,
    ) -> Option<RecordData> {
        let data = self.measure(kind, host)?;
        match self.observe(data) {
            Observation::Changed => Some(data),
            Observation::Baseline => {
                trace!(%kind, "baseline taken on first event");
                None
            }
            Observation::Unchanged => {
                trace!(%kind, "unchanged, not emitting");
                None
            }
        }
    }

    fn measure<H: GeometryHost + ?Sized>(
        &self,
        kind: HostEventKind,
        host: &H,
    ) -> Option<RecordData> {
        let reading = match kind {
            HostEventKind::WindowResize => {
                geometry::read_layout_viewport(host, self.correction)
                    .map(RecordData::ViewportResize)
            }
            HostEventKind::WindowScroll => {
                geometry::read_scroll_offset(host).map(RecordData::Scroll)
            }
            HostEventKind::VisualViewportResize | HostEventKind::VisualViewportScroll => {
                if !self.visual_enabled {
                    return None;
                }
                geometry::read_visual_viewport(host).map(RecordData::VisualViewport)
            }
        };
        match reading {
            Reading::Value(data) => Some(data),
            Reading::Partial => {
                warn!(%kind, "dropping partial geometry reading");
                None
            }
            Reading::Unsupported => None,
        }
    }

    fn observe(&mut self, data: RecordData) -> Observation {
        match data {
            RecordData::ViewportResize(v) => self.layout.observe(v),
            RecordData::Scroll(v) => self.scroll.observe(v),
            RecordData::VisualViewport(v) => self.visual.observe(v),
        }
    }
}
