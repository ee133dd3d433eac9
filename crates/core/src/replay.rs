//! Consumer-side reconstruction: fold a record stream back into the
//! geometry the user saw at each point in time.

use replay_lens_protocol::{
    IncrementalSnapshotRecord, RecordData, ScrollData, ViewportResizeData, VisualViewportData,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReplayState {
    pub timestamp: Option<i64>,
    pub viewport: Option<ViewportResizeData>,
    pub scroll: Option<ScrollData>,
    pub visual: Option<VisualViewportData>,
}

impl ReplayState {
    pub fn apply(&mut self, record: &IncrementalSnapshotRecord) {
        self.timestamp = Some(record.timestamp);
        match record.data {
            RecordData::ViewportResize(v) => self.viewport = Some(v),
            RecordData::Scroll(s) => self.scroll = Some(s),
            RecordData::VisualViewport(v) => self.visual = Some(v),
        }
    }

    /// State after every record has been applied.
    pub fn replay<'a>(records: impl IntoIterator<Item = &'a IncrementalSnapshotRecord>) -> Self {
        let mut state = Self::default();
        for record in records {
            state.apply(record);
        }
        state
    }

    /// State after each record, one entry per record.
    pub fn frames<'a>(
        records: impl IntoIterator<Item = &'a IncrementalSnapshotRecord>,
    ) -> Vec<ReplayState> {
        let mut state = Self::default();
        records
            .into_iter()
            .map(|record| {
                state.apply(record);
                state
            })
            .collect()
    }

    /// Document position of the visual viewport.
    ///
    /// A layout scroll emits no visual-viewport record, so the recorded page
    /// offsets go stale. Once a scroll is known the position is the layout
    /// scroll plus the offset inside the layout viewport.
    pub fn visual_page_offset(&self) -> Option<(f64, f64)> {
        let v = self.visual?;
        Some(match self.scroll {
            Some(s) => (f64::from(s.x) + v.offset_left, f64::from(s.y) + v.offset_top),
            None => (v.page_left, v.page_top),
        })
    }

    /// Visible document rectangle `(left, top, width, height)`, preferring
    /// visual-viewport geometry when it is known.
    pub fn visible_rect(&self) -> Option<(f64, f64, f64, f64)> {
        if let (Some(v), Some((left, top))) = (self.visual, self.visual_page_offset()) {
            return Some((left, top, v.width, v.height));
        }
        let viewport = self.viewport?;
        let scroll = self.scroll.unwrap_or_default();
        Some((
            f64::from(scroll.x),
            f64::from(scroll.y),
            f64::from(viewport.width),
            f64::from(viewport.height),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(ts: i64, data: RecordData) -> IncrementalSnapshotRecord {
        IncrementalSnapshotRecord::new(ts, data)
    }

    #[test]
    fn later_records_override_earlier_ones() {
        let records = vec![
            rec(1, RecordData::ViewportResize(ViewportResizeData::new(390, 844))),
            rec(2, RecordData::Scroll(ScrollData::new(0, 100))),
            rec(3, RecordData::Scroll(ScrollData::new(0, 250))),
        ];
        let state = ReplayState::replay(&records);
        assert_eq!(state.timestamp, Some(3));
        assert_eq!(state.scroll, Some(ScrollData::new(0, 250)));
        assert_eq!(state.visible_rect(), Some((0.0, 250.0, 390.0, 844.0)));
    }

    #[test]
    fn frames_track_each_step() {
        let records = vec![
            rec(1, RecordData::Scroll(ScrollData::new(0, 10))),
            rec(2, RecordData::ViewportResize(ViewportResizeData::new(800, 600))),
        ];
        let frames = ReplayState::frames(&records);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].viewport, None);
        assert_eq!(frames[0].visible_rect(), None);
        assert_eq!(frames[1].scroll, Some(ScrollData::new(0, 10)));
    }

    #[test]
    fn visual_viewport_wins_for_visible_rect() {
        let visual = VisualViewportData {
            scale: 2.0,
            width: 195.0,
            height: 422.0,
            offset_left: 0.0,
            offset_top: 60.0,
            page_left: 0.0,
            page_top: 160.0,
        };
        let state = ReplayState::replay(&[
            rec(1, RecordData::Scroll(ScrollData::new(0, 100))),
            rec(2, RecordData::VisualViewport(visual)),
        ]);
        assert_eq!(state.visible_rect(), Some((0.0, 160.0, 195.0, 422.0)));
    }

    #[test]
    fn layout_scroll_after_pan_moves_visible_rect() {
        let visual = VisualViewportData {
            scale: 2.0,
            width: 195.0,
            height: 422.0,
            offset_left: 10.0,
            offset_top: 60.0,
            page_left: 10.0,
            page_top: 60.0,
        };
        let state = ReplayState::replay(&[
            rec(1, RecordData::VisualViewport(visual)),
            rec(2, RecordData::Scroll(ScrollData::new(0, 1000))),
        ]);
        assert_eq!(state.visual_page_offset(), Some((10.0, 1060.0)));
        assert_eq!(state.visible_rect(), Some((10.0, 1060.0, 195.0, 422.0)));
    }

    #[test]
    fn recorded_page_offset_used_until_a_scroll_is_known() {
        let visual = VisualViewportData {
            scale: 1.5,
            width: 260.0,
            height: 562.0,
            offset_left: 0.0,
            offset_top: 40.0,
            page_left: 0.0,
            page_top: 340.0,
        };
        let state = ReplayState::replay(&[rec(1, RecordData::VisualViewport(visual))]);
        assert_eq!(state.visual_page_offset(), Some((0.0, 340.0)));
    }
}
