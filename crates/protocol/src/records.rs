use serde::{Deserialize, Serialize};

use crate::types::{ScrollData, ViewportResizeData, VisualViewportData};

/// Which geometry source produced an incremental record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncrementalSource {
    ViewportResize,
    Scroll,
    VisualViewport,
}

impl std::fmt::Display for IncrementalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ViewportResize => write!(f, "viewport-resize"),
            Self::Scroll => write!(f, "scroll"),
            Self::VisualViewport => write!(f, "visual-viewport"),
        }
    }
}

/// Payload of an incremental record, tagged by its source.
///
/// Serializes as `{"type": "<source>", "data": {...}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RecordData {
    ViewportResize(ViewportResizeData),
    Scroll(ScrollData),
    VisualViewport(VisualViewportData),
}

impl RecordData {
    pub fn source(&self) -> IncrementalSource {
        match self {
            Self::ViewportResize(_) => IncrementalSource::ViewportResize,
            Self::Scroll(_) => IncrementalSource::Scroll,
            Self::VisualViewport(_) => IncrementalSource::VisualViewport,
        }
    }
}

/// A single timestamped change record.
///
/// Immutable once appended to a segment: consumers replay records in
/// insertion order to rebuild what the user saw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncrementalSnapshotRecord {
    /// Recording timestamp in milliseconds.
    pub timestamp: i64,
    #[serde(flatten)]
    pub data: RecordData,
}

impl IncrementalSnapshotRecord {
    pub fn new(timestamp: i64, data: RecordData) -> Self {
        Self { timestamp, data }
    }

    pub fn source(&self) -> IncrementalSource {
        self.data.source()
    }
}

/// An ordered batch of records drained from the recorder for transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Flush sequence number within the recording session, starting at 0.
    pub index: u32,
    pub records: Vec<IncrementalSnapshotRecord>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of a single source kind, in emission order.
    pub fn of_source(
        &self,
        source: IncrementalSource,
    ) -> impl Iterator<Item = &IncrementalSnapshotRecord> {
        self.records.iter().filter(move |r| r.source() == source)
    }
}
