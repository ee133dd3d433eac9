pub mod records;
pub mod types;

pub use records::{IncrementalSnapshotRecord, IncrementalSource, RecordData, Segment};
pub use types::{ScrollData, ViewportResizeData, VisualViewportData};
