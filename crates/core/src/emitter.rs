use replay_lens_protocol::{IncrementalSnapshotRecord, RecordData};
use tracing::debug;

use crate::clock::Clock;
use crate::segment::SegmentBuffer;

/// Stamps detected changes and appends them to the segment buffer.
pub struct Emitter {
    clock: Box<dyn Clock>,
    last_timestamp: Option<i64>,
}

impl Emitter {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            last_timestamp: None,
        }
    }

    /// Current recording timestamp in whole milliseconds.
    ///
    /// Never goes backwards within a session, even if the clock does.
    pub fn timestamp(&mut self) -> i64 {
        let now = self.clock.now_ms();
        let now = if now.is_finite() { now.round() as i64 } else { 0 };
        let ts = self.last_timestamp.map_or(now, |last| now.max(last));
        self.last_timestamp = Some(ts);
        ts
    }

    pub fn emit(
        &mut self,
        data: RecordData,
        buffer: &mut SegmentBuffer,
    ) -> IncrementalSnapshotRecord {
        let record = IncrementalSnapshotRecord::new(self.timestamp(), data);
        debug!(source = %record.source(), timestamp = record.timestamp, ?data, "emit");
        buffer.append(record);
        record
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("last_timestamp", &self.last_timestamp)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use replay_lens_protocol::ViewportResizeData;

    #[test]
    fn stamps_and_appends() {
        let clock = ManualClock::new(1_000.4);
        let mut emitter = Emitter::new(Box::new(clock.clone()));
        let mut buffer = SegmentBuffer::new();
        let data = RecordData::ViewportResize(ViewportResizeData::new(390, 844));

        let record = emitter.emit(data, &mut buffer);
        assert_eq!(record.timestamp, 1_000);
        assert_eq!(buffer.records(), &[record]);
    }

    #[test]
    fn timestamps_never_decrease() {
        let clock = ManualClock::new(500.0);
        let mut emitter = Emitter::new(Box::new(clock.clone()));
        assert_eq!(emitter.timestamp(), 500);
        clock.set(200.0);
        assert_eq!(emitter.timestamp(), 500);
        clock.set(650.0);
        assert_eq!(emitter.timestamp(), 650);
    }
}
