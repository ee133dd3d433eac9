use replay_lens_protocol::{IncrementalSnapshotRecord, Segment};

/// Append-only record buffer for the current recording.
///
/// `append` is the only mutator; records leave only through a full `flush`.
#[derive(Debug, Default)]
pub struct SegmentBuffer {
    records: Vec<IncrementalSnapshotRecord>,
    next_index: u32,
}

impl SegmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: IncrementalSnapshotRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[IncrementalSnapshotRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index the next flushed segment will carry.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Drain every buffered record into a sealed segment.
    pub fn flush(&mut self) -> Segment {
        let segment = Segment {
            index: self.next_index,
            records: std::mem::take(&mut self.records),
        };
        self.next_index += 1;
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_lens_protocol::{RecordData, ScrollData};

    fn scroll(ts: i64, y: i32) -> IncrementalSnapshotRecord {
        IncrementalSnapshotRecord::new(ts, RecordData::Scroll(ScrollData::new(0, y)))
    }

    #[test]
    fn flush_drains_in_append_order() {
        let mut buffer = SegmentBuffer::new();
        buffer.append(scroll(1, 10));
        buffer.append(scroll(2, 20));
        buffer.append(scroll(2, 30));
        assert_eq!(buffer.len(), 3);

        let segment = buffer.flush();
        assert_eq!(segment.index, 0);
        let ys: Vec<_> = segment
            .records
            .iter()
            .map(|r| match r.data {
                RecordData::Scroll(s) => s.y,
                _ => -1,
            })
            .collect();
        assert_eq!(ys, vec![10, 20, 30]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn flush_indices_increase_even_when_empty() {
        let mut buffer = SegmentBuffer::new();
        assert!(buffer.flush().is_empty());
        buffer.append(scroll(5, 1));
        let second = buffer.flush();
        assert_eq!(second.index, 1);
        assert_eq!(second.len(), 1);
        assert_eq!(buffer.next_index(), 2);
    }
}
