use std::borrow::Cow;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Block, ERR_POISONED_LOCK, SourceLocation, Track};

/// The live, shared state of one track inside a profiler.
///
/// Instrumentation holds an `Arc` to this so that completing a block does not need to look the
/// track up again.
#[derive(Debug)]
pub(crate) struct TrackState {
    track_index: usize,
    enabled: AtomicBool,
    data: Mutex<TrackData>,
}

#[derive(Debug, Default)]
struct TrackData {
    name: Option<String>,
    blocks: Vec<Block>,
}

impl TrackState {
    pub(crate) fn new(track_index: usize) -> Self {
        Self {
            track_index,
            enabled: AtomicBool::new(true),
            data: Mutex::new(TrackData::default()),
        }
    }

    pub(crate) fn track_index(&self) -> usize {
        self.track_index
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub(crate) fn set_name(&self, name: String) {
        self.data.lock().expect(ERR_POISONED_LOCK).name = Some(name);
    }

    /// Appends a completed block, returning the block index it was assigned.
    ///
    /// Index assignment and insertion happen under one lock, so concurrent appends get unique,
    /// contiguous indexes in the order they reach this point.
    pub(crate) fn append(
        &self,
        name: Cow<'static, str>,
        location: SourceLocation,
        duration_ns: u64,
    ) -> usize {
        let mut data = self.data.lock().expect(ERR_POISONED_LOCK);

        let block_index = data.blocks.len();
        data.blocks
            .push(Block::new(block_index, name, location, duration_ns));

        block_index
    }

    pub(crate) fn clear(&self) {
        self.data.lock().expect(ERR_POISONED_LOCK).blocks.clear();
    }

    pub(crate) fn snapshot(&self) -> Track {
        let data = self.data.lock().expect(ERR_POISONED_LOCK);

        Track::new(self.track_index, data.name.clone(), data.blocks.clone())
    }
}
