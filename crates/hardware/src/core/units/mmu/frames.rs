//! Physical frame allocation.

/// Hands out contiguous runs of physical frames, lowest first.
///
/// Frames are never returned; the allocator models the simple "next free
/// offset" placement the instructional kernel starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameAllocator {
    next: u32,
    total: u32,
}

impl FrameAllocator {
    /// Creates an allocator over `total` frames.
    pub const fn new(total: u32) -> Self {
        Self { next: 0, total }
    }

    /// Frames not yet handed out.
    pub const fn available(&self) -> u32 {
        self.total - self.next
    }

    /// Reserves `count` consecutive frames.
    ///
    /// # Returns
    ///
    /// The first frame of the run, or `None` if not enough frames remain.
    pub const fn allocate(&mut self, count: u32) -> Option<u32> {
        if count > self.available() {
            return None;
        }
        let first = self.next;
        self.next += count;
        Some(first)
    }
}
