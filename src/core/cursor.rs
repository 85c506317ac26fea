/// Posisi baca atau tulis di dalam ring, selalu di `[0, capacity)`.
///
/// Satu `Cursor` dimiliki tepat oleh satu task (producer memegang write
/// cursor, consumer memegang read cursor), jadi tidak perlu atomic.
#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    pos: usize,
    capacity: usize,
}

impl Cursor {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self { pos: 0, capacity }
    }

    #[inline(always)]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// `pos = (pos + 1) mod capacity`
    #[inline(always)]
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
        if self.pos == self.capacity {
            self.pos = 0;
        }
    }
}
