//! Fixed-depth sample history for one sensor.

/// Ring buffer of the last N normalized positions.
///
/// Storage is allocated once at construction and pre-filled with zeros, so the
/// first N-1 cycles average real samples together with zeros. `push` always
/// evicts the oldest entry; the length never changes.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    buf: Box<[f32]>,
    // index of the oldest entry, which is also the next slot to overwrite
    head: usize,
}

impl SampleWindow {
    /// Create a window of `depth` zeros. `depth` is clamped to at least 1.
    pub fn new(depth: usize) -> Self {
        Self {
            buf: vec![0.0; depth.max(1)].into_boxed_slice(),
            head: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, value: f32) {
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.buf.len();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Arithmetic mean over all N entries.
    pub fn mean(&self) -> f32 {
        let sum: f32 = self.buf.iter().sum();
        sum / self.buf.len() as f32
    }

    /// Most recently pushed entry.
    pub fn latest(&self) -> f32 {
        let n = self.buf.len();
        self.buf[(self.head + n - 1) % n]
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let (newer, older) = self.buf.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }

    /// Zero every entry, restoring the warm-up state.
    pub fn reset(&mut self) {
        self.buf.fill(0.0);
        self.head = 0;
    }
}
