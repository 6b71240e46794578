//! # Bounded Output Buffer
//!
//! Fixed-capacity, append-only storage for one frame's physical output
//! (bytes or pulse durations). The capacity is chosen so that the worst-case
//! frame always fits; writing past it is a programming error and panics.

/// Fixed-capacity output buffer with a monotonic write cursor
#[derive(Debug, Clone)]
pub struct OutputBuffer<T: Copy + Default, const N: usize> {
    data: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> OutputBuffer<T, N> {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            len: 0,
        }
    }

    /// Rewind the cursor to the start of the buffer
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Append one element
    ///
    /// # Panics
    ///
    /// Panics if the buffer is already full. Frame layouts are sized so that
    /// this cannot happen.
    pub fn append(&mut self, value: T) {
        debug_assert!(self.len < N, "output buffer overrun (capacity {})", N);
        self.data[self.len] = value;
        self.len += 1;
    }

    /// Last written element, if any
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.data[..self.len].last_mut()
    }

    /// Written prefix of the buffer
    pub fn contents(&self) -> &[T] {
        &self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T: Copy + Default, const N: usize> Default for OutputBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
