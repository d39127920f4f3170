use crate::CHANNELS;

/// Grow-only scratch buffer holding interleaved stereo samples.
///
/// The engine renders interleaved frames while hosts hand out one slice per
/// channel, so every block passes through this buffer. Its contents are
/// rewritten on each block; only the allocation is kept between blocks.
#[derive(Clone, Debug, Default)]
pub struct InterleavedBuffer {
    samples: Vec<f32>,
}

impl InterleavedBuffer {
    /// Creates a buffer with room for `frames` stereo frames.
    pub fn with_frames(frames: usize) -> Self {
        let mut buffer = Self::default();
        buffer.ensure_frames(frames);
        buffer
    }

    /// Number of stereo frames the buffer can hold without reallocating.
    pub fn capacity_frames(&self) -> usize {
        self.samples.len() / CHANNELS
    }

    /// Makes room for `frames` stereo frames, returning `true` if this had to
    /// reallocate. The buffer never shrinks.
    pub fn ensure_frames(&mut self, frames: usize) -> bool {
        let needed = frames * CHANNELS;
        if self.samples.len() >= needed {
            return false;
        }
        self.samples = vec![0.0; needed];
        true
    }

    /// Drops the allocation entirely.
    pub fn release(&mut self) {
        self.samples = Vec::new();
    }

    /// Interleaved view over the first `frames` frames.
    ///
    /// # Panics
    /// Panics if `frames` exceeds [`capacity_frames`](Self::capacity_frames).
    pub fn block_mut(&mut self, frames: usize) -> &mut [f32] {
        &mut self.samples[..frames * CHANNELS]
    }

    /// Splits the first `frames` interleaved frames into `left` and `right`.
    pub fn deinterleave(&self, frames: usize, left: &mut [f32], right: &mut [f32]) {
        let frames = frames.min(left.len()).min(right.len());
        let source = self.samples[..frames * CHANNELS].chunks_exact(CHANNELS);
        for ((frame, l), r) in source.zip(left.iter_mut()).zip(right.iter_mut()) {
            *l = frame[0];
            *r = frame[1];
        }
    }
}
