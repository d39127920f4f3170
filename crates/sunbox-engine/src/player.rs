use std::path::Path;

use crate::audio_buffer::InterleavedBuffer;
use crate::error::EngineError;
use crate::module::EngineModule;
use crate::session::EngineSession;

/// Bridges an [`EngineSession`] to split stereo host buffers.
pub struct SongPlayer<M: EngineModule> {
    session: EngineSession<M>,
    interleaved: InterleavedBuffer,
}

impl<M: EngineModule> SongPlayer<M> {
    pub fn new(session: EngineSession<M>) -> Self {
        Self {
            session,
            interleaved: InterleavedBuffer::default(),
        }
    }

    pub fn session(&self) -> &EngineSession<M> {
        &self.session
    }

    pub fn load_song(&mut self, path: &Path) -> Result<(), EngineError> {
        self.session.load_song(path)
    }

    /// Sizes the scratch buffer for the largest block the host will request.
    pub fn activate(&mut self, max_frames: usize) {
        self.interleaved.ensure_frames(max_frames);
    }

    pub fn deactivate(&mut self) {
        self.interleaved.release();
    }

    pub fn buffer_capacity_frames(&self) -> usize {
        self.interleaved.capacity_frames()
    }

    /// Fills `left` and `right` with the next block of the song.
    ///
    /// Renders `min(left.len(), right.len())` frames; samples past that in the
    /// longer channel are zeroed. The block is silent unless a song is playing.
    pub fn run(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        left[frames..].fill(0.0);
        right[frames..].fill(0.0);
        if !self.session.is_playing() {
            left[..frames].fill(0.0);
            right[..frames].fill(0.0);
            return;
        }

        self.interleaved.ensure_frames(frames);
        self.session.render_block(self.interleaved.block_mut(frames));
        self.interleaved.deinterleave(frames, left, right);
    }
}
