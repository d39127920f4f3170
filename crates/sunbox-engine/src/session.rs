use std::path::Path;

use crate::error::EngineError;
use crate::module::{EngineModule, InitFlags};
use crate::CHANNELS;

/// Lifecycle of an engine session. States only ever move forward while the
/// session is being brought up; teardown returns straight to `Unloaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionState {
    Unloaded,
    ModuleLoaded,
    Initialized,
    /// The only state in which songs can be loaded and rendered.
    SlotOpen,
}

/// Parameters used to bring an engine up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub sample_rate: u32,
    pub slot: i32,
    /// Engine volume, where 256 is unity gain.
    pub volume: i32,
}

impl EngineSettings {
    pub const DEFAULT_SLOT: i32 = 0;
    pub const UNITY_VOLUME: i32 = 256;

    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            slot: Self::DEFAULT_SLOT,
            volume: Self::UNITY_VOLUME,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::new(44_100)
    }
}

/// How a block lines up with the end of the song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSplit {
    /// The whole block lies before the song end.
    Continuous { frames: u32 },
    /// `tail` frames finish the song, then `head` frames restart it.
    Wrapped { tail: u32, head: u32 },
}

/// Playback position inside the loaded song, in frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    current: u32,
    total: u32,
}

impl PlaybackCursor {
    pub fn new(total: u32) -> Self {
        Self { current: 0, total }
    }

    /// Builds a cursor at an arbitrary position, clamped to the song length.
    pub fn at(current: u32, total: u32) -> Self {
        Self {
            current: current.min(total),
            total,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Moves the cursor by `frames`, wrapping to the overflow amount once the
    /// block reaches the song end.
    pub fn advance(&mut self, frames: u32) -> BlockSplit {
        let end = u64::from(self.current) + u64::from(frames);
        if end < u64::from(self.total) {
            self.current += frames;
            return BlockSplit::Continuous { frames };
        }

        let tail = self.total - self.current;
        let head = frames - tail;
        self.current = match self.total {
            0 => 0,
            total if head > total => head % total,
            _ => head,
        };
        BlockSplit::Wrapped { tail, head }
    }
}

/// Owns a loaded engine module and its single playback slot.
pub struct EngineSession<M: EngineModule> {
    module: Option<M>,
    state: SessionState,
    settings: EngineSettings,
    cursor: PlaybackCursor,
    failure: Option<EngineError>,
}

impl<M: EngineModule> EngineSession<M> {
    /// A session that never got an engine. Renders silence.
    pub fn unloaded(settings: EngineSettings) -> Self {
        Self {
            module: None,
            state: SessionState::Unloaded,
            settings,
            cursor: PlaybackCursor::default(),
            failure: None,
        }
    }

    /// Loads the module with `load` and brings it up to [`SessionState::SlotOpen`].
    ///
    /// Failures are logged and recorded; the session stops at the last state it
    /// reached and renders silence for the rest of its life.
    pub fn open<F>(load: F, settings: EngineSettings) -> Self
    where
        F: FnOnce() -> Result<M, EngineError>,
    {
        let mut session = Self::unloaded(settings);
        match load() {
            Ok(module) => {
                session.module = Some(module);
                session.state = SessionState::ModuleLoaded;
            }
            Err(err) => {
                session.record_failure(err);
                return session;
            }
        }

        if let Err(err) = session.bring_up() {
            session.record_failure(err);
        }
        session
    }

    fn bring_up(&mut self) -> Result<(), EngineError> {
        let settings = self.settings;
        let Some(module) = self.module.as_mut() else {
            return Err(EngineError::NotReady(self.state));
        };

        module.init(settings.sample_rate, CHANNELS as u32, InitFlags::PLUGIN)?;
        self.state = SessionState::Initialized;

        module.open_slot(settings.slot)?;
        module.set_volume(settings.slot, settings.volume);
        self.state = SessionState::SlotOpen;

        log::info!(
            "engine ready at {} Hz on slot {}",
            settings.sample_rate,
            settings.slot
        );
        Ok(())
    }

    fn record_failure(&mut self, err: EngineError) {
        log::error!("engine unavailable, rendering silence: {err}");
        self.failure = Some(err);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    /// The error that halted bring-up, if any.
    pub fn failure(&self) -> Option<&EngineError> {
        self.failure.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::SlotOpen
    }

    /// True once a song is loaded and blocks will carry audio.
    pub fn is_playing(&self) -> bool {
        self.is_ready() && self.cursor.total() > 0
    }

    /// Loads a song into the slot and starts looping playback from the top.
    pub fn load_song(&mut self, path: &Path) -> Result<(), EngineError> {
        if self.state != SessionState::SlotOpen {
            return Err(EngineError::NotReady(self.state));
        }
        let slot = self.settings.slot;
        let module = self
            .module
            .as_mut()
            .ok_or(EngineError::NotReady(self.state))?;

        self.cursor = PlaybackCursor::default();
        log::info!("loading song {}", path.display());
        module.load_song(slot, path)?;
        module.play_from_beginning(slot);
        module.set_autostop(slot, false);
        self.cursor = PlaybackCursor::new(module.song_length_frames(slot));
        log::debug!("song length: {} frames", self.cursor.total());
        Ok(())
    }

    /// Renders `block.len() / 2` interleaved stereo frames.
    ///
    /// When the block reaches the song end, the song tail fills the front of
    /// the block and the song restarts in the remainder; both halves are
    /// rendered against the same tick value. Without a playing song the block
    /// is zeroed, as is a trailing partial frame.
    pub fn render_block(&mut self, block: &mut [f32]) {
        if !self.is_playing() {
            block.fill(0.0);
            return;
        }
        let Some(module) = self.module.as_mut() else {
            block.fill(0.0);
            return;
        };

        let whole = block.len() - block.len() % CHANNELS;
        let (block, partial) = block.split_at_mut(whole);
        partial.fill(0.0);

        let frames = (block.len() / CHANNELS) as u32;
        let ticks = module.ticks();
        match self.cursor.advance(frames) {
            BlockSplit::Continuous { frames } => {
                module.render(&mut block[..frames as usize * CHANNELS], ticks);
            }
            BlockSplit::Wrapped { tail, head } => {
                let (tail_block, head_block) = block.split_at_mut(tail as usize * CHANNELS);
                if tail > 0 {
                    module.render(tail_block, ticks);
                }
                if head > 0 {
                    module.render(&mut head_block[..head as usize * CHANNELS], ticks);
                }
            }
        }
    }

    /// Unwinds whatever part of the lifecycle was reached. Safe to call twice.
    pub fn shutdown(&mut self) {
        let slot = self.settings.slot;
        if let Some(module) = self.module.as_mut() {
            if self.state >= SessionState::SlotOpen {
                module.stop(slot);
                module.close_slot(slot);
            }
            if self.state >= SessionState::Initialized {
                module.deinit();
            }
        }
        if self.module.take().is_some() {
            log::debug!("engine module released");
        }
        self.state = SessionState::Unloaded;
        self.cursor = PlaybackCursor::default();
    }
}

impl<M: EngineModule> Drop for EngineSession<M> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
