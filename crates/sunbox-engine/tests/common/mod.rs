#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use sunbox_engine::{EngineError, EngineModule, InitFlags, CHANNELS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init {
        sample_rate: u32,
        channels: u32,
        flags: InitFlags,
    },
    Deinit,
    OpenSlot(i32),
    CloseSlot(i32),
    Volume(i32, i32),
    Load(i32, PathBuf),
    PlayFromBeginning(i32),
    Stop(i32),
    Autostop(i32, bool),
    SongLength(i32),
    Ticks,
    Render { frames: usize, out_time: u32 },
    Unload,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    Init,
    OpenSlot,
    Load,
}

/// Engine module double. Renders frame `n` of the song as `(n, -n)` and loops
/// back to frame 0 at the song end, like the real engine with autostop off.
pub struct ScriptedEngine {
    calls: CallLog,
    fail_at: FailAt,
    song_frames: u32,
    position: u32,
    ticks: u32,
}

impl ScriptedEngine {
    pub fn new(song_frames: u32) -> (Self, CallLog) {
        Self::failing(FailAt::Nothing, song_frames)
    }

    pub fn failing(fail_at: FailAt, song_frames: u32) -> (Self, CallLog) {
        let calls = CallLog::default();
        let engine = Self {
            calls: calls.clone(),
            fail_at,
            song_frames,
            position: 0,
            ticks: 7,
        };
        (engine, calls)
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl EngineModule for ScriptedEngine {
    fn init(
        &mut self,
        sample_rate: u32,
        channels: u32,
        flags: InitFlags,
    ) -> Result<(), EngineError> {
        self.record(Call::Init {
            sample_rate,
            channels,
            flags,
        });
        match self.fail_at {
            FailAt::Init => Err(EngineError::InitFailed(-1)),
            _ => Ok(()),
        }
    }

    fn deinit(&mut self) {
        self.record(Call::Deinit);
    }

    fn open_slot(&mut self, slot: i32) -> Result<(), EngineError> {
        self.record(Call::OpenSlot(slot));
        match self.fail_at {
            FailAt::OpenSlot => Err(EngineError::SlotOpenFailed { slot, code: -1 }),
            _ => Ok(()),
        }
    }

    fn close_slot(&mut self, slot: i32) {
        self.record(Call::CloseSlot(slot));
    }

    fn set_volume(&mut self, slot: i32, volume: i32) {
        self.record(Call::Volume(slot, volume));
    }

    fn load_song(&mut self, slot: i32, path: &Path) -> Result<(), EngineError> {
        self.record(Call::Load(slot, path.to_path_buf()));
        match self.fail_at {
            FailAt::Load => Err(EngineError::SongLoadFailed {
                path: path.to_path_buf(),
                code: -1,
            }),
            _ => Ok(()),
        }
    }

    fn play_from_beginning(&mut self, slot: i32) {
        self.record(Call::PlayFromBeginning(slot));
        self.position = 0;
    }

    fn stop(&mut self, slot: i32) {
        self.record(Call::Stop(slot));
    }

    fn set_autostop(&mut self, slot: i32, enabled: bool) {
        self.record(Call::Autostop(slot, enabled));
    }

    fn song_length_frames(&mut self, slot: i32) -> u32 {
        self.record(Call::SongLength(slot));
        self.song_frames
    }

    fn ticks(&mut self) -> u32 {
        self.record(Call::Ticks);
        let now = self.ticks;
        self.ticks += 1_000;
        now
    }

    fn render(&mut self, out: &mut [f32], out_time: u32) {
        self.record(Call::Render {
            frames: out.len() / CHANNELS,
            out_time,
        });
        for frame in out.chunks_exact_mut(CHANNELS) {
            frame[0] = self.position as f32;
            frame[1] = -(self.position as f32);
            self.position = (self.position + 1) % self.song_frames.max(1);
        }
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.record(Call::Unload);
    }
}

/// Left channel of an interleaved block.
pub fn left_channel(block: &[f32]) -> Vec<f32> {
    block.chunks_exact(CHANNELS).map(|frame| frame[0]).collect()
}

pub fn ramp(range: std::ops::Range<u32>) -> Vec<f32> {
    range.map(|frame| frame as f32).collect()
}

pub fn renders(calls: &CallLog) -> Vec<(usize, u32)> {
    calls
        .lock()
        .iter()
        .filter_map(|call| match call {
            Call::Render { frames, out_time } => Some((*frames, *out_time)),
            _ => None,
        })
        .collect()
}
