use std::path::Path;

use crate::error::EngineError;

/// Flags passed to the engine's global initialisation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InitFlags(pub u32);

impl InitFlags {
    pub const NO_DEBUG_OUTPUT: InitFlags = InitFlags(1 << 0);
    /// The host drives rendering through the audio callback instead of the
    /// engine opening its own audio device.
    pub const USER_AUDIO_CALLBACK: InitFlags = InitFlags(1 << 1);
    pub const AUDIO_INT16: InitFlags = InitFlags(1 << 2);
    pub const AUDIO_FLOAT32: InitFlags = InitFlags(1 << 3);
    pub const ONE_THREAD: InitFlags = InitFlags(1 << 4);

    /// Flags used for plug-in hosting: float output, callback driven, no
    /// internal threads and no console chatter.
    pub const PLUGIN: InitFlags = InitFlags(
        Self::NO_DEBUG_OUTPUT.0
            | Self::USER_AUDIO_CALLBACK.0
            | Self::AUDIO_FLOAT32.0
            | Self::ONE_THREAD.0,
    );

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: InitFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for InitFlags {
    type Output = InitFlags;

    fn bitor(self, rhs: InitFlags) -> InitFlags {
        InitFlags(self.0 | rhs.0)
    }
}

/// The capabilities the session needs from a loaded engine module.
///
/// Implementations wrap a module that is already loaded into the process;
/// dropping the implementation unloads it. Every call is made from the thread
/// that owns the session.
pub trait EngineModule: Send {
    fn init(&mut self, sample_rate: u32, channels: u32, flags: InitFlags)
        -> Result<(), EngineError>;
    fn deinit(&mut self);

    fn open_slot(&mut self, slot: i32) -> Result<(), EngineError>;
    fn close_slot(&mut self, slot: i32);
    fn set_volume(&mut self, slot: i32, volume: i32);

    fn load_song(&mut self, slot: i32, path: &Path) -> Result<(), EngineError>;
    fn play_from_beginning(&mut self, slot: i32);
    fn stop(&mut self, slot: i32);
    fn set_autostop(&mut self, slot: i32, enabled: bool);
    fn song_length_frames(&mut self, slot: i32) -> u32;

    /// Current value of the engine's tick counter.
    fn ticks(&mut self) -> u32;

    /// Render `out.len() / 2` interleaved stereo frames.
    fn render(&mut self, out: &mut [f32], out_time: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_flags_select_float_callback_mode() {
        let flags = InitFlags::PLUGIN;
        assert!(flags.contains(InitFlags::AUDIO_FLOAT32));
        assert!(flags.contains(InitFlags::USER_AUDIO_CALLBACK));
        assert!(flags.contains(InitFlags::ONE_THREAD));
        assert!(!flags.contains(InitFlags::AUDIO_INT16));
        assert_eq!(
            flags,
            InitFlags::NO_DEBUG_OUTPUT
                | InitFlags::USER_AUDIO_CALLBACK
                | InitFlags::AUDIO_FLOAT32
                | InitFlags::ONE_THREAD
        );
        assert_eq!(flags.bits(), 0b11011);
    }
}
