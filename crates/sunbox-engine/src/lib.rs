//! SunVox engine hosting for the Sunbox plug-in.
//!
//! The engine is a closed shared library shipped next to the plug-in binary.
//! This crate finds that library, binds its C entry points, and drives a single
//! playback slot through a small lifecycle state machine. The [`SongPlayer`]
//! turns the engine's interleaved stereo output into the split channel buffers
//! plug-in hosts expect, looping the song when a block runs past its end.

mod audio_buffer;
pub mod config;
mod error;
pub mod ffi;
pub mod locator;
mod module;
mod player;
mod session;

pub use audio_buffer::InterleavedBuffer;
pub use config::SunboxConfig;
pub use error::{EngineError, LocatorError};
pub use ffi::SunvoxLibrary;
pub use locator::{engine_library_path, sibling_library_path, ENGINE_MODULE_FILENAME};
pub use module::{EngineModule, InitFlags};
pub use player::SongPlayer;
pub use session::{BlockSplit, EngineSession, EngineSettings, PlaybackCursor, SessionState};

/// Number of interleaved channels the engine renders.
pub const CHANNELS: usize = 2;
