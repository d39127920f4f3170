//! Bindings to the SunVox engine library, resolved at load time.

use std::ffi::{c_char, c_int, c_void, CString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use libloading::Library;

use crate::error::EngineError;
use crate::module::{EngineModule, InitFlags};
use crate::CHANNELS;

type InitFn = unsafe extern "C" fn(*const c_char, c_int, c_int, u32) -> c_int;
type DeinitFn = unsafe extern "C" fn() -> c_int;
type SlotFn = unsafe extern "C" fn(c_int) -> c_int;
type SlotValueFn = unsafe extern "C" fn(c_int, c_int) -> c_int;
type LoadFn = unsafe extern "C" fn(c_int, *const c_char) -> c_int;
type SongLengthFn = unsafe extern "C" fn(c_int) -> u32;
type TicksFn = unsafe extern "C" fn() -> u32;
type AudioCallbackFn = unsafe extern "C" fn(*mut c_void, c_int, c_int, u32) -> c_int;

/// The engine keeps all of its state in globals, so only one handle may be
/// live per process.
static ENGINE_CLAIMED: AtomicBool = AtomicBool::new(false);

struct EngineClaim;

impl EngineClaim {
    fn acquire() -> Option<Self> {
        ENGINE_CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| EngineClaim)
    }
}

impl Drop for EngineClaim {
    fn drop(&mut self) {
        ENGINE_CLAIMED.store(false, Ordering::Release);
    }
}

#[derive(Clone, Copy)]
struct Symbols {
    init: InitFn,
    deinit: DeinitFn,
    open_slot: SlotFn,
    close_slot: SlotFn,
    volume: SlotValueFn,
    load: LoadFn,
    play_from_beginning: SlotFn,
    stop: SlotFn,
    set_autostop: SlotValueFn,
    song_length_frames: SongLengthFn,
    ticks: TicksFn,
    audio_callback: AudioCallbackFn,
}

impl Symbols {
    /// # Safety
    /// `library` must be a SunVox engine library exporting the C signatures above.
    unsafe fn resolve(library: &Library) -> Result<Self, libloading::Error> {
        Ok(Self {
            init: *library.get::<InitFn>(b"sv_init\0")?,
            deinit: *library.get::<DeinitFn>(b"sv_deinit\0")?,
            open_slot: *library.get::<SlotFn>(b"sv_open_slot\0")?,
            close_slot: *library.get::<SlotFn>(b"sv_close_slot\0")?,
            volume: *library.get::<SlotValueFn>(b"sv_volume\0")?,
            load: *library.get::<LoadFn>(b"sv_load\0")?,
            play_from_beginning: *library.get::<SlotFn>(b"sv_play_from_beginning\0")?,
            stop: *library.get::<SlotFn>(b"sv_stop\0")?,
            set_autostop: *library.get::<SlotValueFn>(b"sv_set_autostop\0")?,
            song_length_frames: *library.get::<SongLengthFn>(b"sv_get_song_length_frames\0")?,
            ticks: *library.get::<TicksFn>(b"sv_get_ticks\0")?,
            audio_callback: *library.get::<AudioCallbackFn>(b"sv_audio_callback\0")?,
        })
    }
}

/// A loaded SunVox engine library.
///
/// Dropping the value unloads the library; the owning session is responsible
/// for closing slots and deinitialising the engine first.
pub struct SunvoxLibrary {
    library_path: PathBuf,
    symbols: Symbols,
    // Declared after `symbols` so the code they point into outlives them.
    _library: Library,
    _claim: EngineClaim,
}

impl SunvoxLibrary {
    /// Load the engine library at `path` and resolve its entry points.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let claim = EngineClaim::acquire().ok_or(EngineError::EngineBusy)?;
        if !path.exists() {
            return Err(EngineError::module_load(path, "file does not exist"));
        }

        // SAFETY: loading runs the library's initialisers; the engine module is
        // trusted to be the SunVox library it is named after.
        let library =
            unsafe { Library::new(path) }.map_err(|err| EngineError::module_load(path, err))?;
        let symbols = unsafe { Symbols::resolve(&library) }
            .map_err(|err| EngineError::module_load(path, err))?;

        log::info!("loaded engine module {}", path.display());
        Ok(Self {
            library_path: path.to_path_buf(),
            symbols,
            _library: library,
            _claim: claim,
        })
    }

    /// Path to the backing dynamic library.
    pub fn path(&self) -> &Path {
        &self.library_path
    }
}

impl EngineModule for SunvoxLibrary {
    fn init(
        &mut self,
        sample_rate: u32,
        channels: u32,
        flags: InitFlags,
    ) -> Result<(), EngineError> {
        // Returns the engine version on success.
        let code = unsafe {
            (self.symbols.init)(
                std::ptr::null(),
                sample_rate as c_int,
                channels as c_int,
                flags.bits(),
            )
        };
        if code < 0 {
            return Err(EngineError::InitFailed(code));
        }
        log::debug!(
            "engine version {}.{}.{}",
            (code >> 16) & 0xff,
            (code >> 8) & 0xff,
            code & 0xff
        );
        Ok(())
    }

    fn deinit(&mut self) {
        unsafe { (self.symbols.deinit)() };
    }

    fn open_slot(&mut self, slot: i32) -> Result<(), EngineError> {
        match unsafe { (self.symbols.open_slot)(slot) } {
            0 => Ok(()),
            code => Err(EngineError::SlotOpenFailed { slot, code }),
        }
    }

    fn close_slot(&mut self, slot: i32) {
        unsafe { (self.symbols.close_slot)(slot) };
    }

    fn set_volume(&mut self, slot: i32, volume: i32) {
        unsafe { (self.symbols.volume)(slot, volume) };
    }

    fn load_song(&mut self, slot: i32, path: &Path) -> Result<(), EngineError> {
        let c_path = song_path_cstring(path).ok_or_else(|| EngineError::SongLoadFailed {
            path: path.to_path_buf(),
            code: -1,
        })?;
        match unsafe { (self.symbols.load)(slot, c_path.as_ptr()) } {
            0 => Ok(()),
            code => Err(EngineError::SongLoadFailed {
                path: path.to_path_buf(),
                code,
            }),
        }
    }

    fn play_from_beginning(&mut self, slot: i32) {
        unsafe { (self.symbols.play_from_beginning)(slot) };
    }

    fn stop(&mut self, slot: i32) {
        unsafe { (self.symbols.stop)(slot) };
    }

    fn set_autostop(&mut self, slot: i32, enabled: bool) {
        unsafe { (self.symbols.set_autostop)(slot, enabled as c_int) };
    }

    fn song_length_frames(&mut self, slot: i32) -> u32 {
        unsafe { (self.symbols.song_length_frames)(slot) }
    }

    fn ticks(&mut self) -> u32 {
        unsafe { (self.symbols.ticks)() }
    }

    fn render(&mut self, out: &mut [f32], out_time: u32) {
        let frames = (out.len() / CHANNELS) as c_int;
        // SAFETY: float32 mode was selected at init, so the engine writes
        // exactly `frames * CHANNELS` floats into `out`.
        unsafe {
            (self.symbols.audio_callback)(out.as_mut_ptr().cast::<c_void>(), frames, 0, out_time)
        };
    }
}

/// Raw bytes of `path` on unix; elsewhere the path must be valid UTF-8.
fn song_path_cstring(path: &Path) -> Option<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path.to_str()?.as_bytes().to_vec();

    CString::new(bytes).ok()
}

impl fmt::Debug for SunvoxLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SunvoxLibrary")
            .field("library_path", &self.library_path)
            .finish()
    }
}
