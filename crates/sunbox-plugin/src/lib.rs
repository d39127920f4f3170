//! Sunbox – plays a SunVox song inside a CLAP/VST3 host.
//! - Loads the SunVox engine library shipped next to the plug-in binary
//! - Loops a single song, one engine slot, stereo out
//! - No parameters, no inputs, no MIDI
//!
//! **RT Safety:** process() never allocates once the host respects its
//! announced maximum block size; the interleave buffer is sized in initialize().

use nih_plug::prelude::*;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

use sunbox_engine::{
    engine_library_path, EngineSession, LocatorError, SongPlayer, SunboxConfig, SunvoxLibrary,
};

/// Sunbox exposes nothing to automate.
#[derive(Params, Default)]
struct SunboxParams {}

pub struct Sunbox {
    params: Arc<SunboxParams>,
    config: SunboxConfig,
    // resolved once per instance, before any host callback
    library_path: Result<PathBuf, LocatorError>,
    player: Option<SongPlayer<SunvoxLibrary>>,
}

impl Default for Sunbox {
    fn default() -> Self {
        Self::with_library(engine_library_path(), SunboxConfig::load())
    }
}

impl Sunbox {
    fn with_library(library_path: Result<PathBuf, LocatorError>, config: SunboxConfig) -> Self {
        match &library_path {
            Ok(path) => nih_log!("Sunbox engine module: {}", path.display()),
            Err(err) => nih_warn!("Sunbox engine disabled: {err}"),
        }
        Self {
            params: Arc::new(SunboxParams::default()),
            config,
            library_path,
            player: None,
        }
    }

    fn start_player(&self, sample_rate: u32) -> SongPlayer<SunvoxLibrary> {
        let settings = self.config.engine_settings(sample_rate);
        let session = match &self.library_path {
            Ok(path) => EngineSession::open(|| SunvoxLibrary::load(path), settings),
            Err(_) => EngineSession::unloaded(settings),
        };

        let mut player = SongPlayer::new(session);
        if player.session().is_ready() {
            if let Err(err) = player.load_song(&self.config.song_path) {
                nih_error!("Sunbox could not load its song: {err}");
            }
        } else if let Some(err) = player.session().failure() {
            nih_error!("Sunbox engine failed to start: {err}");
        }
        player
    }

    fn render(&mut self, channels: &mut [&mut [f32]]) {
        match (self.player.as_mut(), channels) {
            (Some(player), [left, right, ..]) => player.run(left, right),
            (_, channels) => {
                for channel in channels.iter_mut() {
                    channel.fill(0.0);
                }
            }
        }
    }
}

impl Plugin for Sunbox {
    const NAME: &'static str = "Sunbox";
    const VENDOR: &'static str = "falkTX";
    const URL: &'static str = env!("CARGO_PKG_HOMEPAGE");
    const EMAIL: &'static str = "falktx@falktx.com";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: None,
        main_output_channels: NonZeroU32::new(2),
        ..AudioIOLayout::const_default()
    }];

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = buffer_config.sample_rate.round() as u32;
        let stale = self
            .player
            .as_ref()
            .map_or(true, |player| player.session().settings().sample_rate != sample_rate);
        if stale {
            // the engine is process-wide; release it before starting over
            self.player = None;
            self.player = Some(self.start_player(sample_rate));
        }

        if let Some(player) = self.player.as_mut() {
            player.activate(buffer_config.max_buffer_size as usize);
        }
        // engine failures only ever mean silence
        true
    }

    fn deactivate(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.deactivate();
        }
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        self.render(buffer.as_slice());
        ProcessStatus::KeepAlive
    }
}

impl ClapPlugin for Sunbox {
    const CLAP_ID: &'static str = "studio.distrho.sunbox";
    const CLAP_DESCRIPTION: Option<&'static str> = Some("Test plugin");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::Instrument,
        ClapFeature::Synthesizer,
        ClapFeature::Stereo,
    ];
}

impl Vst3Plugin for Sunbox {
    const VST3_CLASS_ID: [u8; 16] = *b"DISTRHOSunboxDSb";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] = &[
        Vst3SubCategory::Instrument,
        Vst3SubCategory::Synth,
        Vst3SubCategory::Stereo,
    ];
}

nih_export_clap!(Sunbox);
nih_export_vst3!(Sunbox);
