use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use sunbox_engine::{
    engine_library_path, EngineModule, EngineSession, SongPlayer, SunboxConfig, SunvoxLibrary,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => execute_render(args),
        Commands::Locate => execute_locate(),
    }
}

#[derive(Parser)]
#[command(author, version, about = "Offline rendering tools for Sunbox")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a SunVox song to a WAV file through the engine session.
    Render(RenderArgs),
    /// Print where the engine module is expected next to this binary.
    Locate,
}

#[derive(Args)]
struct RenderArgs {
    /// Song to render. Defaults to the configured song.
    #[arg(long)]
    song: Option<PathBuf>,
    /// Output path for the rendered WAV file.
    #[arg(long)]
    output: PathBuf,
    /// Engine module to load instead of the one next to this binary.
    #[arg(long)]
    library: Option<PathBuf>,
    /// Length of the render in seconds.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,
    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,
    /// Frames requested from the engine per block.
    #[arg(long, default_value_t = 512, value_parser = clap::value_parser!(u32).range(1..=65_536))]
    block_size: u32,
}

fn execute_render(args: RenderArgs) -> Result<()> {
    let config = SunboxConfig::load();
    let song = args.song.unwrap_or_else(|| config.song_path.clone());
    let library = match args.library {
        Some(path) => path,
        None => engine_library_path()
            .context("unable to locate the engine module; pass --library")?,
    };

    let session = EngineSession::open(
        || SunvoxLibrary::load(&library),
        config.engine_settings(args.sample_rate),
    );
    if let Some(err) = session.failure() {
        return Err(anyhow!(
            "engine at {} did not start: {err}",
            library.display()
        ));
    }

    let mut player = SongPlayer::new(session);
    player
        .load_song(&song)
        .with_context(|| format!("failed to load song {}", song.display()))?;

    let frames = (args.seconds.max(0.0) * args.sample_rate as f32).round() as usize;
    render_to_wav(
        &mut player,
        &args.output,
        args.sample_rate,
        frames,
        args.block_size as usize,
    )?;

    info!(frames, song = %song.display(), "render finished");
    println!(
        "Rendered '{}' ({} frames) to {}",
        song.display(),
        frames,
        args.output.display()
    );
    Ok(())
}

fn execute_locate() -> Result<()> {
    let path = engine_library_path().context("unable to resolve the path of this binary")?;
    let status = if path.exists() { "found" } else { "missing" };
    println!("{} ({status})", path.display());
    Ok(())
}

/// Pulls `frames` frames from `player` in blocks of `block_size` and writes
/// them as 32-bit float stereo.
fn render_to_wav<M: EngineModule>(
    player: &mut SongPlayer<M>,
    output: &Path,
    sample_rate: u32,
    frames: usize,
    block_size: usize,
) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(output, spec)
        .with_context(|| format!("failed to create {}", output.display()))?;

    player.activate(block_size);
    let mut left = vec![0.0f32; block_size];
    let mut right = vec![0.0f32; block_size];
    let mut remaining = frames;
    while remaining > 0 {
        let block = remaining.min(block_size);
        player.run(&mut left[..block], &mut right[..block]);
        for (l, r) in left[..block].iter().zip(&right[..block]) {
            writer.write_sample(*l)?;
            writer.write_sample(*r)?;
        }
        remaining -= block;
    }
    player.deactivate();

    writer
        .finalize()
        .with_context(|| format!("failed to finalize {}", output.display()))?;
    Ok(())
}
