//! saavy - render a synth patch to a WAV file
//!
//! Run with: cargo run -- patches/bell.toml --play

mod playback;

use std::{fs, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use saavy_synth::{io::write_samples, Patch};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "saavy", version, about = "Render a synth patch to WAV")]
struct Args {
    /// Patch description (TOML)
    patch: PathBuf,

    /// Output file; defaults to `<patch name>.wav`
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Override the patch frequency (Hz)
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Play the result on the default output device after rendering
    #[arg(long)]
    play: bool,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let source = fs::read_to_string(&args.patch)
        .wrap_err_with(|| format!("failed to read patch {}", args.patch.display()))?;
    let mut patch = Patch::from_toml(&source)
        .wrap_err_with(|| format!("failed to parse patch {}", args.patch.display()))?;
    if let Some(frequency) = args.frequency {
        patch.waveform.frequency = frequency;
    }

    let buffer = patch
        .render()
        .wrap_err_with(|| format!("failed to render patch '{}'", patch.name))?;

    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("{}.wav", patch.name)));
    write_samples(&buffer, patch.sample_rate(), &out)
        .wrap_err_with(|| format!("failed to write {}", out.display()))?;

    tracing::info!(
        path = %out.display(),
        samples = buffer.len(),
        seconds = buffer.len() as f64 / patch.sample_rate(),
        "wrote patch"
    );

    if args.play {
        playback::play(&buffer, patch.sample_rate())?;
    }

    Ok(())
}
