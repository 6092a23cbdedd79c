//! Band Render: offline host for the three-band engine.
//!
//! Reads a WAV (all channels summed to mono) or generates a test signal,
//! runs it through `TriBandEngine` block by block, and writes a stereo
//! 24-bit WAV.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use trifold_dsp::controls::{ParamKind, delay_time_ms};
use trifold_dsp::{Band, ChainTopology, ControlParams, Param, TriBandEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Signal {
    /// Single sample of `--amplitude` at t = 0
    Impulse,
    /// Sine at `--freq`
    Sine,
}

#[derive(Parser, Debug)]
#[command(
    name = "band-render",
    version,
    about = "Render audio through the three-band delay/drive engine",
    after_help = "EXAMPLES:\n    \
        band-render --signal impulse -d 0.1 -o ir.wav\n    \
        band-render -i drums.wav --set mute-high=on --set low-band=0.8 -o out.wav\n    \
        band-render --signal sine --freq 60 --wavefold --set low-wf-offset=0.2 -o fold.wav"
)]
struct Args {
    /// Input WAV file; all channels are summed to mono
    #[arg(short, long, conflicts_with = "signal")]
    input: Option<PathBuf>,

    /// Generated test signal, used when no input file is given
    #[arg(long, value_enum, default_value_t = Signal::Impulse)]
    signal: Signal,

    /// Sine frequency in Hz
    #[arg(long, default_value_t = 100.0)]
    freq: f64,

    /// Peak level of the generated signal
    #[arg(long, default_value_t = 0.5)]
    amplitude: f64,

    /// Length of the generated signal in seconds
    #[arg(short, long, default_value_t = 1.0)]
    duration: f64,

    /// Sample rate of the generated signal
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Samples per processing block
    #[arg(short, long, default_value_t = 512, value_parser = clap::value_parser!(u32).range(1..=65536))]
    block_size: u32,

    /// Parameter override, e.g. `low-mid-freq=250` or `mute-low=on`
    #[arg(short, long = "set", value_name = "ID=VALUE")]
    set: Vec<String>,

    /// Switch the wavefolder into every band
    #[arg(long)]
    wavefold: bool,

    /// Recirculate each band's delay output
    #[arg(long)]
    feedback: bool,

    /// Print every parameter with its range and default, then exit
    #[arg(long)]
    list_params: bool,

    /// Output WAV file (stereo, 24-bit)
    #[arg(short, long, required_unless_present = "list_params")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list_params {
        print_params();
        return Ok(());
    }
    let output = args
        .output
        .as_deref()
        .ok_or_else(|| anyhow!("--output is required"))?;

    let controls = ControlParams::default();
    for assignment in &args.set {
        let (id, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected ID=VALUE, got `{assignment}`"))?;
        controls.set_str(id.trim(), value)?;
        debug!("{} = {}", id.trim(), value.trim());
    }

    let (input, sample_rate) = match &args.input {
        Some(path) => read_wav_mono(path)?,
        None => (generate(&args)?, args.sample_rate),
    };

    let block_size = args.block_size as usize;
    let mut engine = TriBandEngine::new(sample_rate as f64, block_size);
    engine.set_topology(ChainTopology {
        wavefold: args.wavefold,
        feedback: args.feedback,
    });

    let snapshot = controls.snapshot();
    let [low_ms, mid_ms, high_ms] =
        Band::ALL.map(|band| delay_time_ms(snapshot.band(band).delay_time));
    info!(
        "Rendering {} samples at {sample_rate} Hz (block {block_size}), delays {low_ms:.2}/{mid_ms:.2}/{high_ms:.2} ms",
        input.len()
    );

    let (left, right) = render(&mut engine, &input, block_size, &controls);

    let peak = left.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    info!(
        "  Peak amplitude: {peak:.6} ({:.1} dBFS)",
        20.0 * (peak as f64).log10()
    );

    write_wav(output, &left, &right, sample_rate)?;
    info!("  Written: {}", output.display());
    Ok(())
}

/// Drive the engine the way a host does: one snapshot per block.
fn render(
    engine: &mut TriBandEngine,
    input: &[f32],
    block_size: usize,
    controls: &ControlParams,
) -> (Vec<f32>, Vec<f32>) {
    let mut left = vec![0.0f32; input.len()];
    let mut right = vec![0.0f32; input.len()];
    for ((block, l), r) in input
        .chunks(block_size)
        .zip(left.chunks_mut(block_size))
        .zip(right.chunks_mut(block_size))
    {
        engine.process(block, l, r, &controls.snapshot());
    }
    (left, right)
}

fn generate(args: &Args) -> Result<Vec<f32>> {
    if !(args.duration > 0.0) {
        bail!("duration must be positive, got {}", args.duration);
    }
    let sr = args.sample_rate as f64;
    let len = (args.duration * sr).round() as usize;
    let samples = match args.signal {
        Signal::Impulse => {
            let mut samples = vec![0.0f32; len];
            if let Some(first) = samples.first_mut() {
                *first = args.amplitude as f32;
            }
            samples
        }
        Signal::Sine => (0..len)
            .map(|i| (args.amplitude * (2.0 * PI * args.freq * i as f64 / sr).sin()) as f32)
            .collect(),
    };
    Ok(samples)
}

fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .with_context(|| format!("failed to read {}", path.display()))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .with_context(|| format!("failed to read {}", path.display()))?
        }
    };

    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum())
        .collect();
    debug!(
        "read {} ({} ch, {} Hz, {}-bit)",
        path.display(),
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample
    );
    Ok((mono, spec.sample_rate))
}

fn write_wav(path: &Path, left: &[f32], right: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 24,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let scale = (1 << 23) as f32 - 1.0;
    for (&l, &r) in left.iter().zip(right) {
        writer.write_sample((l.clamp(-1.0, 1.0) * scale) as i32)?;
        writer.write_sample((r.clamp(-1.0, 1.0) * scale) as i32)?;
    }
    writer.finalize().context("failed to finalize WAV")?;
    Ok(())
}

fn print_params() {
    println!("{:<16} {:<22} {:>8} {:>9} {:>8}", "ID", "NAME", "MIN", "MAX", "DEFAULT");
    for param in Param::ALL {
        let spec = param.spec();
        match spec.kind {
            ParamKind::Bool => println!(
                "{:<16} {:<22} {:>8} {:>9} {:>8}",
                spec.id,
                spec.name,
                "off",
                "on",
                if spec.default >= 0.5 { "on" } else { "off" }
            ),
            ParamKind::Float { min, max } => println!(
                "{:<16} {:<22} {:>8} {:>9} {:>8}",
                spec.id, spec.name, min, max, spec.default
            ),
        }
    }
}
