// src/main.rs
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};
use log::info;
use photozdff::session::{
    align_camera, decimate, load_config, read_camera_onsets, render_session_png, run_session,
    write_frames_csv, write_session_csv, BlockName, ColumnNames, CsvRecordingSource, PlotStyle,
    RecordingSource, SessionOptions, DEFAULT_DECIMATION, DEFAULT_N_REMOVE, DEFAULT_SMOOTHING_SECONDS,
};
use photozdff::ZdffConfig;
#[derive(Parser)]
#[command(author, version, about = "z-scored dF/F extraction for fiber photometry recordings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}
#[derive(Subcommand)]
enum Command {
    /// Compute zdFF for one exported recording
    Run(RunArgs),
    /// Print the BIDS session name for a rig block name
    BidsName {
        /// Block name, e.g. `OpenField-230104-101530_M12-230217-093005`
        block: String,
    },
}
#[derive(Args)]
struct RunArgs {
    /// Recording table with time, isosbestic and calcium columns
    #[arg(long, value_hint = ValueHint::FilePath)]
    input: PathBuf,
    /// Destination of the per-sample table
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: PathBuf,
    /// JSON file with pipeline options; unspecified options keep their defaults
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "time_seconds")]
    time_column: String,
    #[arg(long, default_value = "_405")]
    reference_column: String,
    #[arg(long, default_value = "_465")]
    signal_column: String,
    /// Integer downsampling factor applied before anything else (1 disables)
    #[arg(long, default_value_t = DEFAULT_DECIMATION)]
    decimate: usize,
    /// Samples dropped from the start, counted after decimation
    #[arg(long, default_value_t = DEFAULT_N_REMOVE)]
    n_remove: usize,
    /// Smoothing window in seconds; overrides the config's window in samples.
    /// Defaults to one second unless --config is given
    #[arg(long)]
    smooth_seconds: Option<f64>,
    /// Append the fitted baselines to the output table
    #[arg(long)]
    with_baselines: bool,
    /// Camera frame onsets table
    #[arg(long, value_hint = ValueHint::FilePath, requires = "frames_output")]
    camera: Option<PathBuf>,
    #[arg(long, default_value = "onset_seconds")]
    camera_column: String,
    /// Destination of the per-frame table
    #[arg(long, value_hint = ValueHint::FilePath, requires = "camera")]
    frames_output: Option<PathBuf>,
    /// Write a PNG preview of the raw channels, baselines and zdFF
    #[arg(long, value_hint = ValueHint::FilePath)]
    plot: Option<PathBuf>,
}
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::BidsName { block } => {
            let name = BlockName::parse(&block)?.bids_name()?;
            println!("{name}");
            Ok(())
        }
    }
}
fn run(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => ZdffConfig::default(),
    };
    let columns = ColumnNames {
        time: args.time_column.clone(),
        reference: args.reference_column.clone(),
        signal: args.signal_column.clone(),
    };
    let raw = CsvRecordingSource::from_path(&args.input)
        .and_then(|source| source.with_columns(columns).load())
        .with_context(|| format!("reading {}", args.input.display()))?;
    info!(
        "{} samples at {:.2} Hz ({:.1} s)",
        raw.len(),
        raw.sample_rate_hz,
        raw.duration_seconds()
    );
    let recording = decimate(&raw, args.decimate)?;
    let options = SessionOptions {
        n_remove: args.n_remove,
        smoothing_seconds: smoothing_seconds(&args),
    };
    let session = run_session(&recording, &options, &config).context("computing zdFF")?;
    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    write_session_csv(BufWriter::new(file), &session, args.with_baselines)?;
    info!("wrote {}", args.output.display());
    if let (Some(camera), Some(frames_output)) = (&args.camera, &args.frames_output) {
        let file = File::open(camera).with_context(|| format!("opening {}", camera.display()))?;
        let onsets = read_camera_onsets(file, &args.camera_column)
            .with_context(|| format!("reading {}", camera.display()))?;
        let frames = align_camera(&session, &onsets)?;
        let file = File::create(frames_output)
            .with_context(|| format!("creating {}", frames_output.display()))?;
        write_frames_csv(BufWriter::new(file), &frames)?;
        info!("wrote {} frames to {}", frames.len(), frames_output.display());
    }
    if let Some(path) = &args.plot {
        let png = render_session_png(&session, &PlotStyle::default())?;
        fs::write(path, png).with_context(|| format!("writing {}", path.display()))?;
        info!("wrote preview {}", path.display());
    }
    Ok(())
}
/// A config file keeps its own window in samples unless a duration is asked for.
fn smoothing_seconds(args: &RunArgs) -> Option<f64> {
    args.smooth_seconds
        .or_else(|| args.config.is_none().then_some(DEFAULT_SMOOTHING_SECONDS))
}
