use std::{
    fs::File,
    io::{BufReader, BufWriter, Read as _, Write},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "kinetrace", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the merged canonical timeline of a trial.
    Timeline(TimelineArgs),
    /// Replay a trial into a JSON-lines dump of sink calls.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Input trial JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input trial JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON-lines path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Playback mode.
    #[arg(long, value_enum, default_value_t = Mode::Frames)]
    mode: Mode,

    /// Leave intermediate phases on display after playback.
    #[arg(long)]
    keep_trailing_phases: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// One timestamped log per entity per canonical instant.
    Frames,
    /// One columnar batch per entity on its phase's native axis.
    Columns,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Timeline(args) => cmd_timeline(args),
        Command::Replay(args) => cmd_replay(args),
    }
}

fn read_scenario(path: &Path) -> anyhow::Result<kinetrace::Scenario> {
    let f = File::open(path).with_context(|| format!("open trial '{}'", path.display()))?;
    let mut json = String::new();
    BufReader::new(f)
        .read_to_string(&mut json)
        .with_context(|| format!("read trial '{}'", path.display()))?;
    Ok(kinetrace::Scenario::from_json(&json)?)
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let scenario = read_scenario(&args.in_path)?;

    let spans = scenario
        .phases
        .iter()
        .map(|phase| kinetrace::TimeSpan::new(phase.t_span.clone()))
        .collect::<kinetrace::KinetraceResult<Vec<_>>>()?;
    let refs: Vec<&kinetrace::TimeSpan> = spans.iter().collect();
    let timeline = kinetrace::CanonicalTimeline::merge(&refs);

    println!("trial '{}': {} phases, {} canonical instants", scenario.name, spans.len(), timeline.len());
    for index in 0..timeline.len() {
        let frames: Vec<String> = (0..timeline.phase_count())
            .map(|phase| match timeline.displayed_frame(phase, index) {
                Some(frame) => frame.to_string(),
                None => "-".to_string(),
            })
            .collect();
        println!(
            "{:>12.9}  phases {:?}  frames [{}]",
            timeline.instant(index),
            timeline.membership(index),
            frames.join(", ")
        );
    }
    Ok(())
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let scenario = read_scenario(&args.in_path)?;
    let replay = scenario.build()?;

    let out: Box<dyn Write> = match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("create '{}'", path.display()))?,
            ))
        }
        None => Box::new(std::io::stdout().lock()),
    };
    let mut sink = kinetrace::JsonLinesSink::new(out);

    match args.mode {
        Mode::Frames => {
            let options = kinetrace::PlayOptions {
                clear_trailing_phases: !args.keep_trailing_phases,
            };
            replay.play_incremental(&mut sink, &options)?;
        }
        Mode::Columns => replay.play_bulk(&mut sink)?,
    }

    let mut out = sink.into_inner();
    out.flush().context("flush output")?;
    if let Some(path) = &args.out {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
