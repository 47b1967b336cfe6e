use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use chronoecho::{
    ChromaOrder, EchoConfig, EchoSession, FfmpegSink, FfmpegSinkOpts, FfmpegSource,
    FfmpegSourceOpts, FrameSink, FrameSource, PngSequenceSink, TestPatternSource,
};

#[derive(Parser, Debug)]
#[command(name = "chronoecho", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the echo to an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render the echo as a numbered PNG sequence.
    Frames(FramesArgs),
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Session configuration JSON. Defaults apply to anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Video file or capture device decoded through ffmpeg. Omit for the built-in test pattern.
    #[arg(long)]
    input: Option<String>,

    /// ffmpeg demuxer for `--input` (e.g. `v4l2`, `avfoundation`).
    #[arg(long)]
    device_format: Option<String>,

    /// Loop a file input instead of losing the source at end of file.
    #[arg(long)]
    loop_input: bool,

    /// Number of ticks to render.
    #[arg(long, default_value_t = 300)]
    ticks: u64,

    /// Override the ring depth from the config.
    #[arg(long)]
    frames: Option<usize>,

    /// Override the capture byte order from the config.
    #[arg(long, value_enum)]
    chroma_order: Option<ChromaOrderArg>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct FramesArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output directory for PNG frames.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ChromaOrderArg {
    Yuyv,
    Uyvy,
    Yvyu,
}

impl From<ChromaOrderArg> for ChromaOrder {
    fn from(v: ChromaOrderArg) -> Self {
        match v {
            ChromaOrderArg::Yuyv => ChromaOrder::Yuyv,
            ChromaOrderArg::Uyvy => ChromaOrder::Uyvy,
            ChromaOrderArg::Yvyu => ChromaOrder::Yvyu,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn load_config(args: &SessionArgs) -> anyhow::Result<EchoConfig> {
    let mut cfg = match &args.config {
        Some(path) => read_config(path)?,
        None => EchoConfig::default(),
    };
    if let Some(frames) = args.frames {
        cfg.frames = frames;
    }
    if let Some(order) = args.chroma_order {
        cfg.chroma_order = order.into();
    }
    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

fn read_config(path: &Path) -> anyhow::Result<EchoConfig> {
    EchoConfig::from_path(path).with_context(|| format!("load config '{}'", path.display()))
}

fn make_source(args: &SessionArgs, cfg: &EchoConfig) -> anyhow::Result<Box<dyn FrameSource>> {
    let Some(input) = &args.input else {
        let pattern = TestPatternSource::new(cfg.capture)?.with_order(cfg.chroma_order);
        return Ok(Box::new(pattern));
    };

    let mut opts = FfmpegSourceOpts::new(input.clone(), cfg.capture);
    opts.input_format = args.device_format.clone();
    opts.order = cfg.chroma_order;
    opts.loop_input = args.loop_input;
    let source =
        FfmpegSource::spawn(opts).with_context(|| format!("open input '{input}'"))?;
    Ok(Box::new(source))
}

fn run_session(args: &SessionArgs, sink: &mut dyn FrameSink) -> anyhow::Result<()> {
    let cfg = load_config(args)?;
    let source = make_source(args, &cfg)?;
    let mut session = EchoSession::new(cfg, Some(source))?;
    let stats = session.run(args.ticks, sink)?;
    eprintln!(
        "rendered {} ticks ({} captured, {} skipped)",
        stats.ticks, stats.frames_captured, stats.ticks_skipped
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&args.out));
    run_session(&args.session, &mut sink)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let mut sink = PngSequenceSink::new(&args.out_dir);
    run_session(&args.session, &mut sink)?;
    eprintln!("wrote {}", args.out_dir.display());
    Ok(())
}
