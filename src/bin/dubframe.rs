use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dubframe::encode::download::{timestamp_ms, wav_file_name};
use dubframe::{
    CaptionPreset, Color, CpuSurfaceFactory, DirectoryDownloads, DownloadTarget, ExportBackends,
    ExportConfig, ExportController, FfmpegRecorder, FfmpegVideoSource, PcmAudioGraph,
    RecordingFormat, SolidVideoSource, SurfaceFactory as _, TargetRatio, Timeline, VideoSource,
    WavContainer,
};

#[derive(Parser, Debug)]
#[command(name = "dubframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a translated caption script and print its timeline as JSON.
    Captions(CaptionsArgs),
    /// Wrap a base64 speech payload into a WAV file.
    Wav(WavArgs),
    /// List the caption style presets.
    Styles(StylesArgs),
    /// Render a single composited frame as a PNG.
    Frame(FrameArgs),
    /// Export the captioned, dubbed video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct CaptionsArgs {
    /// Caption script with `[MM:SS] text` lines.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print only the caption visible at this time (seconds).
    #[arg(long)]
    at: Option<f64>,
}

#[derive(Parser, Debug)]
struct WavArgs {
    /// File holding base64 16-bit mono 24 kHz PCM.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Language value used in the file name.
    #[arg(long, default_value = "English")]
    language: String,

    /// Directory the WAV is written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct StylesArgs {
    /// Print full style definitions as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Source video (decoded with ffmpeg).
    #[arg(long, conflicts_with = "blank")]
    video: Option<PathBuf>,

    /// Use a black `WIDTHxHEIGHT` picture instead of a video.
    #[arg(long)]
    blank: Option<String>,

    /// Caption script.
    #[arg(long)]
    captions: Option<PathBuf>,

    /// Time of the frame in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Caption style preset id.
    #[arg(long, default_value_t = CaptionPreset::Classic)]
    style: CaptionPreset,

    /// Output size rule.
    #[arg(long, default_value_t = TargetRatio::Original)]
    ratio: TargetRatio,

    /// TTF/OTF font used for captions.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Source video.
    #[arg(long)]
    video: PathBuf,

    /// Voiceover WAV.
    #[arg(long)]
    voice: Option<PathBuf>,

    /// Caption script.
    #[arg(long)]
    captions: PathBuf,

    /// JSON export config; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output size rule.
    #[arg(long)]
    ratio: Option<TargetRatio>,

    /// Caption style preset id.
    #[arg(long)]
    style: Option<CaptionPreset>,

    /// Container: webm or mp4.
    #[arg(long)]
    format: Option<RecordingFormat>,

    /// Capture rate.
    #[arg(long)]
    fps: Option<u32>,

    /// TTF/OTF font used for captions.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Directory the video is written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Captions(args) => cmd_captions(args),
        Command::Wav(args) => cmd_wav(args),
        Command::Styles(args) => cmd_styles(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))
}

fn read_font(path: Option<&Path>) -> anyhow::Result<Option<Vec<u8>>> {
    path.map(|p| std::fs::read(p).with_context(|| format!("read font '{}'", p.display())))
        .transpose()
}

fn cmd_captions(args: CaptionsArgs) -> anyhow::Result<()> {
    let timeline = Timeline::parse(&read_text(&args.in_path)?);
    match args.at {
        Some(t) => match timeline.active_at(t) {
            Some(sub) => println!("{}", serde_json::to_string_pretty(sub)?),
            None => println!("null"),
        },
        None => println!("{}", serde_json::to_string_pretty(&timeline)?),
    }
    Ok(())
}

fn cmd_wav(args: WavArgs) -> anyhow::Result<()> {
    let payload = read_text(&args.in_path)?;
    let wav = WavContainer::from_speech_base64(payload.trim())?;
    let mut target = DirectoryDownloads::new(&args.out_dir);
    let delivered = target.deliver(
        &wav_file_name(&args.language, timestamp_ms()),
        dubframe::audio::pcm::WAV_MIME,
        wav.as_bytes(),
    )?;
    if let Some(path) = delivered.path {
        eprintln!("wrote {} ({:.2}s)", path.display(), wav.duration_secs());
    }
    Ok(())
}

fn cmd_styles(args: StylesArgs) -> anyhow::Result<()> {
    if args.json {
        let all: Vec<_> = CaptionPreset::ALL
            .iter()
            .map(|p| serde_json::json!({ "id": p.id(), "name": p.name(), "style": p.style() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else {
        for p in CaptionPreset::ALL {
            println!("{:<14} {}", p.id(), p.name());
        }
    }
    Ok(())
}

fn parse_size(s: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    Ok((
        w.trim().parse().with_context(|| format!("bad width in '{s}'"))?,
        h.trim().parse().with_context(|| format!("bad height in '{s}'"))?,
    ))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut source: Box<dyn VideoSource> = match (&args.video, &args.blank) {
        (Some(path), _) => Box::new(FfmpegVideoSource::new(path)),
        (None, Some(size)) => {
            let (w, h) = parse_size(size)?;
            Box::new(SolidVideoSource::new(w, h, args.at + 1.0, Color::BLACK))
        }
        (None, None) => anyhow::bail!("pass --video or --blank"),
    };
    let info = source.probe()?.validate()?;
    let picture = source.frame_at(args.at)?;

    let timeline = match &args.captions {
        Some(path) => Timeline::parse(&read_text(path)?),
        None => Timeline::default(),
    };
    let canvas = args.ratio.canvas_for(info)?;
    let mut surface =
        CpuSurfaceFactory::new(read_font(args.font.as_deref())?).create_surface(canvas)?;
    let caption = dubframe::compose_frame(
        surface.as_mut(),
        &picture,
        &timeline,
        &args.style.style(),
        args.at,
    )?;
    let png = dubframe::frame_to_png(&surface.snapshot()?)?;

    dubframe::encode::ffmpeg::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, png).with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({}x{}, caption: {})",
        args.out.display(),
        canvas.width,
        canvas.height,
        caption.unwrap_or("none")
    );
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::from_json(&read_text(path)?)?,
        None => ExportConfig::default(),
    };
    if let Some(ratio) = args.ratio {
        config.target_ratio = ratio;
    }
    if let Some(style) = args.style {
        config.style = style;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    config.validate()?;

    let voice = args
        .voice
        .as_deref()
        .map(|p| {
            let bytes = std::fs::read(p).with_context(|| format!("read voice '{}'", p.display()))?;
            Ok::<_, anyhow::Error>(WavContainer::parse(bytes)?)
        })
        .transpose()?;
    let timeline = Timeline::parse(&read_text(&args.captions)?);

    let backends = ExportBackends {
        surfaces: Box::new(CpuSurfaceFactory::new(read_font(args.font.as_deref())?)),
        graph: Box::new(PcmAudioGraph::default()),
        recorder: Box::new(FfmpegRecorder::new()),
        downloads: Box::new(DirectoryDownloads::new(&args.out_dir)),
        blobs: dubframe::BlobStore::new(),
    };

    let controller = ExportController::new();
    let handle = controller.start_export(
        Box::new(FfmpegVideoSource::new(&args.video)),
        voice.as_ref(),
        timeline,
        config,
        backends,
    )?;

    let mut last_pct = None;
    let delivered = handle.run(|p| {
        let pct = (p.fraction() * 100.0).floor() as u32;
        if last_pct != Some(pct) && pct % 10 == 0 {
            tracing::info!(progress = pct, "exporting");
            last_pct = Some(pct);
        }
    })?;

    match delivered.path {
        Some(path) => eprintln!("wrote {} ({} bytes)", path.display(), delivered.len),
        None => eprintln!("delivered {} ({} bytes)", delivered.file_name, delivered.len),
    }
    Ok(())
}
