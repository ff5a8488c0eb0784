use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;

use karaoke::{
    ChromaParams, CpuFrameRenderer, ExternalAligner, FfmpegSink, FontFace, FrameIndex, FrameRange,
    KaraokeConfig, LyricLayout, ParleyMetrics, PictogramResolver, PreparedWordStore, RenderOpts,
    RenderStats, RenderThreading, Rng64, TrimRange,
};

#[derive(Parser, Debug)]
#[command(name = "karaoke", version, about = "Word-timed karaoke lyric videos")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved layout (lines, pages, placements) as JSON.
    Layout(LayoutArgs),
    /// Render the frame shown at one instant as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 lyric video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Produce a word-timed LRC file with an external aligner command.
    Align(AlignArgs),
    /// Cut an audio file between two timecodes (requires `ffmpeg`).
    Trim(TrimArgs),
    /// Chroma-key a lyric video over a background video (requires `ffmpeg`).
    Overlay(OverlayArgs),
    /// Trim, align, render and optionally overlay in one run.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Word-timed LRC transcript.
    #[arg(long)]
    lrc: PathBuf,

    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// JSON config file; omitted fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font file (overrides `font_path` from the config).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Directory of pictogram PNGs (overrides `pictogram_dir`).
    #[arg(long)]
    pictograms: Option<PathBuf>,

    /// Pagination seed (overrides `seed`; the clock is used when neither is set).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Playback instant in seconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Audio track muxed into the output; its duration sets the video length.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Video length in seconds (defaults to the audio duration).
    #[arg(long)]
    duration: Option<f64>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(Args, Debug)]
struct ThreadingArgs {
    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size in frames.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Render every frame even when it repeats the previous one.
    #[arg(long, default_value_t = false)]
    no_elision: bool,
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Audio file to align against.
    #[arg(long)]
    audio: PathBuf,

    /// Plain-text lyrics.
    #[arg(long)]
    transcript: PathBuf,

    /// Output LRC path.
    #[arg(long)]
    out: PathBuf,

    /// Aligner command; run as `<cmd> <args..> <audio> <transcript>`.
    #[arg(long)]
    aligner: PathBuf,

    /// Extra argument passed to the aligner before the file paths (repeatable).
    #[arg(long = "aligner-arg", allow_hyphen_values = true)]
    aligner_args: Vec<String>,
}

#[derive(Args, Debug)]
struct TrimArgs {
    /// Input audio file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Start timecode (`M:SS` or `H:MM:SS`); `-1` keeps the beginning.
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    start: String,

    /// End timecode; `-1` keeps the end.
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    end: String,

    /// Output audio path (defaults to `<stem>_trimmed.<ext>` next to the input).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// Background video.
    #[arg(long)]
    bg: PathBuf,

    /// Foreground lyric video with the key color background.
    #[arg(long)]
    fg: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// JSON config file; its `chroma` section seeds the parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    chroma: ChromaArgs,
}

#[derive(Args, Debug)]
struct ChromaArgs {
    #[arg(long)]
    similarity: Option<f64>,
    #[arg(long)]
    blend: Option<f64>,
    /// Background start offset in seconds.
    #[arg(long)]
    start: Option<f64>,
    /// Background slow-down factor.
    #[arg(long)]
    speed: Option<f64>,
    #[arg(long)]
    encoder: Option<String>,
    #[arg(long)]
    preset: Option<String>,
    #[arg(long)]
    crf: Option<u32>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Song to trim, align and mux.
    #[arg(long)]
    audio: PathBuf,

    /// Plain-text lyrics.
    #[arg(long)]
    transcript: PathBuf,

    /// Directory receiving every output, named after the song.
    #[arg(long)]
    out_dir: PathBuf,

    /// Aligner command; run as `<cmd> <args..> <audio> <transcript>`.
    #[arg(long)]
    aligner: PathBuf,

    /// Extra argument passed to the aligner before the file paths (repeatable).
    #[arg(long = "aligner-arg", allow_hyphen_values = true)]
    aligner_args: Vec<String>,

    /// Cut the song from this timecode (`M:SS` or `H:MM:SS`); `-1` keeps the beginning.
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    trim_start: String,

    /// Cut the song at this timecode; `-1` keeps the end.
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    trim_end: String,

    /// Background video; when given the lyrics are keyed over it.
    #[arg(long)]
    bg: Option<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,

    #[command(flatten)]
    threading: ThreadingArgs,

    #[command(flatten)]
    chroma: ChromaArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Layout(args) => cmd_layout(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Align(args) => cmd_align(args),
        Command::Trim(args) => cmd_trim(args),
        Command::Overlay(args) => cmd_overlay(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<KaraokeConfig> {
    let cfg = match path {
        Some(p) => KaraokeConfig::from_path(p)?,
        None => KaraokeConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Everything needed to render frames of one transcript.
struct Scene {
    cfg: KaraokeConfig,
    layout: LyricLayout,
    store: PreparedWordStore,
}

impl StyleArgs {
    fn load(&self) -> anyhow::Result<KaraokeConfig> {
        let mut cfg = load_config(self.config.as_deref())?;
        if let Some(font) = &self.font {
            cfg.font_path = Some(font.clone());
        }
        if let Some(dir) = &self.pictograms {
            cfg.pictogram_dir = Some(dir.clone());
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        Ok(cfg)
    }
}

impl ThreadingArgs {
    fn threading(&self) -> RenderThreading {
        RenderThreading {
            parallel: self.parallel,
            chunk_size: self.chunk_size,
            threads: self.threads,
            static_frame_elision: !self.no_elision,
        }
    }
}

impl ChromaArgs {
    fn params(&self, base: &ChromaParams) -> ChromaParams {
        ChromaParams {
            similarity: self.similarity.unwrap_or(base.similarity),
            blend: self.blend.unwrap_or(base.blend),
            start_secs: self.start.unwrap_or(base.start_secs),
            speed: self.speed.unwrap_or(base.speed),
            encoder: self.encoder.clone().unwrap_or_else(|| base.encoder.clone()),
            preset: self.preset.clone().unwrap_or_else(|| base.preset.clone()),
            crf: self.crf.unwrap_or(base.crf),
            ..base.clone()
        }
    }
}

fn build_scene(lrc: &Path, cfg: KaraokeConfig) -> anyhow::Result<Scene> {
    let font_path = cfg
        .font_path
        .clone()
        .context("no font given; pass --font or set font_path in the config")?;
    let face = FontFace::load(&font_path, cfg.font_size as f32)?;
    tracing::info!(
        font = %face.path().display(),
        sha256 = %sha256_hex(face.bytes()),
        size_px = face.size_px(),
        "font loaded"
    );

    let words = karaoke::read_lrc_words(lrc)?;
    let mut metrics = ParleyMetrics::new(&face, cfg.text_rgba)?;
    let mut rng = match cfg.seed {
        Some(seed) => Rng64::new(seed),
        None => {
            let seed = karaoke::clock_seed();
            tracing::info!(seed, "pagination seeded from clock");
            Rng64::new(seed)
        }
    };
    let layout = LyricLayout::build(&words, &cfg.layout_config()?, &mut metrics, &mut rng)?;

    let pictograms = match &cfg.pictogram_dir {
        Some(dir) => PictogramResolver::new(dir, cfg.pictogram_size().round().max(1.0) as u32),
        None => PictogramResolver::disabled(),
    };
    let store = PreparedWordStore::prepare(&layout, &face, &mut metrics, &pictograms)?;
    if store.pictogram_fallbacks() > 0 {
        tracing::warn!(
            count = store.pictogram_fallbacks(),
            "pictograms drawn as text (no usable asset)"
        );
    }

    Ok(Scene { cfg, layout, store })
}

fn scene_from_args(args: &SceneArgs) -> anyhow::Result<Scene> {
    build_scene(&args.lrc, args.style.load()?)
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let scene = scene_from_args(&args.scene)?;
    let json = serde_json::to_string_pretty(&scene.layout).context("serialize layout")?;
    match args.out {
        Some(out) => {
            karaoke::encode::ffmpeg::ensure_parent_dir(&out)?;
            std::fs::write(&out, json)
                .with_context(|| format!("write layout '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = scene_from_args(&args.scene)?;
    let mut renderer = CpuFrameRenderer::new(scene.layout.canvas(), scene.cfg.render_style())?;
    let frame = karaoke::render_frame_at(&scene.layout, &scene.store, &mut renderer, args.time)?;

    karaoke::encode::ffmpeg::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Render `duration` seconds of `scene` to `out`, muxing `song` when given.
fn render_video(
    scene: &Scene,
    song: Option<&Path>,
    duration: f64,
    threading: RenderThreading,
    out: &Path,
) -> anyhow::Result<RenderStats> {
    anyhow::ensure!(
        duration.is_finite() && duration > 0.0,
        "video duration must be > 0 (got {duration})"
    );
    let fps = scene.cfg.fps()?;
    let frames = fps.secs_to_frames_floor(duration).max(1);
    let range = FrameRange::new(FrameIndex(0), FrameIndex(frames))?;

    let opts = RenderOpts {
        style: scene.cfg.render_style(),
        fps,
        threading,
        audio: song.map(Path::to_path_buf),
    };
    let mut sink = FfmpegSink::new(out);
    let stats = karaoke::render_range(&scene.layout, &scene.store, range, &opts, &mut sink)?;
    eprintln!(
        "wrote {} ({} frames, {} rendered, {} reused)",
        out.display(),
        stats.frames_total,
        stats.frames_rendered,
        stats.frames_elided
    );
    Ok(stats)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = scene_from_args(&args.scene)?;
    let duration = match (args.duration, args.audio.as_deref()) {
        (Some(d), _) => d,
        (None, Some(audio)) => karaoke::probe_duration(audio)?,
        (None, None) => anyhow::bail!("pass --audio or --duration to set the video length"),
    };
    render_video(
        &scene,
        args.audio.as_deref(),
        duration,
        args.threading.threading(),
        &args.out,
    )?;
    Ok(())
}

fn cmd_align(args: AlignArgs) -> anyhow::Result<()> {
    let aligner = ExternalAligner::new(&args.aligner).with_args(&args.aligner_args);
    let n = karaoke::generate_lrc(&aligner, &args.audio, &args.transcript, &args.out)?;
    eprintln!("wrote {} ({n} words)", args.out.display());
    Ok(())
}

fn cmd_trim(args: TrimArgs) -> anyhow::Result<()> {
    let range = TrimRange::parse(&args.start, &args.end)?;
    let out = match args.out {
        Some(out) => out,
        None => {
            let dir = args.in_path.parent().unwrap_or(Path::new(""));
            derived_path(&args.in_path, dir, "_trimmed", args.in_path.extension())?
        }
    };
    karaoke::trim_audio(&args.in_path, range, &out)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

/// `<dir>/<stem of input><suffix>[.<ext>]`.
fn derived_path(
    input: &Path,
    dir: &Path,
    suffix: &str,
    ext: Option<&OsStr>,
) -> anyhow::Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("input '{}' has no file name", input.display()))?;
    let mut name = stem.to_os_string();
    name.push(suffix);
    if let Some(ext) = ext {
        name.push(".");
        name.push(ext);
    }
    Ok(dir.join(name))
}

fn overlay(bg: &Path, fg: &Path, out: &Path, params: &ChromaParams) -> anyhow::Result<()> {
    let outcome = karaoke::overlay_chroma(bg, fg, out, params)?;
    anyhow::ensure!(
        outcome.success(),
        "ffmpeg overlay exited with {:?}; see log '{}'",
        outcome.exit_code,
        outcome.log_path.display()
    );
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_overlay(args: OverlayArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let params = args.chroma.params(&cfg.chroma);
    overlay(&args.bg, &args.fg, &args.out, &params)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let cfg = args.style.load()?;
    let params = args.chroma.params(&cfg.chroma);
    params.validate()?;
    let range = TrimRange::parse(&args.trim_start, &args.trim_end)?;
    anyhow::ensure!(
        args.audio.is_file(),
        "audio file '{}' does not exist",
        args.audio.display()
    );
    if let Some(bg) = &args.bg {
        anyhow::ensure!(bg.is_file(), "background video '{}' does not exist", bg.display());
    }
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output directory '{}'", args.out_dir.display()))?;
    let out_path = |suffix: &str, ext: &str| {
        derived_path(&args.audio, &args.out_dir, suffix, Some(OsStr::new(ext)))
    };

    let song = if range.is_noop() {
        args.audio.clone()
    } else {
        let trimmed = derived_path(
            &args.audio,
            &args.out_dir,
            "_trimmed",
            args.audio.extension(),
        )?;
        karaoke::trim_audio(&args.audio, range, &trimmed)?;
        eprintln!("wrote {}", trimmed.display());
        trimmed
    };

    let lrc = out_path("", "lrc")?;
    let aligner = ExternalAligner::new(&args.aligner).with_args(&args.aligner_args);
    let words = karaoke::generate_lrc(&aligner, &song, &args.transcript, &lrc)?;
    anyhow::ensure!(words > 0, "aligner returned no words for '{}'", args.transcript.display());
    eprintln!("wrote {} ({words} words)", lrc.display());

    let scene = build_scene(&lrc, cfg)?;
    let duration = karaoke::probe_duration(&song)?;
    let lyrics = out_path("_lyrics", "mp4")?;
    render_video(
        &scene,
        Some(&song),
        duration,
        args.threading.threading(),
        &lyrics,
    )?;

    if let Some(bg) = &args.bg {
        overlay(bg, &lyrics, &out_path("_final", "mp4")?, &params)?;
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
