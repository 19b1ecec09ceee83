use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a WebM video (requires `ffmpeg`).
    Render(RenderArgs),
    /// Render a single slide as a PNG.
    Frame(FrameArgs),
    /// Print the fitted font size and wrapped lines of every slide.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct FontArgs {
    /// Font file to use; repeat for a fallback chain. Defaults to system sans-serif bold faces.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output WebM path.
    #[arg(long)]
    out: PathBuf,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames rendered before they are staged.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Enable static-frame elision within chunks.
    #[arg(long, default_value_t = false)]
    static_frame_elision: bool,

    /// ffmpeg program to run.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Slide index (0-based).
    #[arg(long, default_value_t = 0)]
    slide: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    fonts: FontArgs,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    fonts: FontArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let project = slidecast::Project::from_path(&args.in_path)?;
    let fonts = slidecast::FontSet::resolve(&args.fonts.fonts)?;

    let opts = slidecast::PipelineOpts {
        parallel: args.parallel,
        threads: args.threads,
        chunk_size: args.chunk_size,
        static_frame_elision: args.static_frame_elision,
        ..slidecast::PipelineOpts::default()
    };
    let engine_opts = slidecast::FfmpegEngineOpts {
        program: args.ffmpeg,
        staging_root: None,
    };
    let mut pipeline = slidecast::Pipeline::new(fonts, opts, move || {
        slidecast::FfmpegEngine::new(engine_opts.clone())
    });

    let video = pipeline.run(&project)?;
    video.write_to(&args.out)?;

    let stats = pipeline.stats();
    eprintln!(
        "wrote {} ({} bytes, {} frames, {} rendered, {} elided)",
        args.out.display(),
        video.bytes.len(),
        stats.frames_total,
        stats.frames_rendered,
        stats.frames_elided
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = slidecast::Project::from_path(&args.in_path)?;
    let fonts = slidecast::FontSet::resolve(&args.fonts.fonts)?;
    let png = slidecast::render_slide_png(&project, args.slide, &fonts)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let project = slidecast::Project::from_path(&args.in_path)?;
    project.validate()?;
    let fonts = slidecast::FontSet::resolve(&args.fonts.fonts)?;
    let mut rasterizer = slidecast::SlideRasterizer::new(project.canvas(), &fonts)?;

    for slide in &project.slides {
        let layout = rasterizer.layout(slide);
        println!(
            "{}: {}px, {} line(s), {} frame(s)",
            slide.id,
            layout.font_size_px,
            layout.lines.len(),
            slidecast::frame_count(slide.duration_sec, project.fps)
        );
        for line in &layout.lines {
            println!("  {line}");
        }
    }
    Ok(())
}
