use crate::assets::fonts::FontSet;
use crate::encode::adapter::{EncoderAdapter, OUTPUT_NAME, WEBM_MIME};
use crate::encode::engine::EncoderEngine;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::raster::SlideRasterizer;
use crate::render::sequence::{Frame, FrameSequence, FrameSlot};
use crate::scene::model::Project;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Options controlling a [`Pipeline`] run.
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Rasterize frames of a chunk in parallel on a dedicated rayon pool. Staging stays sequential.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames rendered before they are staged into the engine.
    pub chunk_size: usize,
    /// Rasterize each slide once per chunk and reuse its image for the slide's other frames.
    pub static_frame_elision: bool,
    /// Output file name inside the engine staging area.
    pub output_name: String,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 64,
            static_frame_elision: false,
            output_name: OUTPUT_NAME.to_string(),
        }
    }
}

/// Phase of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    /// No run started yet.
    Idle,
    /// Loading the encoder engine.
    Preparing,
    /// Rasterizing a chunk of frames.
    Rendering,
    /// Staging a chunk of frames into the engine.
    Ingesting,
    /// Running the encoder.
    Encoding,
    /// Last run produced a video.
    Done,
    /// Last run failed with the given message.
    Failed(String),
}

impl RunState {
    /// Return `true` for [`RunState::Done`] and [`RunState::Failed`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

/// Append-only, human-readable progress log of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    /// Lines in the order they were written.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Most recent line.
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Return `true` when nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }
}

/// Shared flag observed between frames. Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Request cancellation of the run in flight.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Return `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> SlidecastResult<()> {
        if self.is_cancelled() {
            return Err(SlidecastError::Cancelled);
        }
        Ok(())
    }
}

/// Final encoded artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedVideo {
    /// Container bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: String,
}

impl EncodedVideo {
    /// Write the container to `path`, creating parent directories.
    pub fn write_to(&self, path: impl AsRef<Path>) -> SlidecastResult<()> {
        use anyhow::Context as _;
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write video '{}'", path.display()))?;
        Ok(())
    }
}

/// Frame counters of the last run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the project.
    pub frames_total: u64,
    /// Frames actually rasterized.
    pub frames_rendered: u64,
    /// Frames that reused a rasterized image via static-frame elision.
    pub frames_elided: u64,
}

/// Callback receiving every progress line together with the current state.
pub type ProgressObserver = Box<dyn FnMut(&RunState, &str) + Send>;

struct RunTracker {
    state: RunState,
    log: RunLog,
    cancel: CancelToken,
    observer: Option<ProgressObserver>,
}

impl RunTracker {
    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }

    fn note(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(state = ?self.state, "{line}");
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.state, &line);
        }
        self.log.push(line);
    }
}

/// Runs projects through layout, rasterization, staging and encoding.
///
/// One run at a time per instance; the engine and its staging area are reused across runs and
/// drained at the end of every run, successful or not.
pub struct Pipeline<E: EncoderEngine> {
    adapter: EncoderAdapter<E>,
    fonts: FontSet,
    opts: PipelineOpts,
    tracker: RunTracker,
    stats: RenderStats,
}

impl<E: EncoderEngine> Pipeline<E> {
    /// Create a pipeline. The engine is built by `make_engine` on the first run.
    pub fn new(
        fonts: FontSet,
        opts: PipelineOpts,
        make_engine: impl FnMut() -> E + Send + 'static,
    ) -> Self {
        Self {
            adapter: EncoderAdapter::new(make_engine),
            fonts,
            opts,
            tracker: RunTracker {
                state: RunState::Idle,
                log: RunLog::default(),
                cancel: CancelToken::default(),
                observer: None,
            },
            stats: RenderStats::default(),
        }
    }

    /// Install a progress observer.
    pub fn with_observer(mut self, observer: impl FnMut(&RunState, &str) + Send + 'static) -> Self {
        self.tracker.observer = Some(Box::new(observer));
        self
    }

    /// Current (or last terminal) state.
    pub fn state(&self) -> &RunState {
        &self.tracker.state
    }

    /// Progress log of the current or last run.
    pub fn log(&self) -> &RunLog {
        &self.tracker.log
    }

    /// Frame counters of the current or last run.
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Token that cancels the run in flight. Each run clears the flag when it starts.
    pub fn cancel_token(&self) -> CancelToken {
        self.tracker.cancel.clone()
    }

    /// Encoder adapter (and through it, the engine).
    pub fn adapter(&self) -> &EncoderAdapter<E> {
        &self.adapter
    }

    /// Run options.
    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Render and encode `project`.
    ///
    /// On failure the state becomes [`RunState::Failed`], the error is appended to the log and
    /// returned. Nothing is retried.
    #[tracing::instrument(skip_all, fields(slides = project.slides.len(), fps = project.fps))]
    pub fn run(&mut self, project: &Project) -> SlidecastResult<EncodedVideo> {
        self.tracker.log = RunLog::default();
        self.tracker.cancel.reset();
        self.tracker.transition(RunState::Idle);
        self.stats = RenderStats::default();

        match self.run_phases(project) {
            Ok(video) => {
                self.tracker.transition(RunState::Done);
                self.tracker.note("Done.");
                Ok(video)
            }
            Err(e) => {
                let msg = e.to_string();
                self.tracker.transition(RunState::Failed(msg.clone()));
                self.tracker.note(format!("Error: {msg}"));
                Err(e)
            }
        }
    }

    fn run_phases(&mut self, project: &Project) -> SlidecastResult<EncodedVideo> {
        project.validate_for_render()?;
        let seq = FrameSequence::new(project)?;

        let tracker = &mut self.tracker;
        tracker.transition(RunState::Preparing);
        if !self.adapter.is_ready() {
            tracker.note("Loading encoder engine ...");
        }
        self.adapter.ensure_ready()?;
        tracker.note("Encoder ready.");

        let total = seq.total_frames();
        self.stats.frames_total = total;
        tracker.note(format!(
            "Planned {total} frames from {} slides at {}x{} @ {} fps.",
            project.slides.len(),
            project.width,
            project.height,
            project.fps
        ));

        let mut raster = if self.opts.parallel {
            ChunkRaster::Parallel(build_thread_pool(self.opts.threads)?)
        } else {
            ChunkRaster::Sequential(Box::new(SlideRasterizer::new(
                project.canvas(),
                &self.fonts,
            )?))
        };
        let chunk_size = normalized_chunk_size(self.opts.chunk_size);

        let mut scope = self.adapter.scope();
        let mut slots = seq.iter();
        loop {
            let chunk: Vec<FrameSlot> = slots.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            tracker.cancel.check()?;

            tracker.transition(RunState::Rendering);
            tracker.note(format!(
                "Rendering frames {}-{} of {total} ...",
                chunk[0].index.0 + 1,
                chunk[chunk.len() - 1].index.0 + 1
            ));
            let work = ChunkWork {
                seq: &seq,
                fonts: &self.fonts,
                elide: self.opts.static_frame_elision,
                cancel: &tracker.cancel,
            };
            let (frames, chunk_stats) = match &mut raster {
                ChunkRaster::Parallel(pool) => work.render_parallel(&chunk, pool)?,
                ChunkRaster::Sequential(r) => work.render_sequential(&chunk, r)?,
            };
            self.stats.frames_rendered += chunk_stats.frames_rendered;
            self.stats.frames_elided += chunk_stats.frames_elided;

            tracker.transition(RunState::Ingesting);
            for frame in frames {
                tracker.cancel.check()?;
                scope.ingest(frame)?;
            }
            tracker.note(format!("Staged {}/{total} frames.", scope.staged_count()));
        }

        tracker.transition(RunState::Encoding);
        tracker.note("Encoding ...");
        let bytes = scope.encode(project.fps, &self.opts.output_name)?;
        drop(scope);

        Ok(EncodedVideo {
            bytes,
            mime_type: WEBM_MIME.to_string(),
        })
    }
}

/// Render one slide of `project` as a PNG still.
pub fn render_slide_png(
    project: &Project,
    slide_index: usize,
    fonts: &FontSet,
) -> SlidecastResult<Vec<u8>> {
    project.validate()?;
    let slide = project.slides.get(slide_index).ok_or_else(|| {
        SlidecastError::invalid_project(format!(
            "slide index {slide_index} out of range (project has {} slides)",
            project.slides.len()
        ))
    })?;
    SlideRasterizer::new(project.canvas(), fonts)?.render_png(slide)
}

enum ChunkRaster {
    Sequential(Box<SlideRasterizer>),
    Parallel(rayon::ThreadPool),
}

struct ChunkWork<'a> {
    seq: &'a FrameSequence<'a>,
    fonts: &'a FontSet,
    elide: bool,
    cancel: &'a CancelToken,
}

impl ChunkWork<'_> {
    /// Slots that need rasterizing, plus for every chunk slot the position of its image.
    fn plan(&self, chunk: &[FrameSlot]) -> (Vec<FrameSlot>, Vec<usize>) {
        let mut unique = Vec::<FrameSlot>::with_capacity(chunk.len());
        let mut frame_to_unique = Vec::<usize>::with_capacity(chunk.len());
        if self.elide {
            let mut first = HashMap::<usize, usize>::new();
            for slot in chunk {
                let u = *first.entry(slot.slide_index).or_insert_with(|| {
                    unique.push(*slot);
                    unique.len() - 1
                });
                frame_to_unique.push(u);
            }
        } else {
            unique.extend_from_slice(chunk);
            frame_to_unique.extend(0..chunk.len());
        }
        (unique, frame_to_unique)
    }

    fn render_sequential(
        &self,
        chunk: &[FrameSlot],
        rasterizer: &mut SlideRasterizer,
    ) -> SlidecastResult<(Vec<Frame>, RenderStats)> {
        let (unique, frame_to_unique) = self.plan(chunk);
        let mut images = Vec::with_capacity(unique.len());
        for slot in &unique {
            self.cancel.check()?;
            images.push(self.seq.rasterize(slot, rasterizer)?.image_bytes);
        }
        Ok(expand(chunk, images, &frame_to_unique))
    }

    fn render_parallel(
        &self,
        chunk: &[FrameSlot],
        pool: &rayon::ThreadPool,
    ) -> SlidecastResult<(Vec<Frame>, RenderStats)> {
        let (unique, frame_to_unique) = self.plan(chunk);
        let canvas = self.seq.project().canvas();
        let rendered = pool.install(|| {
            unique
                .par_iter()
                .map_init(
                    || SlideRasterizer::new(canvas, self.fonts),
                    |worker, slot| -> SlidecastResult<Vec<u8>> {
                        self.cancel.check()?;
                        let r = worker
                            .as_mut()
                            .map_err(|e| SlidecastError::raster(e.to_string()))?;
                        Ok(self.seq.rasterize(slot, r)?.image_bytes)
                    },
                )
                .collect::<Vec<_>>()
        });
        let mut images = Vec::with_capacity(rendered.len());
        for item in rendered {
            images.push(item?);
        }
        Ok(expand(chunk, images, &frame_to_unique))
    }
}

/// Fan rasterized images back out to every slot of the chunk, in order.
fn expand(
    chunk: &[FrameSlot],
    images: Vec<Vec<u8>>,
    frame_to_unique: &[usize],
) -> (Vec<Frame>, RenderStats) {
    let mut remaining = vec![0usize; images.len()];
    for &u in frame_to_unique {
        remaining[u] += 1;
    }
    let mut images: Vec<Option<Vec<u8>>> = images.into_iter().map(Some).collect();

    let mut frames = Vec::with_capacity(chunk.len());
    for (slot, &u) in chunk.iter().zip(frame_to_unique) {
        remaining[u] -= 1;
        let image_bytes = if remaining[u] == 0 {
            images[u].take()
        } else {
            images[u].clone()
        };
        frames.push(Frame {
            sequence_index: slot.index,
            image_bytes: image_bytes.unwrap_or_default(),
        });
    }

    let rendered = images.len() as u64;
    let total = chunk.len() as u64;
    (
        frames,
        RenderStats {
            frames_total: total,
            frames_rendered: rendered,
            frames_elided: total.saturating_sub(rendered),
        },
    )
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

fn build_thread_pool(threads: Option<usize>) -> SlidecastResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(SlidecastError::invalid_project(
            "pipeline 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SlidecastError::raster(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;
