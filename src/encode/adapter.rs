use crate::encode::engine::{EncoderEngine, validate_staged_name};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::sequence::{FRAME_INPUT_PATTERN, Frame};
use std::ops::{Deref, DerefMut};

/// Default output name inside the staging area.
pub const OUTPUT_NAME: &str = "out.webm";
/// Video codec passed to the encoder.
pub const VIDEO_CODEC: &str = "libvpx";
/// Output pixel format.
pub const PIXEL_FORMAT: &str = "yuv420p";
/// Constant target bitrate.
pub const TARGET_BITRATE: &str = "1M";
/// MIME type of the produced container.
pub const WEBM_MIME: &str = "video/webm";

/// Fixed encoder argument list for `fps` and `output_name`.
pub fn encode_args(fps: u32, output_name: &str) -> Vec<String> {
    [
        "-framerate",
        &fps.to_string(),
        "-i",
        FRAME_INPUT_PATTERN,
        "-c:v",
        VIDEO_CODEC,
        "-pix_fmt",
        PIXEL_FORMAT,
        "-b:v",
        TARGET_BITRATE,
        output_name,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Owns one encoder engine and the frames staged into it.
///
/// The engine is constructed and loaded on the first [`EncoderAdapter::ensure_ready`]. Frames
/// must be ingested in contiguous index order starting at 0. A failed ingest leaves the staging
/// area inconsistent until [`EncoderAdapter::discard`] is called; staging never resumes.
pub struct EncoderAdapter<E: EncoderEngine> {
    make_engine: Box<dyn FnMut() -> E + Send>,
    engine: Option<E>,
    staged: Vec<String>,
    output: Option<String>,
    inconsistent: bool,
}

impl<E: EncoderEngine> EncoderAdapter<E> {
    /// Create an adapter that builds its engine with `make_engine` on first use.
    pub fn new(make_engine: impl FnMut() -> E + Send + 'static) -> Self {
        Self {
            make_engine: Box::new(make_engine),
            engine: None,
            staged: Vec::new(),
            output: None,
            inconsistent: false,
        }
    }

    /// Borrow the engine, if it has been constructed.
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Return `true` when the engine exists and is loaded.
    pub fn is_ready(&self) -> bool {
        self.engine.as_ref().is_some_and(EncoderEngine::is_loaded)
    }

    /// Number of frames currently staged.
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    /// Return `true` after a failed ingest, until [`EncoderAdapter::discard`].
    pub fn is_inconsistent(&self) -> bool {
        self.inconsistent
    }

    /// Construct and load the engine once. Later calls are no-ops while it stays loaded.
    pub fn ensure_ready(&mut self) -> SlidecastResult<()> {
        let engine = self.engine.get_or_insert_with(&mut self.make_engine);
        if engine.is_loaded() {
            return Ok(());
        }
        engine.load().map_err(|e| match e {
            SlidecastError::EngineInit(_) => e,
            other => SlidecastError::engine_init(other.to_string()),
        })?;
        tracing::info!("encoder engine loaded");
        Ok(())
    }

    /// Stage one frame under its ordered file name. The frame is dropped once written.
    pub fn ingest(&mut self, frame: Frame) -> SlidecastResult<()> {
        if self.inconsistent {
            return Err(SlidecastError::encode(
                "staging area is inconsistent after a failed ingest; discard before re-staging",
            ));
        }
        let expected = self.staged.len() as u64;
        if frame.sequence_index.0 != expected {
            return Err(SlidecastError::encode(format!(
                "out-of-order frame: expected index {expected}, got {}",
                frame.sequence_index.0
            )));
        }
        let engine = ready_engine(&mut self.engine)?;

        let name = frame.file_name();
        self.staged.push(name.clone());
        if let Err(e) = engine.write_file(&name, &frame.image_bytes) {
            self.inconsistent = true;
            return Err(SlidecastError::encode(format!(
                "failed to stage '{name}': {e}"
            )));
        }
        tracing::debug!(frame = %name, bytes = frame.image_bytes.len(), "frame staged");
        Ok(())
    }

    /// Run the encoder over the staged frames and return the produced file.
    ///
    /// Staged inputs and the output are removed afterwards, on success and on failure.
    pub fn encode(&mut self, fps: u32, output_name: &str) -> SlidecastResult<Vec<u8>> {
        if self.inconsistent {
            return Err(SlidecastError::encode(
                "staging area is inconsistent after a failed ingest; discard before encoding",
            ));
        }
        if self.staged.is_empty() {
            return Err(SlidecastError::encode(
                "no frames staged; refusing to run the encoder on an empty input",
            ));
        }
        if fps == 0 {
            return Err(SlidecastError::encode("fps must be non-zero"));
        }
        validate_staged_name(output_name)?;

        let args = encode_args(fps, output_name);
        self.output = Some(output_name.to_string());
        let result = {
            let engine = ready_engine(&mut self.engine)?;
            engine
                .run(&args)
                .and_then(|()| engine.read_file(output_name))
        };
        self.discard();

        let bytes = result.map_err(|e| match e {
            SlidecastError::Encode(_) => e,
            other => SlidecastError::encode(other.to_string()),
        })?;
        if bytes.is_empty() {
            return Err(SlidecastError::encode("encoder produced an empty output"));
        }
        Ok(bytes)
    }

    /// Remove every staged input and the last output, ignoring failures.
    pub fn discard(&mut self) {
        let names: Vec<String> = self.staged.drain(..).chain(self.output.take()).collect();
        self.inconsistent = false;
        let Some(engine) = self.engine.as_mut().filter(|e| e.is_loaded()) else {
            return;
        };
        for name in names {
            if let Err(e) = engine.remove_file(&name) {
                tracing::debug!(file = %name, "cleanup ignored: {e}");
            }
        }
    }

    /// Borrow the adapter for one run; staged state is discarded when the scope ends.
    pub fn scope(&mut self) -> StagingScope<'_, E> {
        StagingScope { adapter: self }
    }
}

fn ready_engine<E: EncoderEngine>(engine: &mut Option<E>) -> SlidecastResult<&mut E> {
    match engine {
        Some(e) if e.is_loaded() => Ok(e),
        _ => Err(SlidecastError::encode(
            "encoder engine is not ready; call ensure_ready first",
        )),
    }
}

/// Run-scoped handle that discards staged frames on drop, on every exit path.
pub struct StagingScope<'a, E: EncoderEngine> {
    adapter: &'a mut EncoderAdapter<E>,
}

impl<E: EncoderEngine> Deref for StagingScope<'_, E> {
    type Target = EncoderAdapter<E>;

    fn deref(&self) -> &Self::Target {
        self.adapter
    }
}

impl<E: EncoderEngine> DerefMut for StagingScope<'_, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.adapter
    }
}

impl<E: EncoderEngine> Drop for StagingScope<'_, E> {
    fn drop(&mut self) {
        self.adapter.discard();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/adapter.rs"]
mod tests;
