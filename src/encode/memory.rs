use crate::encode::engine::{EncoderEngine, validate_staged_name};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use std::collections::BTreeMap;

const SYNTHETIC_MAGIC: &str = "SLIDECAST-MEM";

/// Engine that keeps its staging area in memory.
///
/// `run` understands the `-framerate <fps> -i <prefix%0Nd.ext> ... <output>` shape, counts the
/// contiguous input frames starting at 0 and writes a small synthetic container describing them
/// (see [`InMemoryEngine::probe_output`]). Failures can be injected for tests.
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    loaded: bool,
    files: BTreeMap<String, Vec<u8>>,
    load_calls: usize,
    writes: usize,
    runs: Vec<Vec<String>>,
    fail_load: Option<String>,
    fail_run: Option<String>,
    fail_write_at: Option<usize>,
}

/// Stream parameters recovered from a synthetic output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyntheticVideo {
    /// Number of input frames consumed.
    pub frames: u64,
    /// Declared input frame rate.
    pub fps: u32,
}

impl SyntheticVideo {
    /// Stream duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        self.frames as f64 / f64::from(self.fps)
    }
}

impl InMemoryEngine {
    /// Create a new in-memory engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `load` fail with `msg`.
    pub fn failing_load(mut self, msg: impl Into<String>) -> Self {
        self.fail_load = Some(msg.into());
        self
    }

    /// Make every `run` fail with `msg`.
    pub fn failing_run(mut self, msg: impl Into<String>) -> Self {
        self.fail_run = Some(msg.into());
        self
    }

    /// Make the `n`-th (0-based) `write_file` call fail.
    pub fn failing_write_at(mut self, n: usize) -> Self {
        self.fail_write_at = Some(n);
        self
    }

    /// Number of `load` calls observed.
    pub fn load_calls(&self) -> usize {
        self.load_calls
    }

    /// Argument lists of every `run` call, in order.
    pub fn runs(&self) -> &[Vec<String>] {
        &self.runs
    }

    /// Names currently in the staging area, sorted.
    pub fn staged_names(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    /// Borrow a staged file.
    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Parse an output produced by [`EncoderEngine::run`] on this engine.
    pub fn probe_output(bytes: &[u8]) -> Option<SyntheticVideo> {
        let text = std::str::from_utf8(bytes).ok()?;
        let rest = text.strip_prefix(SYNTHETIC_MAGIC)?.trim();
        let mut frames = None;
        let mut fps = None;
        for field in rest.split_whitespace() {
            match field.split_once('=')? {
                ("frames", v) => frames = v.parse().ok(),
                ("fps", v) => fps = v.parse().ok(),
                _ => {}
            }
        }
        Some(SyntheticVideo {
            frames: frames?,
            fps: fps?,
        })
    }

    fn ensure_loaded(&self) -> SlidecastResult<()> {
        if !self.loaded {
            return Err(SlidecastError::encode("in-memory engine is not loaded"));
        }
        Ok(())
    }
}

impl EncoderEngine for InMemoryEngine {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn load(&mut self) -> SlidecastResult<()> {
        self.load_calls += 1;
        if let Some(msg) = &self.fail_load {
            return Err(SlidecastError::engine_init(msg.clone()));
        }
        self.loaded = true;
        Ok(())
    }

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> SlidecastResult<()> {
        self.ensure_loaded()?;
        validate_staged_name(name)?;
        let n = self.writes;
        self.writes += 1;
        if self.fail_write_at == Some(n) {
            return Err(SlidecastError::encode(format!(
                "injected write failure for '{name}'"
            )));
        }
        self.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> SlidecastResult<Vec<u8>> {
        self.ensure_loaded()?;
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| SlidecastError::encode(format!("'{name}': no such file")))
    }

    fn remove_file(&mut self, name: &str) -> SlidecastResult<()> {
        self.ensure_loaded()?;
        self.files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SlidecastError::encode(format!("'{name}': no such file")))
    }

    fn run(&mut self, args: &[String]) -> SlidecastResult<()> {
        self.ensure_loaded()?;
        self.runs.push(args.to_vec());
        if let Some(msg) = &self.fail_run {
            return Err(SlidecastError::encode(msg.clone()));
        }

        let flag = |name: &str| -> Option<&String> {
            args.iter()
                .position(|a| a == name)
                .and_then(|i| args.get(i + 1))
        };
        let fps: u32 = flag("-framerate")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| SlidecastError::encode("missing or invalid -framerate"))?;
        let pattern = flag("-i").ok_or_else(|| SlidecastError::encode("missing -i input"))?;
        let output = args
            .last()
            .filter(|o| *o != pattern)
            .ok_or_else(|| SlidecastError::encode("missing output file"))?;
        validate_staged_name(output)?;

        let (prefix, width, suffix) = parse_sequence_pattern(pattern)?;
        let mut frames = 0u64;
        while self
            .files
            .contains_key(&format!("{prefix}{frames:0width$}{suffix}"))
        {
            frames += 1;
        }
        if frames == 0 {
            return Err(SlidecastError::encode(format!(
                "could not find file with path '{pattern}' and index in the range 0-4"
            )));
        }

        let body = format!("{SYNTHETIC_MAGIC} frames={frames} fps={fps}\n");
        self.files.insert(output.clone(), body.into_bytes());
        Ok(())
    }
}

/// Split `frame_%05d.png` into `("frame_", 5, ".png")`.
fn parse_sequence_pattern(pattern: &str) -> SlidecastResult<(&str, usize, &str)> {
    let bad = || SlidecastError::encode(format!("unsupported input pattern '{pattern}'"));
    let start = pattern.find('%').ok_or_else(bad)?;
    let rest = &pattern[start + 1..];
    let d = rest.find('d').ok_or_else(bad)?;
    let width = if d == 0 {
        0
    } else {
        rest[..d].parse::<usize>().map_err(|_| bad())?
    };
    Ok((&pattern[..start], width, &rest[d + 1..]))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/memory.rs"]
mod tests;
