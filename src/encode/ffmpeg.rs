use crate::encode::engine::{EncoderEngine, validate_staged_name};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use anyhow::Context as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Options for [`FfmpegEngine`].
#[derive(Clone, Debug)]
pub struct FfmpegEngineOpts {
    /// Program to invoke. Defaults to `ffmpeg` on `PATH`.
    pub program: PathBuf,
    /// Parent directory for the private staging directory. `None` uses the system temp dir.
    pub staging_root: Option<PathBuf>,
}

impl Default for FfmpegEngineOpts {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            staging_root: None,
        }
    }
}

/// Engine backed by the system `ffmpeg` binary.
///
/// `load` probes the binary and creates a private staging directory that is deleted when the
/// engine is dropped. `run` executes `ffmpeg` inside that directory.
pub struct FfmpegEngine {
    opts: FfmpegEngineOpts,
    staging: Option<tempfile::TempDir>,
}

impl FfmpegEngine {
    /// Create an unloaded engine.
    pub fn new(opts: FfmpegEngineOpts) -> Self {
        Self {
            opts,
            staging: None,
        }
    }

    /// Staging directory, once loaded.
    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging.as_ref().map(tempfile::TempDir::path)
    }

    fn staged_path(&self, name: &str) -> SlidecastResult<PathBuf> {
        validate_staged_name(name)?;
        let dir = self
            .staging_dir()
            .ok_or_else(|| SlidecastError::encode("ffmpeg engine is not loaded"))?;
        Ok(dir.join(name))
    }
}

impl EncoderEngine for FfmpegEngine {
    fn is_loaded(&self) -> bool {
        self.staging.is_some()
    }

    fn load(&mut self) -> SlidecastResult<()> {
        if self.is_loaded() {
            return Ok(());
        }
        if !is_program_runnable(&self.opts.program) {
            return Err(SlidecastError::engine_init(format!(
                "'{}' is required for encoding, but could not be run (is it installed and on PATH?)",
                self.opts.program.display()
            )));
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("slidecast-");
        let dir = match &self.opts.staging_root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| {
                    SlidecastError::engine_init(format!(
                        "failed to create staging root '{}': {e}",
                        root.display()
                    ))
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| SlidecastError::engine_init(format!("failed to create staging dir: {e}")))?;

        tracing::debug!(staging = %dir.path().display(), "ffmpeg engine loaded");
        self.staging = Some(dir);
        Ok(())
    }

    fn write_file(&mut self, name: &str, bytes: &[u8]) -> SlidecastResult<()> {
        let path = self.staged_path(name)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to stage '{}'", path.display()))?;
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> SlidecastResult<Vec<u8>> {
        let path = self.staged_path(name)?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("failed to read '{}'", path.display()))?;
        Ok(bytes)
    }

    fn remove_file(&mut self, name: &str) -> SlidecastResult<()> {
        let path = self.staged_path(name)?;
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove '{}'", path.display()))?;
        Ok(())
    }

    fn run(&mut self, args: &[String]) -> SlidecastResult<()> {
        let dir = self
            .staging_dir()
            .ok_or_else(|| SlidecastError::encode("ffmpeg engine is not loaded"))?;

        let mut cmd = Command::new(&self.opts.program);
        cmd.current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y"])
            .args(args);
        tracing::debug!(?args, "running ffmpeg");

        let output = cmd.output().map_err(|e| {
            SlidecastError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlidecastError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_program_runnable(Path::new("ffmpeg"))
}

fn is_program_runnable(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
