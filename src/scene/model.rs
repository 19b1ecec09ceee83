use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::sequence::{MAX_TOTAL_FRAMES, frame_count};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Largest raster surface edge the CPU backend can allocate.
pub const MAX_CANVAS_EDGE_PX: u32 = u16::MAX as u32;

/// Opaque unique slide token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SlideId(pub String);

impl SlideId {
    /// Borrow the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SlideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One text screen with timing and color styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Slide {
    /// Opaque unique token. Missing ids are assigned when a project is loaded.
    #[serde(default)]
    pub id: SlideId,
    /// Text drawn centered on the slide.
    #[serde(default)]
    pub text: String,
    /// How long the slide stays on screen.
    #[serde(default = "default_duration_sec")]
    pub duration_sec: f64,
    /// Fill color of the whole frame.
    #[serde(default = "default_bg", alias = "background_color")]
    pub bg: Rgb8,
    /// Fill color of the text.
    #[serde(default = "default_text_color")]
    pub text_color: Rgb8,
}

impl Slide {
    /// Create a slide with the editing-layer defaults for timing and colors.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: SlideId(id.into()),
            text: text.into(),
            duration_sec: default_duration_sec(),
            bg: default_bg(),
            text_color: default_text_color(),
        }
    }

    /// Return a copy with a different duration.
    pub fn with_duration(mut self, duration_sec: f64) -> Self {
        self.duration_sec = duration_sec;
        self
    }

    /// Return a copy with different background and text colors.
    pub fn with_colors(mut self, bg: Rgb8, text_color: Rgb8) -> Self {
        self.bg = bg;
        self.text_color = text_color;
        self
    }
}

fn default_duration_sec() -> f64 {
    2.0
}

fn default_bg() -> Rgb8 {
    Rgb8::new(0x1f, 0x29, 0x37)
}

fn default_text_color() -> Rgb8 {
    Rgb8::WHITE
}

fn default_width() -> u32 {
    720
}

fn default_height() -> u32 {
    1280
}

fn default_fps() -> u32 {
    30
}

/// Ordered slides plus output geometry and frame rate.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    /// Slides in presentation order.
    #[serde(default)]
    pub slides: Vec<Slide>,
    /// Output width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Output height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Output frames per second.
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

impl Project {
    /// Create an empty project with the given geometry.
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            slides: Vec::new(),
            width,
            height,
            fps,
        }
    }

    /// Append a slide, builder style.
    pub fn with_slide(mut self, slide: Slide) -> Self {
        self.slides.push(slide);
        self
    }

    /// Parse a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SlidecastResult<Self> {
        let mut project: Project = serde_json::from_reader(r)
            .map_err(|e| SlidecastError::serde(format!("parse project JSON: {e}")))?;
        project.assign_missing_ids();
        Ok(project)
    }

    /// Parse a project from a JSON string.
    pub fn from_json_str(s: &str) -> SlidecastResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a project from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SlidecastResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SlidecastError::serde(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> SlidecastResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SlidecastError::serde(e.to_string()))
    }

    /// Output canvas dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Validate geometry, frame rate and slide timing.
    ///
    /// An empty slide list is valid here; see [`Project::validate_for_render`].
    pub fn validate(&self) -> SlidecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SlidecastError::invalid_project(
                "width/height must be positive",
            ));
        }
        if self.width > MAX_CANVAS_EDGE_PX || self.height > MAX_CANVAS_EDGE_PX {
            return Err(SlidecastError::invalid_project(format!(
                "width/height must be <= {MAX_CANVAS_EDGE_PX}"
            )));
        }
        if self.fps == 0 {
            return Err(SlidecastError::invalid_project("fps must be positive"));
        }
        for (i, slide) in self.slides.iter().enumerate() {
            if !slide.duration_sec.is_finite() || slide.duration_sec < 0.0 {
                return Err(SlidecastError::invalid_project(format!(
                    "slide {i} ('{}') duration_sec must be finite and >= 0",
                    slide.id
                )));
            }
        }
        let total = self.duration_frames();
        if total > MAX_TOTAL_FRAMES {
            return Err(SlidecastError::invalid_project(format!(
                "project is {total} frames long; at most {MAX_TOTAL_FRAMES} are supported"
            )));
        }
        Ok(())
    }

    /// Validate for a full encode: [`Project::validate`] plus a non-empty slide list.
    pub fn validate_for_render(&self) -> SlidecastResult<()> {
        self.validate()?;
        if self.slides.is_empty() {
            return Err(SlidecastError::invalid_project(
                "project has no slides; refusing to encode an empty video",
            ));
        }
        Ok(())
    }

    /// Total number of output frames, saturating at `u64::MAX`.
    pub fn duration_frames(&self) -> u64 {
        self.slides
            .iter()
            .map(|s| frame_count(s.duration_sec, self.fps))
            .fold(0u64, u64::saturating_add)
    }

    /// Total output duration in seconds (`duration_frames / fps`).
    pub fn duration_secs(&self) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        self.duration_frames() as f64 / f64::from(self.fps)
    }

    fn assign_missing_ids(&mut self) {
        for (i, slide) in self.slides.iter_mut().enumerate() {
            if slide.id.0.trim().is_empty() {
                slide.id = SlideId(format!("slide-{}", i + 1));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
