//! Slidecast turns an ordered list of text slides into a WebM video.
//!
//! Each slide is a colored canvas with centered, auto-sized, word-wrapped text shown for a fixed
//! duration. Frames are rasterized on the CPU, staged into an external encoder engine and
//! encoded to VP8/WebM in one pass:
//!
//! - Load and validate a [`Project`]
//! - Create a [`Pipeline`] over an [`EncoderEngine`] ([`FfmpegEngine`] or [`InMemoryEngine`])
//! - [`Pipeline::run`] the project into an [`EncodedVideo`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Font discovery and text shaping.
pub mod assets;
/// Encoder engines and frame staging.
pub mod encode;
/// Text layout.
pub mod layout;
/// Frame rasterization and timing.
pub mod render;
/// Boundary project model.
pub mod scene;
/// Run orchestration.
pub mod session;

pub use crate::foundation::core::{Canvas, FrameIndex, FrameRange, Rgb8};
pub use crate::foundation::error::{SlidecastError, SlidecastResult};

pub use crate::assets::fonts::{FontSet, TextShaper};
pub use crate::encode::adapter::{EncoderAdapter, WEBM_MIME};
pub use crate::encode::engine::EncoderEngine;
pub use crate::encode::ffmpeg::{FfmpegEngine, FfmpegEngineOpts, is_ffmpeg_on_path};
pub use crate::encode::memory::InMemoryEngine;
pub use crate::layout::text::{LayoutBox, LayoutResult, TextMeasure, layout_text};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::raster::SlideRasterizer;
pub use crate::render::sequence::{Frame, FrameSequence, frame_count};
pub use crate::scene::model::{Project, Slide, SlideId};
pub use crate::session::pipeline::{
    CancelToken, EncodedVideo, Pipeline, PipelineOpts, RenderStats, RunLog, RunState,
    render_slide_png,
};
