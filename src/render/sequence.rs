//! Expansion of slides into a time-ordered frame sequence.
//!
//! Every slide contributes `max(1, round(duration_sec * fps))` frames with identical pixels.
//! Global frame indices are contiguous across slides, and staged file names zero-pad the index
//! so that lexicographic order equals temporal order.

use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::raster::SlideRasterizer;
use crate::scene::model::{Project, Slide};

/// Image extension of staged frames.
pub const FRAME_IMAGE_EXT: &str = "png";
/// Encoder input pattern matching [`frame_file_name`].
pub const FRAME_INPUT_PATTERN: &str = "frame_%05d.png";
/// Largest project length in frames; indices stay within the five zero-padded digits.
pub const MAX_TOTAL_FRAMES: u64 = 100_000;

/// Number of frames a slide of `duration_sec` occupies at `fps`.
pub fn frame_count(duration_sec: f64, fps: u32) -> u64 {
    let n = (duration_sec * f64::from(fps)).round();
    if n.is_finite() && n >= 1.0 {
        n as u64
    } else {
        1
    }
}

/// Staged file name for a global frame index, e.g. `frame_00042.png`.
pub fn frame_file_name(index: FrameIndex) -> String {
    format!("frame_{:05}.{FRAME_IMAGE_EXT}", index.0)
}

/// One encoded still in the output sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Zero-based global position in the output.
    pub sequence_index: FrameIndex,
    /// Encoded still image (PNG).
    pub image_bytes: Vec<u8>,
}

impl Frame {
    /// Name this frame is staged under.
    pub fn file_name(&self) -> String {
        frame_file_name(self.sequence_index)
    }
}

/// Position of one frame in the sequence, before rasterization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSlot {
    /// Global frame index.
    pub index: FrameIndex,
    /// Index of the slide the frame shows.
    pub slide_index: usize,
    /// Index of the frame within its slide.
    pub local_index: u64,
}

/// Validated, restartable frame plan for a project.
#[derive(Clone, Debug)]
pub struct FrameSequence<'a> {
    project: &'a Project,
    ranges: Vec<FrameRange>,
}

impl<'a> FrameSequence<'a> {
    /// Plan the frames of `project`.
    ///
    /// Fails with [`SlidecastError::InvalidProject`] for non-positive geometry or frame rate. An
    /// empty slide list yields an empty sequence.
    pub fn new(project: &'a Project) -> SlidecastResult<Self> {
        project.validate()?;
        let mut ranges = Vec::with_capacity(project.slides.len());
        let mut start = 0u64;
        for slide in &project.slides {
            let end = start
                .checked_add(frame_count(slide.duration_sec, project.fps))
                .filter(|&n| n <= MAX_TOTAL_FRAMES)
                .ok_or_else(|| {
                    SlidecastError::invalid_project(format!(
                        "project exceeds {MAX_TOTAL_FRAMES} frames"
                    ))
                })?;
            ranges.push(FrameRange::new(FrameIndex(start), FrameIndex(end))?);
            start = end;
        }
        Ok(Self { project, ranges })
    }

    /// Project this sequence was planned from.
    pub fn project(&self) -> &'a Project {
        self.project
    }

    /// Total frame count.
    pub fn total_frames(&self) -> u64 {
        self.ranges.last().map(|r| r.end.0).unwrap_or(0)
    }

    /// Return `true` when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.total_frames() == 0
    }

    /// Half-open global frame range of each slide, in slide order.
    pub fn slide_ranges(&self) -> &[FrameRange] {
        &self.ranges
    }

    /// Slot for a global frame index.
    pub fn slot(&self, index: FrameIndex) -> Option<FrameSlot> {
        let slide_index = self.ranges.partition_point(|r| r.end.0 <= index.0);
        let range = self.ranges.get(slide_index)?;
        range.contains(index).then(|| FrameSlot {
            index,
            slide_index,
            local_index: index.0 - range.start.0,
        })
    }

    /// Slide shown by `slot`.
    pub fn slide(&self, slot: &FrameSlot) -> SlidecastResult<&'a Slide> {
        self.project.slides.get(slot.slide_index).ok_or_else(|| {
            SlidecastError::invalid_project(format!(
                "frame slot refers to missing slide {}",
                slot.slide_index
            ))
        })
    }

    /// Iterate every frame slot in temporal order. Each call starts from the beginning.
    pub fn iter(&self) -> impl Iterator<Item = FrameSlot> + '_ {
        self.ranges
            .iter()
            .enumerate()
            .flat_map(|(slide_index, range)| {
                (range.start.0..range.end.0).map(move |i| FrameSlot {
                    index: FrameIndex(i),
                    slide_index,
                    local_index: i - range.start.0,
                })
            })
    }

    /// Rasterize the frame at `slot`.
    pub fn rasterize(
        &self,
        slot: &FrameSlot,
        rasterizer: &mut SlideRasterizer,
    ) -> SlidecastResult<Frame> {
        let slide = self.slide(slot)?;
        Ok(Frame {
            sequence_index: slot.index,
            image_bytes: rasterizer.render_png(slide)?,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sequence.rs"]
mod tests;
