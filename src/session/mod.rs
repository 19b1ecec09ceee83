/// Slide-to-video run orchestration.
pub mod pipeline;
