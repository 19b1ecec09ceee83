/// Rendered frame buffers.
pub mod backend;
/// Slide rasterization on the CPU.
pub mod raster;
/// Slide-to-frame timing expansion.
pub mod sequence;
