//! Encoder engines and the adapter that stages frames into them.
//!
//! An engine is an external video encoder with a private file staging area. The adapter owns
//! one engine instance, loads it lazily, stages frames under ordered names and runs the encoder
//! with a fixed argument list.

/// Engine lifecycle around staged frames.
pub mod adapter;
/// Engine contract.
pub mod engine;
/// `ffmpeg`-based engine (system binary, temp-dir staging).
pub mod ffmpeg;
/// In-memory engine for tests and debugging.
pub mod memory;
