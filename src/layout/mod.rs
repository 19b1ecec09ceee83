/// Adaptive word-wrap and font-size search.
pub mod text;
