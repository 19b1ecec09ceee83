/// Font fallback chain and text shaping.
pub mod fonts;
