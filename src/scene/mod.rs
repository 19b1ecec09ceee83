/// Slide and project boundary model.
pub mod model;
