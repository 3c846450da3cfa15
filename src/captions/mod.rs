//! Caption data: the timestamped timeline produced by translation, and the closed catalogue of
//! caption style presets.

/// Caption style presets.
pub mod style;
/// Timestamped caption timeline parser and lookup.
pub mod timeline;
