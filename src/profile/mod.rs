//! Resolution-specific crop geometry.

pub mod config;

pub use config::{DimensionsFile, HitImageLayout, Rect, ResolutionProfile};
