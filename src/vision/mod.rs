//! Image-side stages of the pipeline: cropping, masking and hit segmentation.

pub mod crop;
pub mod segment;
pub mod threshold;

pub use crop::{crop_zones, extract, HitZones};
pub use segment::{find_hits, Segmentation};
pub use threshold::{auto_crop, content_bounds, invert, threshold_binary, to_gray};
