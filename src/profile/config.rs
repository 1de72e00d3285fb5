//! Resolution profiles loaded from the dimensions file.
//!
//! The file maps `"w{width}h{height}"` keys to the crop geometry of one screen
//! layout. Lookups are exact: a screenshot whose resolution has no entry is
//! rejected rather than matched to the closest layout.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::RaidError;

/// Pattern of a profile key, e.g. `w1440h720`.
const RESOLUTION_KEY_PATTERN: &str = r"^w(\d+)h(\d+)$";

/// A rectangle in absolute pixel coordinates.
/// The end coordinates are exclusive when cropping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x_start: u32,
    pub y_start: u32,
    pub x_end: u32,
    pub y_end: u32,
}

impl Rect {
    pub fn new(x_start: u32, y_start: u32, x_end: u32, y_end: u32) -> Self {
        Self {
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    pub fn width(&self) -> u32 {
        self.x_end.saturating_sub(self.x_start)
    }

    pub fn height(&self) -> u32 {
        self.y_end.saturating_sub(self.y_start)
    }

    /// True if the rect has a positive area.
    pub fn is_valid(&self) -> bool {
        self.x_start < self.x_end && self.y_start < self.y_end
    }

    /// True if the rect lies inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x_end <= width && self.y_end <= height
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {})",
            self.x_start, self.y_start, self.x_end, self.y_end
        )
    }
}

/// Geometry of a single hit entry, relative to the hit's own bounding box.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HitImageLayout {
    /// Boxes must be strictly wider than this to count as a hit
    pub min_width: u32,
    /// Boxes must be strictly taller than this to count as a hit
    pub min_height: u32,
    /// Player name followed by the timestamp
    pub name_rect: Rect,
    pub party_rect: Rect,
    pub damage_rect: Rect,
    pub boss_rect: Rect,
}

impl HitImageLayout {
    fn zones(&self) -> [(&'static str, &Rect); 4] {
        [
            ("name_rect", &self.name_rect),
            ("party_rect", &self.party_rect),
            ("damage_rect", &self.damage_rect),
            ("boss_rect", &self.boss_rect),
        ]
    }
}

/// Crop geometry for one screen resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolutionProfile {
    /// Region of the screenshot that holds the list of hits
    pub hits_window: Rect,
    pub hit_image: HitImageLayout,
}

/// All profiles from one dimensions file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DimensionsFile {
    resolutions: BTreeMap<String, ResolutionProfile>,
}

/// Builds the profile key for a resolution.
pub fn resolution_key(width: u32, height: u32) -> String {
    format!("w{}h{}", width, height)
}

/// Splits a profile key back into `(width, height)`.
fn parse_resolution_key(key: &str) -> Option<(u32, u32)> {
    let re = Regex::new(RESOLUTION_KEY_PATTERN).ok()?;
    let caps = re.captures(key)?;
    let width = caps[1].parse().ok()?;
    let height = caps[2].parse().ok()?;
    Some((width, height))
}

impl DimensionsFile {
    /// Loads and validates a dimensions file.
    pub fn load(path: &Path) -> Result<Self, RaidError> {
        tracing::info!("Loading dimensions file: {}", path.display());

        let config_error = |reason: String| RaidError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let file = Self::from_json(&contents).map_err(config_error)?;

        tracing::info!(
            "Loaded {} resolution profile(s) from {}",
            file.resolutions.len(),
            path.display()
        );
        Ok(file)
    }

    /// Parses and validates dimensions file contents.
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let file: DimensionsFile = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), String> {
        for (key, profile) in &self.resolutions {
            let (width, height) = parse_resolution_key(key)
                .ok_or_else(|| format!("'{}' is not a resolution key like 'w1440h720'", key))?;

            let window = &profile.hits_window;
            if !window.is_valid() {
                return Err(format!("{}: hits_window {} is empty", key, window));
            }
            if !window.fits_within(width, height) {
                return Err(format!(
                    "{}: hits_window {} exceeds the {}x{} screen",
                    key, window, width, height
                ));
            }

            for (name, rect) in profile.hit_image.zones() {
                if !rect.is_valid() {
                    return Err(format!("{}: {} {} is empty", key, name, rect));
                }
            }
        }
        Ok(())
    }

    /// Returns the profile for an exact resolution.
    pub fn lookup(&self, width: u32, height: u32) -> Result<&ResolutionProfile, RaidError> {
        let key = resolution_key(width, height);
        tracing::debug!("Searching profile for resolution {}x{}", width, height);

        match self.resolutions.get(&key) {
            Some(profile) => {
                tracing::debug!("Found profile {}", key);
                Ok(profile)
            }
            None => Err(RaidError::ProfileNotFound { key }),
        }
    }

    /// Supported resolutions as `(width, height)`, sorted.
    pub fn resolutions(&self) -> Vec<(u32, u32)> {
        let mut list: Vec<(u32, u32)> = self
            .resolutions
            .keys()
            .filter_map(|k| parse_resolution_key(k))
            .collect();
        list.sort_unstable();
        list
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    pub(crate) const SAMPLE: &str = r#"{
        "resolutions": {
            "w300h240": {
                "hits_window": {"x_start": 10, "y_start": 10, "x_end": 290, "y_end": 230},
                "hit_image": {
                    "min_width": 200,
                    "min_height": 30,
                    "name_rect":   {"x_start": 10,  "y_start": 5,  "x_end": 120, "y_end": 25},
                    "party_rect":  {"x_start": 10,  "y_start": 28, "x_end": 60,  "y_end": 45},
                    "damage_rect": {"x_start": 130, "y_start": 5,  "x_end": 230, "y_end": 25},
                    "boss_rect":   {"x_start": 70,  "y_start": 28, "x_end": 120, "y_end": 45}
                }
            },
            "w1440h720": {
                "hits_window": {"x_start": 700, "y_start": 120, "x_end": 1400, "y_end": 700},
                "hit_image": {
                    "min_width": 500,
                    "min_height": 80,
                    "name_rect":   {"x_start": 120, "y_start": 10, "x_end": 450, "y_end": 45},
                    "party_rect":  {"x_start": 10,  "y_start": 10, "x_end": 110, "y_end": 90},
                    "damage_rect": {"x_start": 120, "y_start": 50, "x_end": 400, "y_end": 90},
                    "boss_rect":   {"x_start": 560, "y_start": 10, "x_end": 660, "y_end": 90}
                }
            }
        }
    }"#;

    pub(crate) fn sample() -> DimensionsFile {
        DimensionsFile::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn test_lookup_exact_resolution() {
        let dims = sample();
        let profile = dims.lookup(1440, 720).unwrap();
        assert_eq!(profile.hits_window, Rect::new(700, 120, 1400, 700));
        assert_eq!(profile.hit_image.min_width, 500);
    }

    #[test]
    fn test_lookup_has_no_nearest_match() {
        let dims = sample();
        let err = dims.lookup(1441, 720).unwrap_err();
        assert!(matches!(err, RaidError::ProfileNotFound { ref key } if key == "w1441h720"));
    }

    #[test]
    fn test_windows_within_screen_bounds() {
        let dims = sample();
        for (width, height) in dims.resolutions() {
            let window = dims.lookup(width, height).unwrap().hits_window;
            assert!(window.x_start < window.x_end && window.x_end <= width);
            assert!(window.y_start < window.y_end && window.y_end <= height);
        }
    }

    #[test]
    fn test_resolutions_sorted() {
        assert_eq!(sample().resolutions(), vec![(300, 240), (1440, 720)]);
    }

    #[test]
    fn test_window_outside_screen_rejected() {
        let json = SAMPLE.replace(r#""x_end": 290"#, r#""x_end": 301"#);
        let err = DimensionsFile::from_json(&json).unwrap_err();
        assert!(err.contains("exceeds"), "unexpected error: {}", err);
    }

    #[test]
    fn test_bad_key_rejected() {
        let json = SAMPLE.replace("w300h240", "300x240");
        assert!(DimensionsFile::from_json(&json).is_err());
    }

    #[test]
    fn test_degenerate_zone_rejected() {
        let json = SAMPLE.replace(
            r#""boss_rect":   {"x_start": 70,  "y_start": 28, "x_end": 120"#,
            r#""boss_rect":   {"x_start": 70,  "y_start": 28, "x_end": 70"#,
        );
        let err = DimensionsFile::from_json(&json).unwrap_err();
        assert!(err.contains("boss_rect"), "unexpected error: {}", err);
    }

    #[test]
    fn test_load_reports_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dimensions.json");
        std::fs::write(&path, "resolutions: not json").unwrap();

        let err = DimensionsFile::load(&path).unwrap_err();
        assert!(matches!(err, RaidError::Config { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = DimensionsFile::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, RaidError::Config { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dimensions.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let dims = DimensionsFile::load(&path).unwrap();
        assert!(dims.lookup(300, 240).is_ok());
    }

    #[test]
    fn test_bundled_dimensions_file() {
        let dims = DimensionsFile::from_json(include_str!("../../dimensions.json")).unwrap();
        assert_eq!(dims.resolutions(), vec![(1440, 720), (2400, 1080)]);
    }
}
