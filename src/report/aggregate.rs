//! Turns screenshot results into report rows and flags likely duplicates.
//!
//! Screenshots of a scrolling combat log often overlap, so the same hit can be
//! captured twice. A hit whose (damage, name) pair was already seen during the
//! run is still reported, but marked so it stands out in the sheet.

use std::collections::HashMap;

use crate::ocr::parse_damage;
use crate::pipeline::{HitRecord, ScreenshotResult};

/// What ends up in the damage cell of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DamageCell {
    /// OCR read nothing
    Empty,
    /// OCR text that is not a number; the cell stays blank
    Unparsed(String),
    Value { value: u64, duplicate: bool },
}

/// One spreadsheet row.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub label: String,
    /// Position of the hit box within its screenshot
    pub hit_index: usize,
    pub damage: DamageCell,
    pub record: HitRecord,
}

/// Remembers every (damage, name) pair seen during one run.
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    seen: HashMap<String, u64>,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit and returns true if the same pair was seen before.
    pub fn observe(&mut self, name: &str, damage_text: &str, value: u64) -> bool {
        let key = format!("{}{}", damage_text, name);
        if self.seen.contains_key(&key) {
            return true;
        }
        self.seen.insert(key, value);
        false
    }
}

/// Builds report rows for a whole run.
#[derive(Debug, Default)]
pub struct Aggregator {
    tracker: DuplicateTracker,
    duplicates: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows flagged as duplicates so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Converts one screenshot's hits into rows, in hit order.
    pub fn add(&mut self, result: ScreenshotResult) -> Vec<ReportRow> {
        let label = result.label;
        result
            .hit_records
            .into_iter()
            .map(|record| {
                tracing::info!("  {} {}", record.name, record.damage);
                let damage = self.damage_cell(&label, record.hit_index, &record);
                ReportRow {
                    label: label.clone(),
                    hit_index: record.hit_index,
                    damage,
                    record,
                }
            })
            .collect()
    }

    fn damage_cell(&mut self, label: &str, hit_index: usize, record: &HitRecord) -> DamageCell {
        if record.damage.is_empty() {
            tracing::warn!(
                "{}: damage is empty for hit #{} name: '{}'",
                label,
                hit_index,
                record.name
            );
            return DamageCell::Empty;
        }

        match parse_damage(&record.damage) {
            Ok(value) => {
                let duplicate = self.tracker.observe(&record.name, &record.damage, value);
                if duplicate {
                    self.duplicates += 1;
                    tracing::info!(
                        "{}: hit #{} ({} {}) was already seen, probably overlapping screenshots",
                        label,
                        hit_index,
                        record.name,
                        value
                    );
                }
                DamageCell::Value { value, duplicate }
            }
            Err(e) => {
                tracing::warn!("{}: hit #{}: {}", label, hit_index, e);
                DamageCell::Unparsed(record.damage.clone())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    pub(crate) fn record(name: &str, damage: &str) -> HitRecord {
        HitRecord {
            hit_index: 0,
            name: name.to_string(),
            damage: damage.to_string(),
            hit_image: RgbImage::new(60, 20),
            name_image: GrayImage::from_pixel(30, 10, image::Luma([255])),
            damage_image: GrayImage::from_pixel(20, 10, image::Luma([255])),
            party_image: RgbImage::new(10, 10),
            boss_image: RgbImage::new(10, 10),
        }
    }

    fn screenshot(label: &str, hits: Vec<HitRecord>) -> ScreenshotResult {
        ScreenshotResult {
            label: label.to_string(),
            hit_records: hits,
        }
    }

    #[test]
    fn test_duplicate_tracker() {
        let mut tracker = DuplicateTracker::new();
        assert!(!tracker.observe("Alice", "12,345", 12345));
        assert!(tracker.observe("Alice", "12,345", 12345));
        // Same damage, other player
        assert!(!tracker.observe("Bob", "12,345", 12345));
        assert!(tracker.observe("Bob", "12,345", 12345));
    }

    #[test]
    fn test_duplicates_flagged_across_screenshots() {
        let mut agg = Aggregator::new();

        let first = agg.add(screenshot("a", vec![record("Alice", "12,345")]));
        let second = agg.add(screenshot(
            "b",
            vec![record("Alice", "12,345"), record("Bob", "12,345")],
        ));

        assert_eq!(
            first[0].damage,
            DamageCell::Value { value: 12345, duplicate: false }
        );
        assert_eq!(
            second[0].damage,
            DamageCell::Value { value: 12345, duplicate: true }
        );
        assert_eq!(
            second[1].damage,
            DamageCell::Value { value: 12345, duplicate: false }
        );
        assert_eq!(agg.duplicates(), 1);
    }

    #[test]
    fn test_unparsable_damage_still_emits_row() {
        let mut agg = Aggregator::new();
        let rows = agg.add(screenshot(
            "a",
            vec![record("Alice", "abc"), record("Bob", ""), record("Carol", "7,000")],
        ));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].damage, DamageCell::Unparsed("abc".to_string()));
        assert_eq!(rows[1].damage, DamageCell::Empty);
        assert_eq!(
            rows[2].damage,
            DamageCell::Value { value: 7000, duplicate: false }
        );
    }

    #[test]
    fn test_rows_carry_label_and_index() {
        let mut agg = Aggregator::new();
        // Box 1 was skipped during recognition
        let hits = [("A", "1", 0), ("B", "2", 2), ("C", "3", 3)]
            .into_iter()
            .map(|(name, damage, index)| HitRecord {
                hit_index: index,
                ..record(name, damage)
            })
            .collect();
        let rows = agg.add(screenshot("shot_7", hits));

        let indices: Vec<usize> = rows.iter().map(|r| r.hit_index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
        assert!(rows.iter().all(|r| r.label == "shot_7"));
    }
}
