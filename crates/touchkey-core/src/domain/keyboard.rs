//! Keyboard layout domain entity.
//!
//! The layout places every key of the printed keyboard in the frame coordinate
//! space produced by the camera.  Keys are grouped into rows; each row occupies
//! a horizontal band and keys inside a row are ordered left to right, so a point
//! lookup is two binary searches.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::geometry::Point;
use crate::keymap::hid::HidKeyCode;

/// Errors that can occur when building a layout.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// Two key regions overlap.
    #[error("key regions overlap: {0} conflicts with {1}")]
    Overlap(String, String),

    /// A key with the same identifier is already in the layout.
    #[error("duplicate key identifier: {0}")]
    DuplicateKey(String),

    /// The key region has a non-positive or non-finite size or position.
    #[error("invalid region for key {0}: size must be positive and coordinates finite")]
    InvalidRegion(String),

    /// The new key would make its row's vertical band intersect another row.
    #[error("row {0} overlaps the vertical band of another row")]
    RowBandOverlap(usize),
}

/// An axis-aligned rectangle in frame coordinates.
///
/// Containment is half-open: the left and top edges belong to the region, the
/// right and bottom edges do not.  Adjacent keys therefore never both claim a
/// point on their shared edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl KeyRegion {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the rightmost X coordinate (exclusive).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Returns the bottommost Y coordinate (exclusive).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns `true` if `point` lies inside the region grown by `margin` on
    /// every side.  A zero margin is plain containment.
    pub fn contains(&self, point: &Point, margin: f64) -> bool {
        point.x >= self.x - margin
            && point.x < self.right() + margin
            && point.y >= self.y - margin
            && point.y < self.bottom() + margin
    }

    /// Returns `true` if this region overlaps with `other`.
    pub fn overlaps(&self, other: &KeyRegion) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// A single key of the printed keyboard.
///
/// Keys are immutable once constructed.  Two keys are the same key when their
/// identifiers match; see [`KeyboardKey::same_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardKey {
    identifier: String,
    display: char,
    region: KeyRegion,
    row: usize,
    column: usize,
}

impl KeyboardKey {
    pub fn new(
        identifier: impl Into<String>,
        display: char,
        region: KeyRegion,
        row: usize,
        column: usize,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            display,
            region,
            row,
            column,
        }
    }

    /// Unique identifier within the layout (e.g. `"q"`, `"space"`).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The character printed on the key.
    pub fn display(&self) -> char {
        self.display
    }

    pub fn region(&self) -> &KeyRegion {
        &self.region
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns `true` if `point` is on this key, allowing `margin` units of
    /// tolerance outside the printed edge.
    pub fn contains(&self, point: &Point, margin: f64) -> bool {
        self.region.contains(point, margin)
    }

    /// Identity comparison by identifier.
    pub fn same_key(&self, other: &KeyboardKey) -> bool {
        self.identifier == other.identifier
    }

    /// The HID usage injected into the host when this key is pressed.
    pub fn hid_code(&self) -> HidKeyCode {
        HidKeyCode::from_char(self.display)
    }
}

/// Read-only lookup service mapping frame points to keys.
///
/// The validation engine calls [`key_at`](KeyboardLayoutIndex::key_at) once per
/// frame, so implementations must answer in O(1) or O(log n).
pub trait KeyboardLayoutIndex {
    /// Returns the key whose region contains `point`, if any.
    fn key_at(&self, point: &Point) -> Option<&KeyboardKey>;

    /// Looks a key up by identifier.
    fn key(&self, identifier: &str) -> Option<&KeyboardKey>;

    /// Number of keys in the layout.
    fn key_count(&self) -> usize;
}

/// One horizontal band of keys, sorted left to right.
#[derive(Debug, Clone)]
struct Row {
    index: usize,
    top: f64,
    bottom: f64,
    keys: Vec<KeyboardKey>,
}

/// The keyboard layout.
///
/// Rows are kept sorted by their top edge and keys inside each row by their
/// left edge, which makes [`key_at`](KeyboardLayoutIndex::key_at) O(log n).
#[derive(Debug, Clone, Default)]
pub struct KeyboardLayout {
    rows: Vec<Row>,
    identifiers: HashSet<String>,
}

impl KeyboardLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a QWERTY layout with square keys of side `key_size` separated by
    /// `gap` units, anchored at `origin` (top-left of the `q` key).
    ///
    /// Row 1 is shifted right by a quarter pitch and row 2 by three quarters,
    /// like a physical keyboard.  Row 3 holds a space bar five keys wide.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidRegion`] if `key_size` is not positive or
    /// `gap` is negative.
    pub fn qwerty(origin: Point, key_size: f64, gap: f64) -> Result<Self, LayoutError> {
        const LETTER_ROWS: [(&str, f64); 3] = [("qwertyuiop", 0.0), ("asdfghjkl", 0.25), ("zxcvbnm", 0.75)];

        if !(gap >= 0.0) {
            return Err(LayoutError::InvalidRegion("qwerty".to_string()));
        }
        let pitch = key_size + gap;
        let mut layout = Self::new();

        for (row, (letters, stagger)) in LETTER_ROWS.iter().enumerate() {
            let top = origin.y + row as f64 * pitch;
            for (column, ch) in letters.chars().enumerate() {
                let left = origin.x + (stagger + column as f64) * pitch;
                layout.add_key(KeyboardKey::new(
                    ch.to_string(),
                    ch,
                    KeyRegion::new(left, top, key_size, key_size),
                    row,
                    column,
                ))?;
            }
        }

        let space_row = LETTER_ROWS.len();
        layout.add_key(KeyboardKey::new(
            "space",
            ' ',
            KeyRegion::new(
                origin.x + 2.5 * pitch,
                origin.y + space_row as f64 * pitch,
                5.0 * pitch - gap,
                key_size,
            ),
            space_row,
            0,
        ))?;

        Ok(layout)
    }

    /// Adds a key to the layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidRegion`] for degenerate regions,
    /// [`LayoutError::DuplicateKey`] if the identifier is taken,
    /// [`LayoutError::Overlap`] if the region overlaps an existing key, and
    /// [`LayoutError::RowBandOverlap`] if the key's row would intersect the
    /// vertical band of a different row.
    pub fn add_key(&mut self, key: KeyboardKey) -> Result<(), LayoutError> {
        if !key.region.is_valid() {
            return Err(LayoutError::InvalidRegion(key.identifier));
        }
        if self.identifiers.contains(&key.identifier) {
            return Err(LayoutError::DuplicateKey(key.identifier));
        }
        if let Some(existing) = self.keys().find(|k| k.region.overlaps(&key.region)) {
            return Err(LayoutError::Overlap(
                key.identifier.clone(),
                existing.identifier.clone(),
            ));
        }

        // Work out the band the key's row would occupy after insertion.
        let (top, bottom) = match self.rows.iter().find(|r| r.index == key.row) {
            Some(row) => (row.top.min(key.region.y), row.bottom.max(key.region.bottom())),
            None => (key.region.y, key.region.bottom()),
        };
        let band_conflict = self
            .rows
            .iter()
            .any(|r| r.index != key.row && top < r.bottom && bottom > r.top);
        if band_conflict {
            return Err(LayoutError::RowBandOverlap(key.row));
        }

        self.identifiers.insert(key.identifier.clone());

        let row_pos = match self.rows.iter().position(|r| r.index == key.row) {
            Some(pos) => pos,
            None => {
                self.rows.push(Row {
                    index: key.row,
                    top,
                    bottom,
                    keys: Vec::new(),
                });
                self.rows.len() - 1
            }
        };
        let row = &mut self.rows[row_pos];
        row.top = top;
        row.bottom = bottom;
        let insert_at = row.keys.partition_point(|k| k.region.x < key.region.x);
        row.keys.insert(insert_at, key);

        self.rows.sort_by(|a, b| a.top.total_cmp(&b.top));
        Ok(())
    }

    /// Returns all keys, row by row, left to right.
    pub fn keys(&self) -> impl Iterator<Item = &KeyboardKey> {
        self.rows.iter().flat_map(|r| r.keys.iter())
    }

    /// Returns the smallest region enclosing every key, or `None` for an empty
    /// layout.
    pub fn bounds(&self) -> Option<KeyRegion> {
        let mut keys = self.keys();
        let first = *keys.next()?.region();
        let (mut left, mut top, mut right, mut bottom) =
            (first.x, first.y, first.right(), first.bottom());
        for key in keys {
            left = left.min(key.region.x);
            top = top.min(key.region.y);
            right = right.max(key.region.right());
            bottom = bottom.max(key.region.bottom());
        }
        Some(KeyRegion::new(left, top, right - left, bottom - top))
    }

    /// Resolves `point` to a key, tolerating `margin` units outside the
    /// printed edges.
    ///
    /// An exact hit always wins.  Otherwise the key with the nearest centre
    /// among those whose grown region contains the point is returned.  This is
    /// a linear scan and is meant for UI highlighting, not the per-frame path.
    pub fn key_at_with_margin(&self, point: &Point, margin: f64) -> Option<&KeyboardKey> {
        if let Some(key) = self.key_at(point) {
            return Some(key);
        }
        self.keys()
            .filter(|k| k.contains(point, margin))
            .min_by(|a, b| {
                let da = a.region.center().distance_to(point);
                let db = b.region.center().distance_to(point);
                da.total_cmp(&db)
            })
    }
}

impl KeyboardLayoutIndex for KeyboardLayout {
    fn key_at(&self, point: &Point) -> Option<&KeyboardKey> {
        if !point.is_finite() {
            return None;
        }

        // Last row whose top edge is at or above the point.
        let row_idx = self.rows.partition_point(|r| r.top <= point.y);
        let row = self.rows.get(row_idx.checked_sub(1)?)?;
        if point.y >= row.bottom {
            return None;
        }

        // Last key in that row whose left edge is at or left of the point.
        let key_idx = row.keys.partition_point(|k| k.region.x <= point.x);
        let key = row.keys.get(key_idx.checked_sub(1)?)?;
        key.contains(point, 0.0).then_some(key)
    }

    fn key(&self, identifier: &str) -> Option<&KeyboardKey> {
        self.keys().find(|k| k.identifier == identifier)
    }

    fn key_count(&self) -> usize {
        self.identifiers.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str, x: f64, y: f64, w: f64, h: f64, row: usize, column: usize) -> KeyboardKey {
        let display = id.chars().next().unwrap_or('?');
        KeyboardKey::new(id, display, KeyRegion::new(x, y, w, h), row, column)
    }

    fn qwerty() -> KeyboardLayout {
        KeyboardLayout::qwerty(Point::new(0.0, 0.0), 40.0, 4.0).unwrap()
    }

    // ── KeyRegion helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_region_right_and_bottom() {
        let region = KeyRegion::new(10.0, 20.0, 40.0, 30.0);
        assert_eq!(region.right(), 50.0);
        assert_eq!(region.bottom(), 50.0);
    }

    #[test]
    fn test_region_contains_is_half_open() {
        let region = KeyRegion::new(0.0, 0.0, 10.0, 10.0);
        assert!(region.contains(&Point::new(0.0, 0.0), 0.0));
        assert!(!region.contains(&Point::new(10.0, 5.0), 0.0));
        assert!(!region.contains(&Point::new(5.0, 10.0), 0.0));
    }

    #[test]
    fn test_region_contains_with_margin_grows_every_side() {
        let region = KeyRegion::new(0.0, 0.0, 10.0, 10.0);
        assert!(region.contains(&Point::new(-1.5, 5.0), 2.0));
        assert!(region.contains(&Point::new(11.5, 5.0), 2.0));
        assert!(region.contains(&Point::new(5.0, -2.0), 2.0));
        assert!(!region.contains(&Point::new(5.0, 12.5), 2.0));
    }

    #[test]
    fn test_region_does_not_overlap_when_adjacent() {
        let a = KeyRegion::new(0.0, 0.0, 10.0, 10.0);
        let b = KeyRegion::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    // ── add_key ───────────────────────────────────────────────────────────────

    #[test]
    fn test_add_key_rejects_overlap() {
        let mut layout = KeyboardLayout::new();
        layout.add_key(key("a", 0.0, 0.0, 10.0, 10.0, 0, 0)).unwrap();
        let result = layout.add_key(key("b", 5.0, 0.0, 10.0, 10.0, 0, 1));
        assert_eq!(result, Err(LayoutError::Overlap("b".into(), "a".into())));
    }

    #[test]
    fn test_add_key_rejects_duplicate_identifier() {
        let mut layout = KeyboardLayout::new();
        layout.add_key(key("a", 0.0, 0.0, 10.0, 10.0, 0, 0)).unwrap();
        let result = layout.add_key(key("a", 20.0, 0.0, 10.0, 10.0, 0, 1));
        assert_eq!(result, Err(LayoutError::DuplicateKey("a".into())));
    }

    #[test]
    fn test_add_key_rejects_degenerate_region() {
        let mut layout = KeyboardLayout::new();
        let result = layout.add_key(key("a", 0.0, 0.0, 0.0, 10.0, 0, 0));
        assert_eq!(result, Err(LayoutError::InvalidRegion("a".into())));
    }

    #[test]
    fn test_add_key_rejects_row_band_overlap() {
        let mut layout = KeyboardLayout::new();
        layout.add_key(key("a", 0.0, 0.0, 10.0, 10.0, 0, 0)).unwrap();
        // Different row, no key overlap, but vertically inside row 0's band.
        let result = layout.add_key(key("b", 50.0, 5.0, 10.0, 10.0, 1, 0));
        assert_eq!(result, Err(LayoutError::RowBandOverlap(1)));
    }

    #[test]
    fn test_add_key_out_of_order_still_resolves() {
        let mut layout = KeyboardLayout::new();
        layout.add_key(key("c", 40.0, 20.0, 10.0, 10.0, 1, 1)).unwrap();
        layout.add_key(key("b", 20.0, 20.0, 10.0, 10.0, 1, 0)).unwrap();
        layout.add_key(key("a", 0.0, 0.0, 10.0, 10.0, 0, 0)).unwrap();

        assert_eq!(layout.key_at(&Point::new(5.0, 5.0)).unwrap().identifier(), "a");
        assert_eq!(layout.key_at(&Point::new(25.0, 25.0)).unwrap().identifier(), "b");
        assert_eq!(layout.key_at(&Point::new(45.0, 25.0)).unwrap().identifier(), "c");
        assert_eq!(layout.key_count(), 3);
    }

    // ── key_at ────────────────────────────────────────────────────────────────

    #[test]
    fn test_key_at_resolves_qwerty_keys() {
        let layout = qwerty();
        assert_eq!(layout.key_at(&Point::new(20.0, 20.0)).unwrap().identifier(), "q");
        assert_eq!(layout.key_at(&Point::new(64.0, 20.0)).unwrap().identifier(), "w");
        // Row 1 starts a quarter pitch (11 units) to the right.
        assert_eq!(layout.key_at(&Point::new(31.0, 64.0)).unwrap().identifier(), "a");
    }

    #[test]
    fn test_key_at_returns_none_in_gap_between_keys() {
        let layout = qwerty();
        // q spans x 0..40, w starts at 44.
        assert!(layout.key_at(&Point::new(42.0, 20.0)).is_none());
    }

    #[test]
    fn test_key_at_returns_none_outside_keyboard() {
        let layout = qwerty();
        assert!(layout.key_at(&Point::new(-10.0, 20.0)).is_none());
        assert!(layout.key_at(&Point::new(20.0, -10.0)).is_none());
        assert!(layout.key_at(&Point::new(20.0, 1000.0)).is_none());
        assert!(layout.key_at(&Point::new(1000.0, 20.0)).is_none());
    }

    #[test]
    fn test_key_at_returns_none_for_non_finite_point() {
        let layout = qwerty();
        assert!(layout.key_at(&Point::new(f64::NAN, 20.0)).is_none());
    }

    #[test]
    fn test_key_at_resolves_space_bar() {
        let layout = qwerty();
        let space = layout.key("space").unwrap();
        let hit = layout.key_at(&space.region().center()).unwrap();
        assert_eq!(hit.identifier(), "space");
        assert_eq!(hit.display(), ' ');
    }

    #[test]
    fn test_every_qwerty_key_resolves_at_its_center() {
        let layout = qwerty();
        assert_eq!(layout.key_count(), 27);
        for k in layout.keys() {
            let hit = layout.key_at(&k.region().center()).unwrap();
            assert!(hit.same_key(k), "{} resolved to {}", k.identifier(), hit.identifier());
        }
    }

    #[test]
    fn test_key_at_with_margin_snaps_to_nearest_key_in_gap() {
        let layout = qwerty();
        // 1 unit right of q's edge, 3 units left of w.
        let hit = layout.key_at_with_margin(&Point::new(41.0, 20.0), 2.0).unwrap();
        assert_eq!(hit.identifier(), "q");
    }

    #[test]
    fn test_qwerty_rejects_negative_gap() {
        assert!(KeyboardLayout::qwerty(Point::new(0.0, 0.0), 40.0, -1.0).is_err());
    }

    #[test]
    fn test_bounds_cover_all_keys() {
        let layout = qwerty();
        let bounds = layout.bounds().unwrap();
        for k in layout.keys() {
            assert!(bounds.contains(&k.region().center(), 0.0));
        }
        assert!(KeyboardLayout::new().bounds().is_none());
    }
}
