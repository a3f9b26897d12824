//! Sparse wide-column wire structures.
//!
//! Two views of the same logical content:
//!
//! - [`Row`]: a fetched row, every cell carrying a concrete timestamp.
//!   Versions are held in ascending timestamp order (newest last), whatever
//!   order they were fetched or inserted in. Stores typically hand versions
//!   back newest first; callers converting from such a source need no
//!   reordering because the map sorts on insertion.
//! - [`RowMutation`]: a not-yet-committed write. Cells keep insertion order
//!   and may leave the timestamp to the store.

use std::collections::BTreeMap;

/// Timestamp a store reads as "newest possible".
pub const LATEST_TIMESTAMP: i64 = i64::MAX;

/// Versions of one column, ascending by timestamp.
pub type Versions = BTreeMap<i64, Vec<u8>>;

/// One `(family, qualifier, timestamp) → value` unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub family: String,
    pub qualifier: String,
    pub timestamp: i64,
    pub value: Vec<u8>,
}

impl Cell {
    pub fn new(
        family: impl Into<String>,
        qualifier: impl Into<String>,
        timestamp: i64,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp,
            value: value.into(),
        }
    }
}

// ============================================================================
// Row
// ============================================================================

/// Row key plus `family → qualifier → timestamp → bytes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    key: Vec<u8>,
    families: BTreeMap<String, BTreeMap<String, Versions>>,
}

impl Row {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            families: BTreeMap::new(),
        }
    }

    /// Build from cells in any order. A repeated coordinate keeps the last value.
    pub fn from_cells(key: impl Into<Vec<u8>>, cells: impl IntoIterator<Item = Cell>) -> Self {
        let mut row = Self::new(key);
        for cell in cells {
            row.put(cell.family, cell.qualifier, cell.timestamp, cell.value);
        }
        row
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Insert or overwrite one version.
    pub fn put(
        &mut self,
        family: impl Into<String>,
        qualifier: impl Into<String>,
        timestamp: i64,
        value: impl Into<Vec<u8>>,
    ) {
        self.families
            .entry(family.into())
            .or_default()
            .entry(qualifier.into())
            .or_default()
            .insert(timestamp, value.into());
    }

    pub fn with_cell(
        mut self,
        family: impl Into<String>,
        qualifier: impl Into<String>,
        timestamp: i64,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.put(family, qualifier, timestamp, value);
        self
    }

    pub fn versions(&self, family: &str, qualifier: &str) -> Option<&Versions> {
        self.families.get(family)?.get(qualifier)
    }

    /// The version with the greatest timestamp.
    pub fn latest(&self, family: &str, qualifier: &str) -> Option<(i64, &[u8])> {
        self.versions(family, qualifier)?
            .iter()
            .next_back()
            .map(|(ts, value)| (*ts, value.as_slice()))
    }

    pub fn contains(&self, family: &str, qualifier: &str) -> bool {
        self.versions(family, qualifier)
            .map_or(false, |versions| !versions.is_empty())
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    /// Every cell, ordered by family, qualifier, then ascending timestamp.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.families.iter().flat_map(|(family, qualifiers)| {
            qualifiers.iter().flat_map(move |(qualifier, versions)| {
                versions
                    .iter()
                    .map(move |(ts, value)| Cell::new(family.as_str(), qualifier.as_str(), *ts, value.clone()))
            })
        })
    }

    /// Number of cells (all versions of all columns).
    pub fn len(&self) -> usize {
        self.families
            .values()
            .flat_map(|qualifiers| qualifiers.values())
            .map(|versions| versions.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only the newest `max_versions` versions of every column.
    ///
    /// This is what a read with a version limit returns; the mapper itself
    /// never drops versions.
    pub fn limit_versions(&self, max_versions: usize) -> Row {
        let mut limited = Row::new(self.key.clone());
        for (family, qualifiers) in &self.families {
            for (qualifier, versions) in qualifiers {
                for (ts, value) in versions.iter().rev().take(max_versions) {
                    limited.put(family.as_str(), qualifier.as_str(), *ts, value.clone());
                }
            }
        }
        limited
    }
}

// ============================================================================
// RowMutation
// ============================================================================

/// A cell waiting to be written; `None` lets the store pick the timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCell {
    pub family: String,
    pub qualifier: String,
    pub timestamp: Option<i64>,
    pub value: Vec<u8>,
}

/// An uncommitted write of one row, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMutation {
    key: Vec<u8>,
    cells: Vec<PendingCell>,
}

impl RowMutation {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            cells: Vec::new(),
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn add(
        &mut self,
        family: impl Into<String>,
        qualifier: impl Into<String>,
        timestamp: Option<i64>,
        value: impl Into<Vec<u8>>,
    ) {
        self.cells.push(PendingCell {
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp,
            value: value.into(),
        });
    }

    pub fn with_cell(
        mut self,
        family: impl Into<String>,
        qualifier: impl Into<String>,
        timestamp: Option<i64>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.add(family, qualifier, timestamp, value);
        self
    }

    pub fn cells(&self) -> &[PendingCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The row a store would hold after applying this mutation at `now`.
    ///
    /// Unstamped cells take `now`. Two cells at the same coordinate and
    /// timestamp resolve to the later insertion.
    pub fn commit(&self, now: i64) -> Row {
        self.view_with(now)
    }

    /// The mutation seen as a row, unstamped cells reading as newest.
    pub(crate) fn as_row(&self) -> Row {
        self.view_with(LATEST_TIMESTAMP)
    }

    fn view_with(&self, unstamped: i64) -> Row {
        let mut row = Row::new(self.key.clone());
        for cell in &self.cells {
            row.put(
                cell.family.as_str(),
                cell.qualifier.as_str(),
                cell.timestamp.unwrap_or(unstamped),
                cell.value.clone(),
            );
        }
        row
    }
}
