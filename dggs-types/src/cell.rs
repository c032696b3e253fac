use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarsest supported grid resolution.
pub const MIN_RESOLUTION: u8 = 1;

/// Finest supported grid resolution.
pub const MAX_RESOLUTION: u8 = 12;

/// Identifier of one grid cell at one resolution.
///
/// The cell id is a prefix code: the id at resolution `r` is a prefix of the
/// id produced for the same coordinate at resolution `r + 1`, so ancestry is a
/// string prefix test.
///
/// # Examples
///
/// ```
/// use dggs_types::cell::CellKey;
///
/// let fine = CellKey::new(5, "u4pru");
/// let coarse = fine.parent().unwrap();
///
/// assert_eq!(coarse, CellKey::new(4, "u4pr"));
/// assert!(coarse.is_ancestor_of(&fine));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub resolution: u8,
    pub cell_id: String,
}

impl CellKey {
    pub fn new(resolution: u8, cell_id: impl Into<String>) -> Self {
        Self {
            resolution,
            cell_id: cell_id.into(),
        }
    }

    /// The enclosing cell one resolution coarser, or `None` at resolution 1.
    pub fn parent(&self) -> Option<CellKey> {
        if self.resolution <= MIN_RESOLUTION || self.cell_id.is_empty() {
            return None;
        }
        let mut id = self.cell_id.clone();
        id.pop();
        Some(CellKey::new(self.resolution - 1, id))
    }

    /// True when `other` lies strictly inside this cell at a finer resolution.
    pub fn is_ancestor_of(&self, other: &CellKey) -> bool {
        self.resolution < other.resolution && other.cell_id.starts_with(&self.cell_id)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.cell_id, self.resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_chain_reaches_root() {
        let mut key = CellKey::new(3, "gcp");
        let mut seen = vec![key.clone()];
        while let Some(parent) = key.parent() {
            seen.push(parent.clone());
            key = parent;
        }
        assert_eq!(
            seen,
            vec![
                CellKey::new(3, "gcp"),
                CellKey::new(2, "gc"),
                CellKey::new(1, "g")
            ]
        );
    }

    #[test]
    fn test_ancestor_is_strict() {
        let cell = CellKey::new(2, "gc");
        assert!(!cell.is_ancestor_of(&cell));
        assert!(!cell.is_ancestor_of(&CellKey::new(3, "gbp")));
        assert!(cell.is_ancestor_of(&CellKey::new(7, "gcpvj0d")));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellKey::new(2, "gc").to_string(), "gc@2");
    }
}
