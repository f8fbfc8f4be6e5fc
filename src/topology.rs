//! Key topology: logical key → hardware slot and host grid position
//!
//! The slot is where the key's LED lives in the controller's lighting memory.
//! The grid position is only used to ask the host for a color and is never
//! written to the device.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One physical key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapping {
    pub name: String,
    pub slot: usize,
    pub column: u16,
    pub row: u16,
}

impl KeyMapping {
    pub fn new(name: impl Into<String>, slot: usize, column: u16, row: u16) -> Self {
        Self {
            name: name.into(),
            slot,
            column,
            row,
        }
    }
}

/// Validated, ordered key table
///
/// Slots, grid positions and names are each unique. Slot range is checked
/// against the memory layout separately (see `MemoryLayout::active_chunks`).
#[derive(Debug, Clone)]
pub struct Topology {
    keys: Vec<KeyMapping>,
}

impl Topology {
    pub fn new(keys: Vec<KeyMapping>) -> Result<Self, ConfigError> {
        let mut slots: HashMap<usize, &str> = HashMap::new();
        let mut positions: HashMap<(u16, u16), &str> = HashMap::new();
        let mut names: HashSet<String> = HashSet::new();

        for key in &keys {
            if let Some(first) = slots.insert(key.slot, &key.name) {
                return Err(ConfigError::DuplicateSlot {
                    slot: key.slot,
                    first: first.to_string(),
                    second: key.name.clone(),
                });
            }
            if let Some(first) = positions.insert((key.column, key.row), &key.name) {
                return Err(ConfigError::DuplicatePosition {
                    column: key.column,
                    row: key.row,
                    first: first.to_string(),
                    second: key.name.clone(),
                });
            }
            if !names.insert(key.name.to_ascii_lowercase()) {
                return Err(ConfigError::DuplicateName(key.name.clone()));
            }
        }

        Ok(Self { keys })
    }

    /// The builtin Onikuma G67 table
    pub fn g67() -> Self {
        Self { keys: g67_keys() }
    }

    pub fn keys(&self) -> &[KeyMapping] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Look up a key by name (case-insensitive)
    pub fn by_name(&self, name: &str) -> Option<&KeyMapping> {
        self.keys.iter().find(|k| k.name.eq_ignore_ascii_case(name))
    }

    /// Highest mapped slot
    pub fn max_slot(&self) -> Option<usize> {
        self.keys.iter().map(|k| k.slot).max()
    }

    /// Grid extent as (columns, rows)
    pub fn grid_size(&self) -> (u16, u16) {
        let cols = self.keys.iter().map(|k| k.column + 1).max().unwrap_or(0);
        let rows = self.keys.iter().map(|k| k.row + 1).max().unwrap_or(0);
        (cols, rows)
    }
}

/// (name, slot, column, row)
const G67_KEYS: &[(&str, usize, u16, u16)] = &[
    // Row 0
    ("Esc", 0, 0, 0),
    ("1", 17, 1, 0),
    ("2", 18, 2, 0),
    ("3", 19, 3, 0),
    ("4", 20, 4, 0),
    ("5", 21, 5, 0),
    ("6", 22, 6, 0),
    ("7", 23, 7, 0),
    ("8", 24, 8, 0),
    ("9", 25, 9, 0),
    ("0", 26, 10, 0),
    ("Minus", 27, 11, 0),
    ("Equals", 28, 12, 0),
    ("Backspace", 92, 14, 0),
    // Row 1
    ("Tab", 32, 0, 1),
    ("Q", 33, 1, 1),
    ("W", 34, 2, 1),
    ("E", 35, 3, 1),
    ("R", 36, 4, 1),
    ("T", 37, 5, 1),
    ("Y", 38, 6, 1),
    ("U", 39, 7, 1),
    ("I", 40, 8, 1),
    ("O", 41, 9, 1),
    ("P", 42, 10, 1),
    ("LBracket", 43, 11, 1),
    ("RBracket", 44, 12, 1),
    // Row 2
    ("CapsLock", 48, 0, 2),
    ("A", 49, 1, 2),
    ("S", 50, 2, 2),
    ("D", 51, 3, 2),
    ("F", 52, 4, 2),
    ("G", 53, 5, 2),
    ("H", 54, 6, 2),
    ("J", 55, 7, 2),
    ("K", 56, 8, 2),
    ("L", 57, 9, 2),
    ("Semicolon", 58, 10, 2),
    ("Quote", 59, 11, 2),
    ("Backslash", 60, 13, 2),
    ("Enter", 76, 14, 2),
    // Row 3
    ("LShift", 64, 0, 3),
    ("Z", 65, 2, 3),
    ("X", 66, 3, 3),
    ("C", 67, 4, 3),
    ("V", 68, 5, 3),
    ("B", 69, 6, 3),
    ("N", 70, 7, 3),
    ("M", 71, 8, 3),
    ("Comma", 72, 9, 3),
    ("Period", 73, 10, 3),
    ("Slash", 74, 11, 3),
    ("RShift", 75, 12, 3),
    ("Up", 90, 14, 3),
    // Row 4
    ("LCtrl", 80, 0, 4),
    ("LWin", 81, 1, 4),
    ("LAlt", 82, 2, 4),
    ("Space", 83, 6, 4),
    ("RAlt", 84, 10, 4),
    ("Fn", 85, 11, 4),
    ("Left", 88, 12, 4),
    ("Down", 89, 13, 4),
    ("Right", 91, 14, 4),
    // Navigation column
    ("Home", 104, 16, 1),
    ("PageUp", 105, 16, 2),
    ("End", 107, 16, 3),
    ("PageDown", 108, 16, 4),
];

fn g67_keys() -> Vec<KeyMapping> {
    G67_KEYS
        .iter()
        .map(|&(name, slot, column, row)| KeyMapping::new(name, slot, column, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let topo = Topology::new(g67_keys()).unwrap();
        assert_eq!(topo.len(), 67);
        assert_eq!(topo.max_slot(), Some(108));
        assert_eq!(topo.grid_size(), (17, 5));
    }

    #[test]
    fn test_by_name_case_insensitive() {
        let topo = Topology::g67();
        let key = topo.by_name("pageup").unwrap();
        assert_eq!(key.slot, 105);
        assert_eq!((key.column, key.row), (16, 2));
        assert!(topo.by_name("F13").is_none());
    }

    #[test]
    fn test_duplicate_slot_rejected() {
        let err = Topology::new(vec![
            KeyMapping::new("A", 3, 0, 0),
            KeyMapping::new("B", 3, 1, 0),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSlot { slot: 3, .. }));
    }

    #[test]
    fn test_duplicate_position_rejected() {
        let err = Topology::new(vec![
            KeyMapping::new("A", 1, 2, 2),
            KeyMapping::new("B", 2, 2, 2),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicatePosition { column: 2, row: 2, .. }
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = Topology::new(vec![
            KeyMapping::new("Esc", 1, 0, 0),
            KeyMapping::new("esc", 2, 1, 0),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(_)));
    }

    #[test]
    fn test_empty_topology() {
        let topo = Topology::new(Vec::new()).unwrap();
        assert!(topo.is_empty());
        assert_eq!(topo.grid_size(), (0, 0));
        assert_eq!(topo.max_slot(), None);
    }
}
