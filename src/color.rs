//! Desired color per hardware slot
//!
//! The store is indexed by slot, not by key or chunk. Unmapped slots stay
//! black for the life of the session.

use crate::error::DriverError;
use crate::topology::Topology;

/// RGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Source of per-key colors, queried by grid position once per tick.
///
/// Returning `None` for a mapped position is a host bug and fails the tick.
pub trait ColorProvider {
    fn color_at(&mut self, column: u16, row: u16) -> Option<Rgb>;
}

impl<F> ColorProvider for F
where
    F: FnMut(u16, u16) -> Option<Rgb>,
{
    fn color_at(&mut self, column: u16, row: u16) -> Option<Rgb> {
        self(column, row)
    }
}

/// Last-known desired color for every slot
#[derive(Debug, Clone)]
pub struct ColorStore {
    slots: Vec<Rgb>,
}

impl ColorStore {
    /// All-black store for `slot_count` slots
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![Rgb::BLACK; slot_count],
        }
    }

    /// Pull the current color of every mapped key from the host.
    ///
    /// All colors are fetched before any slot is written, so a missing color
    /// leaves the store as it was. Returns the number of slots that changed.
    pub fn update<P>(&mut self, topology: &Topology, provider: &mut P) -> Result<usize, DriverError>
    where
        P: ColorProvider + ?Sized,
    {
        let mut fetched = Vec::with_capacity(topology.len());
        for key in topology.keys() {
            let color = provider
                .color_at(key.column, key.row)
                .ok_or_else(|| DriverError::MissingColor {
                    key: key.name.clone(),
                    column: key.column,
                    row: key.row,
                })?;
            fetched.push((key.slot, color));
        }

        let mut changed = 0;
        for (slot, color) in fetched {
            // Slot range was validated when the session was built
            if let Some(current) = self.slots.get_mut(slot) {
                if *current != color {
                    *current = color;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// Slot-indexed colors, for encoding
    pub fn snapshot(&self) -> &[Rgb] {
        &self.slots
    }

    pub fn get(&self, slot: usize) -> Option<Rgb> {
        self.slots.get(slot).copied()
    }

    /// Set every slot to black
    pub fn clear(&mut self) {
        self.slots.fill(Rgb::BLACK);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::KeyMapping;

    fn small_topology() -> Topology {
        Topology::new(vec![
            KeyMapping::new("A", 2, 0, 0),
            KeyMapping::new("B", 5, 1, 0),
        ])
        .unwrap()
    }

    #[test]
    fn test_update_writes_mapped_slots_only() {
        let topo = small_topology();
        let mut store = ColorStore::new(8);
        let mut provider = |col: u16, _row: u16| Some(Rgb::new(10 * (col as u8 + 1), 0, 0));

        let changed = store.update(&topo, &mut provider).unwrap();
        assert_eq!(changed, 2);
        assert_eq!(store.get(2), Some(Rgb::new(10, 0, 0)));
        assert_eq!(store.get(5), Some(Rgb::new(20, 0, 0)));
        for slot in [0, 1, 3, 4, 6, 7] {
            assert_eq!(store.get(slot), Some(Rgb::BLACK));
        }

        // Same colors again: nothing changes
        assert_eq!(store.update(&topo, &mut provider).unwrap(), 0);
    }

    #[test]
    fn test_missing_color_leaves_store_untouched() {
        let topo = small_topology();
        let mut store = ColorStore::new(8);
        let mut provider = |col: u16, _row: u16| (col == 0).then_some(Rgb::new(1, 2, 3));

        let err = store.update(&topo, &mut provider).unwrap_err();
        match err {
            DriverError::MissingColor { key, column, row } => {
                assert_eq!(key, "B");
                assert_eq!((column, row), (1, 0));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.snapshot().iter().all(Rgb::is_black));
    }

    #[test]
    fn test_clear() {
        let topo = small_topology();
        let mut store = ColorStore::new(8);
        store
            .update(&topo, &mut |_: u16, _: u16| Some(Rgb::new(255, 255, 255)))
            .unwrap();
        store.clear();
        assert!(store.snapshot().iter().all(Rgb::is_black));
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn test_rgb_conversions() {
        assert_eq!(Rgb::from((1, 2, 3)), Rgb::new(1, 2, 3));
        assert_eq!(Rgb::from([4, 5, 6]), Rgb::new(4, 5, 6));
        assert!(Rgb::default().is_black());
    }
}
