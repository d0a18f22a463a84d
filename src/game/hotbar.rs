use log::debug;

use crate::error::{GameError, GameResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSlot {
    pub name: String,
    pub count: u32,
}

/// Inventory of gate items, slots kept in the order they first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hotbar {
    slots: Vec<ItemSlot>,
}

impl Hotbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[ItemSlot] {
        &self.slots
    }

    pub fn count(&self, name: &str) -> u32 {
        self.slots
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    /// Adds `count` items to an existing slot or opens a new one at the end.
    pub fn add_item(&mut self, name: &str, count: u32) {
        match self.slots.iter_mut().find(|s| s.name == name) {
            Some(slot) => slot.count += count,
            None => self.slots.push(ItemSlot {
                name: name.to_string(),
                count,
            }),
        }
        debug!("hotbar: {} x{}", name, self.count(name));
    }

    /// Takes one item; the slot disappears when it runs out.
    pub fn remove_one(&mut self, name: &str) -> GameResult<()> {
        let pos = self
            .slots
            .iter()
            .position(|s| s.name == name && s.count > 0)
            .ok_or_else(|| GameError::GateUnavailable(name.to_string()))?;
        self.slots[pos].count -= 1;
        if self.slots[pos].count == 0 {
            self.slots.remove(pos);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_stack() {
        let mut hotbar = Hotbar::new();
        hotbar.add_item("X", 2);
        hotbar.add_item("H", 1);
        hotbar.add_item("X", 1);
        assert_eq!(hotbar.count("X"), 3);
        assert_eq!(hotbar.slots()[0].name, "X");
        assert_eq!(hotbar.slots()[1].name, "H");
    }

    #[test]
    fn test_remove_drops_empty_slot() {
        let mut hotbar = Hotbar::new();
        hotbar.add_item("X", 1);
        hotbar.add_item("H", 2);
        hotbar.remove_one("X").unwrap();
        assert_eq!(hotbar.count("X"), 0);
        assert_eq!(hotbar.slots().len(), 1);
        assert_eq!(hotbar.slots()[0].name, "H");

        assert!(matches!(hotbar.remove_one("X"), Err(GameError::GateUnavailable(_))));
        hotbar.remove_one("H").unwrap();
        assert_eq!(hotbar.count("H"), 1);
    }
}
