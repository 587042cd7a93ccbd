//! Numbered map slots and the active map
//!
//! Slot N lives at `maps/map{N}.bin`. Slots that fail to load are simply absent;
//! switching to an absent slot creates an empty map there.

use super::codec::{deserialize_map, serialize_map};
use super::store::MapStore;
use super::MapError;
use crate::settings::Tuning;
use crate::sim::Map;

/// Number of map slots scanned at startup
pub const MAX_MAP_SLOTS: usize = 100;

/// Storage path of a slot
pub fn map_path(slot: usize) -> String {
    format!("maps/map{}.bin", slot)
}

/// All map slots plus the one being played or edited
#[derive(Debug, Clone)]
pub struct MapLibrary {
    /// Inactive maps by slot. The active slot is always `None` here.
    slots: Vec<Option<Map>>,
    active: Map,
    active_index: usize,
}

impl MapLibrary {
    /// Library with a single empty map in slot 0
    pub fn empty(tuning: &Tuning) -> Self {
        let mut active = Map::new();
        active.rebuild(tuning);
        Self {
            slots: vec![None; MAX_MAP_SLOTS],
            active,
            active_index: 0,
        }
    }

    /// Scan every slot in `store`. Unreadable slots are left absent; if nothing
    /// loads, slot 0 gets an empty map.
    pub fn load_maps(store: &impl MapStore, tuning: &Tuning) -> Self {
        let mut slots: Vec<Option<Map>> = vec![None; MAX_MAP_SLOTS];
        let mut loaded = 0;

        for (index, slot) in slots.iter_mut().enumerate() {
            let path = map_path(index);
            let result = store
                .load(&path)
                .map_err(MapError::from)
                .and_then(|bytes| deserialize_map(&bytes));
            match result {
                Ok(map) => {
                    *slot = Some(map);
                    loaded += 1;
                }
                Err(e) => log::debug!("{}: {}", path, e),
            }
        }

        log::info!("Loaded {} maps", loaded);

        let mut active = slots[0].take().unwrap_or_default();
        active.rebuild(tuning);
        Self {
            slots,
            active,
            active_index: 0,
        }
    }

    pub fn current(&self) -> &Map {
        &self.active
    }

    pub fn current_mut(&mut self) -> &mut Map {
        &mut self.active
    }

    pub fn current_index(&self) -> usize {
        self.active_index
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Map in `index`, if that slot is populated
    pub fn slot(&self, index: usize) -> Option<&Map> {
        if index == self.active_index {
            Some(&self.active)
        } else {
            self.slots.get(index).and_then(Option::as_ref)
        }
    }

    /// Number of populated slots, counting the active one
    pub fn populated(&self) -> usize {
        1 + self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Make `index` the active map and rebuild its components
    pub fn change_map(&mut self, index: usize, tuning: &Tuning) -> Result<(), MapError> {
        if index >= self.slots.len() {
            return Err(MapError::SlotOutOfRange {
                index,
                slots: self.slots.len(),
            });
        }

        if index != self.active_index {
            let next = self.slots[index].take().unwrap_or_default();
            let previous = std::mem::replace(&mut self.active, next);
            self.slots[self.active_index] = Some(previous);
            self.active_index = index;
        }

        self.active.rebuild(tuning);
        log::info!("Switched to map {}", index);
        Ok(())
    }

    /// Advance to the following slot, wrapping at the end
    pub fn next_map(&mut self, tuning: &Tuning) -> Result<(), MapError> {
        let next = (self.active_index + 1) % self.slots.len();
        self.change_map(next, tuning)
    }

    /// Step back to the previous slot, wrapping at the start
    pub fn prev_map(&mut self, tuning: &Tuning) -> Result<(), MapError> {
        let prev = self
            .active_index
            .checked_sub(1)
            .unwrap_or(self.slots.len() - 1);
        self.change_map(prev, tuning)
    }

    /// Write the active map to its slot
    pub fn save_current(&self, store: &mut impl MapStore) -> Result<(), MapError> {
        let path = map_path(self.active_index);
        store.save(&path, &serialize_map(&self.active))?;
        log::info!("Saved {} ({} elements)", path, self.active.elements.len());
        Ok(())
    }

    /// Replace the active map with its stored version. On failure the map is kept.
    pub fn reload_current(&mut self, store: &impl MapStore, tuning: &Tuning) -> Result<(), MapError> {
        let bytes = store.load(&map_path(self.active_index))?;
        let mut map = deserialize_map(&bytes)?;
        map.rebuild(tuning);
        self.active = map;
        Ok(())
    }
}
