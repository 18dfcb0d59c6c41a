//! Linear-scan identifier index.

use super::IdentifierIndex;

/// Array of `(id, index)` pairs.
///
/// Every lookup scans the live prefix. Removal moves the last pair into the
/// hole so the live pairs stay contiguous.
#[derive(Debug, Default)]
pub struct LinearIndex {
    entries: Vec<(Box<str>, usize)>,
}

impl LinearIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn position_of_id(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(entry, _)| &**entry == id)
    }

    fn position_of_index(&self, index: usize) -> Option<usize> {
        self.entries.iter().position(|&(_, entry)| entry == index)
    }
}

impl IdentifierIndex for LinearIndex {
    fn index_of(&self, id: &str) -> Option<usize> {
        self.position_of_id(id).map(|p| self.entries[p].1)
    }

    fn set_index(&mut self, id: &str, index: usize) {
        if let Some(owner) = self.position_of_index(index) {
            if &*self.entries[owner].0 == id {
                return;
            }
            self.entries.swap_remove(owner);
        }

        match self.position_of_id(id) {
            Some(p) => self.entries[p].1 = index,
            None => self.entries.push((id.into(), index)),
        }
    }

    fn update_index(&mut self, old_index: usize, new_index: usize) {
        if old_index == new_index || self.position_of_index(old_index).is_none() {
            return;
        }
        self.remove_index(new_index);
        if let Some(p) = self.position_of_index(old_index) {
            self.entries[p].1 = new_index;
        }
    }

    fn remove_index(&mut self, index: usize) {
        if let Some(p) = self.position_of_index(index) {
            self.entries.swap_remove(p);
        }
    }

    fn id_at(&self, index: usize) -> Option<&str> {
        self.position_of_index(index).map(|p| &*self.entries[p].0)
    }

    fn each_id(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.entries.iter().map(|(id, _)| &**id))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
