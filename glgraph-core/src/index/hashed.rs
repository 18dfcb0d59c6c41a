//! Hash-based identifier index.

use std::sync::Arc;

use indexmap::IndexMap;

use super::IdentifierIndex;

/// Forward hash map plus a reverse array sized to the pool capacity.
///
/// The forward map is an `IndexMap`, so `each_id` walks identifiers in a
/// stable order and removal stays O(1) through `swap_remove`.
#[derive(Debug, Default)]
pub struct HashedIndex {
    forward: IndexMap<Arc<str>, usize>,
    reverse: Vec<Option<Arc<str>>>,
}

impl HashedIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            forward: IndexMap::with_capacity(capacity),
            reverse: vec![None; capacity],
        }
    }

    fn reverse_slot(&mut self, index: usize) -> &mut Option<Arc<str>> {
        if index >= self.reverse.len() {
            self.reverse.resize(index + 1, None);
        }
        &mut self.reverse[index]
    }
}

impl IdentifierIndex for HashedIndex {
    fn index_of(&self, id: &str) -> Option<usize> {
        self.forward.get(id).copied()
    }

    fn set_index(&mut self, id: &str, index: usize) {
        if let Some(previous) = self.forward.get(id).copied() {
            if previous == index {
                return;
            }
            self.reverse[previous] = None;
        }

        let id: Arc<str> = Arc::from(id);
        if let Some(owner) = self.reverse_slot(index).replace(Arc::clone(&id)) {
            self.forward.swap_remove(&owner);
        }
        self.forward.insert(id, index);
    }

    fn update_index(&mut self, old_index: usize, new_index: usize) {
        if old_index == new_index {
            return;
        }
        let Some(id) = self.reverse.get_mut(old_index).and_then(Option::take) else {
            return;
        };

        if let Some(owner) = self.reverse_slot(new_index).replace(Arc::clone(&id)) {
            self.forward.swap_remove(&owner);
        }
        self.forward.insert(id, new_index);
    }

    fn remove_index(&mut self, index: usize) {
        if let Some(id) = self.reverse.get_mut(index).and_then(Option::take) {
            self.forward.swap_remove(&id);
        }
    }

    fn id_at(&self, index: usize) -> Option<&str> {
        self.reverse.get(index)?.as_deref()
    }

    fn each_id(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.forward.keys().map(|id| &**id))
    }

    fn len(&self) -> usize {
        self.forward.len()
    }

    fn clear(&mut self) {
        self.forward.clear();
        self.reverse.iter_mut().for_each(|slot| *slot = None);
    }
}
