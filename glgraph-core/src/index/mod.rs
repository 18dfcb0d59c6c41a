//! Identifier Index
//!
//! Producers talk about nodes and edges by opaque string identifiers, while
//! the buffers are addressed by small dense integers. An identifier index is
//! the bidirectional mapping between the two.
//!
//! # Overview
//!
//! - Forward: identifier → index, used by every event that names an entity.
//! - Reverse: index → identifier, used when compaction moves the entity at
//!   one index to another.
//!
//! Every mapped index has exactly one identifier and vice versa. The mapping
//! for an index is cleared before the index is handed out again.
//!
//! # Implementations
//!
//! - [`HashedIndex`]: hash map forward, array reverse. The default.
//! - [`LinearIndex`]: a single array of `(id, index)` pairs scanned
//!   linearly. Useful when storage has to stay array-only; lookups are O(n).
//!
//! Neither implementation locks internally. The pool owning the index holds
//! the lock that serialises read-modify-write sequences.

mod hashed;
mod linear;

pub use hashed::HashedIndex;
pub use linear::LinearIndex;

use crate::config::IndexKind;

/// Bidirectional mapping between identifiers and dense indices.
pub trait IdentifierIndex: Send {
    /// Look up the index currently owned by `id`.
    fn index_of(&self, id: &str) -> Option<usize>;

    /// Map `id` to `index`, replacing whatever either side was mapped to.
    fn set_index(&mut self, id: &str, index: usize);

    /// Move the identifier owning `old_index` to `new_index`.
    ///
    /// Whatever owned `new_index` before is dropped. No-op if nothing owns
    /// `old_index`.
    fn update_index(&mut self, old_index: usize, new_index: usize);

    /// Forget the identifier owning `index`. No-op if none.
    fn remove_index(&mut self, index: usize);

    /// Reverse lookup.
    fn id_at(&self, index: usize) -> Option<&str>;

    /// All mapped identifiers, in no particular order.
    fn each_id(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Number of mapped identifiers.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every mapping.
    fn clear(&mut self);
}

/// Build the index implementation selected by configuration.
pub fn new_index(kind: IndexKind, capacity: usize) -> Box<dyn IdentifierIndex> {
    match kind {
        IndexKind::Hashed => Box::new(HashedIndex::with_capacity(capacity)),
        IndexKind::Linear => Box::new(LinearIndex::with_capacity(capacity)),
    }
}
