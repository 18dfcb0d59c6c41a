//! Buffer Pool
//!
//! Fixed-capacity parallel arrays mirroring the graph for batched draws.
//!
//! # Layout
//!
//! ```text
//! identifier index       active-index list          attribute arrays
//! "a" -> slot 0   ---->  slots[0] = 2   ---------->  positions[3*2..3*2+3]
//! "c" -> slot 1   ---->  slots[1] = 1                colors[4*2..4*2+4]
//!                        slots[2] = 0   (free)       sizes[2]
//! ```
//!
//! Identifiers map to *slots*, positions in the active-index list. The list
//! maps each slot to a *pool index* into the attribute arrays. Live nodes
//! always occupy slots `0..node_count`, so the list prefix is exactly the
//! index buffer the renderer draws.
//!
//! # Removal
//!
//! Removing the node at slot `s` swaps list entries `s` and `last`, then
//! re-homes the identifier that owned `last` to `s`. Attribute data never
//! moves. The freed pool index lands just past the active range and is the
//! next one handed out.
//!
//! Edges are a single array of `(from, to)` pool index pairs, one pair per
//! edge slot. Edge removal moves the last pair into the hole.

use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::error::{BufferError, EntityKind, Result};
use crate::index::{new_index, IdentifierIndex};

const VERTEX_COMPONENTS: usize = 3;
const COLOR_COMPONENTS: usize = 4;

/// Parallel native buffers for one graph.
pub struct BufferPool {
    /// Node identifier → slot.
    node_ids: Box<dyn IdentifierIndex>,
    /// Edge identifier → edge slot.
    edge_ids: Box<dyn IdentifierIndex>,

    /// Active-index list. Always a permutation of `0..node_capacity`.
    slots: Vec<u32>,
    node_count: usize,
    /// One past the highest pool index ever handed out.
    high_water: usize,

    positions: Vec<f32>,
    /// Empty when per-node colour is disabled.
    colors: Vec<f32>,
    /// Empty when per-node size is disabled.
    sizes: Vec<f32>,

    /// `(from, to)` pool index pairs.
    edges: Vec<u32>,
    edge_count: usize,
    edge_capacity: usize,

    color_enabled: bool,
    size_enabled: bool,
    default_color: [f32; 4],
    default_size: f32,
}

impl BufferPool {
    /// Allocate every buffer up front for the configured capacities.
    pub fn new(config: &ViewerConfig) -> Self {
        let max_nodes = config.max_nodes;
        let max_edges = config.max_edges;
        let color_enabled = config.color_enabled();
        let size_enabled = config.size_enabled();

        let pool = Self {
            node_ids: new_index(config.index, max_nodes),
            edge_ids: new_index(config.index, max_edges),
            slots: (0..max_nodes).map(|i| i as u32).collect(),
            node_count: 0,
            high_water: 0,
            positions: vec![0.0; VERTEX_COMPONENTS * max_nodes],
            colors: if color_enabled {
                vec![0.0; COLOR_COMPONENTS * max_nodes]
            } else {
                Vec::new()
            },
            sizes: if size_enabled { vec![0.0; max_nodes] } else { Vec::new() },
            edges: vec![0; 2 * max_edges],
            edge_count: 0,
            edge_capacity: max_edges,
            color_enabled,
            size_enabled,
            default_color: config.default_color,
            default_size: config.default_size,
        };

        info!(
            bytes = pool.memory_footprint(),
            max_nodes,
            max_edges,
            color_enabled,
            size_enabled,
            "allocated graph buffers"
        );

        pool
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Register a node and return its slot.
    ///
    /// The node starts at the origin with the default colour and size.
    /// Fails with `CapacityExceeded` when every slot is live, leaving the
    /// pool untouched.
    pub fn allocate_node(&mut self, id: &str) -> Result<usize> {
        if let Some(slot) = self.node_ids.index_of(id) {
            warn!(node = id, slot, "node already live, keeping existing slot");
            return Ok(slot);
        }
        if self.node_count >= self.node_capacity() {
            return Err(BufferError::CapacityExceeded {
                kind: EntityKind::Node,
                capacity: self.node_capacity(),
            });
        }

        let slot = self.node_count;
        let pool_index = self.slots[slot] as usize;

        self.node_ids.set_index(id, slot);
        self.node_count += 1;
        self.high_water = self.high_water.max(pool_index + 1);

        self.write_position(pool_index, [0.0; 3]);
        self.write_color(pool_index, self.default_color);
        self.write_size(pool_index, self.default_size);

        Ok(slot)
    }

    /// Remove a node, compacting the active range.
    ///
    /// Edges still attached to the node are removed with it. Returns false
    /// if the identifier is unknown.
    pub fn free_node(&mut self, id: &str) -> bool {
        let Some(slot) = self.node_ids.index_of(id) else {
            return false;
        };
        let pool_index = self.slots[slot];

        let dangling = self.remove_edges_touching(pool_index);
        if dangling > 0 {
            debug!(node = id, edges = dangling, "removed edges attached to node");
        }

        let last = self.node_count - 1;
        self.slots.swap(slot, last);
        self.node_ids.remove_index(slot);
        self.node_ids.update_index(last, slot);
        self.node_count -= 1;

        true
    }

    /// Slot currently owned by a node.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_ids.index_of(id)
    }

    /// Identifier owning a slot.
    pub fn id_at(&self, slot: usize) -> Option<&str> {
        self.node_ids.id_at(slot)
    }

    /// Whether a node with this identifier is live.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.index_of(id).is_some()
    }

    /// Pool index into the attribute arrays for a node.
    pub fn pool_index_of(&self, id: &str) -> Option<usize> {
        self.node_ids.index_of(id).map(|slot| self.slots[slot] as usize)
    }

    /// Live node identifiers, in no particular order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.node_ids.each_id()
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Register an edge between two live nodes and return its slot.
    ///
    /// Returns `Ok(None)` when either endpoint is unknown. In a live stream
    /// an edge can arrive before its endpoints.
    pub fn allocate_edge(&mut self, id: &str, from: &str, to: &str) -> Result<Option<usize>> {
        if let Some(slot) = self.edge_ids.index_of(id) {
            warn!(edge = id, slot, "edge already live, keeping existing slot");
            return Ok(Some(slot));
        }
        if self.edge_count >= self.edge_capacity {
            return Err(BufferError::CapacityExceeded {
                kind: EntityKind::Edge,
                capacity: self.edge_capacity,
            });
        }

        let (Some(a), Some(b)) = (self.pool_index_of(from), self.pool_index_of(to)) else {
            warn!(edge = id, from, to, "edge endpoint not found, edge skipped");
            return Ok(None);
        };

        let slot = self.edge_count;
        self.edges[2 * slot] = a as u32;
        self.edges[2 * slot + 1] = b as u32;
        self.edge_ids.set_index(id, slot);
        self.edge_count += 1;

        Ok(Some(slot))
    }

    /// Remove an edge. Returns false if the identifier is unknown.
    pub fn free_edge(&mut self, id: &str) -> bool {
        match self.edge_ids.index_of(id) {
            Some(slot) => {
                self.remove_edge_slot(slot);
                true
            }
            None => false,
        }
    }

    /// Whether an edge with this identifier is live.
    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_ids.index_of(id).is_some()
    }

    /// Slot currently owned by an edge.
    pub fn edge_index_of(&self, id: &str) -> Option<usize> {
        self.edge_ids.index_of(id)
    }

    /// Pool indices of an edge's endpoints.
    pub fn edge_endpoints(&self, id: &str) -> Option<(u32, u32)> {
        let slot = self.edge_ids.index_of(id)?;
        Some((self.edges[2 * slot], self.edges[2 * slot + 1]))
    }

    fn remove_edge_slot(&mut self, slot: usize) {
        let last = self.edge_count - 1;
        self.edges.copy_within(2 * last..2 * last + 2, 2 * slot);
        self.edge_ids.remove_index(slot);
        self.edge_ids.update_index(last, slot);
        self.edge_count -= 1;
    }

    /// Remove every edge with an endpoint at `pool_index`.
    fn remove_edges_touching(&mut self, pool_index: u32) -> usize {
        let mut removed = 0;
        // Walking backwards, whatever compaction moves into `slot` has
        // already been checked.
        for slot in (0..self.edge_count).rev() {
            if self.edges[2 * slot] == pool_index || self.edges[2 * slot + 1] == pool_index {
                self.remove_edge_slot(slot);
                removed += 1;
            }
        }
        removed
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Write the given axes of a node's position, leaving the others as is.
    pub fn set_position(
        &mut self,
        id: &str,
        x: Option<f32>,
        y: Option<f32>,
        z: Option<f32>,
    ) -> Result<()> {
        let base = VERTEX_COMPONENTS * self.resolve(id)?;
        for (offset, value) in [x, y, z].into_iter().enumerate() {
            if let Some(value) = value {
                self.positions[base + offset] = value;
            }
        }
        Ok(())
    }

    /// Write a full position triple.
    pub fn set_position_xyz(&mut self, id: &str, xyz: [f32; 3]) -> Result<()> {
        let pool_index = self.resolve(id)?;
        self.write_position(pool_index, xyz);
        Ok(())
    }

    /// Write all four colour channels. No-op when per-node colour is off.
    pub fn set_color(&mut self, id: &str, rgba: [f32; 4]) -> Result<()> {
        let pool_index = self.resolve(id)?;
        self.write_color(pool_index, rgba);
        Ok(())
    }

    /// Write a node's size. No-op when per-node size is off.
    pub fn set_size(&mut self, id: &str, size: f32) -> Result<()> {
        let pool_index = self.resolve(id)?;
        self.write_size(pool_index, size);
        Ok(())
    }

    /// A node's position, or `None` if unknown.
    pub fn position_of(&self, id: &str) -> Option<[f32; 3]> {
        let base = VERTEX_COMPONENTS * self.pool_index_of(id)?;
        let p = &self.positions[base..base + VERTEX_COMPONENTS];
        Some([p[0], p[1], p[2]])
    }

    /// A node's colour, or `None` if unknown or per-node colour is off.
    pub fn color_of(&self, id: &str) -> Option<[f32; 4]> {
        if !self.color_enabled {
            return None;
        }
        let base = COLOR_COMPONENTS * self.pool_index_of(id)?;
        let c = &self.colors[base..base + COLOR_COMPONENTS];
        Some([c[0], c[1], c[2], c[3]])
    }

    /// A node's size, or `None` if unknown or per-node size is off.
    pub fn size_of(&self, id: &str) -> Option<f32> {
        if !self.size_enabled {
            return None;
        }
        Some(self.sizes[self.pool_index_of(id)?])
    }

    fn resolve(&self, id: &str) -> Result<usize> {
        self.pool_index_of(id)
            .ok_or_else(|| BufferError::unknown(EntityKind::Node, id))
    }

    fn write_position(&mut self, pool_index: usize, xyz: [f32; 3]) {
        let base = VERTEX_COMPONENTS * pool_index;
        self.positions[base..base + VERTEX_COMPONENTS].copy_from_slice(&xyz);
    }

    fn write_color(&mut self, pool_index: usize, rgba: [f32; 4]) {
        if self.color_enabled {
            let base = COLOR_COMPONENTS * pool_index;
            self.colors[base..base + COLOR_COMPONENTS].copy_from_slice(&rgba);
        }
    }

    fn write_size(&mut self, pool_index: usize, size: f32) {
        if self.size_enabled {
            self.sizes[pool_index] = size;
        }
    }

    // ------------------------------------------------------------------
    // Views and counts
    // ------------------------------------------------------------------

    /// Pool indices of live nodes, one per slot.
    pub fn active_node_view(&self) -> &[u32] {
        &self.slots[..self.node_count]
    }

    /// `(from, to)` pool index pairs of live edges, flattened.
    pub fn active_edge_view(&self) -> &[u32] {
        &self.edges[..2 * self.edge_count]
    }

    /// Interleaved `xyz` up to the high-water mark.
    pub fn position_view(&self) -> &[f32] {
        &self.positions[..VERTEX_COMPONENTS * self.high_water]
    }

    /// Interleaved `rgba` up to the high-water mark.
    pub fn color_view(&self) -> Option<&[f32]> {
        self.color_enabled
            .then(|| &self.colors[..COLOR_COMPONENTS * self.high_water])
    }

    /// Sizes up to the high-water mark, `None` when per-node size is off.
    pub fn size_view(&self) -> Option<&[f32]> {
        self.size_enabled.then(|| &self.sizes[..self.high_water])
    }

    /// Live nodes, which is also the length of the active-index list.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Live edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Configured `max_nodes`.
    pub fn node_capacity(&self) -> usize {
        self.slots.len()
    }

    /// Configured `max_edges`.
    pub fn edge_capacity(&self) -> usize {
        self.edge_capacity
    }

    /// One past the highest pool index ever handed out.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Whether each node carries its own colour.
    pub fn color_enabled(&self) -> bool {
        self.color_enabled
    }

    /// Whether each node carries its own size.
    pub fn size_enabled(&self) -> bool {
        self.size_enabled
    }

    /// Colour written to freshly allocated nodes.
    pub fn default_color(&self) -> [f32; 4] {
        self.default_color
    }

    /// Floats per position. Always 3.
    pub fn vertex_components(&self) -> usize {
        VERTEX_COMPONENTS
    }

    /// Floats per colour. Always 4.
    pub fn color_components(&self) -> usize {
        COLOR_COMPONENTS
    }

    /// Bytes reserved by the native arrays.
    pub fn memory_footprint(&self) -> usize {
        use std::mem::size_of;

        (self.slots.len() + self.edges.len()) * size_of::<u32>()
            + (self.positions.len() + self.colors.len() + self.sizes.len()) * size_of::<f32>()
    }

    /// Drop every node and edge. Capacities are kept.
    pub fn clear(&mut self) {
        self.node_ids.clear();
        self.edge_ids.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            *slot = i as u32;
        }
        self.node_count = 0;
        self.edge_count = 0;
        self.high_water = 0;
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("node_count", &self.node_count)
            .field("node_capacity", &self.node_capacity())
            .field("edge_count", &self.edge_count)
            .field("edge_capacity", &self.edge_capacity)
            .field("high_water", &self.high_water)
            .finish()
    }
}
