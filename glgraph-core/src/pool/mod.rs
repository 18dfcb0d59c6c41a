//! Buffer Pool
//!
//! This module owns the native arrays the renderer draws from and keeps
//! them in step with the graph.
//!
//! # Overview
//!
//! - [`BufferPool`]: fixed-capacity parallel arrays (active-index list,
//!   positions, colours, sizes, edge endpoints) addressed by pool index.
//! - [`GraphBuffers`]: a cloneable, lock-protected handle to one pool,
//!   shared by the graph producer, the layout producer and the renderer.
//! - [`attribute`]: coercion of loosely typed attribute payloads into the
//!   shapes the arrays store.
//!
//! # Design Decisions
//!
//! 1. Capacity is fixed at construction. Running out is fatal to ingestion
//!    rather than silently truncating the graph.
//!
//! 2. Removal is O(1): the active range is compacted by swapping the last
//!    live slot into the hole, so the renderer always draws a dense prefix.
//!
//! 3. Attribute data is addressed by pool index and never moves. Only the
//!    active-index list is permuted on removal, so edges that store pool
//!    indices stay valid.

pub mod attribute;
mod buffers;
mod shared;

pub use attribute::{AttributeValue, Axes, NodeAttribute};
pub use buffers::BufferPool;
pub use shared::GraphBuffers;
