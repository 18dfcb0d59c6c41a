//! Event Sinks
//!
//! Producers never touch the buffers directly. They emit events, and the
//! sinks in this module translate them into pool operations through the
//! identifier indices.
//!
//! # Overview
//!
//! - [`GraphSink`]: topology and attribute changes from the graph source.
//! - [`LayoutSink`]: position updates from the layout engine.
//! - [`StyleResolver`]: the seam to the external stylesheet engine.
//!
//! Both sinks hold a clone of the same [`GraphBuffers`](crate::pool::GraphBuffers)
//! and may run on different threads.

mod event;
mod graph;
mod layout;
mod style;

pub use event::{GraphEvent, GraphEventKind, LayoutEvent};
pub use graph::GraphSink;
pub use layout::LayoutSink;
pub use style::{NoStyles, StyleResolver};
