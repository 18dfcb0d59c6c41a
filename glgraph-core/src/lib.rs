//! GLGraph Core
//!
//! This crate keeps a dynamic graph in GPU-ready buffers. It implements:
//!
//! - A fixed-capacity buffer pool with dense node and edge slots
//! - Identifier indices mapping external string ids to slots
//! - Event sinks for graph mutations and layout updates
//! - A render adapter handing zero-copy views to a draw path
//! - A tokio run loop tying producers and the frame driver together
//!
//! # Architecture
//!
//! - `pool`: the buffer pool and its shared handle
//! - `index`: identifier → slot lookup
//! - `sink`: graph and layout event ingestion
//! - `render`: frame views and frame statistics
//! - `viewer`: the async run loop
//! - `config`, `error`: ambient configuration and error types
//!
//! # Example
//!
//! ```rust
//! use glgraph_core::{GraphBuffers, GraphEvent, GraphEventKind, GraphSink, NoStyles, ViewerConfig};
//!
//! let buffers = GraphBuffers::new(&ViewerConfig::default());
//! let mut sink = GraphSink::new(buffers.clone(), Box::new(NoStyles));
//!
//! sink.apply(&GraphEvent::new("src", 1, GraphEventKind::node_added("a"))).unwrap();
//! sink.apply(&GraphEvent::new(
//!     "src",
//!     2,
//!     GraphEventKind::node_attribute("a", "xyz", [1.0f32, 2.0, 3.0]),
//! ))
//! .unwrap();
//!
//! assert_eq!(buffers.read(|pool| pool.position_of("a")), Some([1.0, 2.0, 3.0]));
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod pool;
pub mod render;
pub mod sink;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::{BufferError, EntityKind, Result, ViewerError};
pub use pool::{BufferPool, GraphBuffers};
pub use render::{FrameRenderer, FrameSnapshot, FrameStats, FrameView, RenderAdapter};
pub use sink::{GraphEvent, GraphEventKind, GraphSink, LayoutEvent, LayoutSink, NoStyles, StyleResolver};
pub use viewer::Viewer;
