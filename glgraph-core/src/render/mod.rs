//! Render Adapter
//!
//! The seam between the buffer pool and a GPU draw path.
//!
//! # Overview
//!
//! A [`FrameRenderer`] receives a [`FrameView`] once per frame: the active
//! node indices, the edge endpoint pairs, and the position, colour and size
//! arrays exactly as the pool stores them. Positions are laid out as three
//! floats per node and colours as four, indexed by pool index, so the views
//! can be uploaded as-is.
//!
//! # Design Decisions
//!
//! - [`RenderAdapter::render`] draws while the pool lock is held. Nothing is
//!   copied, and producers block for the duration of the draw call.
//! - [`RenderAdapter::snapshot`] copies into a reusable [`FrameSnapshot`]
//!   for draw paths that should not block producers. The viewer run loop
//!   always draws this way.
//! - Frame statistics are owned by the adapter. There is no global counter.

mod adapter;
mod stats;

pub use adapter::{FrameRenderer, FrameSnapshot, FrameView, RenderAdapter};
pub use stats::{FpsCounter, FrameObserver, FrameStats, TracingObserver};
