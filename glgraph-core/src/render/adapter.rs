use std::time::{Duration, Instant};

use crate::pool::{BufferPool, GraphBuffers};

use super::stats::{FpsCounter, FrameObserver, FrameStats, TracingObserver};

/// Borrowed views over the pool, valid for one draw call.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Pool indices of the active nodes, in slot order.
    pub node_indices: &'a [u32],
    /// Edge endpoints as consecutive `(from, to)` pool indices.
    pub edge_indices: &'a [u32],
    /// `3 * high_water` floats.
    pub positions: &'a [f32],
    pub colors: Option<&'a [f32]>,
    pub sizes: Option<&'a [f32]>,
}

impl<'a> FrameView<'a> {
    /// Borrow the live ranges of every buffer.
    pub fn from_pool(pool: &'a BufferPool) -> Self {
        Self {
            node_indices: pool.active_node_view(),
            edge_indices: pool.active_edge_view(),
            positions: pool.position_view(),
            colors: pool.color_view(),
            sizes: pool.size_view(),
        }
    }

    /// Nodes to draw.
    pub fn node_count(&self) -> usize {
        self.node_indices.len()
    }

    /// Edges to draw, one per endpoint pair.
    pub fn edge_count(&self) -> usize {
        self.edge_indices.len() / 2
    }

    /// Whether `colors` is present.
    pub fn color_enabled(&self) -> bool {
        self.colors.is_some()
    }

    /// Whether `sizes` is present.
    pub fn size_enabled(&self) -> bool {
        self.sizes.is_some()
    }

    /// Floats per position in `positions`.
    pub fn vertex_components(&self) -> usize {
        3
    }

    /// Floats per colour in `colors`.
    pub fn color_components(&self) -> usize {
        4
    }
}

/// Owned copy of a frame. The vectors keep their allocation between
/// refreshes.
#[derive(Debug, Clone, Default)]
pub struct FrameSnapshot {
    node_indices: Vec<u32>,
    edge_indices: Vec<u32>,
    positions: Vec<f32>,
    colors: Option<Vec<f32>>,
    sizes: Option<Vec<f32>>,
}

impl FrameSnapshot {
    /// An empty snapshot. Buffers grow on the first refresh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite this snapshot with `frame`, reusing allocations.
    pub fn refresh_from(&mut self, frame: &FrameView<'_>) {
        copy_into(&mut self.node_indices, frame.node_indices);
        copy_into(&mut self.edge_indices, frame.edge_indices);
        copy_into(&mut self.positions, frame.positions);
        refresh_optional(&mut self.colors, frame.colors);
        refresh_optional(&mut self.sizes, frame.sizes);
    }

    /// Borrow the snapshot as a frame.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            node_indices: &self.node_indices,
            edge_indices: &self.edge_indices,
            positions: &self.positions,
            colors: self.colors.as_deref(),
            sizes: self.sizes.as_deref(),
        }
    }
}

fn copy_into<T: Copy>(dst: &mut Vec<T>, src: &[T]) {
    dst.clear();
    dst.extend_from_slice(src);
}

fn refresh_optional(dst: &mut Option<Vec<f32>>, src: Option<&[f32]>) {
    match src {
        Some(src) => copy_into(dst.get_or_insert_with(Vec::new), src),
        None => *dst = None,
    }
}

/// The GPU draw path.
pub trait FrameRenderer {
    fn draw(&mut self, frame: &FrameView<'_>);
}

impl<F> FrameRenderer for F
where
    F: FnMut(&FrameView<'_>),
{
    fn draw(&mut self, frame: &FrameView<'_>) {
        self(frame)
    }
}

/// Hands pool views to a renderer once per frame and keeps the frame
/// statistics.
pub struct RenderAdapter {
    buffers: GraphBuffers,
    observer: Box<dyn FrameObserver>,
    counter: FpsCounter,
    last: FrameStats,
}

impl RenderAdapter {
    /// Adapter reporting frame statistics through `tracing`.
    pub fn new(buffers: GraphBuffers, window: Duration) -> Self {
        Self::with_observer(buffers, window, Box::new(TracingObserver))
    }

    /// Adapter reporting to a custom observer.
    pub fn with_observer(
        buffers: GraphBuffers,
        window: Duration,
        observer: Box<dyn FrameObserver>,
    ) -> Self {
        Self {
            buffers,
            observer,
            counter: FpsCounter::new(window, Instant::now()),
            last: FrameStats::default(),
        }
    }

    /// Draw one frame. The pool stays locked while `renderer` runs, so
    /// producers wait for the draw call to return.
    pub fn render<R>(&mut self, renderer: &mut R) -> FrameStats
    where
        R: FrameRenderer + ?Sized,
    {
        let (nodes, edges) = {
            let pool = self.buffers.lock();
            let frame = FrameView::from_pool(&pool);
            renderer.draw(&frame);
            (frame.node_count(), frame.edge_count())
        };
        self.record(nodes, edges)
    }

    /// Copy the current frame into `snapshot` and release the lock.
    pub fn snapshot(&mut self, snapshot: &mut FrameSnapshot) -> FrameStats {
        let (nodes, edges) = {
            let pool = self.buffers.lock();
            let frame = FrameView::from_pool(&pool);
            snapshot.refresh_from(&frame);
            (frame.node_count(), frame.edge_count())
        };
        self.record(nodes, edges)
    }

    /// Statistics of the last recorded frame.
    pub fn stats(&self) -> FrameStats {
        self.last
    }

    fn record(&mut self, nodes: usize, edges: usize) -> FrameStats {
        let closed = self.counter.tick(Instant::now());
        self.last = FrameStats {
            frames: self.counter.total_frames(),
            fps: self.counter.fps(),
            nodes,
            edges,
        };

        self.observer.frame_rendered(&self.last);
        if closed {
            self.observer.window_closed(&self.last);
        }
        self.last
    }
}

impl std::fmt::Debug for RenderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderAdapter")
            .field("buffers", &self.buffers)
            .field("counter", &self.counter)
            .field("last", &self.last)
            .finish()
    }
}
