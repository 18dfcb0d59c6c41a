//! Viewer Run Loop
//!
//! Wires a pool, both sinks and the render adapter together and drives
//! them on tokio.
//!
//! # Overview
//!
//! ```text
//!  graph stream ──► GraphSink ──┐
//!                               ├──► GraphBuffers ──► RenderAdapter ──► FrameRenderer
//! layout stream ──► LayoutSink ─┘
//! ```
//!
//! Each stream is drained on its own spawned task. The calling task ticks a
//! frame interval and renders one frame per tick until the shutdown future
//! resolves. Every frame is copied into a [`FrameSnapshot`] and drawn after
//! the pool lock is released, so a slow draw never stalls the producers.
//!
//! # Termination
//!
//! - A fatal ingestion error (capacity exhaustion) aborts the layout task
//!   and is returned to the caller.
//! - A panicking producer task surfaces as [`ViewerError::TaskFailed`].
//! - A stream that simply ends is not an error. Rendering continues with
//!   whatever the buffers hold.

use std::future::Future;

use futures_util::{pin_mut, Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::config::ViewerConfig;
use crate::error::{BufferError, ViewerError};
use crate::pool::GraphBuffers;
use crate::render::{FrameObserver, FrameRenderer, FrameSnapshot, FrameStats, RenderAdapter};
use crate::sink::{GraphEvent, GraphSink, LayoutEvent, LayoutSink, StyleResolver};

/// A configured viewer, ready to run.
pub struct Viewer {
    config: ViewerConfig,
    buffers: GraphBuffers,
    graph: GraphSink,
    layout: LayoutSink,
    adapter: RenderAdapter,
}

impl Viewer {
    /// Build the pool, both sinks and the render adapter from `config`.
    pub fn new(config: ViewerConfig, resolver: Box<dyn StyleResolver>) -> Self {
        let buffers = GraphBuffers::new(&config);
        Self {
            graph: GraphSink::new(buffers.clone(), resolver),
            layout: LayoutSink::new(buffers.clone()),
            adapter: RenderAdapter::new(buffers.clone(), config.stats_window()),
            buffers,
            config,
        }
    }

    /// Replace the default tracing observer.
    pub fn with_observer(mut self, observer: Box<dyn FrameObserver>) -> Self {
        self.adapter =
            RenderAdapter::with_observer(self.buffers.clone(), self.config.stats_window(), observer);
        self
    }

    /// Configuration the viewer was built with.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Shared handle to the buffers, e.g. for a renderer living elsewhere.
    pub fn buffers(&self) -> &GraphBuffers {
        &self.buffers
    }

    /// Run until `shutdown` resolves or ingestion fails.
    ///
    /// Returns the statistics of the last rendered frame.
    pub async fn run<G, L, R, S>(
        self,
        graph_events: G,
        layout_events: L,
        renderer: &mut R,
        shutdown: S,
    ) -> Result<FrameStats, ViewerError>
    where
        G: Stream<Item = GraphEvent> + Send + 'static,
        L: Stream<Item = LayoutEvent> + Send + 'static,
        R: FrameRenderer + ?Sized,
        S: Future<Output = ()>,
    {
        let Viewer {
            config,
            graph,
            layout,
            mut adapter,
            ..
        } = self;

        info!(
            max_nodes = config.max_nodes,
            max_edges = config.max_edges,
            frame_rate = config.frame_rate,
            "viewer starting"
        );

        let mut graph_task = spawn_graph(graph, graph_events);
        let mut layout_task = spawn_layout(layout, layout_events);
        let mut graph_running = true;
        let mut layout_running = true;

        let mut snapshot = FrameSnapshot::new();
        let mut ticker = tokio::time::interval(config.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        pin_mut!(shutdown);

        let outcome = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("shutdown requested");
                    break Ok(());
                }
                joined = &mut graph_task, if graph_running => {
                    graph_running = false;
                    match joined {
                        Ok(Ok(())) => debug!("graph stream ended"),
                        Ok(Err(err)) => {
                            error!(error = %err, "graph ingestion stopped");
                            break Err(ViewerError::Buffer(err));
                        }
                        Err(err) => break Err(ViewerError::TaskFailed(err.to_string())),
                    }
                }
                joined = &mut layout_task, if layout_running => {
                    layout_running = false;
                    match joined {
                        Ok(()) => debug!("layout stream ended"),
                        Err(err) => break Err(ViewerError::TaskFailed(err.to_string())),
                    }
                }
                _ = ticker.tick() => {
                    adapter.snapshot(&mut snapshot);
                    renderer.draw(&snapshot.view());
                }
            }
        };

        graph_task.abort();
        layout_task.abort();

        let stats = adapter.stats();
        info!(frames = stats.frames, "viewer stopped");
        outcome.map(|()| stats)
    }
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("config", &self.config)
            .field("buffers", &self.buffers)
            .finish_non_exhaustive()
    }
}

fn spawn_graph<G>(mut sink: GraphSink, events: G) -> JoinHandle<Result<(), BufferError>>
where
    G: Stream<Item = GraphEvent> + Send + 'static,
{
    tokio::spawn(async move {
        pin_mut!(events);
        while let Some(event) = events.next().await {
            sink.apply(&event)?;
        }
        Ok(())
    })
}

fn spawn_layout<L>(mut sink: LayoutSink, events: L) -> JoinHandle<()>
where
    L: Stream<Item = LayoutEvent> + Send + 'static,
{
    tokio::spawn(async move {
        pin_mut!(events);
        while let Some(event) = events.next().await {
            sink.apply(&event);
        }
    })
}
