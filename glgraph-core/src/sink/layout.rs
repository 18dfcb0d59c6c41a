//! Layout Event Sink
//!
//! The layout engine already produces full `xyz` triples, so positions are
//! written straight into the pool without attribute-name dispatch. Nodes
//! the layout still knows about may have been removed by the graph stream
//! in the meantime; updates for them are skipped.

use tracing::trace;

use super::event::LayoutEvent;
use crate::pool::GraphBuffers;

/// Consumes layout updates.
pub struct LayoutSink {
    buffers: GraphBuffers,
    completion: f32,
}

impl LayoutSink {
    /// Sink writing positions into `buffers`.
    pub fn new(buffers: GraphBuffers) -> Self {
        Self {
            buffers,
            completion: 0.0,
        }
    }

    /// Move one node. Returns false if the node is unknown.
    pub fn node_moved(&self, id: &str, x: f32, y: f32, z: f32) -> bool {
        match self.buffers.with(|pool| pool.set_position_xyz(id, [x, y, z])) {
            Ok(()) => true,
            Err(e) => {
                trace!(error = %e, "layout update skipped");
                false
            }
        }
    }

    /// Move a batch of nodes under one lock. Returns how many were applied.
    ///
    /// Entries are independent, so their order does not matter.
    pub fn nodes_moved<I, K>(&self, nodes: I) -> usize
    where
        I: IntoIterator<Item = (K, [f32; 3])>,
        K: AsRef<str>,
    {
        self.buffers.with(|pool| {
            nodes
                .into_iter()
                .filter(|(id, xyz)| match pool.set_position_xyz(id.as_ref(), *xyz) {
                    Ok(()) => true,
                    Err(e) => {
                        trace!(error = %e, "layout update skipped");
                        false
                    }
                })
                .count()
        })
    }

    /// Apply one layout event. Unknown nodes are skipped.
    pub fn apply(&mut self, event: &LayoutEvent) {
        match event {
            LayoutEvent::NodeMoved { id, xyz: [x, y, z] } => {
                self.node_moved(id, *x, *y, *z);
            }
            LayoutEvent::NodesMoved { nodes } => {
                let applied = self.nodes_moved(nodes.iter().map(|(id, xyz)| (id, *xyz)));
                trace!(applied, total = nodes.len(), "layout batch applied");
            }
            LayoutEvent::StepCompletion { percent } => {
                self.completion = *percent;
            }
        }
    }

    /// Last convergence value reported by the layout.
    pub fn completion(&self) -> f32 {
        self.completion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use indexmap::IndexMap;

    fn setup(ids: &[&str]) -> (GraphBuffers, LayoutSink) {
        let buffers = GraphBuffers::new(&ViewerConfig {
            max_nodes: 8,
            max_edges: 1,
            ..Default::default()
        });
        buffers.with(|pool| {
            for id in ids {
                pool.allocate_node(id).unwrap();
            }
        });
        let sink = LayoutSink::new(buffers.clone());
        (buffers, sink)
    }

    #[test]
    fn node_moved_writes_full_triple() {
        let (buffers, sink) = setup(&["a"]);
        assert!(sink.node_moved("a", 1.0, 2.0, 3.0));
        assert_eq!(buffers.read(|p| p.position_of("a")), Some([1.0, 2.0, 3.0]));
    }

    #[test]
    fn moves_follow_compaction() {
        let (buffers, sink) = setup(&["a", "b", "c"]);
        buffers.with(|pool| pool.free_node("a"));

        // c now lives in slot 0 but keeps pool index 2.
        assert!(sink.node_moved("c", 4.0, 5.0, 6.0));
        buffers.read(|pool| {
            assert_eq!(pool.position_of("c"), Some([4.0, 5.0, 6.0]));
            let view = pool.position_view();
            assert_eq!(&view[6..9], &[4.0, 5.0, 6.0]);
            assert_eq!(&view[0..3], &[0.0, 0.0, 0.0]);
        });
    }

    #[test]
    fn unknown_nodes_are_skipped() {
        let (_buffers, sink) = setup(&["a"]);
        assert!(!sink.node_moved("ghost", 1.0, 1.0, 1.0));

        let applied = sink.nodes_moved([("a", [1.0, 1.0, 1.0]), ("ghost", [2.0, 2.0, 2.0])]);
        assert_eq!(applied, 1);
    }

    #[test]
    fn apply_batch_event() {
        let (buffers, mut sink) = setup(&["a", "b"]);
        let mut nodes = IndexMap::new();
        nodes.insert("a".to_string(), [1.0, 0.0, 0.0]);
        nodes.insert("b".to_string(), [0.0, 1.0, 0.0]);

        sink.apply(&LayoutEvent::NodesMoved { nodes });
        sink.apply(&LayoutEvent::StepCompletion { percent: 0.5 });

        buffers.read(|pool| {
            assert_eq!(pool.position_of("a"), Some([1.0, 0.0, 0.0]));
            assert_eq!(pool.position_of("b"), Some([0.0, 1.0, 0.0]));
        });
        assert_eq!(sink.completion(), 0.5);
    }
}
