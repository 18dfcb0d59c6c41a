//! Graph Event Sink
//!
//! Translates graph mutations into pool operations.
//!
//! # Dispatch
//!
//! | event | pool operation |
//! |---|---|
//! | node added / removed | `allocate_node` / `free_node` |
//! | edge added / removed | `allocate_edge` / `free_edge` |
//! | node attribute `x`, `y`, `z`, `xy`, `xyz` | `set_position` on the named axes |
//! | node attribute `ui.color` | `set_color` |
//! | node attribute `ui.size` | `set_size` |
//! | graph attribute `ui.stylesheet` | reload styles, recolour changed nodes |
//! | graph cleared | `clear` |
//!
//! Other attribute names belong to external styling and are ignored.
//!
//! # Errors
//!
//! Unknown identifiers and malformed values are logged and absorbed here;
//! `apply` only ever returns `CapacityExceeded`.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use super::event::{GraphEvent, GraphEventKind};
use super::style::StyleResolver;
use crate::error::{BufferError, EntityKind, Result};
use crate::pool::attribute::{
    color_from_value, coords_from_value, size_from_value, STYLESHEET_ATTRIBUTE,
};
use crate::pool::{AttributeValue, GraphBuffers, NodeAttribute};

/// Consumes graph events and keeps a [`GraphBuffers`] in step.
pub struct GraphSink {
    buffers: GraphBuffers,
    resolver: Box<dyn StyleResolver>,
    /// Last colour each node received from the stylesheet.
    styled: HashMap<String, [f32; 4]>,
    /// Last time id seen per source.
    clocks: HashMap<String, u64>,
}

impl GraphSink {
    /// Sink writing into `buffers`, colouring nodes through `resolver`.
    pub fn new(buffers: GraphBuffers, resolver: Box<dyn StyleResolver>) -> Self {
        Self {
            buffers,
            resolver,
            styled: HashMap::new(),
            clocks: HashMap::new(),
        }
    }

    /// The buffers this sink writes into.
    pub fn buffers(&self) -> &GraphBuffers {
        &self.buffers
    }

    /// Apply one event.
    ///
    /// Events that are not newer than the last one seen from the same
    /// source are dropped.
    pub fn apply(&mut self, event: &GraphEvent) -> Result<()> {
        if !self.advance_clock(&event.source_id, event.time_id) {
            trace!(
                source = %event.source_id,
                time = event.time_id,
                "dropping out-of-sequence event"
            );
            return Ok(());
        }

        match self.dispatch(&event.kind) {
            Err(e) if e.is_fatal() => Err(e),
            Err(e @ BufferError::UnknownIdentifier { .. }) => {
                debug!(error = %e, "event skipped");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "event skipped");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    fn advance_clock(&mut self, source_id: &str, time_id: u64) -> bool {
        match self.clocks.get_mut(source_id) {
            Some(last) if time_id <= *last => false,
            Some(last) => {
                *last = time_id;
                true
            }
            None => {
                self.clocks.insert(source_id.to_string(), time_id);
                true
            }
        }
    }

    fn dispatch(&mut self, kind: &GraphEventKind) -> Result<()> {
        match kind {
            GraphEventKind::NodeAdded { node_id } => self.node_added(node_id),
            GraphEventKind::NodeRemoved { node_id } => self.node_removed(node_id),
            GraphEventKind::EdgeAdded {
                edge_id, from, to, ..
            } => self
                .buffers
                .with(|pool| pool.allocate_edge(edge_id, from, to))
                .map(|_| ()),
            GraphEventKind::EdgeRemoved { edge_id } => {
                if self.buffers.with(|pool| pool.free_edge(edge_id)) {
                    Ok(())
                } else {
                    Err(BufferError::unknown(EntityKind::Edge, edge_id))
                }
            }
            GraphEventKind::NodeAttributeAdded {
                node_id,
                attribute,
                value,
            }
            | GraphEventKind::NodeAttributeChanged {
                node_id,
                attribute,
                new_value: value,
                ..
            } => self.node_attribute(node_id, attribute, value),
            GraphEventKind::NodeAttributeRemoved { .. } => Ok(()),
            GraphEventKind::GraphAttributeAdded { attribute, value }
            | GraphEventKind::GraphAttributeChanged {
                attribute,
                new_value: value,
                ..
            } => self.graph_attribute(attribute, Some(value)),
            GraphEventKind::GraphAttributeRemoved { attribute } => {
                self.graph_attribute(attribute, None)
            }
            GraphEventKind::GraphCleared => {
                self.buffers.with(|pool| pool.clear());
                self.styled.clear();
                Ok(())
            }
            GraphEventKind::StepBegins { step } => {
                trace!(step, "step begins");
                Ok(())
            }
        }
    }

    /// A repeated add for a live node keeps its slot and its current colour.
    fn node_added(&mut self, node_id: &str) -> Result<()> {
        let color = self.resolver.resolve(node_id);
        let fresh = self.buffers.with(|pool| {
            if pool.contains_node(node_id) {
                debug!(node = node_id, "node already live, add ignored");
                return Ok::<_, BufferError>(false);
            }
            pool.allocate_node(node_id)?;
            if let Some(color) = color {
                pool.set_color(node_id, color)?;
            }
            Ok(true)
        })?;

        if let (true, Some(color)) = (fresh, color) {
            self.styled.insert(node_id.to_string(), color);
        }
        Ok(())
    }

    fn node_removed(&mut self, node_id: &str) -> Result<()> {
        self.styled.remove(node_id);
        if self.buffers.with(|pool| pool.free_node(node_id)) {
            Ok(())
        } else {
            Err(BufferError::unknown(EntityKind::Node, node_id))
        }
    }

    fn node_attribute(&mut self, node_id: &str, attribute: &str, value: &AttributeValue) -> Result<()> {
        let Some(kind) = NodeAttribute::classify(attribute) else {
            trace!(node = node_id, attribute, "attribute left to external styling");
            return Ok(());
        };

        match kind {
            NodeAttribute::Coords(axes) => {
                let (x, y, z) = axes.select(coords_from_value(attribute, value)?);
                self.buffers.with(|pool| pool.set_position(node_id, x, y, z))
            }
            NodeAttribute::Color => {
                let rgba = color_from_value(attribute, value)?;
                self.buffers.with(|pool| pool.set_color(node_id, rgba))
            }
            NodeAttribute::Size => {
                let size = size_from_value(attribute, value)?;
                self.buffers.with(|pool| pool.set_size(node_id, size))
            }
        }
    }

    /// `value` is `None` when the attribute was removed.
    fn graph_attribute(&mut self, attribute: &str, value: Option<&AttributeValue>) -> Result<()> {
        if attribute != STYLESHEET_ATTRIBUTE {
            return Ok(());
        }

        match value {
            Some(AttributeValue::Text(sheet)) => {
                if let Err(e) = self.resolver.load(sheet) {
                    warn!(error = %e, "keeping previous styles");
                    return Ok(());
                }
            }
            Some(_) => {
                return Err(BufferError::malformed(attribute, "stylesheet must be text"));
            }
            None => self.resolver.clear(),
        }

        self.restyle()
    }

    /// Re-resolve every live node and recolour those whose rule changed.
    fn restyle(&mut self) -> Result<()> {
        let resolver = &self.resolver;
        let styled = &mut self.styled;

        let changed = self.buffers.with(|pool| {
            let default_color = pool.default_color();
            let ids: Vec<String> = pool.node_ids().map(str::to_owned).collect();
            let mut changed = 0usize;

            for id in ids {
                match resolver.resolve(&id) {
                    Some(color) if styled.get(&id) != Some(&color) => {
                        pool.set_color(&id, color)?;
                        styled.insert(id, color);
                        changed += 1;
                    }
                    Some(_) => {}
                    None => {
                        if styled.remove(&id).is_some() {
                            pool.set_color(&id, default_color)?;
                            changed += 1;
                        }
                    }
                }
            }
            Ok::<_, BufferError>(changed)
        })?;

        debug!(changed, "stylesheet applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::error::StyleError;
    use crate::pool::attribute::COLOR_ATTRIBUTE;
    use crate::sink::style::NoStyles;

    /// Resolver reading `id=r,g,b,a` lines.
    #[derive(Default)]
    struct TableStyles {
        rules: HashMap<String, [f32; 4]>,
    }

    impl StyleResolver for TableStyles {
        fn load(&mut self, stylesheet: &str) -> std::result::Result<(), StyleError> {
            let mut rules = HashMap::new();
            for line in stylesheet.lines().filter(|l| !l.trim().is_empty()) {
                let (id, rgba) = line
                    .split_once('=')
                    .ok_or_else(|| StyleError(format!("bad rule `{line}`")))?;
                let c: Vec<f32> = rgba
                    .split(',')
                    .map(|v| v.trim().parse().map_err(|_| StyleError(line.to_string())))
                    .collect::<std::result::Result<_, _>>()?;
                rules.insert(id.trim().to_string(), [c[0], c[1], c[2], c[3]]);
            }
            self.rules = rules;
            Ok(())
        }

        fn clear(&mut self) {
            self.rules.clear();
        }

        fn resolve(&self, node_id: &str) -> Option<[f32; 4]> {
            self.rules.get(node_id).copied()
        }
    }

    struct Harness {
        sink: GraphSink,
        time: u64,
    }

    impl Harness {
        fn new(max_nodes: usize, max_edges: usize, resolver: Box<dyn StyleResolver>) -> Self {
            let buffers = GraphBuffers::new(&ViewerConfig {
                max_nodes,
                max_edges,
                ..Default::default()
            });
            Self {
                sink: GraphSink::new(buffers, resolver),
                time: 0,
            }
        }

        fn send(&mut self, kind: GraphEventKind) -> Result<()> {
            self.time += 1;
            self.sink.apply(&GraphEvent::new("test", self.time, kind))
        }

        fn read<R>(&self, f: impl FnOnce(&crate::pool::BufferPool) -> R) -> R {
            self.sink.buffers().read(f)
        }
    }

    #[test]
    fn add_and_remove_nodes() {
        let mut h = Harness::new(3, 3, Box::new(NoStyles));
        for id in ["a", "b", "c"] {
            h.send(GraphEventKind::node_added(id)).unwrap();
        }
        h.send(GraphEventKind::node_removed("b")).unwrap();

        h.read(|pool| {
            assert_eq!(pool.node_count(), 2);
            assert_eq!(pool.index_of("c"), Some(1));
            assert_eq!(pool.index_of("b"), None);
        });
    }

    #[test]
    fn capacity_exhaustion_is_returned() {
        let mut h = Harness::new(1, 1, Box::new(NoStyles));
        h.send(GraphEventKind::node_added("a")).unwrap();
        let err = h.send(GraphEventKind::node_added("b")).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn soft_errors_are_absorbed() {
        let mut h = Harness::new(2, 2, Box::new(NoStyles));
        h.send(GraphEventKind::node_added("a")).unwrap();

        assert!(h.send(GraphEventKind::node_removed("ghost")).is_ok());
        assert!(h.send(GraphEventKind::edge_removed("ghost")).is_ok());
        assert!(h.send(GraphEventKind::edge_added("e", "a", "ghost")).is_ok());
        assert!(h.send(GraphEventKind::node_attribute("ghost", "x", 1.0)).is_ok());
        assert!(h.send(GraphEventKind::node_attribute("a", "xyz", "far away")).is_ok());

        h.read(|pool| {
            assert_eq!(pool.edge_count(), 0);
            assert_eq!(pool.position_of("a"), Some([0.0, 0.0, 0.0]));
        });
    }

    #[test]
    fn coordinate_attributes_route_to_axes() {
        let mut h = Harness::new(1, 1, Box::new(NoStyles));
        h.send(GraphEventKind::node_added("a")).unwrap();

        h.send(GraphEventKind::node_attribute("a", "xyz", [1.0f32, 2.0, 3.0])).unwrap();
        h.send(GraphEventKind::node_attribute("a", "x", 5.0)).unwrap();
        h.read(|pool| assert_eq!(pool.position_of("a"), Some([5.0, 2.0, 3.0])));

        // Scalar on a single axis writes only that axis.
        h.send(GraphEventKind::node_attribute("a", "z", 9.0)).unwrap();
        h.read(|pool| assert_eq!(pool.position_of("a"), Some([5.0, 2.0, 9.0])));

        // Two components on `xyz` zero z.
        h.send(GraphEventKind::node_attribute("a", "xyz", [7.0f32, 8.0])).unwrap();
        h.read(|pool| assert_eq!(pool.position_of("a"), Some([7.0, 8.0, 0.0])));
    }

    #[test]
    fn changed_attributes_behave_like_added() {
        let mut h = Harness::new(1, 1, Box::new(NoStyles));
        h.send(GraphEventKind::node_added("a")).unwrap();
        h.send(GraphEventKind::NodeAttributeChanged {
            node_id: "a".into(),
            attribute: COLOR_ATTRIBUTE.into(),
            old_value: None,
            new_value: AttributeValue::from([0.0f32, 1.0, 0.0, 1.0]),
        })
        .unwrap();
        h.read(|pool| assert_eq!(pool.color_of("a"), Some([0.0, 1.0, 0.0, 1.0])));
    }

    #[test]
    fn size_and_unrelated_attributes() {
        let mut h = Harness::new(1, 1, Box::new(NoStyles));
        h.send(GraphEventKind::node_added("a")).unwrap();
        h.send(GraphEventKind::node_attribute("a", "ui.size", 4.0)).unwrap();
        h.send(GraphEventKind::node_attribute("a", "ui.label", "hello")).unwrap();
        h.read(|pool| assert_eq!(pool.size_of("a"), Some(4.0)));
    }

    #[test]
    fn stale_events_are_dropped() {
        let mut h = Harness::new(2, 1, Box::new(NoStyles));
        h.sink
            .apply(&GraphEvent::new("src", 5, GraphEventKind::node_added("a")))
            .unwrap();
        h.sink
            .apply(&GraphEvent::new("src", 5, GraphEventKind::node_removed("a")))
            .unwrap();
        h.sink
            .apply(&GraphEvent::new("other", 1, GraphEventKind::node_added("b")))
            .unwrap();

        h.read(|pool| {
            assert!(pool.contains_node("a"));
            assert!(pool.contains_node("b"));
        });
    }

    #[test]
    fn new_nodes_pick_up_resolved_style() {
        let mut h = Harness::new(2, 1, Box::new(TableStyles::default()));
        h.send(GraphEventKind::graph_attribute("ui.stylesheet", "a=1,0,0,1")).unwrap();
        h.send(GraphEventKind::node_added("a")).unwrap();
        h.send(GraphEventKind::node_added("b")).unwrap();

        h.read(|pool| {
            assert_eq!(pool.color_of("a"), Some([1.0, 0.0, 0.0, 1.0]));
            assert_eq!(pool.color_of("b"), Some(pool.default_color()));
        });
    }

    #[test]
    fn repeated_add_keeps_explicit_color() {
        let mut h = Harness::new(2, 1, Box::new(TableStyles::default()));
        h.send(GraphEventKind::graph_attribute("ui.stylesheet", "a=1,0,0,1")).unwrap();
        h.send(GraphEventKind::node_added("a")).unwrap();
        h.send(GraphEventKind::node_attribute("a", "ui.color", [0.0f32, 0.0, 1.0, 1.0]))
            .unwrap();

        h.send(GraphEventKind::node_added("a")).unwrap();

        h.read(|pool| {
            assert_eq!(pool.node_count(), 1);
            assert_eq!(pool.color_of("a"), Some([0.0, 0.0, 1.0, 1.0]));
        });
    }

    #[test]
    fn stylesheet_change_recolours_only_changed_nodes() {
        let mut h = Harness::new(3, 1, Box::new(TableStyles::default()));
        for id in ["a", "b", "c"] {
            h.send(GraphEventKind::node_added(id)).unwrap();
        }
        h.send(GraphEventKind::graph_attribute("ui.stylesheet", "a=1,0,0,1\nb=0,1,0,1"))
            .unwrap();
        h.read(|pool| {
            assert_eq!(pool.color_of("a"), Some([1.0, 0.0, 0.0, 1.0]));
            assert_eq!(pool.color_of("b"), Some([0.0, 1.0, 0.0, 1.0]));
        });

        // An explicit colour on `a` survives a reload that keeps a's rule.
        h.send(GraphEventKind::node_attribute("a", "ui.color", [0.5f32, 0.5, 0.5, 1.0]))
            .unwrap();
        h.send(GraphEventKind::graph_attribute("ui.stylesheet", "a=1,0,0,1\nc=0,0,1,1"))
            .unwrap();

        h.read(|pool| {
            assert_eq!(pool.color_of("a"), Some([0.5, 0.5, 0.5, 1.0]));
            assert_eq!(pool.color_of("b"), Some(pool.default_color()));
            assert_eq!(pool.color_of("c"), Some([0.0, 0.0, 1.0, 1.0]));
        });
    }

    #[test]
    fn rejected_stylesheet_keeps_colours() {
        let mut h = Harness::new(1, 1, Box::new(TableStyles::default()));
        h.send(GraphEventKind::node_added("a")).unwrap();
        h.send(GraphEventKind::graph_attribute("ui.stylesheet", "a=1,0,0,1")).unwrap();
        h.send(GraphEventKind::graph_attribute("ui.stylesheet", "garbage")).unwrap();
        h.read(|pool| assert_eq!(pool.color_of("a"), Some([1.0, 0.0, 0.0, 1.0])));
    }

    #[test]
    fn removing_stylesheet_restores_defaults() {
        let mut h = Harness::new(1, 1, Box::new(TableStyles::default()));
        h.send(GraphEventKind::node_added("a")).unwrap();
        h.send(GraphEventKind::graph_attribute("ui.stylesheet", "a=1,0,0,1")).unwrap();
        h.send(GraphEventKind::GraphAttributeRemoved {
            attribute: "ui.stylesheet".into(),
        })
        .unwrap();
        h.read(|pool| assert_eq!(pool.color_of("a"), Some(pool.default_color())));
    }

    #[test]
    fn graph_cleared_empties_pool() {
        let mut h = Harness::new(2, 2, Box::new(NoStyles));
        h.send(GraphEventKind::node_added("a")).unwrap();
        h.send(GraphEventKind::node_added("b")).unwrap();
        h.send(GraphEventKind::edge_added("e", "a", "b")).unwrap();
        h.send(GraphEventKind::GraphCleared).unwrap();

        h.read(|pool| {
            assert_eq!(pool.node_count(), 0);
            assert_eq!(pool.edge_count(), 0);
        });
    }
}
