//! Event Model
//!
//! Events as emitted by the external graph source and layout engine. Each
//! graph event carries the id of the source that produced it and a logical
//! timestamp; the sink uses the pair only to drop replayed or reordered
//! events.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pool::AttributeValue;

/// One graph mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEvent {
    pub source_id: String,
    pub time_id: u64,
    #[serde(flatten)]
    pub kind: GraphEventKind,
}

impl GraphEvent {
    /// Event stamped with its source and logical time.
    pub fn new(source_id: impl Into<String>, time_id: u64, kind: GraphEventKind) -> Self {
        Self {
            source_id: source_id.into(),
            time_id,
            kind,
        }
    }

    /// Parse a single JSON-encoded event.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// What happened to the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEventKind {
    NodeAdded {
        node_id: String,
    },
    NodeRemoved {
        node_id: String,
    },
    EdgeAdded {
        edge_id: String,
        from: String,
        to: String,
        #[serde(default)]
        directed: bool,
    },
    EdgeRemoved {
        edge_id: String,
    },
    NodeAttributeAdded {
        node_id: String,
        attribute: String,
        value: AttributeValue,
    },
    NodeAttributeChanged {
        node_id: String,
        attribute: String,
        #[serde(default)]
        old_value: Option<AttributeValue>,
        new_value: AttributeValue,
    },
    NodeAttributeRemoved {
        node_id: String,
        attribute: String,
    },
    GraphAttributeAdded {
        attribute: String,
        value: AttributeValue,
    },
    GraphAttributeChanged {
        attribute: String,
        #[serde(default)]
        old_value: Option<AttributeValue>,
        new_value: AttributeValue,
    },
    GraphAttributeRemoved {
        attribute: String,
    },
    GraphCleared,
    StepBegins {
        step: f64,
    },
}

impl GraphEventKind {
    pub fn node_added(node_id: impl Into<String>) -> Self {
        GraphEventKind::NodeAdded {
            node_id: node_id.into(),
        }
    }

    pub fn node_removed(node_id: impl Into<String>) -> Self {
        GraphEventKind::NodeRemoved {
            node_id: node_id.into(),
        }
    }

    pub fn edge_added(
        edge_id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        GraphEventKind::EdgeAdded {
            edge_id: edge_id.into(),
            from: from.into(),
            to: to.into(),
            directed: false,
        }
    }

    pub fn edge_removed(edge_id: impl Into<String>) -> Self {
        GraphEventKind::EdgeRemoved {
            edge_id: edge_id.into(),
        }
    }

    pub fn node_attribute(
        node_id: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        GraphEventKind::NodeAttributeAdded {
            node_id: node_id.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn graph_attribute(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        GraphEventKind::GraphAttributeAdded {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Position updates from the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LayoutEvent {
    NodeMoved { id: String, xyz: [f32; 3] },
    NodesMoved { nodes: IndexMap<String, [f32; 3]> },
    /// Layout convergence in `[0, 1]`.
    StepCompletion { percent: f32 },
}
