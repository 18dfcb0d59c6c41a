//! Viewer Configuration
//!
//! Capacities and capability flags are read once at construction. Nothing
//! here is re-validated later; the pool only checks capacities when it
//! allocates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Whether nodes share one colour or each node carries its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeColorMode {
    Uniform,
    PerNode,
}

/// Whether nodes share one size or each node carries its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeSizeMode {
    Uniform,
    PerNode,
}

/// Which identifier index implementation backs the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexKind {
    /// Hash map lookup. The default.
    #[default]
    Hashed,
    /// Array-only storage searched linearly.
    Linear,
}

/// Configuration consumed when the viewer is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Maximum number of live nodes.
    pub max_nodes: usize,
    /// Maximum number of live edges.
    pub max_edges: usize,
    pub node_color_mode: NodeColorMode,
    pub node_size_mode: NodeSizeMode,
    pub index: IndexKind,
    /// Colour written to freshly allocated nodes.
    pub default_color: [f32; 4],
    /// Size written to freshly allocated nodes.
    pub default_size: f32,
    /// Frames per second driven by the run loop.
    pub frame_rate: u32,
    /// Averaging window for the frame statistics, in milliseconds.
    pub stats_window_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_nodes: 10_000,
            max_edges: 10_000,
            node_color_mode: NodeColorMode::PerNode,
            node_size_mode: NodeSizeMode::PerNode,
            index: IndexKind::Hashed,
            default_color: [1.0, 1.0, 1.0, 0.4],
            default_size: 10.0,
            frame_rate: 60,
            stats_window_ms: 2_000,
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by `GLGRAPH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("GLGRAPH_MAX_NODES") {
            config.max_nodes = parse_number("GLGRAPH_MAX_NODES", &value)?;
        }
        if let Some(value) = lookup("GLGRAPH_MAX_EDGES") {
            config.max_edges = parse_number("GLGRAPH_MAX_EDGES", &value)?;
        }
        if let Some(value) = lookup("GLGRAPH_FRAME_RATE") {
            config.frame_rate = parse_number("GLGRAPH_FRAME_RATE", &value)?;
        }
        if let Some(value) = lookup("GLGRAPH_NODE_COLORS") {
            config.node_color_mode = match parse_mode("GLGRAPH_NODE_COLORS", &value)? {
                true => NodeColorMode::PerNode,
                false => NodeColorMode::Uniform,
            };
        }
        if let Some(value) = lookup("GLGRAPH_NODE_SIZES") {
            config.node_size_mode = match parse_mode("GLGRAPH_NODE_SIZES", &value)? {
                true => NodeSizeMode::PerNode,
                false => NodeSizeMode::Uniform,
            };
        }

        Ok(config)
    }

    /// Whether each node carries its own colour.
    pub fn color_enabled(&self) -> bool {
        self.node_color_mode == NodeColorMode::PerNode
    }

    /// Whether each node carries its own size.
    pub fn size_enabled(&self) -> bool {
        self.node_size_mode == NodeSizeMode::PerNode
    }

    /// Delay between two frames. A zero frame rate is treated as 1 fps.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.frame_rate.max(1)))
    }

    /// Averaging window for frame statistics.
    pub fn stats_window(&self) -> Duration {
        Duration::from_millis(self.stats_window_ms)
    }
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// `per-node` → true, `uniform` → false.
fn parse_mode(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "per-node" | "each" => Ok(true),
        "uniform" | "all" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
            reason: "expected `uniform` or `per-node`".to_string(),
        }),
    }
}
