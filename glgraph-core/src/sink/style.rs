//! Style Resolution
//!
//! Stylesheet parsing and rule matching live outside this crate. The graph
//! sink only needs the answer to one question: which colour does the
//! current stylesheet give this node?

use crate::error::StyleError;

/// The external styling collaborator.
pub trait StyleResolver: Send {
    /// Replace the current stylesheet.
    fn load(&mut self, stylesheet: &str) -> Result<(), StyleError>;

    /// Drop the current stylesheet.
    fn clear(&mut self);

    /// Colour the current rules assign to a node, if any.
    fn resolve(&self, node_id: &str) -> Option<[f32; 4]>;
}

/// Resolver that never assigns a colour. Nodes keep the default style.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStyles;

impl StyleResolver for NoStyles {
    fn load(&mut self, _stylesheet: &str) -> Result<(), StyleError> {
        Ok(())
    }

    fn clear(&mut self) {}

    fn resolve(&self, _node_id: &str) -> Option<[f32; 4]> {
        None
    }
}
