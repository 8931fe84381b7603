//! Render batches for the external renderer
//!
//! Visible nodes are grouped by (model, transparency). Opaque batches always
//! precede transparent ones; the renderer relies on that order for blending.

use crate::scene::{ModelId, NodeHandle};
use std::collections::HashMap;

/// A group of nodes drawn from the same model with the same transparency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderBatch {
    /// Model shared by all nodes in this batch
    pub model: ModelId,

    /// Nodes in this batch, in scene iteration order
    pub nodes: Vec<NodeHandle>,

    /// True if the batch must be drawn with blending, after opaque batches
    pub is_transparent: bool,
}

impl RenderBatch {
    /// Create a new empty batch
    pub const fn new(model: ModelId, is_transparent: bool) -> Self {
        Self {
            model,
            nodes: Vec::new(),
            is_transparent,
        }
    }

    /// Get the number of nodes in this batch
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Accumulates nodes into batches while keeping first-seen batch order
#[derive(Debug, Default)]
pub(crate) struct RenderQueue {
    opaque_batches: Vec<RenderBatch>,
    transparent_batches: Vec<RenderBatch>,
    lookup: HashMap<(ModelId, bool), usize>,
}

impl RenderQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, model: ModelId, is_transparent: bool, node: NodeHandle) {
        let batches = if is_transparent {
            &mut self.transparent_batches
        } else {
            &mut self.opaque_batches
        };

        let slot = *self.lookup.entry((model, is_transparent)).or_insert_with(|| {
            batches.push(RenderBatch::new(model, is_transparent));
            batches.len() - 1
        });
        batches[slot].nodes.push(node);
    }

    /// Opaque batches followed by transparent batches
    pub(crate) fn into_batches(self) -> Vec<RenderBatch> {
        let mut batches = self.opaque_batches;
        batches.extend(self.transparent_batches);
        batches
    }
}
