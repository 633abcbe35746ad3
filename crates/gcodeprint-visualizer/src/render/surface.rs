//! Render surface abstraction

use crate::geometry::Point;

/// Handle of a node appended to a [`RenderSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// 2D vector drawing surface the playback engine draws onto
///
/// Nodes are drawn in append order, so later nodes paint over earlier ones.
/// Operations on a node that is no longer on the surface are ignored.
pub trait RenderSurface {
    /// Append an empty path node for the layer at height `z`
    fn append_path(&mut self, z: f64) -> NodeId;

    /// Append a point marker (not part of any path)
    fn append_marker(&mut self, at: Point, radius: f64, class: &str) -> NodeId;

    /// Replace a path node's path data
    fn set_path_data(&mut self, node: NodeId, d: &str);

    /// Append one token to a path node's data, space separated
    fn push_path_token(&mut self, node: NodeId, token: &str);

    /// Replace a node's transform attribute
    fn set_transform(&mut self, node: NodeId, transform: &str);

    /// Remove a single node
    fn remove(&mut self, node: NodeId);

    /// Remove every node
    fn clear(&mut self);
}
