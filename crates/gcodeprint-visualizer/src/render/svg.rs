//! In-memory SVG scene
//! Keeps the node list the engine builds and serialises it as an SVG document

use super::surface::{NodeId, RenderSurface};
use crate::geometry::{format_coord, Point};
use std::collections::HashMap;
use std::fmt::Write;
use tracing::trace;

/// A node in the scene
#[derive(Debug, Clone, PartialEq)]
pub enum SvgNode {
    Path {
        id: NodeId,
        z: f64,
        d: String,
        transform: Option<String>,
    },
    Marker {
        id: NodeId,
        center: Point,
        radius: f64,
        class: String,
        transform: Option<String>,
    },
}

impl SvgNode {
    pub fn id(&self) -> NodeId {
        match self {
            SvgNode::Path { id, .. } | SvgNode::Marker { id, .. } => *id,
        }
    }
}

/// SVG-backed [`RenderSurface`]
#[derive(Debug, Clone, Default)]
pub struct SvgScene {
    nodes: Vec<SvgNode>,
    /// Position of each node in `nodes`
    index: HashMap<NodeId, usize>,
    next_id: u64,
    path_commits: usize,
}

impl SvgScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[SvgNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.find(node).is_some()
    }

    /// Path data of a path node
    pub fn path_data(&self, node: NodeId) -> Option<&str> {
        match self.find(node)? {
            SvgNode::Path { d, .. } => Some(d),
            SvgNode::Marker { .. } => None,
        }
    }

    pub fn transform(&self, node: NodeId) -> Option<&str> {
        match self.find(node)? {
            SvgNode::Path { transform, .. } | SvgNode::Marker { transform, .. } => {
                transform.as_deref()
            }
        }
    }

    /// Path nodes in draw order as `(id, z, d)`
    pub fn paths(&self) -> Vec<(NodeId, f64, &str)> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                SvgNode::Path { id, z, d, .. } => Some((*id, *z, d.as_str())),
                SvgNode::Marker { .. } => None,
            })
            .collect()
    }

    /// Marker centers with the given class, in draw order
    pub fn markers(&self, class: &str) -> Vec<Point> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                SvgNode::Marker {
                    center, class: c, ..
                } if c == class => Some(*center),
                _ => None,
            })
            .collect()
    }

    /// Number of path data updates that hit a live node
    pub fn path_commits(&self) -> usize {
        self.path_commits
    }

    /// Serialise the scene as a standalone SVG document
    pub fn to_svg_document(&self, width: f64, height: f64, stroke_width: f64) -> String {
        let mut out = String::with_capacity(256 + self.nodes.len() * 64);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
            format_coord(width),
            format_coord(height)
        );
        out.push_str("  <g id=\"scene\">\n");
        for node in &self.nodes {
            match node {
                SvgNode::Path { z, d, transform, .. } => {
                    let _ = write!(
                        out,
                        r#"    <path class="layer" data-z="{}" d="{}" fill="none" stroke="currentColor" stroke-width="{}""#,
                        format_coord(*z),
                        d,
                        format_coord(stroke_width)
                    );
                    write_transform(&mut out, transform.as_deref());
                    out.push_str("/>\n");
                }
                SvgNode::Marker {
                    center,
                    radius,
                    class,
                    transform,
                    ..
                } => {
                    let _ = write!(
                        out,
                        r#"    <circle class="{}" cx="{}" cy="{}" r="{}""#,
                        class,
                        format_coord(center.x),
                        format_coord(center.y),
                        format_coord(*radius)
                    );
                    write_transform(&mut out, transform.as_deref());
                    out.push_str("/>\n");
                }
            }
        }
        out.push_str("  </g>\n</svg>\n");
        out
    }

    fn find(&self, node: NodeId) -> Option<&SvgNode> {
        self.index.get(&node).and_then(|&pos| self.nodes.get(pos))
    }

    fn find_mut(&mut self, node: NodeId) -> Option<&mut SvgNode> {
        let pos = *self.index.get(&node)?;
        self.nodes.get_mut(pos)
    }

    fn find_path_mut(&mut self, node: NodeId) -> Option<&mut String> {
        match self.find_mut(node)? {
            SvgNode::Path { d, .. } => Some(d),
            SvgNode::Marker { .. } => None,
        }
    }

    fn push_node(&mut self, node: SvgNode) {
        self.index.insert(node.id(), self.nodes.len());
        self.nodes.push(node);
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn write_transform(out: &mut String, transform: Option<&str>) {
    if let Some(t) = transform {
        let _ = write!(out, r#" transform="{}""#, t);
    }
}

impl RenderSurface for SvgScene {
    fn append_path(&mut self, z: f64) -> NodeId {
        let id = self.next_id();
        self.push_node(SvgNode::Path {
            id,
            z,
            d: String::new(),
            transform: None,
        });
        trace!("Appended path {} for z={}", id, z);
        id
    }

    fn append_marker(&mut self, at: Point, radius: f64, class: &str) -> NodeId {
        let id = self.next_id();
        self.push_node(SvgNode::Marker {
            id,
            center: at,
            radius,
            class: class.to_string(),
            transform: None,
        });
        id
    }

    fn set_path_data(&mut self, node: NodeId, data: &str) {
        if let Some(d) = self.find_path_mut(node) {
            d.clear();
            d.push_str(data);
            self.path_commits += 1;
        }
    }

    fn push_path_token(&mut self, node: NodeId, token: &str) {
        if let Some(d) = self.find_path_mut(node) {
            if !d.is_empty() {
                d.push(' ');
            }
            d.push_str(token);
            self.path_commits += 1;
        }
    }

    fn set_transform(&mut self, node: NodeId, value: &str) {
        match self.find_mut(node) {
            Some(SvgNode::Path { transform, .. }) | Some(SvgNode::Marker { transform, .. }) => {
                *transform = Some(value.to_string());
            }
            None => {}
        }
    }

    fn remove(&mut self, node: NodeId) {
        let Some(pos) = self.index.remove(&node) else {
            return;
        };
        self.nodes.remove(pos);
        for (offset, n) in self.nodes[pos..].iter().enumerate() {
            self.index.insert(n.id(), pos + offset);
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }
}
