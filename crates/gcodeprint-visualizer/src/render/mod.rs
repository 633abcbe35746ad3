//! Render surfaces
//!
//! The engine only talks to [`RenderSurface`]; [`SvgScene`] is the
//! in-memory implementation used by the binary and the tests.

pub mod surface;
pub mod svg;

pub use surface::{NodeId, RenderSurface};
pub use svg::{SvgNode, SvgScene};
