//! Kd-tree over scene objects.
//!
//! The tree only stores object indices and boxes. Geometry stays with the
//! caller, who is asked for it through the extents functions at build time
//! and through the candidate callback during traversal.
//!
//! Nodes live in one arena (`Vec<KdNode>`) and refer to their children by
//! index. Leaves refer to a range of a shared object index list.

mod build;
mod traverse;

use std::fmt;

use kdtrace_core::SceneDescription;
use kdtrace_math::Aabb;
use serde::{Deserialize, Serialize};

pub use traverse::Visit;

/// Size of the traversal todo stack. Tree depth is capped below this.
pub(crate) const MAX_TODO: usize = 64;

/// Hard cap on tree depth.
pub const MAX_TREE_DEPTH: u32 = 60;

/// Kd-tree construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdTreeConfig {
    /// Cost of testing one object, relative to `traversal_cost`
    pub object_cost: f64,
    /// Cost of stepping through one interior node
    pub traversal_cost: f64,
    /// Refine the best split of each axis by looking one level further down
    pub double_recurse: bool,
    /// Depth limit; `None` picks `8 + 1.3 log2(n)` for `n` objects
    pub max_depth: Option<u32>,
}

impl Default for KdTreeConfig {
    fn default() -> Self {
        Self {
            object_cost: 8.0,
            traversal_cost: 1.0,
            double_recurse: true,
            max_depth: None,
        }
    }
}

impl KdTreeConfig {
    /// Depth limit for a tree over `object_count` objects.
    pub fn depth_limit(&self, object_count: usize) -> u32 {
        let depth = self.max_depth.unwrap_or_else(|| {
            if object_count <= 1 {
                0
            } else {
                (8.0 + 1.3 * (object_count as f64).log2()).round() as u32
            }
        });
        depth.min(MAX_TREE_DEPTH)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum KdNode {
    Interior {
        axis: usize,
        split: f64,
        below: usize,
        above: usize,
    },
    Leaf {
        first: usize,
        count: usize,
    },
}

/// Shape of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KdTreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub empty_leaves: usize,
    pub max_depth: u32,
    /// Sum of the leaf list lengths; objects in several leaves count once per leaf
    pub total_leaf_entries: usize,
}

impl fmt::Display for KdTreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} leaves ({} empty), depth {}, {} leaf entries",
            self.nodes, self.leaves, self.empty_leaves, self.max_depth, self.total_leaf_entries
        )
    }
}

/// Immutable kd-tree. Build once per scene, then query from any number of
/// rays.
#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    objects: Vec<usize>,
    bounds: Aabb,
    stats: KdTreeStats,
}

impl KdTree {
    /// Build a tree over the scene's viewables.
    pub fn for_scene(scene: &SceneDescription, config: &KdTreeConfig) -> Self {
        Self::build(
            scene.num_viewables(),
            |i| scene.viewable(i).aabb(),
            |i, bounds| scene.viewable(i).extent_in_box(bounds),
            config,
        )
    }

    /// Box enclosing every object. Empty for a tree without objects.
    pub fn bounding_box(&self) -> Aabb {
        self.bounds
    }

    pub fn stats(&self) -> KdTreeStats {
        self.stats
    }
}
