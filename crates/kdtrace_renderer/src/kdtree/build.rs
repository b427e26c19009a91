//! Surface-area-heuristic construction.

use kdtrace_math::Aabb;

use super::{KdNode, KdTree, KdTreeConfig, KdTreeStats};

/// An object and its tight extent inside the node being built.
#[derive(Debug, Clone, Copy)]
struct Entry {
    object: usize,
    extent: Aabb,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    axis: usize,
    position: f64,
    cost: f64,
}

struct Builder<'a> {
    extents_in_box: &'a dyn Fn(usize, &Aabb) -> Option<Aabb>,
    config: &'a KdTreeConfig,
    max_depth: u32,
    nodes: Vec<KdNode>,
    objects: Vec<usize>,
    stats: KdTreeStats,
}

impl KdTree {
    /// Build a tree over `object_count` objects.
    ///
    /// `extents(i)` is the bounding box of object `i`.
    /// `extents_in_box(i, cell)` is the bounding box of the part of object
    /// `i` inside `cell`, or `None` if the object does not reach into it. It
    /// must never drop an object that touches the cell, faces included.
    pub fn build<E, B>(
        object_count: usize,
        extents: E,
        extents_in_box: B,
        config: &KdTreeConfig,
    ) -> Self
    where
        E: Fn(usize) -> Aabb,
        B: Fn(usize, &Aabb) -> Option<Aabb>,
    {
        log::debug!("Building kd-tree over {object_count} objects with {config:?}");

        let entries: Vec<Entry> = (0..object_count)
            .map(|object| {
                let extent = extents(object);
                debug_assert!(extent.is_valid(), "object {object} has malformed extents {extent:?}");
                Entry { object, extent }
            })
            .collect();
        let bounds = entries
            .iter()
            .fold(Aabb::EMPTY, |acc, e| Aabb::surrounding(&acc, &e.extent));

        let mut builder = Builder {
            extents_in_box: &extents_in_box,
            config,
            max_depth: config.depth_limit(object_count),
            nodes: Vec::new(),
            objects: Vec::new(),
            stats: KdTreeStats::default(),
        };
        builder.build_node(bounds, entries, 0);

        let mut stats = builder.stats;
        stats.nodes = builder.nodes.len();
        log::info!("Built kd-tree over {object_count} objects: {stats}");

        Self {
            nodes: builder.nodes,
            objects: builder.objects,
            bounds,
            stats,
        }
    }
}

impl Builder<'_> {
    fn build_node(&mut self, bounds: Aabb, entries: Vec<Entry>, depth: u32) -> usize {
        let index = self.nodes.len();
        self.nodes.push(KdNode::Leaf { first: 0, count: 0 });
        self.stats.max_depth = self.stats.max_depth.max(depth);

        let split = if entries.len() > 1 && depth < self.max_depth {
            self.choose_split(&bounds, &entries)
        } else {
            None
        };

        let Some(split) = split else {
            self.make_leaf(index, &entries);
            return index;
        };

        let (below_box, above_box) = bounds.split(split.axis, split.position);
        let (below_entries, above_entries) = self.partition(&entries, &split, &below_box, &above_box);
        drop(entries);

        let below = self.build_node(below_box, below_entries, depth + 1);
        let above = self.build_node(above_box, above_entries, depth + 1);
        self.nodes[index] = KdNode::Interior {
            axis: split.axis,
            split: split.position,
            below,
            above,
        };
        index
    }

    fn make_leaf(&mut self, index: usize, entries: &[Entry]) {
        let first = self.objects.len();
        self.objects.extend(entries.iter().map(|e| e.object));
        self.nodes[index] = KdNode::Leaf {
            first,
            count: entries.len(),
        };

        self.stats.leaves += 1;
        self.stats.total_leaf_entries += entries.len();
        if entries.is_empty() {
            self.stats.empty_leaves += 1;
        }
    }

    /// Distribute entries to the two children of `split`, re-testing each
    /// against the child cells and tightening its extent.
    ///
    /// Cells are closed, so an object ending exactly on the split plane
    /// touches both cells. It is only kept on the side where it has some
    /// thickness; objects lying in the plane go to both sides.
    fn partition(
        &self,
        entries: &[Entry],
        split: &Split,
        below_box: &Aabb,
        above_box: &Aabb,
    ) -> (Vec<Entry>, Vec<Entry>) {
        let on_plane = |extent: &Aabb| {
            let range = extent.axis_interval(split.axis);
            range.min == split.position && range.max == split.position
        };

        let mut below = Vec::new();
        let mut above = Vec::new();
        for e in entries {
            let in_below = (self.extents_in_box)(e.object, below_box);
            let in_above = (self.extents_in_box)(e.object, above_box);
            let (in_below, in_above) = match (in_below, in_above) {
                (Some(b), Some(a)) if on_plane(&a) && !on_plane(&b) => (Some(b), None),
                (Some(b), Some(a)) if on_plane(&b) && !on_plane(&a) => (None, Some(a)),
                pair => pair,
            };
            if let Some(extent) = in_below {
                below.push(Entry { object: e.object, extent });
            }
            if let Some(extent) = in_above {
                above.push(Entry { object: e.object, extent });
            }
        }
        (below, above)
    }

    fn leaf_cost(&self, count: usize) -> f64 {
        self.config.object_cost * count as f64
    }

    /// The split to make at this node, or `None` if a leaf is cheaper.
    fn choose_split(&self, bounds: &Aabb, entries: &[Entry]) -> Option<Split> {
        let per_axis = (0..3).filter_map(|axis| self.best_split_on_axis(bounds, entries, axis));

        let best = if self.config.double_recurse {
            per_axis
                .map(|split| Split {
                    cost: self.lookahead_cost(bounds, entries, &split),
                    ..split
                })
                .min_by(|a, b| a.cost.total_cmp(&b.cost))
        } else {
            per_axis.min_by(|a, b| a.cost.total_cmp(&b.cost))
        };

        best.filter(|split| split.cost < self.leaf_cost(entries.len()))
    }

    /// Cheapest split along `axis`, assuming both children become leaves.
    ///
    /// Candidate planes are the extent boundaries strictly inside the node.
    /// An object counts on a side if its extent reaches past the plane into
    /// that side.
    fn best_split_on_axis(&self, bounds: &Aabb, entries: &[Entry], axis: usize) -> Option<Split> {
        let range = bounds.axis_interval(axis);
        let area = bounds.surface_area();
        if range.size() <= 0.0 || area <= 0.0 {
            return None;
        }

        let mut lows: Vec<f64> = entries.iter().map(|e| e.extent.axis_interval(axis).min).collect();
        let mut highs: Vec<f64> = entries.iter().map(|e| e.extent.axis_interval(axis).max).collect();
        lows.sort_by(f64::total_cmp);
        highs.sort_by(f64::total_cmp);

        let mut best: Option<Split> = None;
        for &position in lows.iter().chain(&highs) {
            if !range.surrounds(position) {
                continue;
            }
            let below = lows.partition_point(|&lo| lo < position);
            let above = entries.len() - highs.partition_point(|&hi| hi <= position);

            let (below_box, above_box) = bounds.split(axis, position);
            let cost = self.config.traversal_cost
                + (below_box.surface_area() * self.leaf_cost(below)
                    + above_box.surface_area() * self.leaf_cost(above))
                    / area;
            if best.map_or(true, |b| cost < b.cost) {
                best = Some(Split { axis, position, cost });
            }
        }
        best
    }

    /// Cost of `split` when each child may itself split once more.
    fn lookahead_cost(&self, bounds: &Aabb, entries: &[Entry], split: &Split) -> f64 {
        let (below_box, above_box) = bounds.split(split.axis, split.position);
        let (below_entries, above_entries) = self.partition(entries, split, &below_box, &above_box);
        let below = self.subtree_cost(&below_box, &below_entries);
        let above = self.subtree_cost(&above_box, &above_entries);
        self.config.traversal_cost
            + (below_box.surface_area() * below + above_box.surface_area() * above) / bounds.surface_area()
    }

    /// Best single-level cost of a node: a leaf or its cheapest split.
    fn subtree_cost(&self, bounds: &Aabb, entries: &[Entry]) -> f64 {
        let leaf = self.leaf_cost(entries.len());
        if entries.len() <= 1 {
            return leaf;
        }
        (0..3)
            .filter_map(|axis| self.best_split_on_axis(bounds, entries, axis))
            .map(|split| split.cost)
            .fold(leaf, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdtrace_math::Vec3;

    fn unit_box_at(x: f64) -> Aabb {
        Aabb::from_min_max(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0))
    }

    fn build_boxes(boxes: &[Aabb], config: &KdTreeConfig) -> KdTree {
        KdTree::build(
            boxes.len(),
            |i| boxes[i],
            |i, cell| {
                let clipped = boxes[i].intersection(cell);
                (!clipped.is_empty()).then_some(clipped)
            },
            config,
        )
    }

    #[test]
    fn test_empty_tree() {
        let tree = build_boxes(&[], &KdTreeConfig::default());
        assert!(tree.bounding_box().is_empty());
        assert_eq!(tree.nodes, vec![KdNode::Leaf { first: 0, count: 0 }]);
        assert_eq!(tree.stats().empty_leaves, 1);
    }

    #[test]
    fn test_single_object_is_a_leaf() {
        let tree = build_boxes(&[unit_box_at(0.0)], &KdTreeConfig::default());
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.objects, vec![0]);
        assert_eq!(tree.bounding_box(), unit_box_at(0.0));
    }

    #[test]
    fn test_separated_objects_are_split() {
        let boxes: Vec<Aabb> = (0..16).map(|i| unit_box_at(3.0 * i as f64)).collect();
        let tree = build_boxes(&boxes, &KdTreeConfig::default());

        let stats = tree.stats();
        assert!(stats.leaves > 1);
        assert!(matches!(tree.nodes[0], KdNode::Interior { axis: 0, .. }));
        // Objects only touch the split planes, so none is duplicated
        assert_eq!(stats.total_leaf_entries, 16);
        assert_eq!(stats.nodes, tree.nodes.len());
    }

    #[test]
    fn test_identical_objects_terminate() {
        // Nothing to separate: every candidate plane is on the node boundary
        let boxes = vec![unit_box_at(0.0); 50];
        let tree = build_boxes(&boxes, &KdTreeConfig::default());
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.stats().total_leaf_entries, 50);
    }

    #[test]
    fn test_flat_objects_terminate() {
        // Zero-thickness boxes all lying in the plane z = 0
        let boxes: Vec<Aabb> = (0..40)
            .map(|i| {
                let x = (i % 7) as f64 * 0.3;
                let y = (i / 7) as f64 * 0.3;
                Aabb::from_min_max(Vec3::new(x, y, 0.0), Vec3::new(x + 0.5, y + 0.5, 0.0))
            })
            .collect();
        let tree = build_boxes(&boxes, &KdTreeConfig::default());
        assert!(tree.stats().max_depth <= KdTreeConfig::default().depth_limit(40));
    }

    #[test]
    fn test_depth_cap() {
        let boxes: Vec<Aabb> = (0..64).map(|i| unit_box_at(2.0 * i as f64)).collect();
        let config = KdTreeConfig {
            max_depth: Some(2),
            ..Default::default()
        };
        let tree = build_boxes(&boxes, &config);
        assert_eq!(tree.stats().max_depth, 2);
        assert!(tree.stats().leaves <= 4);
    }

    #[test]
    fn test_single_level_and_lookahead_both_split() {
        let boxes: Vec<Aabb> = (0..8).map(|i| unit_box_at(4.0 * i as f64)).collect();
        for double_recurse in [false, true] {
            let config = KdTreeConfig {
                double_recurse,
                ..Default::default()
            };
            let tree = build_boxes(&boxes, &config);
            assert!(tree.stats().leaves > 1, "double_recurse = {double_recurse}");
        }
    }

    #[test]
    fn test_straddling_object_is_in_both_children() {
        // One long box spans both clusters
        let mut boxes: Vec<Aabb> = (0..6).map(|i| unit_box_at(1.5 * i as f64)).collect();
        boxes.extend((0..6).map(|i| unit_box_at(100.0 + 1.5 * i as f64)));
        boxes.push(Aabb::from_min_max(Vec3::new(0.0, 2.0, 0.0), Vec3::new(108.0, 3.0, 1.0)));

        let tree = build_boxes(&boxes, &KdTreeConfig::default());
        let copies = tree.objects.iter().filter(|&&o| o == 12).count();
        assert!(copies >= 2);
    }
}
