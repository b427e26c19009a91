//! Front-to-back traversal along a ray.

use kdtrace_math::Vec3;

use super::{KdNode, KdTree, MAX_TODO};

/// What a candidate callback found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visit {
    /// The object is not hit closer than the current stop distance.
    Miss,
    /// The object is hit; traversal may ignore everything beyond the given
    /// distance.
    Hit(f64),
    /// Stop the traversal now.
    Abort,
}

/// A node still to be visited and the ray's parameter range inside it.
#[derive(Debug, Clone, Copy, Default)]
struct KdTodo {
    node: usize,
    t_min: f64,
    t_max: f64,
}

impl KdTree {
    /// Walk the leaves pierced by the ray `origin + t * direction`,
    /// `0 <= t <= max_distance`, nearest first.
    ///
    /// `on_candidate(object, stop)` is called for every object of every
    /// visited leaf, with the current stop distance. An object stored in
    /// several leaves may be offered more than once. Leaves starting at or
    /// beyond the stop distance are skipped. With `stop_on_first_hit` the
    /// walk ends at the first [`Visit::Hit`].
    ///
    /// Returns `true` if any callback reported a hit or aborted.
    pub fn traverse<F>(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f64,
        stop_on_first_hit: bool,
        mut on_candidate: F,
    ) -> bool
    where
        F: FnMut(usize, f64) -> Visit,
    {
        let Some((mut t_min, mut t_max)) = self.bounds.ray_range(origin, direction, max_distance)
        else {
            return false;
        };

        let mut stop = max_distance;
        let mut found = false;
        let mut todo = [KdTodo::default(); MAX_TODO];
        let mut todo_len = 0;
        let mut node = 0;

        loop {
            // A cell starting beyond the stop distance is skipped, not the
            // whole walk: a ray lying in a split plane leaves the todo stack
            // out of distance order.
            if t_min < stop {
                match self.nodes[node] {
                    KdNode::Interior {
                        axis,
                        split,
                        below,
                        above,
                    } => {
                        let o = origin[axis];
                        let d = direction[axis];

                        if d == 0.0 {
                            // Parallel to the plane: the ray stays on one side, or
                            // lies in the plane and touches both cells.
                            if o == split {
                                todo[todo_len] = KdTodo {
                                    node: above,
                                    t_min,
                                    t_max,
                                };
                                todo_len += 1;
                            }
                            node = if o <= split { below } else { above };
                            continue;
                        }

                        let (near, far) = if o < split || (o == split && d < 0.0) {
                            (below, above)
                        } else {
                            (above, below)
                        };
                        let t_split = (split - o) / d;

                        if t_split > t_max || t_split <= 0.0 {
                            node = near;
                        } else if t_split < t_min {
                            node = far;
                        } else {
                            todo[todo_len] = KdTodo {
                                node: far,
                                t_min: t_split,
                                t_max,
                            };
                            todo_len += 1;
                            node = near;
                            t_max = t_split;
                        }
                        continue;
                    }
                    KdNode::Leaf { first, count } => {
                        for &object in &self.objects[first..first + count] {
                            match on_candidate(object, stop) {
                                Visit::Miss => {}
                                Visit::Hit(distance) => {
                                    debug_assert!(distance >= 0.0, "negative hit distance {distance}");
                                    found = true;
                                    stop = stop.min(distance);
                                    if stop_on_first_hit {
                                        return true;
                                    }
                                }
                                Visit::Abort => return true,
                            }
                        }
                    }
                }
            }

            if todo_len == 0 {
                break;
            }
            todo_len -= 1;
            let next = todo[todo_len];
            node = next.node;
            t_min = next.t_min;
            t_max = next.t_max;
        }

        found
    }

    /// Every object offered to the callback by a full traversal of the ray,
    /// sorted and without repeats.
    pub fn candidates(&self, origin: Vec3, direction: Vec3) -> Vec<usize> {
        let mut objects = Vec::new();
        self.traverse(origin, direction, f64::INFINITY, false, |object, _| {
            objects.push(object);
            Visit::Miss
        });
        objects.sort_unstable();
        objects.dedup();
        objects
    }
}
