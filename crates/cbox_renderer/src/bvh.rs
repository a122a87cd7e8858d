//! Bounding sphere hierarchy.
//!
//! Built bottom-up by repeatedly merging the closest pair of targets found
//! by a sweep along X. Every branch stores the smallest sphere enclosing both
//! children, so a ray that misses a branch sphere skips the whole subtree.

use cbox_math::{BoundingSphere, Ray};

use crate::{Hit, Primitive, PrimitiveId};

/// BVH node - either a branch with two children or a leaf with one primitive.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bounds: BoundingSphere,
    },
    /// Leaf wrapping a single bounded primitive.
    Leaf {
        id: PrimitiveId,
        bounds: BoundingSphere,
    },
}

/// Shape statistics of a built hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BvhStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
}

impl BvhNode {
    pub fn leaf(id: PrimitiveId, bounds: BoundingSphere) -> Self {
        BvhNode::Leaf { id, bounds }
    }

    /// Join two nodes under a branch with their merged bounding sphere.
    pub fn branch(left: BvhNode, right: BvhNode) -> Self {
        let bounds = BoundingSphere::merge(left.bounds(), right.bounds());
        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bounds,
        }
    }

    pub fn bounds(&self) -> &BoundingSphere {
        match self {
            BvhNode::Branch { bounds, .. } | BvhNode::Leaf { bounds, .. } => bounds,
        }
    }

    /// Build a hierarchy over the given targets by sweep merging.
    ///
    /// Returns `None` when there is nothing to build.
    pub fn build(mut targets: Vec<BvhNode>) -> Option<BvhNode> {
        while targets.len() > 1 {
            targets.sort_by(|a, b| {
                let (a, b) = (a.bounds().center, b.bounds().center);
                a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
            });

            let (i, j) = sweep_closest_pair(&targets);

            // j > i, so removing j first leaves i in place
            let second = targets.swap_remove(j);
            let first = targets.swap_remove(i);
            targets.push(BvhNode::branch(first, second));
        }

        targets.pop()
    }

    /// Closest intersection among the primitives under this node.
    pub fn closest_hit(&self, ray: &Ray, primitives: &[Primitive]) -> Option<Hit> {
        match self {
            BvhNode::Leaf { id, .. } => primitives
                .get(*id)?
                .closest_hit(ray)
                .map(|lambda| Hit { lambda, id: *id }),

            BvhNode::Branch { left, right, bounds } => {
                if !bounds.may_intersect(ray) {
                    return None;
                }

                Hit::nearest(
                    left.closest_hit(ray, primitives),
                    right.closest_hit(ray, primitives),
                )
            }
        }
    }

    /// Count nodes and leaves and measure the depth.
    pub fn stats(&self) -> BvhStats {
        match self {
            BvhNode::Leaf { .. } => BvhStats {
                nodes: 1,
                leaves: 1,
                depth: 1,
            },
            BvhNode::Branch { left, right, .. } => {
                let (l, r) = (left.stats(), right.stats());
                BvhStats {
                    nodes: l.nodes + r.nodes + 1,
                    leaves: l.leaves + r.leaves,
                    depth: l.depth.max(r.depth) + 1,
                }
            }
        }
    }
}

/// Approximate closest pair of a slice sorted by centre X.
///
/// Keeps a window `[left, right)` of candidates. The leftmost candidate is
/// retired once its X lies at least the best squared distance behind the
/// incoming target; otherwise the incoming target is compared with every
/// candidate and joins the window. Returns indices `(i, j)` with `i < j`.
fn sweep_closest_pair(targets: &[BvhNode]) -> (usize, usize) {
    let center = |k: usize| targets[k].bounds().center;
    let n = targets.len();

    let mut best = (0, 1);
    let mut min = center(0).distance_squared(center(1));
    let (mut left, mut right) = (0, 2);

    while right < n {
        let incoming = center(right);

        if left < right && center(left).x <= incoming.x - min {
            left += 1;
            continue;
        }

        for k in left..right {
            let dist = center(k).distance_squared(incoming);
            if dist < min {
                min = dist;
                best = (k, right);
            }
        }
        right += 1;
    }

    best
}
