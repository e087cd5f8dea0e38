//! The spatial tree behind [`Plane`](crate::Plane).
//!
//! Nodes live in an arena (`Vec<QuadNode>`) and refer to their children by
//! index, so a tree is a single allocation that is thrown away as a whole on
//! the next rebuild.

use std::ops::{Deref, DerefMut};

use log::trace;

use crate::{
    error::{Error, Result},
    force::ForceLaw,
    particle::{Particle, PointMass},
    vector::{distance, separation},
    Float, Vector2,
};

/// Index of a node in a [`QuadTree`].
pub type NodeId = usize;

/// Deepest level a leaf may be subdivided to. Particles that still share a
/// leaf at this depth are merged into one pseudo-particle.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Relative padding added around the particles when sizing the root.
pub const DEFAULT_MARGIN: Float = 0.01;

const ROOT: NodeId = 0;
const EMPTY: NodeId = NodeId::MAX;

/// The Barnes-Hut acceptance parameter.
///
/// A node of width `s` whose center of mass is at distance `d` from the target
/// is treated as a single pseudo-particle if `s / d < theta`. Zero gives the
/// exact result, larger values trade accuracy for speed.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Theta(Float);

impl Theta {
    /// Never approximate.
    pub const EXACT: Theta = Theta(0.);

    /// Rejects NaN, infinite and negative values.
    pub fn new(theta: Float) -> Result<Self> {
        if theta.is_finite() && theta >= 0. {
            Ok(Self(theta))
        } else {
            Err(Error::InvalidTheta(theta))
        }
    }

    #[must_use]
    pub fn get(self) -> Float {
        self.0
    }

    /// Whether a node of `width` at `distance` may stand in for its subtree.
    #[inline]
    #[must_use]
    pub fn accepts(self, width: Float, distance: Float) -> bool {
        distance > 0. && width / distance < self.0
    }
}

impl Default for Theta {
    fn default() -> Self {
        Self(0.5)
    }
}

impl TryFrom<Float> for Theta {
    type Error = Error;

    fn try_from(theta: Float) -> Result<Self> {
        Self::new(theta)
    }
}

/// An axis-aligned square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Square {
    pub center: Vector2,
    pub half_width: Float,
}

impl Square {
    #[must_use]
    pub fn new(center: Vector2, half_width: Float) -> Self {
        Self { center, half_width }
    }

    /// The smallest square around `positions`, widened by `margin` (relative).
    ///
    /// Returns `None` for no positions. If all positions coincide the square
    /// gets a side length of one. The half width saturates at `Float::MAX`, so
    /// positions spread over the whole finite range still get a finite square.
    pub fn enclosing<'a>(
        positions: impl IntoIterator<Item = &'a Vector2>,
        margin: Float,
    ) -> Option<Self> {
        let mut positions = positions.into_iter();
        let first = positions.next()?;
        let (mut v_min, mut v_max) = (*first, *first);
        for pos in positions {
            v_min = v_min.inf(pos);
            v_max = v_max.sup(pos);
        }

        // halved before combining, so extremes near Float::MAX cannot overflow
        let (v_min, v_max) = (v_min / 2., v_max / 2.);
        let half_extent = (v_max - v_min).max();
        let half_width = if half_extent > 0. {
            (half_extent * (1. + margin)).min(Float::MAX)
        } else {
            0.5
        };

        Some(Self::new(v_min + v_max, half_width))
    }

    #[must_use]
    pub fn width(&self) -> Float {
        2. * self.half_width
    }

    /// Inclusive on all edges.
    #[must_use]
    pub fn contains(&self, position: &Vector2) -> bool {
        (position.x - self.center.x).abs() <= self.half_width
            && (position.y - self.center.y).abs() <= self.half_width
    }

    /// Quadrant index of `position`: 0 south-west, 1 south-east, 2 north-west,
    /// 3 north-east.
    ///
    /// Positions on a dividing line belong to the lower/left side.
    #[must_use]
    pub fn quadrant(&self, position: &Vector2) -> usize {
        let east = position.x > self.center.x;
        let north = position.y > self.center.y;
        usize::from(east) + 2 * usize::from(north)
    }

    #[must_use]
    pub fn child(&self, quadrant: usize) -> Self {
        let step_size = self.half_width / 2.;
        let dx = if quadrant & 1 == 1 { step_size } else { -step_size };
        let dy = if quadrant & 2 == 2 { step_size } else { -step_size };
        Self::new(self.center + Vector2::new(dx, dy), step_size)
    }
}

#[derive(Clone, Debug)]
struct Subnodes([NodeId; 4]);

impl Default for Subnodes {
    fn default() -> Self {
        Self([EMPTY; 4])
    }
}

impl Deref for Subnodes {
    type Target = [NodeId; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Subnodes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// A square region of the plane and the aggregate of the particles in it.
///
/// A node is either a leaf holding the particles at one position (or, at the
/// depth limit, whatever ended up there) or an inner node with up to four
/// children.
#[derive(Clone, Debug)]
pub struct QuadNode {
    region: Square,
    aggregate: PointMass,
    count: usize,
    depth: usize,
    subnodes: Option<Subnodes>,
    members: Vec<PointMass>,
}

impl QuadNode {
    fn new(region: Square, depth: usize) -> Self {
        Self {
            region,
            aggregate: PointMass::new(0., region.center),
            count: 0,
            depth,
            subnodes: None,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn region(&self) -> &Square {
        &self.region
    }

    /// Total mass and center of mass of the subtree.
    #[must_use]
    pub fn aggregate(&self) -> &PointMass {
        &self.aggregate
    }

    #[must_use]
    pub fn mass(&self) -> Float {
        self.aggregate.mass
    }

    #[must_use]
    pub fn center_of_mass(&self) -> Vector2 {
        self.aggregate.position
    }

    /// Number of particles in the subtree.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.subnodes.is_none()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The distinct positions merged into this leaf at the depth limit, each
    /// with the mass of the particles there. Empty for every other node.
    #[must_use]
    pub fn members(&self) -> &[PointMass] {
        &self.members
    }

    /// The existing children, in quadrant order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.subnodes
            .iter()
            .flat_map(|subnodes| subnodes.iter().copied())
            .filter(|&id| id != EMPTY)
    }
}

/// A Barnes-Hut quadtree.
#[derive(Clone, Debug)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    max_depth: usize,
    depth: usize,
    coalesced: usize,
}

impl QuadTree {
    /// An empty tree covering `region`.
    #[must_use]
    pub fn new(region: Square, max_depth: usize) -> Self {
        Self::with_capacity(region, max_depth, 1)
    }

    /// Build a tree over `particles`, with the root sized to enclose all of
    /// them. Returns `None` if there are no particles.
    pub fn from_particles<P: Particle>(
        particles: &[P],
        margin: Float,
        max_depth: usize,
    ) -> Option<Self> {
        let points: Vec<PointMass> = particles
            .iter()
            .map(|p| PointMass::new(p.mass(), p.position()))
            .collect();
        let region = Square::enclosing(points.iter().map(|p| &p.position), margin)?;

        let mut tree = Self::with_capacity(region, max_depth, 2 * points.len());
        for point in &points {
            tree.insert_unchecked(point.mass, point.position);
        }

        Some(tree)
    }

    fn with_capacity(region: Square, max_depth: usize, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(QuadNode::new(region, 0));
        Self {
            nodes,
            max_depth,
            depth: 0,
            coalesced: 0,
        }
    }

    fn push_node(&mut self, region: Square, depth: usize) -> NodeId {
        self.depth = self.depth.max(depth);
        self.nodes.push(QuadNode::new(region, depth));
        self.nodes.len() - 1
    }

    /// Insert a particle, updating the aggregates along its path.
    ///
    /// Returns `false`, leaving the tree untouched, if `position` lies outside
    /// the root region.
    pub fn insert(&mut self, mass: Float, position: Vector2) -> bool {
        if !self.region().contains(&position) {
            return false;
        }
        self.insert_unchecked(mass, position);
        true
    }

    fn insert_unchecked(&mut self, mass: Float, position: Vector2) {
        let mut id = ROOT;
        loop {
            let node = &mut self.nodes[id];

            // Empty leaf, only possible for the root
            if node.count == 0 {
                node.aggregate = PointMass::new(mass, position);
                node.count = 1;
                return;
            }

            if let Some(subnodes) = &node.subnodes {
                // Inner node, merge and descend
                let quadrant = node.region.quadrant(&position);
                let child = subnodes[quadrant];
                node.aggregate.merge(mass, &position);
                node.count += 1;

                if child != EMPTY {
                    id = child;
                    continue;
                }

                let (region, depth) = (node.region.child(quadrant), node.depth + 1);
                let new_child = self.push_node(region, depth);
                self.nodes[new_child].aggregate = PointMass::new(mass, position);
                self.nodes[new_child].count = 1;
                if let Some(subnodes) = &mut self.nodes[id].subnodes {
                    subnodes[quadrant] = new_child;
                }
                return;
            }

            // Occupied leaf: coincident particles and the depth limit merge,
            // everything else subdivides
            let distinct = node.aggregate.position != position || !node.members.is_empty();
            if node.depth >= self.max_depth && distinct {
                if node.members.is_empty() {
                    node.members.push(node.aggregate);
                }
                match node.members.iter_mut().find(|m| m.position == position) {
                    Some(member) => member.mass += mass,
                    None => {
                        trace!("coalescing particle at {position:?} at depth {}", node.depth);
                        node.members.push(PointMass::new(mass, position));
                        self.coalesced += 1;
                    }
                }
                node.aggregate.merge(mass, &position);
                node.count += 1;
                return;
            }
            if !distinct {
                node.aggregate.merge(mass, &position);
                node.count += 1;
                return;
            }

            let occupant = node.aggregate;
            let occupant_count = node.count;
            let quadrant = node.region.quadrant(&occupant.position);
            let (region, depth) = (node.region.child(quadrant), node.depth + 1);

            let child = self.push_node(region, depth);
            self.nodes[child].aggregate = occupant;
            self.nodes[child].count = occupant_count;

            let mut subnodes = Subnodes::default();
            subnodes[quadrant] = child;
            self.nodes[id].subnodes = Some(subnodes);
            // Same node again, now as an inner node
        }
    }

    #[must_use]
    pub fn root(&self) -> &QuadNode {
        &self.nodes[ROOT]
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&QuadNode> {
        self.nodes.get(id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root().is_empty()
    }

    /// Depth of the deepest node; a lone root has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of non-coincident particles merged into a leaf because the depth
    /// limit was reached.
    #[must_use]
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.root().count
    }

    #[must_use]
    pub fn total_mass(&self) -> Float {
        self.root().mass()
    }

    #[must_use]
    pub fn center_of_mass(&self) -> Vector2 {
        self.root().center_of_mass()
    }

    #[must_use]
    pub fn region(&self) -> &Square {
        self.root().region()
    }

    /// Approximate force on a particle of `mass` at `position`.
    ///
    /// Leaves at `position` contribute nothing, so querying a particle that is
    /// part of the tree excludes its self-force.
    pub fn force_on<L: ForceLaw + ?Sized>(
        &self,
        position: &Vector2,
        mass: Float,
        theta: Theta,
        law: &L,
    ) -> Vector2 {
        if self.is_empty() {
            return Vector2::zeros();
        }
        self.node_force(ROOT, position, mass, theta, law)
    }

    fn node_force<L: ForceLaw + ?Sized>(
        &self,
        id: NodeId,
        position: &Vector2,
        mass: Float,
        theta: Theta,
        law: &L,
    ) -> Vector2 {
        let node = &self.nodes[id];
        let pseudo = &node.aggregate;

        match &node.subnodes {
            // merged at the depth limit, sum the members so the target
            // never pulls on itself
            None if !node.members.is_empty() => node
                .members
                .iter()
                .filter(|member| member.position != *position)
                .map(|member| {
                    law.force(&separation(position, &member.position), member.mass, mass)
                })
                .sum(),
            None => {
                if pseudo.position == *position {
                    return Vector2::zeros();
                }
                law.force(&separation(position, &pseudo.position), pseudo.mass, mass)
            }
            Some(subnodes) => {
                if theta.accepts(node.region.width(), distance(position, &pseudo.position)) {
                    // far enough away, use the pseudo-particle
                    return law.force(&separation(position, &pseudo.position), pseudo.mass, mass);
                }

                // near field, go deeper into tree
                let mut force = Vector2::zeros();
                for &child in subnodes.iter().filter(|&&child| child != EMPTY) {
                    force += self.node_force(child, position, mass, theta, law);
                }
                force
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::{direct_summation, force::Gravity};

    fn random_points(n: usize, seed: u64) -> Vec<PointMass> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                PointMass::new(
                    rng.gen_range(0.1..10.0),
                    Vector2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)),
                )
            })
            .collect()
    }

    fn build(points: &[PointMass]) -> QuadTree {
        QuadTree::from_particles(points, DEFAULT_MARGIN, DEFAULT_MAX_DEPTH).unwrap()
    }

    /// Check aggregates and regions of every node against its children.
    fn check_node(tree: &QuadTree, id: NodeId) {
        let node = tree.node(id).unwrap();
        assert!(node.count() > 0);
        assert!(node.region().contains(&node.center_of_mass()));

        if node.is_leaf() {
            return;
        }

        let mut mass = 0.;
        let mut count = 0;
        let mut moment = Vector2::zeros();
        for child in node.children() {
            let child_node = tree.node(child).unwrap();
            assert_eq!(child_node.depth(), node.depth() + 1);
            assert_abs_diff_eq!(child_node.region().width(), node.region().width() / 2.);
            mass += child_node.mass();
            count += child_node.count();
            moment += child_node.center_of_mass() * child_node.mass();
            check_node(tree, child);
        }
        assert_eq!(count, node.count());
        assert_abs_diff_eq!(mass, node.mass(), epsilon = 1e-9);
        assert_abs_diff_eq!(moment / mass, node.center_of_mass(), epsilon = 1e-9);
    }

    #[test]
    fn theta_validation() {
        assert!(Theta::new(0.).is_ok());
        assert!(Theta::new(1.5).is_ok());
        assert_eq!(Theta::new(-0.1), Err(Error::InvalidTheta(-0.1)));
        assert!(Theta::new(Float::NAN).is_err());
        assert!(Theta::try_from(Float::INFINITY).is_err());
        assert_eq!(Theta::default().get(), 0.5);
    }

    #[test]
    fn acceptance() {
        let theta = Theta::new(0.5).unwrap();
        assert!(theta.accepts(1., 3.));
        assert!(!theta.accepts(1., 2.));
        assert!(!theta.accepts(1., 0.));
        assert!(!Theta::EXACT.accepts(1e-9, 1e9));
    }

    #[test]
    fn enclosing_square() {
        let positions = [
            Vector2::new(-1., 0.),
            Vector2::new(3., 1.),
            Vector2::new(0., -2.),
        ];
        let square = Square::enclosing(&positions, 0.).unwrap();

        assert_eq!(square.center, Vector2::new(1., -0.5));
        assert_abs_diff_eq!(square.width(), 4.);
        for pos in &positions {
            assert!(square.contains(pos));
        }

        let padded = Square::enclosing(&positions, 0.1).unwrap();
        assert_abs_diff_eq!(padded.width(), 4.4);
    }

    #[test]
    fn enclosing_degenerate() {
        assert!(Square::enclosing(std::iter::empty(), 0.1).is_none());

        let square = Square::enclosing(&[Vector2::new(2., 2.)], 0.1).unwrap();
        assert_eq!(square.center, Vector2::new(2., 2.));
        assert_abs_diff_eq!(square.width(), 1.);
    }

    #[test]
    fn quadrants() {
        let square = Square::new(Vector2::zeros(), 1.);
        assert_eq!(square.quadrant(&Vector2::new(-0.5, -0.5)), 0);
        assert_eq!(square.quadrant(&Vector2::new(0.5, -0.5)), 1);
        assert_eq!(square.quadrant(&Vector2::new(-0.5, 0.5)), 2);
        assert_eq!(square.quadrant(&Vector2::new(0.5, 0.5)), 3);

        // dividing lines go to the lower/left quadrant
        assert_eq!(square.quadrant(&Vector2::new(0., 0.)), 0);
        assert_eq!(square.quadrant(&Vector2::new(0., 0.5)), 2);
        assert_eq!(square.quadrant(&Vector2::new(0.5, 0.)), 1);

        for q in 0..4 {
            let child = square.child(q);
            assert_abs_diff_eq!(child.half_width, 0.5);
            assert_eq!(square.quadrant(&child.center), q);
        }
    }

    #[test]
    fn single_particle() {
        let tree = build(&[PointMass::new(2., Vector2::new(1., 1.))]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.depth(), 0);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.total_mass(), 2.);
        assert_eq!(
            tree.force_on(&Vector2::new(1., 1.), 2., Theta::EXACT, &Gravity::default()),
            Vector2::zeros()
        );
    }

    #[test]
    fn empty_tree() {
        let tree = QuadTree::new(Square::new(Vector2::zeros(), 1.), DEFAULT_MAX_DEPTH);

        assert!(tree.is_empty());
        assert_eq!(
            tree.force_on(&Vector2::new(0.5, 0.), 1., Theta::EXACT, &Gravity::default()),
            Vector2::zeros()
        );
    }

    #[test]
    fn aggregates() {
        let points = random_points(200, 0);
        let tree = build(&points);

        let mass: Float = points.iter().map(|p| p.mass).sum();
        assert_eq!(tree.particle_count(), points.len());
        assert_abs_diff_eq!(tree.total_mass(), mass, epsilon = 1e-9);
        assert!(tree.region().contains(&tree.center_of_mass()));
        check_node(&tree, 0);
    }

    #[test]
    fn leaves_hold_one_position() {
        let points = random_points(100, 1);
        let tree = build(&points);

        let leaves: Vec<_> = (0..tree.len())
            .filter_map(|id| tree.node(id))
            .filter(|node| node.is_leaf())
            .collect();
        assert_eq!(leaves.len(), points.len());
        assert!(leaves.iter().all(|leaf| leaf.count() == 1));
    }

    #[test]
    fn coincident_particles_are_coalesced() {
        let pos = Vector2::new(0.25, -0.75);
        let mut points = vec![PointMass::new(1., pos); 10];
        points.push(PointMass::new(3., Vector2::new(5., 5.)));
        let tree = build(&points);

        assert_eq!(tree.particle_count(), 11);
        assert_abs_diff_eq!(tree.total_mass(), 13.);
        assert_eq!(tree.coalesced(), 0);

        let leaves: Vec<_> = (0..tree.len())
            .filter_map(|id| tree.node(id))
            .filter(|node| node.is_leaf())
            .collect();
        assert_eq!(leaves.len(), 2);
        assert!(leaves
            .iter()
            .any(|leaf| leaf.count() == 10 && leaf.center_of_mass() == pos));
        check_node(&tree, 0);
    }

    #[test]
    fn depth_limit() {
        let points = [
            PointMass::new(1., Vector2::new(0., 0.)),
            PointMass::new(1., Vector2::new(1e-9, 1e-9)),
            PointMass::new(1., Vector2::new(10., 10.)),
        ];
        let tree = QuadTree::from_particles(&points, DEFAULT_MARGIN, 4).unwrap();

        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.coalesced(), 1);
        assert_eq!(tree.particle_count(), 3);
        assert_abs_diff_eq!(tree.total_mass(), 3.);
        check_node(&tree, 0);

        let leaf = (0..tree.len())
            .filter_map(|id| tree.node(id))
            .find(|node| node.is_leaf() && node.count() == 2)
            .unwrap();
        assert_eq!(leaf.members().len(), 2);
    }

    #[test]
    fn depth_limit_excludes_self_force() {
        let gravity = Gravity::default();
        for (max_depth, gap) in [(DEFAULT_MAX_DEPTH, 1e-20), (4, 1e-3)] {
            let points = [
                PointMass::new(1., Vector2::new(0., 0.)),
                PointMass::new(1., Vector2::new(gap, 0.)),
                PointMass::new(1., Vector2::new(10., 10.)),
            ];
            let tree = QuadTree::from_particles(&points, DEFAULT_MARGIN, max_depth).unwrap();
            assert_eq!(tree.coalesced(), 1);

            for p in &points {
                let bh = tree.force_on(&p.position, p.mass, Theta::EXACT, &gravity);
                let ds = direct_summation::force_on(&points, &p.position, p.mass, &gravity);
                assert_relative_eq!(bh, ds, epsilon = 1e-12, max_relative = 1e-9);
            }

            // a point between the merged pair feels both of them
            let between = Vector2::new(gap / 2., 0.);
            let bh = tree.force_on(&between, 1., Theta::EXACT, &gravity);
            let ds = direct_summation::force_on(&points, &between, 1., &gravity);
            assert_relative_eq!(bh, ds, epsilon = 1e-12, max_relative = 1e-9);
        }
    }

    #[test]
    fn depth_limit_keeps_coincident_members_together() {
        let points = [
            PointMass::new(1., Vector2::new(0., 0.)),
            PointMass::new(2., Vector2::new(1e-3, 0.)),
            PointMass::new(3., Vector2::new(1e-3, 0.)),
            PointMass::new(1., Vector2::new(10., 10.)),
        ];
        let tree = QuadTree::from_particles(&points, DEFAULT_MARGIN, 4).unwrap();
        assert_eq!(tree.coalesced(), 1);

        let gravity = Gravity::default();
        let target = Vector2::new(1e-3, 0.);
        let bh = tree.force_on(&target, 2., Theta::EXACT, &gravity);
        let ds = direct_summation::force_on(&points, &target, 2., &gravity);
        assert_relative_eq!(bh, ds, epsilon = 1e-12, max_relative = 1e-9);
    }

    #[test]
    fn insert_outside_region_is_rejected() {
        let mut tree = QuadTree::new(Square::new(Vector2::zeros(), 1.), DEFAULT_MAX_DEPTH);

        assert!(tree.insert(1., Vector2::new(0.5, 0.5)));
        assert!(tree.insert(2., Vector2::new(-1., 1.)));
        assert!(!tree.insert(5., Vector2::new(1.5, 0.)));

        assert_eq!(tree.particle_count(), 2);
        assert_abs_diff_eq!(tree.total_mass(), 3.);
        check_node(&tree, 0);
    }

    #[test]
    fn enclosing_extreme_positions() {
        let positions = [
            Vector2::new(-0.9 * Float::MAX, -0.9 * Float::MAX),
            Vector2::new(0.9 * Float::MAX, 0.9 * Float::MAX),
        ];
        let square = Square::enclosing(&positions, DEFAULT_MARGIN).unwrap();
        assert!(square.half_width.is_finite());
        assert!(square.center.iter().all(|c| c.is_finite()));
        for pos in &positions {
            assert!(square.contains(pos));
        }

        let points: Vec<_> = positions.iter().map(|&p| PointMass::new(1., p)).collect();
        let tree = build(&points);
        assert_eq!(tree.coalesced(), 0);
        assert_eq!(tree.depth(), 1);
        assert!(tree.region().child(0).center.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn exact_traversal_matches_direct_summation() {
        let points = random_points(100, 2);
        let tree = build(&points);
        let gravity = Gravity::default();

        for p in &points {
            let bh = tree.force_on(&p.position, p.mass, Theta::EXACT, &gravity);
            let ds = direct_summation::force_on(&points, &p.position, p.mass, &gravity);
            assert_relative_eq!(bh, ds, epsilon = 1e-9, max_relative = 1e-9);
        }
    }

    #[test]
    fn centroid_at_target_recurses() {
        // center of mass of the two particles is the origin
        let points = [
            PointMass::new(1., Vector2::new(-1., 0.)),
            PointMass::new(2., Vector2::new(0.5, 0.)),
        ];
        let tree = build(&points);
        assert_abs_diff_eq!(tree.center_of_mass(), Vector2::zeros(), epsilon = 1e-12);

        let theta = Theta::new(100.).unwrap();
        let force = tree.force_on(&Vector2::zeros(), 1., theta, &Gravity::default());
        assert_abs_diff_eq!(force, Vector2::new(7., 0.), epsilon = 1e-9);
    }

    #[test]
    fn far_cluster_is_aggregated() {
        let cluster: Vec<_> = (0..16)
            .map(|i| {
                let (x, y) = ((i % 4) as Float, (i / 4) as Float);
                PointMass::new(0.1, Vector2::new(0.01 * x, 0.01 * y))
            })
            .collect();
        let tree = build(&cluster);
        let far = Vector2::new(1000., 0.);
        let gravity = Gravity::default();

        let approx = tree.force_on(&far, 1e3, Theta::new(1.).unwrap(), &gravity);
        let exact = direct_summation::force_on(&cluster, &far, 1e3, &gravity);
        let pseudo = gravity.force(&(far - tree.center_of_mass()), tree.total_mass(), 1e3);

        assert_eq!(approx, pseudo);
        assert_abs_diff_eq!(approx, exact, epsilon = 1e-6 * exact.norm());
    }
}
