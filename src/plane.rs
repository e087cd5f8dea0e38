use std::{panic, thread};

use log::{debug, trace, warn};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    direct_summation,
    error::{Error, Result},
    force::ForceLaw,
    particle::Particle,
    quadtree::{QuadTree, Theta, DEFAULT_MARGIN, DEFAULT_MAX_DEPTH},
    vector, Execution, Float, Vector2,
};

/// A set of particles and the Barnes-Hut tree over their positions.
///
/// The tree is a snapshot: it reflects the particles as they were at the last
/// [`Plane::reset`]. Call `reset` at the start of every step, after the
/// particles have moved.
#[derive(Clone, Debug)]
pub struct Plane<P: Particle> {
    particles: Vec<P>,
    tree: Option<QuadTree>,
    max_depth: usize,
    direct_threshold: usize,
    margin: Float,
}

impl<P: Particle> Plane<P> {
    /// Create a plane without a tree. Until [`Plane::reset`] is called, force
    /// queries fall back to direct summation.
    #[must_use]
    pub fn new(particles: Vec<P>) -> Self {
        Self {
            particles,
            tree: None,
            max_depth: DEFAULT_MAX_DEPTH,
            direct_threshold: 0,
            margin: DEFAULT_MARGIN,
        }
    }

    /// Limit the subdivision depth of the tree.
    ///
    /// Distinct particles still sharing a leaf at this depth are merged into
    /// that leaf instead of splitting it further.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Skip building a tree for at most `n` particles and sum directly.
    #[must_use]
    pub fn direct_threshold(mut self, n: usize) -> Self {
        self.direct_threshold = n;
        self
    }

    /// Relative padding around the particles when sizing the root node.
    #[must_use]
    pub fn margin(mut self, margin: Float) -> Self {
        self.margin = margin;
        self
    }

    /// Throw away the current tree and build a new one from the current
    /// particle positions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonFiniteParticle`] if a particle has a non-finite
    /// position or mass. The plane is left without a tree in that case.
    pub fn reset(&mut self) -> Result<()> {
        self.tree = None;

        if let Some(index) = self
            .particles
            .iter()
            .position(|p| !vector::is_finite(&p.position()) || !p.mass().is_finite())
        {
            return Err(Error::NonFiniteParticle { index });
        }

        if self.particles.len() <= self.direct_threshold {
            trace!(
                "{} particles, skipping tree and summing directly",
                self.particles.len()
            );
            return Ok(());
        }

        let Some(tree) = QuadTree::from_particles(&self.particles, self.margin, self.max_depth)
        else {
            return Ok(());
        };

        debug!(
            "built tree over {} particles: {} nodes, depth {}",
            tree.particle_count(),
            tree.len(),
            tree.depth()
        );
        if tree.coalesced() > 0 {
            warn!(
                "{} particles merged into neighbours at depth limit {}",
                tree.coalesced(),
                tree.max_depth()
            );
        }

        self.tree = Some(tree);
        Ok(())
    }

    /// The force `law` exerts on `target` from all particles of the plane.
    ///
    /// `target` does not have to be one of the plane's particles; if it is, its
    /// self-force is excluded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTheta`] for a negative or non-finite `theta`.
    pub fn force_on<T, L>(&self, target: &T, theta: Float, law: &L) -> Result<Vector2>
    where
        T: Particle + ?Sized,
        L: ForceLaw + ?Sized,
    {
        Ok(self.force_on_with(target, Theta::new(theta)?, law))
    }

    /// Like [`Plane::force_on`], with an already validated theta.
    pub fn force_on_with<T, L>(&self, target: &T, theta: Theta, law: &L) -> Vector2
    where
        T: Particle + ?Sized,
        L: ForceLaw + ?Sized,
    {
        self.force_at(&target.position(), target.mass(), theta, law)
    }

    fn force_at<L: ForceLaw + ?Sized>(
        &self,
        position: &Vector2,
        mass: Float,
        theta: Theta,
        law: &L,
    ) -> Vector2 {
        match &self.tree {
            Some(tree) => tree.force_on(position, mass, theta, law),
            None => direct_summation::force_on(&self.particles, position, mass, law),
        }
    }

    /// The force on each of the plane's particles, in index order.
    ///
    /// Every strategy of `execution` gives the same result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTheta`] for a negative or non-finite `theta` and
    /// [`Error::InvalidThreadCount`] for zero threads.
    pub fn forces<L>(&self, theta: Float, law: &L, execution: Execution) -> Result<Vec<Vector2>>
    where
        P: Sync,
        L: ForceLaw + ?Sized,
    {
        let theta = Theta::new(theta)?;

        let forces: Vec<Vector2> = match execution {
            Execution::SingleThreaded => self
                .particles
                .iter()
                .map(|p| self.force_on_with(p, theta, law))
                .collect(),
            Execution::Multithreaded { num_threads } => {
                if num_threads == 0 {
                    return Err(Error::InvalidThreadCount);
                }
                let chunk_size = self.particles.len().div_ceil(num_threads).max(1);

                thread::scope(|s| {
                    let handles: Vec<_> = self
                        .particles
                        .chunks(chunk_size)
                        .map(|chunk| {
                            s.spawn(move || {
                                chunk
                                    .iter()
                                    .map(|p| self.force_on_with(p, theta, law))
                                    .collect::<Vec<_>>()
                            })
                        })
                        .collect();

                    handles
                        .into_iter()
                        .flat_map(|handle| {
                            handle
                                .join()
                                .unwrap_or_else(|payload| panic::resume_unwind(payload))
                        })
                        .collect()
                })
            }
            #[cfg(feature = "rayon")]
            Execution::RayonIter => self
                .particles
                .par_iter()
                .map(|p| self.force_on_with(p, theta, law))
                .collect(),
        };

        Ok(forces)
    }

    #[must_use]
    pub fn particles(&self) -> &[P] {
        &self.particles
    }

    /// Mutable access to the particles, e.g. to integrate a step.
    ///
    /// This drops the tree, since it no longer matches the particles. Queries
    /// before the next [`Plane::reset`] are answered by exact summation.
    pub fn particles_mut(&mut self) -> &mut [P] {
        self.tree = None;
        &mut self.particles
    }

    #[must_use]
    pub fn into_particles(self) -> Vec<P> {
        self.particles
    }

    /// The tree of the last [`Plane::reset`], if one was built.
    #[must_use]
    pub fn tree(&self) -> Option<&QuadTree> {
        self.tree.as_ref()
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.tree.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
