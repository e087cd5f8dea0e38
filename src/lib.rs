//! A two-dimensional Barnes-Hut force engine.
//!
//! [`Plane`] owns a set of [`Particle`]s, rebuilds a [`QuadTree`] over their
//! current positions on every [`Plane::reset`] and answers force queries with
//! a [`ForceLaw`] of the caller's choice. Integration of the resulting forces
//! is left to the caller.
//!
//! ```
//! use barneshut::{Gravity, Plane, PointMass, Vector2};
//!
//! let mut plane = Plane::new(vec![
//!     PointMass::new(1., Vector2::new(-1., 0.)),
//!     PointMass::new(1., Vector2::new(1., 0.)),
//! ]);
//! plane.reset().unwrap();
//!
//! let target = plane.particles()[0];
//! let force = plane.force_on(&target, 0.5, &Gravity::default()).unwrap();
//! assert!(force.x > 0.);
//! ```

pub mod direct_summation;
pub mod error;
pub mod force;
pub mod particle;
pub mod plane;
pub mod quadtree;
pub mod tracks;
pub mod vector;

#[cfg(feature = "randomization")]
pub mod creator;

pub use error::{Error, Result};
pub use force::{ForceLaw, Gravity, InversePower};
pub use particle::{Particle, PointMass};
pub use plane::Plane;
pub use quadtree::{QuadTree, Theta};

pub type Float = f64;
pub type Vector2 = nalgebra::Vector2<Float>;

/// How [`Plane::forces`] distributes the force queries of one step.
///
/// The tree is always built on the calling thread; only the read-only
/// traversals are split up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    SingleThreaded,
    /// Split the targets into `num_threads` contiguous chunks, each handled
    /// by a scoped thread.
    Multithreaded { num_threads: usize },
    /// Let Rayon's global pool iterate over the targets.
    #[cfg(feature = "rayon")]
    RayonIter,
}
