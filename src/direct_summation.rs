//! Exact pairwise summation.
//!
//! Used by [`Plane`](crate::Plane) when no tree is built, and as the reference
//! the tree is checked against.

use crate::{
    force::ForceLaw,
    particle::Particle,
    vector::separation,
    Float, Vector2,
};

/// Exact force on a particle of `mass` at `position` from all `particles`.
///
/// Particles at `position` itself are skipped, matching the self-force rule
/// of the tree traversal.
pub fn force_on<P, L>(particles: &[P], position: &Vector2, mass: Float, law: &L) -> Vector2
where
    P: Particle,
    L: ForceLaw + ?Sized,
{
    let mut force = Vector2::zeros();
    for p in particles {
        let source = p.position();
        if source == *position {
            continue;
        }
        force += law.force(&separation(position, &source), p.mass(), mass);
    }
    force
}

/// Exact forces on every particle, in index order.
pub fn forces<P, L>(particles: &[P], law: &L) -> Vec<Vector2>
where
    P: Particle,
    L: ForceLaw + ?Sized,
{
    particles
        .iter()
        .map(|p| force_on(particles, &p.position(), p.mass(), law))
        .collect()
}
