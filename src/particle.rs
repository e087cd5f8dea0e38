use crate::{Float, Vector2};

/// A body the engine can compute forces for.
///
/// The engine only ever reads these two values. Anything else a body carries
/// (velocity, charge, color) is the caller's business.
pub trait Particle {
    fn position(&self) -> Vector2;

    fn mass(&self) -> Float;
}

impl<P: Particle + ?Sized> Particle for &P {
    fn position(&self) -> Vector2 {
        (**self).position()
    }

    fn mass(&self) -> Float {
        (**self).mass()
    }
}

impl<P: Particle + ?Sized> Particle for Box<P> {
    fn position(&self) -> Vector2 {
        (**self).position()
    }

    fn mass(&self) -> Float {
        (**self).mass()
    }
}

/// A mass at a point.
///
/// Used both as a plain particle and as the aggregate (pseudo-particle) of a
/// tree node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMass {
    pub mass: Float,
    pub position: Vector2,
}

impl PointMass {
    #[must_use]
    pub fn new(mass: Float, position: Vector2) -> Self {
        Self { mass, position }
    }

    /// Add `mass` at `position`, moving the center of mass accordingly.
    ///
    /// If the combined mass is zero, or `position` is already the center of
    /// mass, the position is left exactly where it was.
    pub fn merge(&mut self, mass: Float, position: &Vector2) {
        let mass_sum = self.mass + mass;
        if mass_sum != 0. && *position != self.position {
            self.position = (self.position * self.mass + position * mass) / mass_sum;
        }
        self.mass = mass_sum;
    }
}

impl Particle for PointMass {
    fn position(&self) -> Vector2 {
        self.position
    }

    fn mass(&self) -> Float {
        self.mass
    }
}
