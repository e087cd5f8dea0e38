use crate::{Float, Vector2};

/// Gravitational constant in SI units.
pub const G: Float = 6.6743015e-11;

/// A pairwise force between two masses.
pub trait ForceLaw: Send + Sync {
    /// Calculate the force a source particle exerts on a target particle.
    ///
    /// `separation` is `target - source`. Implementations must return the zero
    /// vector for a zero separation, since that is how a particle meets itself
    /// (or a node centered on it) during traversal.
    fn force(&self, separation: &Vector2, source_mass: Float, target_mass: Float) -> Vector2;
}

impl<F> ForceLaw for F
where
    F: Fn(&Vector2, Float, Float) -> Vector2 + Send + Sync,
{
    fn force(&self, separation: &Vector2, source_mass: Float, target_mass: Float) -> Vector2 {
        self(separation, source_mass, target_mass)
    }
}

/// Newtonian gravity, optionally softened to lessen the singularity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gravity {
    g: Float,
    epsilon: Float,
}

impl Gravity {
    #[must_use]
    pub fn new(g: Float) -> Self {
        Self { g, epsilon: 0. }
    }

    /// Gravity with the SI value of the gravitational constant.
    #[must_use]
    pub fn si() -> Self {
        Self::new(G)
    }

    /// Plummer softening: `|F| = g m1 m2 r / (r^2 + epsilon)^(3/2)`.
    #[must_use]
    pub fn softened(mut self, epsilon: Float) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn g(&self) -> Float {
        self.g
    }

    #[must_use]
    pub fn epsilon(&self) -> Float {
        self.epsilon
    }
}

/// Unit gravitational constant, as is usual for simulation units.
impl Default for Gravity {
    fn default() -> Self {
        Self::new(1.)
    }
}

impl ForceLaw for Gravity {
    fn force(&self, separation: &Vector2, source_mass: Float, target_mass: Float) -> Vector2 {
        let r_square = separation.norm_squared();
        if r_square == 0. {
            return Vector2::zeros();
        }
        -separation * self.g * source_mass * target_mass / (r_square + self.epsilon).sqrt().powi(3)
    }
}

/// A central force with magnitude `k m1 m2 / r^power`.
///
/// Positive `k` attracts, negative `k` repels; `power = 2` with a negative `k`
/// behaves like a Coulomb force between like charges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InversePower {
    k: Float,
    power: Float,
}

impl InversePower {
    #[must_use]
    pub fn new(k: Float, power: Float) -> Self {
        Self { k, power }
    }
}

impl ForceLaw for InversePower {
    fn force(&self, separation: &Vector2, source_mass: Float, target_mass: Float) -> Vector2 {
        let r_square = separation.norm_squared();
        if r_square == 0. {
            return Vector2::zeros();
        }
        -separation * self.k * source_mass * target_mass / r_square.sqrt().powf(self.power + 1.)
    }
}
