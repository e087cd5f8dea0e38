//! Random initial conditions.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};

use crate::{Float, Vector2};

/// Creates `(mass, position, velocity)` triples for new particles.
pub trait ParticleCreator {
    fn create_particle(&mut self) -> (Float, Vector2, Vector2);

    fn create_particles(&mut self, n: usize) -> Vec<(Float, Vector2, Vector2)> {
        (0..n).map(|_| self.create_particle()).collect()
    }
}

/// Samples masses, position components and velocity components independently
/// from the given distributions.
pub struct DistrParticleCreator<R, MD, PD, VD>
where
    R: Rng,
    MD: Distribution<Float>,
    PD: Distribution<Float>,
    VD: Distribution<Float>,
{
    rng: R,
    mass_distr: MD,
    position_distr: PD,
    velocity_distr: VD,
}

impl<R, MD, PD, VD> DistrParticleCreator<R, MD, PD, VD>
where
    R: Rng,
    MD: Distribution<Float>,
    PD: Distribution<Float>,
    VD: Distribution<Float>,
{
    pub fn new(mass_distr: MD, position_distr: PD, velocity_distr: VD, rng: R) -> Self {
        Self {
            rng,
            mass_distr,
            position_distr,
            velocity_distr,
        }
    }
}

impl<R: Rng> DistrParticleCreator<R, Uniform<Float>, Uniform<Float>, StandardNormal> {
    /// Masses in `[0, 1)`, positions in `[-50, 50)^2`, standard normal
    /// velocities.
    pub fn galaxy(rng: R) -> Self {
        Self::new(
            Uniform::new(0., 1.),
            Uniform::new(-50., 50.),
            StandardNormal,
            rng,
        )
    }
}

impl<R, MD, PD, VD> ParticleCreator for DistrParticleCreator<R, MD, PD, VD>
where
    R: Rng,
    MD: Distribution<Float>,
    PD: Distribution<Float>,
    VD: Distribution<Float>,
{
    fn create_particle(&mut self) -> (Float, Vector2, Vector2) {
        let rng = &mut self.rng;

        let m = self.mass_distr.sample(rng);
        let pos = Vector2::new(
            self.position_distr.sample(rng),
            self.position_distr.sample(rng),
        );
        let vel = Vector2::new(
            self.velocity_distr.sample(rng),
            self.velocity_distr.sample(rng),
        );

        (m, pos, vel)
    }
}
