//! Forty random stars under mutual gravity, integrated with a simple explicit
//! Euler step. The trajectories are written to a CSV file (`galaxy.csv`, or
//! the first argument).

use barneshut::{
    creator::{DistrParticleCreator, ParticleCreator},
    tracks, Execution, Float, Gravity, Particle, Plane, Vector2,
};
use color_eyre::Result;
use log::info;
use rand::{rngs::StdRng, SeedableRng};

const NUM_STARS: usize = 40;
const NUM_STEPS: usize = 10_000;
const THETA: Float = 0.6;
const FORCE_SCALE: Float = 100.;

#[derive(Clone, Debug)]
struct Star {
    position: Vector2,
    velocity: Vector2,
    mass: Float,
}

impl Star {
    fn kick(&mut self, force: Vector2) {
        self.velocity += force / self.mass;
        self.position += self.velocity;
    }
}

impl Particle for Star {
    fn position(&self) -> Vector2 {
        self.position
    }

    fn mass(&self) -> Float {
        self.mass
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "galaxy.csv".to_owned());

    let stars = DistrParticleCreator::galaxy(StdRng::seed_from_u64(1))
        .create_particles(NUM_STARS)
        .into_iter()
        .map(|(mass, position, velocity)| Star {
            position,
            velocity,
            mass,
        })
        .collect();
    let mut plane = Plane::new(stars);
    let gravity = Gravity::default();

    let mut trajectories: Vec<Vec<Vector2>> = (0..NUM_STARS)
        .map(|_| Vec::with_capacity(NUM_STEPS))
        .collect();
    for t in 0..NUM_STEPS {
        plane.reset()?;
        let forces = plane.forces(THETA, &gravity, Execution::SingleThreaded)?;

        for ((star, force), track) in plane
            .particles_mut()
            .iter_mut()
            .zip(forces)
            .zip(trajectories.iter_mut())
        {
            star.kick(force * FORCE_SCALE);
            track.push(star.position);
        }

        if t % 1000 == 0 {
            info!("{t} out of {NUM_STEPS} time steps done.");
        }
    }

    tracks::save_tracks(&path, &trajectories)?;
    info!("wrote {NUM_STARS} tracks to {path}");

    Ok(())
}
