use std::{error, fmt};

use crate::Float;

/// Configuration errors reported at the call boundary.
///
/// Degenerate geometry (coincident particles) and self-forces are handled by
/// the tree and the force laws and never show up here.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Theta was negative, NaN or infinite.
    InvalidTheta(Float),
    /// The particle at `index` has a non-finite position or mass.
    NonFiniteParticle { index: usize },
    /// A multithreaded execution was requested with zero threads.
    InvalidThreadCount,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidTheta(theta) => {
                write!(f, "invalid theta {theta}, expected a finite value >= 0")
            }
            Error::NonFiniteParticle { index } => {
                write!(f, "particle {index} has a non-finite position or mass")
            }
            Error::InvalidThreadCount => write!(f, "number of threads must be at least 1"),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
