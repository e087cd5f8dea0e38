//! CSV output of particle trajectories.
//!
//! Each row is one step, each particle contributes an `x` and a `y` column:
//!
//! ```text
//! step,x0,y0,x1,y1
//! 0,1,2,3,4
//! ```
//!
//! Tracks shorter than the longest one leave their columns empty.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::Vector2;

pub fn write_tracks<W: Write>(mut writer: W, tracks: &[Vec<Vector2>]) -> io::Result<()> {
    write!(writer, "step")?;
    for i in 0..tracks.len() {
        write!(writer, ",x{i},y{i}")?;
    }
    writeln!(writer)?;

    let num_steps = tracks.iter().map(Vec::len).max().unwrap_or(0);
    for t in 0..num_steps {
        write!(writer, "{t}")?;
        for track in tracks {
            match track.get(t) {
                Some(pos) => write!(writer, ",{},{}", pos.x, pos.y)?,
                None => write!(writer, ",,")?,
            }
        }
        writeln!(writer)?;
    }

    writer.flush()
}

pub fn save_tracks(path: impl AsRef<Path>, tracks: &[Vec<Vector2>]) -> io::Result<()> {
    write_tracks(BufWriter::new(File::create(path)?), tracks)
}
