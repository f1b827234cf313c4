//! CLI command implementations.

pub(crate) mod cache;
pub(crate) mod extract;
pub(crate) mod render;

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

pub(crate) use cache::CacheCommand;
pub(crate) use extract::ExtractArgs;
pub(crate) use render::RenderArgs;

/// Open the input file, or stdin when no path is given.
pub(crate) fn open_input(path: Option<&Path>) -> io::Result<Box<dyn Read>> {
    Ok(match path {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    })
}

/// Create the output file, or use stdout when no path is given.
pub(crate) fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}
