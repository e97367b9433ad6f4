//! Reads and writes trained artifacts (models and encoder tables) to disk.

use crate::error::{Error, Result};
use crate::Persist;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Serialize 'item' into the file at 'path', and return the number of bytes
/// written.
pub fn save<T: Persist, P: AsRef<Path>>(item: &T, path: P) -> Result<usize> {
    let path = path.as_ref();
    let mut stream = Vec::new();
    let written = item.serialize(&mut stream);
    let mut f = File::create(path)?;
    f.write_all(&stream)?;
    log::info!("Wrote {} ({} bytes).", path.display(), written);
    Ok(written)
}

/// Load an artifact from the file at 'path'. The whole file must be consumed.
pub fn load<T: Persist, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let stream = std::fs::read(path)?;
    let (item, read) = T::deserialize(&stream).ok_or_else(|| {
        Error::CorruptArtifact(format!("can't decode {}", path.display()))
    })?;
    if read != stream.len() {
        return Err(Error::CorruptArtifact(format!(
            "{} trailing bytes in {}",
            stream.len() - read,
            path.display()
        )));
    }
    log::info!("Loaded {}.", path.display());
    Ok(item)
}
