use std::{fs, path::Path};

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Memory-map the input file. An empty file yields an empty map.
pub fn mmap_file(path: &Path) -> Result<Mmap> {
    let file =
        fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    // The map is read-only and lives only for the duration of one read.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("failed to map {}", path.display()))?;
    Ok(mmap)
}
