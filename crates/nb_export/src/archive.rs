use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use nb_core::{Error, Result};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn zip_err(e: zip::result::ZipError) -> Error {
    Error::Export(e.to_string())
}

/// Zips every file in `dir` (flat, no recursion; image names carry their
/// page structure already) into `zip_path`, then removes the loose
/// directory.
pub fn archive_images(dir: &Path, zip_path: &Path) -> Result<()> {
    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut archived = 0usize;
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        zip.start_file(name, options).map_err(zip_err)?;
        let mut contents = Vec::new();
        File::open(&path)?.read_to_end(&mut contents)?;
        zip.write_all(&contents)?;
        archived += 1;
    }
    zip.finish().map_err(zip_err)?;

    std::fs::remove_dir_all(dir)?;
    info!("archived {archived} images into {}", zip_path.display());
    Ok(())
}
