//! Writing a finished file map out of the session.

use std::io::{Seek, Write};
use std::path::{Component, Path, PathBuf};

use neonvibe_common::{FileMap, StorageError};
use tracing::debug;

/// Write every entry of `files` as one member of a zip archive.
///
/// Members are named exactly by their key. Returns the underlying writer
/// once the archive's central directory has been written.
pub fn write_zip<W: Write + Seek>(files: &FileMap, writer: W) -> Result<W, StorageError> {
    let mut zip = zip::ZipWriter::new(writer);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in files {
        zip.start_file(name.as_str(), options)
            .map_err(|e| StorageError::Serialize(format!("failed to add {name} to archive: {e}")))?;
        zip.write_all(content.as_bytes())
            .map_err(|e| StorageError::Serialize(format!("failed to write {name}: {e}")))?;
    }

    let writer = zip
        .finish()
        .map_err(|e| StorageError::Serialize(format!("failed to finish archive: {e}")))?;
    debug!(members = files.len(), "Archive written");
    Ok(writer)
}

/// Write `files` into a zip file at `path`.
pub fn write_zip_file(files: &FileMap, path: &Path) -> Result<(), StorageError> {
    let file = std::fs::File::create(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_zip(files, file)?;
    Ok(())
}

/// Materialize `files` as a directory tree under `root`.
///
/// Keys must be relative paths that stay inside `root`; absolute paths and
/// `..` components are rejected before anything is written.
pub fn write_dir(files: &FileMap, root: &Path) -> Result<Vec<PathBuf>, StorageError> {
    for name in files.keys() {
        check_relative(name)?;
    }

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, content).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }

    debug!(root = %root.display(), files = written.len(), "Project written to disk");
    Ok(written)
}

fn check_relative(name: &str) -> Result<(), StorageError> {
    let path = Path::new(name);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if name.is_empty() || path.is_absolute() || escapes {
        return Err(StorageError::InvalidPath(name.to_string()));
    }
    Ok(())
}
