//! File system helpers used by the LAB reader and writer

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Size in bytes of a regular file
///
/// Returns [`Error::NotFound`] if the path does not exist or is not a regular file.
pub fn query_file_size(path: &Path) -> Result<u64> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        Ok(_) => Err(Error::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Create a directory and all of its parents
///
/// No-op if the directory already exists. Fails if something other than a
/// directory is in the way.
pub fn create_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path)?;
    Ok(())
}

/// Names of the regular files directly inside `dir`
///
/// Dot-files are left out unless `include_hidden` is set. Errors are logged
/// and yield an empty list. The order is unspecified.
pub fn list_files_in_path(dir: &Path, include_hidden: bool) -> Vec<String> {
    match try_list_files(dir, include_hidden) {
        Ok(files) => files,
        Err(e) => {
            tracing::error!("Failed to list files in '{}': {e}", dir.display());
            Vec::new()
        }
    }
}

fn try_list_files(dir: &Path, include_hidden: bool) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            // Depth 0 means the directory itself could not be read
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Skipping unreadable directory entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            tracing::warn!(
                "Skipping file with non UTF-8 name: {}",
                entry.path().display()
            );
            continue;
        };

        if !include_hidden && name.starts_with('.') {
            continue;
        }
        files.push(name.to_string());
    }

    Ok(files)
}

/// Load a whole file into memory
pub fn load_file(path: &Path) -> Result<Vec<u8>> {
    let expected = query_file_size(path)?;
    let data = fs::read(path)?;

    ensure_read_complete(path, expected, data.len() as u64)?;
    Ok(data)
}

/// Fail with [`Error::ShortRead`] if fewer bytes arrived than the file size
///
/// Only a file that shrinks between the size query and the read trips this.
pub fn ensure_read_complete(path: &Path, expected: u64, actual: u64) -> Result<()> {
    if actual < expected {
        return Err(Error::ShortRead {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Extension of a file name, starting at the last dot (".wav")
pub fn file_extension(file_name: &str) -> Option<&str> {
    file_name.rfind('.').map(|dot| &file_name[dot..])
}

/// Where an archive entry lands when extracted under `dest`
///
/// Both `/` and `\` separate directories. Names that would escape `dest`
/// or name no file at all are rejected.
pub fn entry_output_path(dest: &Path, entry_name: &str) -> Result<PathBuf> {
    let mut path = dest.to_path_buf();
    let mut pushed = false;

    for component in entry_name.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => return Err(Error::InvalidPath(entry_name.to_string())),
            c if c.contains(':') => return Err(Error::InvalidPath(entry_name.to_string())),
            c => {
                path.push(c);
                pushed = true;
            }
        }
    }

    if !pushed {
        return Err(Error::InvalidPath(entry_name.to_string()));
    }
    Ok(path)
}
