//! Error types for `LabKit`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `LabKit` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The path does not exist or is not a regular file.
    #[error("file not found: {path}")]
    NotFound {
        /// The path that was queried.
        path: PathBuf,
    },

    /// Fewer bytes could be read than the file reported.
    #[error("short read on {path}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// The file being read.
        path: PathBuf,
        /// Size reported by the file system.
        expected: u64,
        /// Bytes actually read.
        actual: u64,
    },

    /// A write did not complete while building an archive.
    #[error("failed to write LAB {section} to {path}: {source}")]
    PartialWrite {
        /// The archive being written.
        path: PathBuf,
        /// Which part of the archive was being written.
        section: &'static str,
        /// The underlying IO error.
        source: std::io::Error,
    },

    // ==================== LAB Archive Errors ====================
    /// The archive file has zero length.
    #[error("LAB archive is empty: {path}")]
    EmptyArchive {
        /// The archive path.
        path: PathBuf,
    },

    /// The file is not a LAB archive (missing LABN magic).
    #[error("invalid LAB magic: expected LABN, found {found:?}")]
    BadMagic {
        /// The first four bytes of the file, zero-padded if shorter.
        found: [u8; 4],
    },

    /// The file carries the LABN magic but is too short to hold a header.
    #[error("LAB header truncated: file is only {size} bytes")]
    TruncatedHeader {
        /// Size of the file in bytes.
        size: usize,
    },

    /// An entry record points outside the name list or the archive.
    ///
    /// Recovered while parsing: the entry is skipped and parsing continues.
    #[error("corrupt LAB entry #{index}: {reason}")]
    CorruptEntry {
        /// Zero-based position of the record in the entry table.
        index: usize,
        /// What was out of bounds.
        reason: String,
    },

    /// `open()` was called on a reader that is already open.
    #[error("LAB archive already open: {path}")]
    AlreadyOpen {
        /// The archive path.
        path: PathBuf,
    },

    /// A query was made on a reader that is not open.
    #[error("LAB archive not open")]
    NotOpen,

    /// The writer has nothing to pack.
    #[error("no input files to pack in {path}")]
    NoInputFiles {
        /// The source directory.
        path: PathBuf,
    },

    /// A field would overflow its 32-bit slot in the archive.
    #[error("LAB archive too large: {what} is {size} bytes")]
    ArchiveTooLarge {
        /// Which quantity overflowed.
        what: &'static str,
        /// The offending value.
        size: u64,
    },

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

// Add conversion from walkdir::Error
impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `LabKit` operations.
pub type Result<T> = std::result::Result<T, Error>;
