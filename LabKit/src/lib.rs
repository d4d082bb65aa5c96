//! # LabKit
//!
//! A pure-Rust library for reading and writing LucasArts LAB archives, the
//! single-file containers used by Outlaws and other LucasArts titles.
//!
//! ## Quick Start
//!
//! ### Reading an archive
//!
//! ```no_run
//! use labkit::lab::LabReader;
//!
//! let mut reader = LabReader::new("OUTLAWS.LAB");
//! reader.open()?;
//! println!("Found {} files", reader.len());
//!
//! let written = reader.extract_all("output/");
//! println!("Extracted {written} files");
//! # Ok::<(), labkit::Error>(())
//! ```
//!
//! ### Packing a directory
//!
//! ```no_run
//! use labkit::lab::LabWriter;
//!
//! let stats = LabWriter::new("hideout.lab", "hideout/").write()?;
//! println!("Packed {} files", stats.files_packed);
//! # Ok::<(), labkit::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use labkit::prelude::*;
//!
//! // Now you have access to:
//! // - LabReader, LabWriter
//! // - LabHeader, LabFileEntry, TypeTag
//! // - Error, Result, and more
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `labkit` command-line binary

pub mod error;
pub mod lab;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    // LAB operations
    pub use crate::lab::{
        LabReader, LabWriter,
        LabEntryInfo, LabFileEntry, LabHeader, PackStats, TableEntry, TypeTag,
        LabPhase, LabProgress, ProgressCallback,
        DEFAULT_FORMAT_TAG, MAGIC,
        type_tag_for_file_name,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
