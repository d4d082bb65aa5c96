//! LAB archive operations module

pub mod labn;
pub mod type_tag;

// Primary public API
pub use labn::{LabReader, LabWriter};

// Re-export format types for convenience
pub use labn::{
    DEFAULT_FORMAT_TAG, LabEntryInfo, LabFileEntry, LabHeader, LabPhase, LabProgress, MAGIC,
    PackStats, ProgressCallback, TableEntry, TypeTag,
};

pub use type_tag::type_tag_for_file_name;
