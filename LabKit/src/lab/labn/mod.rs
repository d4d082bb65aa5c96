//! LABN archive format reader/writer
//!
//! Layout, all integers little-endian `u32`:
//!
//! ```text
//! header      magic "LABN" | format tag | file count | name list length   (16 bytes)
//! entries     name offset | data offset | size | type tag                 (16 bytes each)
//! name list   null-terminated file names, `name list length` bytes
//! data        file payloads back to back, at the absolute data offsets
//! ```

mod reader;
mod types;
mod writer;

pub use reader::LabReader;
pub use types::*;
pub use writer::LabWriter;

/// LAB magic bytes
pub const MAGIC: [u8; 4] = *b"LABN";

/// Size of the archive header
pub const HEADER_SIZE: usize = 16;

/// Size of one entry record in the entry table
pub const ENTRY_SIZE: usize = 16;

/// Header tag written by default. Every Outlaws archive inspected carries it.
pub const DEFAULT_FORMAT_TAG: u32 = 0x10000;
