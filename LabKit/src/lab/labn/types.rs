//! Types for LAB archive handling

use std::fmt;
use std::io::{self, Write};
use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use serde::{Serialize, Serializer};

use super::{ENTRY_SIZE, HEADER_SIZE, MAGIC};
use crate::error::{Error, Result};

/// Four-character code attached to each entry, loosely tied to the file extension.
///
/// Often all zeros. Displayed with zero bytes shown as `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeTag(pub [u8; 4]);

impl TypeTag {
    /// The empty tag (four zero bytes)
    pub const ZERO: TypeTag = TypeTag([0; 4]);

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

// Zero bytes print as `-` and other non-printable bytes as `?`, where
// older listings wrote the raw bytes.
impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = match b {
                0 => '-',
                b if b.is_ascii_graphic() => char::from(b),
                _ => '?',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Header of a LAB archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabHeader {
    /// Magic bytes (always "LABN")
    pub magic: [u8; 4],
    /// Opaque version/format tag, passed through unchanged
    pub format_tag: u32,
    /// Number of entry records
    pub file_count: u32,
    /// Length of the name list, including the null terminators
    pub name_list_len: u32,
}

impl LabHeader {
    /// Create a header with the LABN magic
    #[must_use]
    pub fn new(format_tag: u32, file_count: u32, name_list_len: u32) -> Self {
        Self {
            magic: MAGIC,
            format_tag,
            file_count,
            name_list_len,
        }
    }

    /// Parse the header at the start of an archive buffer
    ///
    /// The magic is checked first, so a short non-LAB file reports
    /// [`Error::BadMagic`] rather than a truncated header.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut magic = [0u8; 4];
        let available = bytes.len().min(magic.len());
        magic[..available].copy_from_slice(&bytes[..available]);

        if magic != MAGIC {
            return Err(Error::BadMagic { found: magic });
        }
        if bytes.len() < HEADER_SIZE {
            return Err(Error::TruncatedHeader { size: bytes.len() });
        }

        Ok(Self {
            magic,
            format_tag: LittleEndian::read_u32(&bytes[4..8]),
            file_count: LittleEndian::read_u32(&bytes[8..12]),
            name_list_len: LittleEndian::read_u32(&bytes[12..16]),
        })
    }

    /// Serialize the header (16 bytes)
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.magic)?;
        writer.write_u32::<LittleEndian>(self.format_tag)?;
        writer.write_u32::<LittleEndian>(self.file_count)?;
        writer.write_u32::<LittleEndian>(self.name_list_len)?;
        Ok(())
    }

    /// Absolute offset of the name list
    #[must_use]
    pub fn name_list_offset(&self) -> u64 {
        HEADER_SIZE as u64 + ENTRY_SIZE as u64 * u64::from(self.file_count)
    }

    /// Absolute offset of the first payload byte
    #[must_use]
    pub fn data_offset(&self) -> u64 {
        self.name_list_offset() + u64::from(self.name_list_len)
    }
}

/// Entry record in the archive's entry table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabFileEntry {
    /// Offset of this entry's name inside the name list
    pub name_offset: u32,
    /// Absolute offset of the payload from the start of the archive
    pub data_offset: u32,
    /// Payload size in bytes
    pub size: u32,
    /// Four-character type code
    pub type_tag: TypeTag,
}

impl LabFileEntry {
    /// Parse one 16-byte entry record
    #[must_use]
    pub fn parse(bytes: &[u8; ENTRY_SIZE]) -> Self {
        Self {
            name_offset: LittleEndian::read_u32(&bytes[0..4]),
            data_offset: LittleEndian::read_u32(&bytes[4..8]),
            size: LittleEndian::read_u32(&bytes[8..12]),
            type_tag: TypeTag([bytes[12], bytes[13], bytes[14], bytes[15]]),
        }
    }

    /// Serialize the record (16 bytes)
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.name_offset)?;
        writer.write_u32::<LittleEndian>(self.data_offset)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_all(self.type_tag.as_bytes())?;
        Ok(())
    }

    /// Check the record against the name list length and archive size
    ///
    /// `index` is only used to label the error.
    pub fn validate(&self, index: usize, name_list_len: u32, archive_size: u64) -> Result<()> {
        let corrupt = |reason: String| Error::CorruptEntry { index, reason };

        if self.name_offset >= name_list_len {
            return Err(corrupt(format!(
                "bad name offset {} (name list is {name_list_len} bytes)",
                self.name_offset
            )));
        }
        if u64::from(self.data_offset) >= archive_size {
            return Err(corrupt(format!(
                "bad data offset {} (archive is {archive_size} bytes)",
                self.data_offset
            )));
        }
        let data_end = u64::from(self.data_offset) + u64::from(self.size);
        if data_end > archive_size {
            return Err(corrupt(format!(
                "bad data offset/size {}+{} (archive is {archive_size} bytes)",
                self.data_offset, self.size
            )));
        }
        Ok(())
    }
}

/// Value stored in the reader's file table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    /// Absolute offset of the payload
    pub data_offset: u32,
    /// Payload size in bytes
    pub size: u32,
    /// Type tag copied from the entry record
    pub type_tag: TypeTag,
}

impl TableEntry {
    /// Byte range of the payload inside the archive buffer
    #[must_use]
    pub fn data_range(&self) -> Range<usize> {
        let start = self.data_offset as usize;
        start..start + self.size as usize
    }
}

impl From<&LabFileEntry> for TableEntry {
    fn from(entry: &LabFileEntry) -> Self {
        Self {
            data_offset: entry.data_offset,
            size: entry.size,
            type_tag: entry.type_tag,
        }
    }
}

/// One row of an archive listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabEntryInfo {
    /// File name as stored in the archive
    pub name: String,
    /// Absolute offset of the payload
    pub data_offset: u32,
    /// Payload size in bytes
    pub size: u32,
    /// Type tag, rendered as four characters
    pub type_tag: TypeTag,
}

/// Outcome of a successful pack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackStats {
    /// Number of entry records written
    pub files_packed: usize,
    /// Source files that could not be loaded and were left out
    pub skipped: Vec<String>,
    /// Total size of the written archive in bytes
    pub archive_size: u64,
}

/// Progress information during LAB operations
#[derive(Debug, Clone)]
pub struct LabProgress {
    /// Current operation phase
    pub phase: LabPhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current file being processed (if applicable)
    pub current_file: Option<String>,
}

impl LabProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: LabPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with a file name
    #[must_use]
    pub fn with_file(
        phase: LabPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of a LAB operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabPhase {
    /// Loading source files (during packing)
    LoadingFiles,
    /// Writing header, entry table and name list
    WritingTable,
    /// Writing payloads (archive data when packing, output files when extracting)
    WritingFiles,
    /// Operation complete
    Complete,
}

impl LabPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadingFiles => "Loading files",
            Self::WritingTable => "Writing file table",
            Self::WritingFiles => "Writing files",
            Self::Complete => "Complete",
        }
    }
}

/// Progress callback for LAB operations
pub type ProgressCallback<'a> = &'a dyn Fn(&LabProgress);
