//! LAB archive reader with error recovery
//!
//! The whole archive is loaded into memory on [`LabReader::open`]. Entry
//! records that point outside the archive are skipped with a warning, the
//! rest of the table is still usable.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use super::{
    ENTRY_SIZE, HEADER_SIZE, LabEntryInfo, LabFileEntry, LabHeader, LabPhase, LabProgress,
    MAGIC, ProgressCallback, TableEntry,
};
use crate::error::{Error, Result};
use crate::utils::filesys::{
    create_path, ensure_read_complete, entry_output_path, query_file_size,
};

/// File name to entry metadata. Ordered so listings and extraction are deterministic.
type FileTable = BTreeMap<String, TableEntry>;

/// LAB archive reader and unpacker
pub struct LabReader {
    path: PathBuf,
    header: Option<LabHeader>,
    contents: Vec<u8>,
    file_table: FileTable,
}

impl LabReader {
    /// Create a reader for the archive at `path`. Nothing is read until [`open`](Self::open).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: None,
            contents: Vec::new(),
            file_table: FileTable::new(),
        }
    }

    /// Load the archive into memory and build the file table
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyOpen`] if the reader is already open, leaving it untouched.
    /// Returns [`Error::NotFound`] if the path is not a regular file.
    /// Returns [`Error::EmptyArchive`] if the file has zero length.
    /// Returns [`Error::BadMagic`] if the file does not start with `LABN`.
    /// Returns [`Error::ShortRead`] if the file could not be read in full.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            tracing::error!("LAB archive already open: {}", self.path.display());
            return Err(Error::AlreadyOpen {
                path: self.path.clone(),
            });
        }

        match self.load() {
            Ok((header, contents, file_table)) => {
                tracing::info!(
                    "Opened LAB archive {} ({} bytes, {} entries)",
                    self.path.display(),
                    contents.len(),
                    file_table.len()
                );
                self.header = Some(header);
                self.contents = contents;
                self.file_table = file_table;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Unable to open LAB archive {}: {e}", self.path.display());
                Err(e)
            }
        }
    }

    fn load(&self) -> Result<(LabHeader, Vec<u8>, FileTable)> {
        let size = query_file_size(&self.path)?;
        if size == 0 {
            return Err(Error::EmptyArchive {
                path: self.path.clone(),
            });
        }

        let mut file = File::open(&self.path)?;

        // Check the id before taking the trouble of loading the whole file
        let mut magic = Vec::with_capacity(MAGIC.len());
        (&mut file).take(MAGIC.len() as u64).read_to_end(&mut magic)?;
        if magic != MAGIC {
            let mut found = [0u8; 4];
            found[..magic.len()].copy_from_slice(&magic);
            return Err(Error::BadMagic { found });
        }

        file.rewind()?;
        let mut contents = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        file.take(size).read_to_end(&mut contents)?;

        ensure_read_complete(&self.path, size, contents.len() as u64)?;

        let header = LabHeader::parse(&contents)?;
        let file_table = parse_file_table(&header, &contents, &self.path);
        Ok((header, contents, file_table))
    }

    /// Release the archive bytes and the file table
    ///
    /// Safe to call more than once. Dropping the reader has the same effect.
    pub fn close(&mut self) {
        self.header = None;
        self.contents = Vec::new();
        self.file_table.clear();
    }

    /// True while an archive is resident in memory
    pub fn is_open(&self) -> bool {
        !self.contents.is_empty()
    }

    /// Path given at construction
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header of the open archive
    pub fn header(&self) -> Option<&LabHeader> {
        self.header.as_ref()
    }

    /// Number of entries in the file table
    pub fn len(&self) -> usize {
        self.file_table.len()
    }

    /// True if the file table has no entries
    pub fn is_empty(&self) -> bool {
        self.file_table.is_empty()
    }

    /// Look up an entry by name
    pub fn entry(&self, name: &str) -> Option<&TableEntry> {
        self.file_table.get(name)
    }

    /// Payload bytes of an entry, borrowed from the loaded archive
    pub fn read_file(&self, name: &str) -> Option<&[u8]> {
        let entry = self.file_table.get(name)?;
        self.contents.get(entry.data_range())
    }

    /// All entries of the file table, sorted by name
    pub fn list_entries(&self) -> Result<Vec<LabEntryInfo>> {
        if !self.is_open() {
            return Err(Error::NotOpen);
        }

        Ok(self
            .file_table
            .iter()
            .map(|(name, entry)| LabEntryInfo {
                name: name.clone(),
                data_offset: entry.data_offset,
                size: entry.size,
                type_tag: entry.type_tag,
            })
            .collect())
    }

    /// Print a table of all entries, for diagnostics
    pub fn write_listing<W: Write>(&self, out: &mut W) -> Result<()> {
        const BORDER: &str = "+-------------+-------------+--------------------+";

        let entries = self.list_entries()?;

        writeln!(
            out,
            "[[ LAB archive entries listing for '{}' ]]",
            self.path.display()
        )?;
        if entries.is_empty() {
            writeln!(out, "(empty)")?;
        } else {
            writeln!(out, "{BORDER}")?;
            writeln!(out, "| dataOffset  |  sizeBytes  |  id/filename       |")?;
            writeln!(out, "{BORDER}")?;
            for entry in &entries {
                writeln!(
                    out,
                    "  {:<11} | {:<11} | [{}] {}",
                    entry.data_offset, entry.size, entry.type_tag, entry.name
                )?;
            }
        }
        writeln!(out, "[[ listed {} entries ]]", entries.len())?;
        Ok(())
    }

    /// Extract every entry to `dest`
    ///
    /// Creates `dest` as needed and overwrites existing files. Failures on
    /// individual files are logged and skipped. Returns the number of files
    /// written, or 0 if the archive is not open or `dest` cannot be created.
    pub fn extract_all(&self, dest: impl AsRef<Path>) -> usize {
        self.extract_all_with_progress(dest, &|_| {})
    }

    /// Extract every entry to `dest` with progress callback
    pub fn extract_all_with_progress(
        &self,
        dest: impl AsRef<Path>,
        progress: ProgressCallback,
    ) -> usize {
        let dest = dest.as_ref();

        if !self.is_open() {
            tracing::error!("LAB archive not open!");
            return 0;
        }
        if let Err(e) = create_path(dest) {
            tracing::error!(
                "Failed to create destination path '{}': {e}",
                dest.display()
            );
            return 0;
        }

        let total = self.file_table.len();
        let mut files_written = 0;

        for (i, (name, entry)) in self.file_table.iter().enumerate() {
            progress(&LabProgress::with_file(
                LabPhase::WritingFiles,
                i + 1,
                total,
                name.as_str(),
            ));

            if self.extract_entry(dest, name, entry) {
                files_written += 1;
            }
        }

        progress(&LabProgress::new(LabPhase::Complete, files_written, total));
        tracing::info!(
            "Extracted {files_written} of {total} files to {}",
            dest.display()
        );
        files_written
    }

    fn extract_entry(&self, dest: &Path, name: &str, entry: &TableEntry) -> bool {
        let output_path = match entry_output_path(dest, name) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping LAB entry '{name}': {e}");
                return false;
            }
        };

        if let Some(parent) = output_path.parent()
            && let Err(e) = create_path(parent)
        {
            tracing::warn!("Failed to create directory '{}': {e}", parent.display());
            return false;
        }

        let Some(data) = self.contents.get(entry.data_range()) else {
            tracing::warn!("LAB entry '{name}' points past the end of the archive");
            return false;
        };

        let mut file = match File::create(&output_path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(
                    "Failed to open file '{}' for writing: {e}",
                    output_path.display()
                );
                return false;
            }
        };

        // A failed write still counts: the file was created
        if let Err(e) = file.write_all(data) {
            tracing::warn!("Partial write for '{}': {e}", output_path.display());
        }

        tracing::debug!("Extracted {name} ({} bytes)", data.len());
        true
    }
}

/// Walk the entry records and build the file table
///
/// Bad records are logged and skipped. A later record with the same name
/// replaces an earlier one.
fn parse_file_table(header: &LabHeader, contents: &[u8], path: &Path) -> FileTable {
    let archive_size = contents.len() as u64;
    let name_list = name_list(header, contents);
    let mut table = FileTable::new();

    for index in 0..header.file_count as usize {
        let start = HEADER_SIZE + index * ENTRY_SIZE;
        let Some(record) = contents
            .get(start..start + ENTRY_SIZE)
            .and_then(|bytes| <&[u8; ENTRY_SIZE]>::try_from(bytes).ok())
        else {
            tracing::warn!(
                "LAB entry table truncated after {index} of {} entries! {}",
                header.file_count,
                path.display()
            );
            break;
        };

        let entry = LabFileEntry::parse(record);
        if let Err(e) = entry.validate(index, header.name_list_len, archive_size) {
            tracing::warn!("{e}, ignoring it... {}", path.display());
            continue;
        }

        let Some(name) = read_entry_name(name_list, entry.name_offset) else {
            tracing::warn!(
                "LAB entry #{index} name lies past the end of the archive, ignoring it... {}",
                path.display()
            );
            continue;
        };

        if let Some(previous) = table.insert(name.clone(), TableEntry::from(&entry)) {
            tracing::debug!(
                "Duplicate LAB entry '{name}' replaces the one at offset {}",
                previous.data_offset
            );
        }
    }

    table
}

/// The name list region, clamped to the bytes actually present
fn name_list<'a>(header: &LabHeader, contents: &'a [u8]) -> &'a [u8] {
    let len = contents.len() as u64;
    let start = header.name_list_offset().min(len) as usize;
    let end = (header.name_list_offset() + u64::from(header.name_list_len)).min(len) as usize;
    &contents[start..end]
}

/// Read a null-terminated name starting at `offset`
///
/// A name without a terminator runs to the end of the list.
fn read_entry_name(name_list: &[u8], offset: u32) -> Option<String> {
    let tail = name_list
        .get(offset as usize..)
        .filter(|tail| !tail.is_empty())?;
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    Some(String::from_utf8_lossy(&tail[..end]).into_owned())
}
