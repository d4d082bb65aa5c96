//! LAB archive writer with progress callbacks

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{
    DEFAULT_FORMAT_TAG, LabFileEntry, LabHeader, LabPhase, LabProgress, PackStats,
    ProgressCallback,
};
use crate::error::{Error, Result};
use crate::lab::type_tag::type_tag_for_file_name;
use crate::utils::filesys::{create_path, list_files_in_path, load_file};

/// Source file slot. `data` is `None` when the file could not be loaded.
struct SourceFile<'a> {
    name: &'a str,
    name_offset: u32,
    data: Option<Vec<u8>>,
}

/// LAB archive writer
///
/// The source directory is enumerated on construction. Files are only
/// loaded when [`write`](Self::write) runs.
pub struct LabWriter {
    /// Archive to create
    dest_path: PathBuf,
    /// Directory holding the loose files
    source_dir: PathBuf,
    /// File names relative to `source_dir`, sorted
    file_list: Vec<String>,
    /// Opaque header tag
    format_tag: u32,
    /// Set when `file_list` came from the caller instead of the directory
    explicit_list: bool,
}

impl LabWriter {
    /// Create a writer packing every regular, non-hidden file in `source_dir`
    pub fn new(dest_path: impl Into<PathBuf>, source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        let file_list = list_files_in_path(&source_dir, false);
        Self::from_parts(dest_path.into(), source_dir, file_list, false)
    }

    /// Create a writer packing the named files from `source_dir`
    pub fn with_files<I, S>(
        dest_path: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
        files: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let file_list = files.into_iter().map(Into::into).collect();
        Self::from_parts(dest_path.into(), source_dir.into(), file_list, true)
    }

    fn from_parts(
        dest_path: PathBuf,
        source_dir: PathBuf,
        mut file_list: Vec<String>,
        explicit_list: bool,
    ) -> Self {
        if file_list.is_empty() {
            tracing::warn!(
                "Could not find any files in path '{}'!",
                source_dir.display()
            );
        }
        // Sorted so the output only depends on the directory contents
        file_list.sort();

        Self {
            dest_path,
            source_dir,
            file_list,
            format_tag: DEFAULT_FORMAT_TAG,
            explicit_list,
        }
    }

    /// Re-enumerate the source directory, including or excluding dot-files
    ///
    /// No-op for writers built with [`with_files`](Self::with_files): an
    /// explicit list is packed as given.
    #[must_use]
    pub fn with_hidden_files(self, include_hidden: bool) -> Self {
        if self.explicit_list {
            return self;
        }
        let file_list = list_files_in_path(&self.source_dir, include_hidden);
        let format_tag = self.format_tag;
        Self::from_parts(self.dest_path, self.source_dir, file_list, false)
            .with_format_tag(format_tag)
    }

    /// Set the opaque header tag (defaults to [`DEFAULT_FORMAT_TAG`])
    #[must_use]
    pub fn with_format_tag(mut self, format_tag: u32) -> Self {
        self.format_tag = format_tag;
        self
    }

    /// Sorted names of the files to pack
    pub fn file_list(&self) -> &[String] {
        &self.file_list
    }

    /// Get the number of files that will be packed
    pub fn file_count(&self) -> usize {
        self.file_list.len()
    }

    /// Get the destination archive path
    pub fn dest_path(&self) -> &Path {
        &self.dest_path
    }

    /// Get the source directory
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Write the LAB archive
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoInputFiles`] if there is nothing to pack.
    /// Returns [`Error::Io`] if the destination cannot be created.
    /// Returns [`Error::PartialWrite`] if any part of the archive fails to write.
    /// Returns [`Error::ArchiveTooLarge`] if an offset or size does not fit in 32 bits.
    pub fn write(&self) -> Result<PackStats> {
        self.write_with_progress(&|_| {})
    }

    /// Write the LAB archive with progress callback
    pub fn write_with_progress(&self, progress: ProgressCallback) -> Result<PackStats> {
        if self.file_list.is_empty() {
            tracing::error!(
                "Nothing to pack into {}: no input files",
                self.dest_path.display()
            );
            return Err(Error::NoInputFiles {
                path: self.source_dir.clone(),
            });
        }

        let total = self.file_list.len();

        // Load everything first. Files that fail to load keep their slot in
        // the name list but get no entry record and no data.
        let mut sources = Vec::with_capacity(total);
        let mut name_list_len = 0u64;

        for (i, name) in self.file_list.iter().enumerate() {
            progress(&LabProgress::with_file(
                LabPhase::LoadingFiles,
                i + 1,
                total,
                name.as_str(),
            ));

            sources.push(SourceFile {
                name,
                name_offset: to_u32(name_list_len, "name list")?,
                data: self.load_source(name),
            });

            // Size includes the null byte
            name_list_len += name.len() as u64 + 1;
        }

        let loaded: Vec<(&SourceFile, &[u8])> = sources
            .iter()
            .filter_map(|source| source.data.as_deref().map(|data| (source, data)))
            .collect();
        let skipped: Vec<String> = sources
            .iter()
            .filter(|source| source.data.is_none())
            .map(|source| source.name.to_string())
            .collect();

        let header = LabHeader::new(
            self.format_tag,
            to_u32(loaded.len() as u64, "entry count")?,
            to_u32(name_list_len, "name list")?,
        );

        let mut data_offset = header.data_offset();
        let mut entries = Vec::with_capacity(loaded.len());
        for (source, data) in &loaded {
            let size = data.len() as u64;
            entries.push(LabFileEntry {
                name_offset: source.name_offset,
                data_offset: to_u32(data_offset, "data offset")?,
                size: to_u32(size, "file")?,
                type_tag: type_tag_for_file_name(source.name, &self.dest_path),
            });
            data_offset += size;
        }

        if let Some(parent) = self.dest_path.parent() {
            create_path(parent)?;
        }
        let file = File::create(&self.dest_path).map_err(|e| {
            tracing::error!(
                "Failed to open file {} for writing: {e}",
                self.dest_path.display()
            );
            Error::Io(e)
        })?;
        let mut output = BufWriter::new(file);

        progress(&LabProgress::new(LabPhase::WritingTable, 0, total));
        header
            .write_to(&mut output)
            .map_err(|e| self.write_failed("header", e))?;
        for entry in &entries {
            entry
                .write_to(&mut output)
                .map_err(|e| self.write_failed("entry header", e))?;
        }
        for source in &sources {
            write_name(&mut output, source.name).map_err(|e| self.write_failed("entry name", e))?;
        }

        for (i, (source, data)) in loaded.iter().enumerate() {
            progress(&LabProgress::with_file(
                LabPhase::WritingFiles,
                i + 1,
                loaded.len(),
                source.name,
            ));
            output
                .write_all(data)
                .map_err(|e| self.write_failed("entry data", e))?;
        }
        output
            .flush()
            .map_err(|e| self.write_failed("entry data", e))?;

        progress(&LabProgress::new(LabPhase::Complete, entries.len(), total));
        tracing::info!(
            "Wrote LAB archive {} ({} files, {} skipped, {data_offset} bytes)",
            self.dest_path.display(),
            entries.len(),
            skipped.len()
        );

        Ok(PackStats {
            files_packed: entries.len(),
            skipped,
            archive_size: data_offset,
        })
    }

    fn load_source(&self, name: &str) -> Option<Vec<u8>> {
        match load_file(&self.source_dir.join(name)) {
            Ok(data) if data.is_empty() => {
                tracing::warn!("File '{name}' is empty! Won't be added to LAB archive...");
                None
            }
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(
                    "Failed to load file '{name}': {e}. Won't be added to LAB archive..."
                );
                None
            }
        }
    }

    fn write_failed(&self, section: &'static str, source: io::Error) -> Error {
        tracing::error!(
            "Failed to write LAB {section}! {}: {source}",
            self.dest_path.display()
        );
        Error::PartialWrite {
            path: self.dest_path.clone(),
            section,
            source,
        }
    }
}

/// Null-terminated name list string
fn write_name<W: Write>(writer: &mut W, name: &str) -> io::Result<()> {
    writer.write_all(name.as_bytes())?;
    writer.write_all(&[0])
}

fn to_u32(value: u64, what: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::ArchiveTooLarge { what, size: value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::labn::{ENTRY_SIZE, HEADER_SIZE, TypeTag};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn entry_at(archive: &[u8], index: usize) -> LabFileEntry {
        let start = HEADER_SIZE + index * ENTRY_SIZE;
        LabFileEntry::parse(archive[start..start + ENTRY_SIZE].try_into().unwrap())
    }

    #[test]
    fn test_write_two_files_layout() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("b.txt"), b"z").unwrap();
        fs::write(src.join("a.txt"), b"abc").unwrap();
        let dest = dir.path().join("test.lab");

        let writer = LabWriter::new(&dest, &src);
        assert_eq!(writer.file_list(), ["a.txt", "b.txt"]);

        let stats = writer.write().unwrap();
        assert_eq!(stats.files_packed, 2);
        assert!(stats.skipped.is_empty());
        assert_eq!(stats.archive_size, 64);

        let mut expected = Vec::new();
        expected.extend_from_slice(b"LABN");
        expected.extend_from_slice(&0x10000u32.to_le_bytes());
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(&12u32.to_le_bytes());
        for (name_offset, data_offset, size) in [(0u32, 60u32, 3u32), (6, 63, 1)] {
            expected.extend_from_slice(&name_offset.to_le_bytes());
            expected.extend_from_slice(&data_offset.to_le_bytes());
            expected.extend_from_slice(&size.to_le_bytes());
            expected.extend_from_slice(&[0; 4]);
        }
        expected.extend_from_slice(b"a.txt\0b.txt\0");
        expected.extend_from_slice(b"abcz");

        assert_eq!(fs::read(&dest).unwrap(), expected);
    }

    #[test]
    fn test_empty_source_dir_fails_without_output() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        let dest = dir.path().join("empty.lab");

        let writer = LabWriter::new(&dest, &src);
        assert_eq!(writer.file_count(), 0);
        assert!(matches!(writer.write(), Err(Error::NoInputFiles { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_unloadable_file_keeps_name_slot() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"abc").unwrap();
        let dest = dir.path().join("out.lab");

        let writer = LabWriter::with_files(&dest, dir.path(), ["missing.bin", "a.txt"]);
        let stats = writer.write().unwrap();
        assert_eq!(stats.files_packed, 1);
        assert_eq!(stats.skipped, vec!["missing.bin".to_string()]);

        let archive = fs::read(&dest).unwrap();
        let header = LabHeader::parse(&archive).unwrap();
        assert_eq!(header.file_count, 1);
        assert_eq!(header.name_list_len, 18);

        // 16 header + 1 entry + 18 names
        let entry = entry_at(&archive, 0);
        assert_eq!((entry.name_offset, entry.data_offset, entry.size), (0, 50, 3));
        assert_eq!(&archive[32..50], b"a.txt\0missing.bin\0");
        assert_eq!(&archive[50..], b"abc");
    }

    #[test]
    fn test_zero_length_file_is_skipped() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("empty.dat"), b"").unwrap();
        fs::write(src.join("full.dat"), b"1").unwrap();

        let stats = LabWriter::new(dir.path().join("out.lab"), &src).write().unwrap();
        assert_eq!(stats.files_packed, 1);
        assert_eq!(stats.skipped, vec!["empty.dat".to_string()]);
    }

    #[test]
    fn test_type_tags_and_format_tag() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("gun.wav"), b"RIFF").unwrap();
        fs::write(src.join("sky.pcx"), b"PCX").unwrap();
        let dest = dir.path().join("dump").join("outlaws.lab");

        LabWriter::new(&dest, &src)
            .with_format_tag(0xABCD)
            .write()
            .unwrap();

        let archive = fs::read(&dest).unwrap();
        assert_eq!(LabHeader::parse(&archive).unwrap().format_tag, 0xABCD);
        assert_eq!(entry_at(&archive, 0).type_tag, TypeTag(*b"DVAW"));
        assert_eq!(entry_at(&archive, 1).type_tag, TypeTag(*b"PXCP"));
    }

    #[test]
    fn test_hidden_files_opt_in() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join(".config"), b"c").unwrap();
        fs::write(src.join("level.lvt"), b"l").unwrap();
        let dest = dir.path().join("out.lab");

        let writer = LabWriter::new(&dest, &src).with_format_tag(7);
        assert_eq!(writer.file_list(), ["level.lvt"]);

        let writer = writer.with_hidden_files(true);
        assert_eq!(writer.file_list(), [".config", "level.lvt"]);

        writer.write().unwrap();
        let archive = fs::read(&dest).unwrap();
        let header = LabHeader::parse(&archive).unwrap();
        assert_eq!((header.format_tag, header.file_count), (7, 2));
    }

    #[test]
    fn test_write_is_deterministic() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        for (name, data) in [("c.itm", &b"ccc"[..]), ("a.inf", b"a"), ("b.3do", b"bb")] {
            fs::write(src.join(name), data).unwrap();
        }
        let dest = dir.path().join("out.lab");
        let writer = LabWriter::new(&dest, &src);

        writer.write().unwrap();
        let first = fs::read(&dest).unwrap();
        writer.write().unwrap();
        assert_eq!(fs::read(&dest).unwrap(), first);
    }

    #[test]
    fn test_hidden_files_keeps_explicit_list() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".config"), b"c").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();

        let writer = LabWriter::with_files(dir.path().join("out.lab"), dir.path(), ["b.txt"])
            .with_hidden_files(true);
        assert_eq!(writer.file_list(), ["b.txt"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_write_aborts_pack() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"abc").unwrap();

        // Every write to /dev/full fails with ENOSPC
        let writer = LabWriter::with_files("/dev/full", dir.path(), ["a.txt"]);
        assert!(matches!(
            writer.write(),
            Err(Error::PartialWrite { ref path, .. }) if path == Path::new("/dev/full")
        ));
    }

    #[test]
    fn test_destination_blocked_by_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let writer = LabWriter::with_files(blocker.join("out.lab"), dir.path(), ["a.txt"]);
        assert!(matches!(writer.write(), Err(Error::Io(_))));
    }

    #[test]
    fn test_to_u32_overflow() {
        assert_eq!(to_u32(42, "file").unwrap(), 42);
        assert!(matches!(
            to_u32(u64::from(u32::MAX) + 1, "data offset"),
            Err(Error::ArchiveTooLarge { what: "data offset", .. })
        ));
    }
}
