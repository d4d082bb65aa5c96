use labkit::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn populate(dir: &Path, files: &[(&str, &[u8])]) {
    fs::create_dir_all(dir).unwrap();
    for (name, data) in files {
        fs::write(dir.join(name), data).unwrap();
    }
}

const LEVEL_FILES: &[(&str, &[u8])] = &[
    ("hideout.lvt", b"LVT 1.1\nLEVELNAME hideout\n"),
    ("hideout.inf", b"INF 1.0"),
    ("gun.wav", b"RIFF\x24\x00\x00\x00WAVEfmt "),
    ("marshal.itm", b"ITEM 1.0 NAME marshal"),
    ("crate.3do", b"3DO 2.1\x00\x01\x02\x03"),
    ("notes.txt", b"\x00\xffbinary\x00"),
];

#[test]
fn test_pack_unpack_round_trip() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    let lab = dir.path().join("hideout.lab");
    populate(&src, LEVEL_FILES);

    let stats = LabWriter::new(&lab, &src).write().unwrap();
    assert_eq!(stats.files_packed, LEVEL_FILES.len());
    assert_eq!(stats.archive_size, fs::metadata(&lab).unwrap().len());

    let mut reader = LabReader::new(&lab);
    reader.open().unwrap();
    assert_eq!(reader.len(), LEVEL_FILES.len());
    assert_eq!(reader.extract_all(&out), LEVEL_FILES.len());

    for (name, data) in LEVEL_FILES {
        assert_eq!(fs::read(out.join(name)).unwrap(), *data, "{name}");
        assert_eq!(reader.read_file(name), Some(*data));
    }
    assert_eq!(fs::read_dir(&out).unwrap().count(), LEVEL_FILES.len());
}

#[test]
fn test_pack_is_deterministic() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    populate(&src, LEVEL_FILES);

    let first = dir.path().join("first.lab");
    let second = dir.path().join("second.lab");
    LabWriter::new(&first, &src).write().unwrap();
    LabWriter::new(&second, &src).write().unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_listing_is_sorted_with_type_tags() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let lab = dir.path().join("hideout.lab");
    populate(&src, LEVEL_FILES);
    LabWriter::new(&lab, &src).write().unwrap();

    let mut reader = LabReader::new(&lab);
    reader.open().unwrap();
    let entries = reader.list_entries().unwrap();

    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["crate.3do", "gun.wav", "hideout.inf", "hideout.lvt", "marshal.itm", "notes.txt"]
    );
    let tags: Vec<String> = entries.iter().map(|e| e.type_tag.to_string()).collect();
    assert_eq!(tags, vec!["FOD3", "DVAW", "FFNI", "FTVL", "METI", "----"]);

    // Payloads follow each other in name order
    let header = reader.header().unwrap();
    let mut expected_offset = header.data_offset();
    for entry in &entries {
        assert_eq!(u64::from(entry.data_offset), expected_offset);
        expected_offset += u64::from(entry.size);
    }
}

#[test]
fn test_extract_into_blocked_destination() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let lab = dir.path().join("hideout.lab");
    populate(&src, LEVEL_FILES);
    LabWriter::new(&lab, &src).write().unwrap();

    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    let mut reader = LabReader::new(&lab);
    reader.open().unwrap();
    assert_eq!(reader.extract_all(blocker.join("out")), 0);
    assert_eq!(fs::read(&blocker).unwrap(), b"not a directory");
}

#[test]
fn test_empty_source_dir_writes_nothing() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    let lab = dir.path().join("empty.lab");

    let result = LabWriter::new(&lab, &src).write();
    assert!(matches!(result, Err(Error::NoInputFiles { .. })));
    assert!(!lab.exists());
}

#[test]
fn test_open_rejects_foreign_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fake.lab");
    fs::write(&path, b"GOB \x00\x00\x00\x00 not a lab archive").unwrap();

    let mut reader = LabReader::new(&path);
    assert!(matches!(reader.open(), Err(Error::BadMagic { found }) if &found == b"GOB "));
    assert!(!reader.is_open());
    assert_eq!(reader.len(), 0);
    assert_eq!(reader.extract_all(dir.path().join("out")), 0);
}

#[test]
fn test_skipped_source_file_still_readable() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let lab = dir.path().join("partial.lab");
    populate(&src, &[("a.txt", b"abc"), ("c.txt", b"ccc")]);

    let stats = LabWriter::with_files(&lab, &src, ["a.txt", "b.txt", "c.txt"])
        .write()
        .unwrap();
    assert_eq!(stats.files_packed, 2);
    assert_eq!(stats.skipped, vec!["b.txt".to_string()]);

    let mut reader = LabReader::new(&lab);
    reader.open().unwrap();
    assert_eq!(reader.len(), 2);
    assert_eq!(reader.read_file("a.txt"), Some(&b"abc"[..]));
    assert_eq!(reader.read_file("c.txt"), Some(&b"ccc"[..]));
    assert_eq!(reader.read_file("b.txt"), None);
}

#[test]
fn test_format_tag_survives_round_trip() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let lab = dir.path().join("tagged.lab");
    populate(&src, &[("a.txt", b"a")]);

    LabWriter::new(&lab, &src)
        .with_format_tag(0xDEAD_BEEF)
        .write()
        .unwrap();

    let mut reader = LabReader::new(&lab);
    reader.open().unwrap();
    let header = reader.header().unwrap();
    assert_eq!(header.magic, MAGIC);
    assert_eq!(header.format_tag, 0xDEAD_BEEF);
    assert_eq!(header.file_count, 1);
}
