#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for reading lumps and opening virtual paths

use lumpfs::{OpenMode, Vfs, VfsConfig};
use lumpfs_formats::wad::{WadBuilder, WadKind};
use lumpfs_formats::deflate::{DEFAULT_LEVEL, deflate_raw};
use lumpfs_formats::zip::{ZipBuilder, crc32};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::{Read, Seek, SeekFrom};
use tempfile::TempDir;

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

fn mounted(data: &[u8]) -> (TempDir, Vfs) {
    let dir = TempDir::new().unwrap();

    let mut wad = WadBuilder::new(WadKind::Pwad);
    wad.add_lump("PAYLOAD", data.to_vec()).unwrap();
    std::fs::write(dir.path().join("data.wad"), wad.to_vec().unwrap()).unwrap();

    let mut zip = ZipBuilder::new();
    zip.add_deflated("packed/payload.bin", data.to_vec())
        .unwrap()
        .add_stored("loose/payload.bin", data.to_vec())
        .unwrap();
    std::fs::write(dir.path().join("data.pk3"), zip.to_vec().unwrap()).unwrap();

    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    vfs.add_file("data.wad", false).unwrap().unwrap();
    vfs.add_file("data.pk3", false).unwrap().unwrap();
    (dir, vfs)
}

#[test]
fn handles_read_and_seek() {
    let data = pattern(1000, 3);
    let (_dir, vfs) = mounted(&data);

    let mut handle = vfs.open("PAYLOAD", OpenMode::READ).unwrap().unwrap();
    assert_eq!(handle.len(), 1000);
    handle.seek(SeekFrom::Start(990)).unwrap();
    let mut tail = Vec::new();
    handle.read_to_end(&mut tail).unwrap();
    assert_eq!(tail, &data[990..]);
    assert_eq!(handle.tell(), 1000);

    let mut handle = vfs
        .open_with_mode("loose/payload.bin", "rbx")
        .unwrap()
        .unwrap();
    assert!(handle.is_delegate());
    assert_eq!(handle.read_all().unwrap(), data);

    // Compressed entries are always buffered
    let mut handle = vfs
        .open_with_mode("packed/payload.bin", "rx")
        .unwrap()
        .unwrap();
    assert!(handle.is_buffered());
    assert_eq!(handle.read_all().unwrap(), data);
}

#[test]
fn unbuffered_open_inflates_deflated_entries_of_equal_size() {
    let original = b"E1M1".repeat(250);
    let mut packed = deflate_raw(&original, DEFAULT_LEVEL).unwrap();
    packed.resize(original.len(), 0);

    let dir = TempDir::new().unwrap();
    let mut zip = ZipBuilder::new();
    zip.add_raw("data/blob.bin", 8, crc32(&original), original.len(), packed)
        .unwrap();
    std::fs::write(dir.path().join("blob.pk3"), zip.to_vec().unwrap()).unwrap();

    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    vfs.add_file("blob.pk3", false).unwrap().unwrap();

    let mut handle = vfs.open_with_mode("data/blob.bin", "rx").unwrap().unwrap();
    assert!(handle.is_buffered());
    assert!(!handle.is_delegate());
    assert_eq!(handle.read_all().unwrap(), original);
}

#[test]
fn lump_directory_makes_lumps_addressable() {
    let dir = TempDir::new().unwrap();
    let mut wad = WadBuilder::new(WadKind::Pwad);
    wad.add_lump(
        "DD_DIREC",
        b"# lump   path\nINFOTEXT  docs/info.txt\nCREDITS /credits.txt\n".to_vec(),
    )
    .unwrap()
    .add_lump("INFOTEXT", b"lump as file".to_vec())
    .unwrap()
    .add_lump("CREDITS", b"everyone".to_vec())
    .unwrap();
    std::fs::write(dir.path().join("docs.wad"), wad.to_vec().unwrap()).unwrap();

    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    vfs.add_file("docs.wad", false).unwrap();
    assert_eq!(vfs.lump_directory_mappings().len(), 2);

    let mut info = vfs.open("docs/info.txt", OpenMode::READ).unwrap().unwrap();
    assert_eq!(info.read_all().unwrap(), b"lump as file");
    let mut credits = vfs.open("/credits.txt", OpenMode::READ).unwrap().unwrap();
    assert_eq!(credits.read_all().unwrap(), b"everyone");

    // Mappings are skipped entirely when disabled
    let mut vfs = Vfs::new(VfsConfig::new(dir.path()).with_lump_directory_mappings(false));
    vfs.add_file("docs.wad", false).unwrap();
    assert!(vfs.lump_directory_mappings().is_empty());
    assert!(!vfs.access("docs/info.txt"));
}

#[test]
fn real_files_are_opened_directly() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("cfg")).unwrap();
    std::fs::write(dir.path().join("cfg/default.cfg"), b"bind w +forward").unwrap();

    let vfs = Vfs::new(VfsConfig::new(dir.path()));
    let mut handle = vfs
        .open("cfg/default.cfg", OpenMode::READ.real_file_only())
        .unwrap()
        .unwrap();
    assert!(!handle.is_buffered());
    assert!(!handle.is_delegate());
    assert_eq!(handle.read_all().unwrap(), b"bind w +forward");
    assert!(vfs.access("CFG/../cfg/default.cfg"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn partial_reads_match_the_source(
        len in 1usize..5000,
        seed in any::<u8>(),
        start in 0usize..6000,
        count in 0usize..6000,
    ) {
        let data = pattern(len, seed);
        let (_dir, vfs) = mounted(&data);

        let expected_start = start.min(len);
        let expected_end = start.saturating_add(count).min(len).max(expected_start);
        let expected = &data[expected_start..expected_end];

        let lump = vfs.lump_num_for_name("PAYLOAD").unwrap();
        let mut buf = vec![0u8; count];
        let read = vfs.read_lump_section(lump, &mut buf, start, count).unwrap();
        prop_assert_eq!(&buf[..read], expected);

        for path in ["packed/payload.bin", "loose/payload.bin"] {
            let index = vfs.zip_index().index_for_path(&format!("{}/{path}", vfs.base_path())).unwrap();
            let entry = vfs.zip_index().get(index).unwrap();
            let file = vfs.container(entry.container).unwrap();

            let mut buf = vec![0u8; count];
            let read = lumpfs::Container::read_lump_section(file, entry.local_index, &mut buf, start, count, false).unwrap();
            prop_assert_eq!(&buf[..read], expected);
        }
    }
}
