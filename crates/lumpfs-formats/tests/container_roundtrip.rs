#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for WAD and Zip containers built with the crate's own
//! builders
//!
//! Covers nested containers (a WAD stored inside a PK3), directory override
//! order and payload extraction for both compression methods.

use lumpfs_formats::wad::{WadBuilder, WadDirectory, WadKind, is_wad};
use lumpfs_formats::zip::{CompressionMethod, ZipBuilder, ZipDirectory, is_zip};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::Cursor;

fn episode_wad() -> Vec<u8> {
    let mut builder = WadBuilder::new(WadKind::Pwad);
    builder
        .add_marker("E1M1")
        .unwrap()
        .add_lump("THINGS", vec![1u8; 100])
        .unwrap()
        .add_lump("LINEDEFS", vec![2u8; 140])
        .unwrap()
        .add_lump("SIDEDEFS", vec![3u8; 300])
        .unwrap();
    builder.to_vec().unwrap()
}

#[test]
fn nested_wad_inside_pk3() {
    let wad = episode_wad();

    let mut builder = ZipBuilder::new();
    builder.add_deflated("maps/e1m1.wad", wad.clone()).unwrap();
    builder.add_stored("readme.txt", b"episode one".to_vec()).unwrap();
    let archive = builder.to_vec().unwrap();

    let mut cursor = Cursor::new(archive);
    assert!(is_zip(&mut cursor));
    assert!(!is_wad(&mut cursor));

    let directory = ZipDirectory::parse(&mut cursor).unwrap();
    let entry = directory.find("maps/E1M1.WAD").unwrap();
    assert_eq!(entry.method, CompressionMethod::Deflated);

    let extracted = entry.extract(&mut cursor).unwrap();
    assert_eq!(extracted, wad);

    let mut inner = Cursor::new(extracted);
    assert!(is_wad(&mut inner));
    let wad_directory = WadDirectory::parse(&mut inner).unwrap();
    let names: Vec<String> = wad_directory
        .entries
        .iter()
        .map(|entry| entry.name())
        .collect();
    assert_eq!(names, vec!["E1M1", "THINGS", "LINEDEFS", "SIDEDEFS"]);
}

#[test]
fn later_zip_entries_win() {
    let mut builder = ZipBuilder::new();
    builder.add_stored("graphics/titlepic.png", vec![1u8; 8]).unwrap();
    builder.add_stored("GRAPHICS/TitlePic.png", vec![2u8; 8]).unwrap();
    let archive = builder.to_vec().unwrap();

    let mut cursor = Cursor::new(archive);
    let directory = ZipDirectory::parse(&mut cursor).unwrap();
    assert_eq!(directory.len(), 2);

    let entry = directory.find("graphics/titlepic.png").unwrap();
    assert_eq!(entry.extract(&mut cursor).unwrap(), vec![2u8; 8]);
}

#[test]
fn corrupted_wad_is_malformed_not_mismatch() {
    let mut wad = episode_wad();
    // Point the directory past the end of the file
    wad[8..12].copy_from_slice(&i32::MAX.to_le_bytes());

    let err = WadDirectory::parse(&mut Cursor::new(&wad)).unwrap_err();
    assert!(!err.is_format_mismatch());

    wad[0..4].copy_from_slice(b"JUNK");
    let err = WadDirectory::parse(&mut Cursor::new(&wad)).unwrap_err();
    assert!(err.is_format_mismatch());
}

proptest! {
    #[test]
    fn wad_lump_bytes_survive_building(
        lumps in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..256), 1..8)
    ) {
        let mut builder = WadBuilder::new(WadKind::Pwad);
        for (i, data) in lumps.iter().enumerate() {
            builder.add_lump(&format!("LUMP{i}"), data.clone()).unwrap();
        }
        let bytes = builder.to_vec().unwrap();

        let directory = WadDirectory::parse(&mut Cursor::new(&bytes)).unwrap();
        prop_assert_eq!(directory.len(), lumps.len());
        for (entry, data) in directory.entries.iter().zip(&lumps) {
            let start = entry.offset() as usize;
            let end = start + entry.len() as usize;
            prop_assert_eq!(&bytes[start..end], data.as_slice());
        }
    }

    #[test]
    fn zip_entries_decode_to_original(
        data in prop::collection::vec(any::<u8>(), 0..2048),
        deflate in any::<bool>(),
    ) {
        let mut builder = ZipBuilder::new();
        if deflate {
            builder.add_deflated("lump.bin", data.clone()).unwrap();
        } else {
            builder.add_stored("lump.bin", data.clone()).unwrap();
        }

        let mut cursor = Cursor::new(builder.to_vec().unwrap());
        let directory = ZipDirectory::parse(&mut cursor).unwrap();
        prop_assert_eq!(directory.entries[0].extract(&mut cursor).unwrap(), data);
    }
}
