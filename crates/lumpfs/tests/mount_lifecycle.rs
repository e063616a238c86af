#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for mounting, overriding, resetting and the auxiliary
//! index
//!
//! Fixtures are written to a temporary directory with the format builders
//! and mounted through the public `Vfs` API.

use lumpfs::{CacheTag, Container, LumpNum, Vfs, VfsConfig, VfsError};
use lumpfs_formats::wad::{WadBuilder, WadKind};
use lumpfs_formats::zip::ZipBuilder;
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

fn wad_bytes(kind: WadKind, lumps: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut builder = WadBuilder::new(kind);
    for (name, data) in lumps {
        builder.add_lump(name, data.clone()).unwrap();
    }
    builder.to_vec().unwrap()
}

fn write(dir: &Path, name: &str, bytes: Vec<u8>) {
    std::fs::write(dir.join(name), bytes).unwrap();
}

fn game_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "base.wad",
        wad_bytes(
            WadKind::Iwad,
            &[
                ("E1M1", vec![0xB0; 1024]),
                ("PLAYPAL", vec![0; 768]),
            ],
        ),
    );
    write(
        dir.path(),
        "patch.wad",
        wad_bytes(WadKind::Pwad, &[("E1M1", vec![0xD0; 2048])]),
    );
    dir
}

#[test]
fn patch_overrides_until_reset() {
    let dir = game_dir();
    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));

    vfs.add_file("base.wad", false).unwrap().unwrap();
    vfs.end_startup();
    vfs.add_file("patch.wad", false).unwrap().unwrap();
    assert_eq!(vfs.lump_count(), 3);

    let e1m1 = vfs.lump_num_for_name("E1M1").unwrap();
    assert_eq!(vfs.lump_length(e1m1).unwrap(), 2048);
    assert!(vfs.lump_source_file(e1m1).unwrap().ends_with("/patch.wad"));

    let mut data = vec![0u8; 2048];
    assert_eq!(vfs.read_lump(e1m1, &mut data).unwrap(), 2048);
    assert!(data.iter().all(|&b| b == 0xD0));

    assert_eq!(vfs.reset(), 1);
    assert_eq!(vfs.lump_count(), 2);
    assert!(!vfs.is_loaded("patch.wad"));

    let e1m1 = vfs.lump_num_for_name("E1M1").unwrap();
    assert_eq!(vfs.lump_length(e1m1).unwrap(), 1024);
    assert!(vfs.lump_source_file(e1m1).unwrap().ends_with("/base.wad"));
    assert!(!vfs.lump_is_custom(e1m1).unwrap());

    // The patch can be mounted again after a reset
    assert!(vfs.add_file("patch.wad", false).unwrap().is_some());
    vfs.shutdown();
}

#[test]
fn unmount_restores_shadowed_lumps() {
    let dir = game_dir();
    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    vfs.add_file("base.wad", false).unwrap();
    vfs.add_file("patch.wad", false).unwrap();

    let before = vfs.lump_count();
    assert!(vfs.remove_file("patch.wad", false));
    assert_eq!(vfs.lump_count(), before - 1);

    let e1m1 = vfs.lump_num_for_name("E1M1").unwrap();
    assert_eq!(vfs.lump_length(e1m1).unwrap(), 1024);
    assert!(!vfs.remove_file("patch.wad", false));
}

#[test]
fn loaded_files_keep_mount_order() {
    let dir = game_dir();
    write(dir.path(), "readme.txt", b"not an archive".to_vec());
    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));

    for file in ["base.wad", "readme.txt", "patch.wad"] {
        vfs.add_file(file, false).unwrap().unwrap();
    }

    let names: Vec<&str> = vfs
        .loaded_files()
        .map(|file| file.path().rsplit('/').next().unwrap())
        .collect();
    assert_eq!(names, vec!["base.wad", "readme.txt", "patch.wad"]);

    let orders: Vec<u32> = vfs.loaded_files().map(|f| f.core().load_order()).collect();
    assert!(orders.windows(2).all(|pair| pair[0] < pair[1]));

    // Loose files become one lump named after the file
    let readme = vfs.lump_num_for_name("README").unwrap();
    assert_eq!(vfs.lump_length(readme).unwrap(), 14);
}

#[test]
fn auxiliary_is_isolated_from_primary() {
    let dir = game_dir();
    write(
        dir.path(),
        "demo.wad",
        wad_bytes(
            WadKind::Pwad,
            &[("E1M1", vec![0xA0; 10]), ("DEMO1", vec![1; 32])],
        ),
    );
    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    vfs.add_file("base.wad", false).unwrap();

    let primary_count = vfs.lump_count();
    let first = vfs.open_auxiliary("demo.wad").unwrap();
    assert_eq!(first, LumpNum::AUXILIARY_START);
    assert_eq!(vfs.lump_count(), primary_count);
    assert_eq!(vfs.auxiliary_index().unwrap().len(), 2);
    assert!(vfs.loaded_files().all(|f| !f.path().ends_with("demo.wad")));

    // Auxiliary lumps win name lookups
    let e1m1 = vfs.lump_num_for_name("E1M1").unwrap();
    assert!(e1m1.is_auxiliary());
    assert_eq!(vfs.lump_length(e1m1).unwrap(), 10);
    assert_eq!(vfs.lump_name(first).unwrap(), "E1M1");

    assert!(vfs.close_auxiliary());
    assert!(!vfs.close_auxiliary());
    assert!(matches!(
        vfs.lump_info(e1m1),
        Err(VfsError::InvalidLumpNum(_))
    ));

    let e1m1 = vfs.lump_num_for_name("E1M1").unwrap();
    assert!(!e1m1.is_auxiliary());
    assert_eq!(vfs.lump_length(e1m1).unwrap(), 1024);
    assert_eq!(vfs.check_lump_num_for_name("DEMO1", true), None);
}

#[test]
fn auxiliary_replaces_previous_and_rejects_zip() {
    let dir = game_dir();
    let mut zip = ZipBuilder::new();
    zip.add_stored("a.txt", b"a".to_vec()).unwrap();
    write(dir.path(), "pack.pk3", zip.to_vec().unwrap());

    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    vfs.open_auxiliary("base.wad").unwrap();
    vfs.open_auxiliary("patch.wad").unwrap();
    assert_eq!(vfs.auxiliary_index().unwrap().len(), 1);
    assert_eq!(vfs.open_file_count(), 1);

    assert!(matches!(
        vfs.open_auxiliary("pack.pk3"),
        Err(VfsError::AuxiliaryOpen(_))
    ));
    assert!(!vfs.has_auxiliary());
    assert_eq!(vfs.open_file_count(), 0);

    assert!(matches!(
        vfs.open_auxiliary("missing.wad"),
        Err(VfsError::AuxiliaryOpen(_))
    ));
}

#[test]
fn size_qualified_lookup() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "small.wad",
        wad_bytes(WadKind::Pwad, &[("DEMO", vec![1; 100])]),
    );
    write(
        dir.path(),
        "large.wad",
        wad_bytes(WadKind::Pwad, &[("DEMO", vec![2; 200])]),
    );
    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    vfs.add_file("small.wad", false).unwrap();
    vfs.add_file("large.wad", false).unwrap();

    let size = |query: &str| {
        vfs.check_lump_num_for_name(query, true)
            .map(|lump| vfs.lump_length(lump).unwrap())
    };
    assert_eq!(size("DEMO"), Some(200));
    assert_eq!(size("DEMO==100"), Some(100));
    assert_eq!(size("DEMO>=150"), Some(200));
    assert_eq!(size("DEMO<=150"), Some(100));
    assert_eq!(size("DEMO<=50"), None);
}

#[test]
fn nested_wad_mounts_from_pk3() {
    let dir = TempDir::new().unwrap();
    let inner = wad_bytes(WadKind::Pwad, &[("MAP01", vec![0x01; 64])]);
    let mut zip = ZipBuilder::new();
    zip.add_deflated("maps/level.wad", inner).unwrap();
    write(dir.path(), "mod.pk3", zip.to_vec().unwrap());

    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    vfs.add_file("mod.pk3", false).unwrap().unwrap();
    assert_eq!(vfs.lump_count(), 0);
    assert!(vfs.access("maps/level.wad"));

    vfs.add_file("maps/level.wad", false).unwrap().unwrap();
    let map = vfs.lump_num_for_name("MAP01").unwrap();
    assert_eq!(vfs.lump_length(map).unwrap(), 64);
    assert!(vfs.lump_source_file(map).unwrap().ends_with("/maps/level.wad"));

    // Unmounting the PK3 leaves the already-mounted WAD readable
    assert!(vfs.remove_file("mod.pk3", false));
    assert!(vfs.zip_index().is_empty());
    let mut buf = [0u8; 64];
    assert_eq!(vfs.read_lump(map, &mut buf).unwrap(), 64);
}

#[test]
fn malformed_archive_is_not_mounted() {
    let dir = TempDir::new().unwrap();
    let mut bytes = b"IWAD".to_vec();
    bytes.extend_from_slice(&3i32.to_le_bytes());
    bytes.extend_from_slice(&4096i32.to_le_bytes());
    write(dir.path(), "broken.wad", bytes);

    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    let err = vfs.add_file("broken.wad", false).unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(vfs.open_file_count(), 0);
    assert!(!vfs.is_loaded("broken.wad"));
}

#[test]
fn cached_lumps_are_released_on_purge() {
    let dir = game_dir();
    let mut vfs = Vfs::new(VfsConfig::new(dir.path()));
    vfs.add_file("base.wad", false).unwrap();

    let playpal = vfs.lump_num_for_name("PLAYPAL").unwrap();
    let first = vfs.cache_lump(playpal, CacheTag::Map).unwrap();
    let stats = vfs.lump_container(playpal).unwrap().io_stats();
    let second = vfs.cache_lump(playpal, CacheTag::Map).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(vfs.lump_container(playpal).unwrap().io_stats(), stats);

    let local_index = vfs.lump_info(playpal).unwrap().local_index;
    assert!(vfs.lump_container(playpal).unwrap().is_lump_cached(local_index));

    assert_eq!(vfs.purge_cache(CacheTag::Map), 1);
    assert!(!vfs.lump_container(playpal).unwrap().is_lump_cached(local_index));
    assert_eq!(vfs.purge_cache(CacheTag::Static), 0);
}

#[test]
fn config_from_json() {
    let dir = game_dir();
    std::fs::create_dir(dir.path().join("data")).unwrap();
    std::fs::rename(dir.path().join("patch.wad"), dir.path().join("data/patch.wad")).unwrap();

    let json = format!(
        r#"{{
            "base_path": {:?},
            "virtual_directory_mappings": [{{ "source": "auto", "destination": "data" }}],
            "required_files": ["base.wad"]
        }}"#,
        dir.path().to_string_lossy()
    );
    let config = VfsConfig::from_json_str(&json).unwrap();
    assert!(config.load_lump_directory_mappings);

    let mut vfs = Vfs::new(config);
    vfs.add_file("base.wad", false).unwrap().unwrap();
    vfs.add_file("auto/patch.wad", false).unwrap().unwrap();

    assert!(!vfs.remove_file("base.wad", false));
    assert!(vfs.remove_file("auto/patch.wad", false));
}
