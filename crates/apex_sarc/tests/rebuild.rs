use std::collections::HashMap;

use apex_sarc::{error::Error, error::Result, SarcArchive, SarcWriter, MAX_BLOCK_SIZE};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

const MIB: usize = 1024 * 1024;

fn no_replacements() -> HashMap<String, Vec<u8>> {
    HashMap::new()
}

fn members() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("gfx/a.ddsc", vec![0x11; 13]),
        ("gfx/b.ddsc", Vec::new()),
        ("settings/c.bin", vec![0x22; 1021]),
        ("settings/d.bin", vec![0x33; 3]),
    ]
}

fn build(members: &[(&str, Vec<u8>)], symlinks: &[(&str, u32)]) -> Result<SarcArchive> {
    let mut writer = SarcWriter::default();
    for (path, data) in members {
        writer.add_file(path, data.clone());
    }
    for (path, length) in symlinks {
        writer.add_symlink(path, *length);
    }
    SarcArchive::new(writer.finish(Vec::new())?)
}

#[traced_test]
#[test]
fn round_trip_keeps_directory_and_payloads() -> Result<()> {
    let original = build(&members(), &[("loose/e.bin", 77)])?;
    let rebuilt = SarcArchive::new(original.rebuild(&no_replacements())?)?;

    assert_eq!(original.len(), rebuilt.len());
    for (before, after) in original.entries().iter().zip(rebuilt.entries()) {
        info!("comparing {}", before.path);
        assert_eq!(before, after);
        assert_eq!(original.payload(before)?, rebuilt.payload(after)?);
    }

    Ok(())
}

#[traced_test]
#[test]
fn every_packed_member_is_aligned() -> Result<()> {
    let original = build(&members(), &[])?;

    let mut replacements = HashMap::new();
    replacements.insert("gfx/a.ddsc".to_string(), vec![0u8; 5]);

    let rebuilt = SarcArchive::new(original.rebuild(&replacements)?)?;
    for entry in rebuilt.entries().iter().filter(|e| !e.is_symlink()) {
        assert_eq!(entry.offset % 4, 0, "{} is unaligned", entry.path);
    }

    Ok(())
}

#[traced_test]
#[test]
fn symlinks_survive_rebuild() -> Result<()> {
    let original = build(&members(), &[("loose/e.bin", 77), ("loose/f.bin", 3)])?;

    let mut replacements = HashMap::new();
    replacements.insert("loose/e.bin".to_string(), vec![0u8; 100]);

    let rebuilt = SarcArchive::new(original.rebuild(&replacements)?)?;

    let e = rebuilt.by_name("loose/e.bin").expect("loose/e.bin");
    assert!(e.is_symlink());
    assert_eq!(e.length, 100);

    let f = rebuilt.by_name("loose/f.bin").expect("loose/f.bin");
    assert!(f.is_symlink());
    assert_eq!(f.length, 3);

    Ok(())
}

#[test]
fn large_members_do_not_cross_block_boundaries() -> Result<()> {
    let large = vec![
        ("first.bin", vec![0xAB; 20 * MIB]),
        ("second.bin", vec![0xCD; 20 * MIB]),
        ("small.bin", vec![0xEF; 16]),
    ];
    let original = build(&large, &[])?;
    let rebuilt = SarcArchive::new(original.rebuild(&no_replacements())?)?;

    let block = MAX_BLOCK_SIZE;
    for entry in rebuilt.entries() {
        let start = entry.offset as u64;
        let end = start + entry.length as u64;
        assert_eq!(start / block, (end - 1) / block, "{} crosses a block", entry.path);
    }

    let second = rebuilt.by_name("second.bin").expect("second.bin");
    assert_eq!(second.offset as u64, block);
    assert_eq!(
        rebuilt.payload(second)?.map(|p| p.iter().all(|&b| b == 0xCD)),
        Some(true)
    );

    Ok(())
}

#[test]
fn oversized_member_is_rejected() {
    let mut writer = SarcWriter::default();
    writer.add_file("huge.bin", vec![0u8; MAX_BLOCK_SIZE as usize + 1]);

    assert!(matches!(
        writer.finish(Vec::new()),
        Err(Error::OversizedMember { ref path, .. }) if path == "huge.bin"
    ));
}

#[rustfmt::skip]
fn version3() -> Vec<u8> {
    vec![
        // Header (16)
        0x04, 0x00, 0x00, 0x00, 0x53, 0x41, 0x52, 0x43,
        0x03, 0x00, 0x00, 0x00, 0x3C, 0x00, 0x00, 0x00,
        // String block (4 + 16)
        0x10, 0x00, 0x00, 0x00,
        b'a', b'.', b't', b'x', b't', 0x00,
        b'b', b'/', b'c', b'.', b'b', b'i', b'n', 0x00, 0x00, 0x00,
        // Records (40)
        0x00, 0x00, 0x00, 0x00,
        0x4C, 0x00, 0x00, 0x00,
        0x03, 0x00, 0x00, 0x00,
        0x11, 0x11, 0x11, 0x11,
        0x22, 0x22, 0x22, 0x22,

        0x06, 0x00, 0x00, 0x00,
        0x50, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x00, 0x00,
        0x33, 0x33, 0x33, 0x33,
        0x44, 0x44, 0x44, 0x44,
        // Data
        b'a', b'b', b'c', 0x00,
        b'x', b'y',
    ]
}

#[traced_test]
#[test]
fn version3_round_trip() -> Result<()> {
    let original = SarcArchive::new(version3())?;
    let rebuilt = original.rebuild(&no_replacements())?;

    assert_eq!(rebuilt, original.as_bytes());

    Ok(())
}

#[traced_test]
#[test]
fn version3_patches_only_offsets_and_lengths() -> Result<()> {
    let original = SarcArchive::new(version3())?;

    let mut replacements = HashMap::new();
    replacements.insert("a.txt".to_string(), vec![0u8; 9]);

    let rebuilt = SarcArchive::new(original.rebuild(&replacements)?)?;
    assert_eq!(rebuilt.header().version, 3);

    let a = rebuilt.by_name("a.txt").expect("a.txt");
    assert!(a.is_symlink());
    assert_eq!(a.length, 9);

    let b = rebuilt.by_name("b/c.bin").expect("b/c.bin");
    assert_eq!(b.offset, 0x4C);
    assert_eq!(rebuilt.payload(b)?, Some(&b"xy"[..]));

    // Name offsets and hashes of both records are untouched
    let (before, after) = (original.as_bytes(), rebuilt.as_bytes());
    for record in [36usize, 56] {
        assert_eq!(before[record..record + 4], after[record..record + 4]);
        assert_eq!(before[record + 12..record + 20], after[record + 12..record + 20]);
    }
    assert_eq!(after.len(), 0x4C + 2);

    Ok(())
}

#[test]
fn oversized_member_fails_rebuild() -> Result<()> {
    let length = MAX_BLOCK_SIZE as u32 + 1;

    let mut data = Vec::with_capacity(36 + length as usize);
    data.extend_from_slice(b"\x04\x00\x00\x00SARC");
    data.extend_from_slice(&2u32.to_le_bytes());
    data.extend_from_slice(&20u32.to_le_bytes());
    data.extend_from_slice(&8u32.to_le_bytes());
    data.extend_from_slice(b"huge.bin");
    data.extend_from_slice(&36u32.to_le_bytes());
    data.extend_from_slice(&length.to_le_bytes());
    data.resize(36 + length as usize, 0xAA);

    let original = SarcArchive::new(data)?;
    assert!(matches!(
        original.rebuild(&no_replacements()),
        Err(Error::OversizedMember { ref path, size }) if path == "huge.bin" && size == length as u64
    ));

    // Shipping it as a loose file instead is fine
    let mut replacements = HashMap::new();
    replacements.insert("huge.bin".to_string(), Vec::new());
    let rebuilt = SarcArchive::new(original.rebuild(&replacements)?)?;
    assert!(rebuilt.entries()[0].is_symlink());

    Ok(())
}
