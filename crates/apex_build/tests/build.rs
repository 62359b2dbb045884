use apex_avtx::header::{AvtxHeader, INTERCHANGE_HEADER_LEN};
use apex_avtx::BasicCodec;
use apex_build::error::{Error, Result};
use apex_build::{BuildOptions, Builder};
use apex_sarc::{SarcArchive, SarcWriter};
use apex_vfs::{DirectoryIndex, MemoryIndex, NodeKind};
use binrw::BinWrite;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing_test::traced_test;

fn sarc(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = SarcWriter::default();
    for (path, data) in members {
        writer.add_file(*path, data.to_vec());
    }
    writer.finish(Vec::new()).expect("sarc")
}

fn write(root: &Path, logical: &str, data: &[u8]) {
    let path = root.join(logical);
    fs::create_dir_all(path.parent().expect("parent")).expect("directories");
    fs::write(path, data).expect("write");
}

fn options(source: &Path, destination: &Path) -> BuildOptions {
    BuildOptions::builder()
        .source(source.to_path_buf())
        .destination(destination.to_path_buf())
        .build()
}

#[traced_test]
#[test]
fn nested_containers_are_rebuilt_inside_out() -> Result<()> {
    let game = tempfile::tempdir()?;
    let source = tempfile::tempdir()?;
    let destination = tempfile::tempdir()?;

    let inner = sarc(&[("settings/b.bin", b"bbbb"), ("settings/c.bin", b"cc")]);
    let outer = sarc(&[("settings/a.bin", b"aaaa"), ("inner/pack.bl", &inner)]);
    write(game.path(), "globals/outer.ee", &outer);
    write(source.path(), "settings/b.bin", b"BBBBBB");
    write(source.path(), "settings/b.bin.deca_sha1sum", b"0123");

    let index = DirectoryIndex::scan(game.path())?;
    let report = Builder::new(&index, options(source.path(), destination.path())).build()?;

    assert_eq!(report.rebuilt, vec!["inner/pack.bl", "globals/outer.ee"]);
    assert_eq!(
        report.completed.keys().collect::<Vec<_>>(),
        vec!["settings/b.bin", "inner/pack.bl", "globals/outer.ee"]
    );
    assert!(!destination.path().join("settings/b.bin.deca_sha1sum").exists());
    assert_eq!(fs::read(destination.path().join("settings/b.bin"))?, b"BBBBBB");

    let inner = SarcArchive::new(fs::read(destination.path().join("inner/pack.bl"))?)?;
    let b = inner.by_name("settings/b.bin").expect("b");
    assert!(b.is_symlink());
    assert_eq!(b.length, 6);
    let c = inner.by_name("settings/c.bin").expect("c");
    assert_eq!(inner.payload(c)?, Some(&b"cc"[..]));

    let outer = SarcArchive::new(fs::read(destination.path().join("globals/outer.ee"))?)?;
    let nested = outer.by_name("inner/pack.bl").expect("inner");
    assert!(nested.is_symlink());
    assert_eq!(nested.length as usize, inner.as_bytes().len());
    let a = outer.by_name("settings/a.bin").expect("a");
    assert_eq!(outer.payload(a)?, Some(&b"aaaa"[..]));

    Ok(())
}

#[test]
fn shared_member_completes_both_containers() -> Result<()> {
    let source = tempfile::tempdir()?;
    let destination = tempfile::tempdir()?;

    let mut index = MemoryIndex::new();
    index.add_sarc(
        Some("left.ee"),
        sarc(&[("shared.bin", b"s"), ("l.bin", b"l")]),
        None,
    )?;
    index.add_sarc(
        Some("right.ee"),
        sarc(&[("r.bin", b"r"), ("shared.bin", b"s")]),
        None,
    )?;
    write(source.path(), "shared.bin", b"shared!");

    let report = Builder::new(&index, options(source.path(), destination.path())).build()?;

    assert_eq!(report.rebuilt, vec!["left.ee", "right.ee"]);
    for container in ["left.ee", "right.ee"] {
        let rebuilt = SarcArchive::new(fs::read(destination.path().join(container))?)?;
        let shared = rebuilt.by_name("shared.bin").expect("shared");
        assert!(shared.is_symlink());
        assert_eq!(shared.length, 7);
    }

    Ok(())
}

#[test]
fn cyclic_containers_fail_with_every_pending_path() -> Result<()> {
    let source = tempfile::tempdir()?;
    let destination = tempfile::tempdir()?;

    let mut index = MemoryIndex::new();
    let a = index.add(Some("a.ee"), NodeKind::Container, None, None);
    let b = index.add(Some("b.ee"), NodeKind::Container, Some(a), None);
    index.add(Some("a.ee"), NodeKind::Container, Some(b), None);
    index.add(Some("c.bin"), NodeKind::Opaque, Some(b), None);
    write(source.path(), "c.bin", b"c");

    let result = Builder::new(&index, options(source.path(), destination.path())).build();

    assert!(matches!(
        result,
        Err(Error::UnresolvedBuild { pending }) if pending == vec!["a.ee", "b.ee"]
    ));

    Ok(())
}

#[test]
fn anonymous_parent_is_a_missing_target() -> Result<()> {
    let source = tempfile::tempdir()?;
    let destination = tempfile::tempdir()?;

    let mut index = MemoryIndex::new();
    let anonymous = index.add(None, NodeKind::Container, None, None);
    index.add(Some("a.bin"), NodeKind::Opaque, Some(anonymous), None);
    write(source.path(), "a.bin", b"a");

    let result = Builder::new(&index, options(source.path(), destination.path())).build();

    assert!(matches!(
        result,
        Err(Error::MissingDependencyTarget { member, .. }) if member == "a.bin"
    ));

    Ok(())
}

#[traced_test]
#[test]
fn unknown_files_are_staged_but_not_packed() -> Result<()> {
    let source = tempfile::tempdir()?;
    let destination = tempfile::tempdir()?;
    write(source.path(), "notes/readme.txt", b"hello");

    let report = Builder::new(
        &MemoryIndex::new(),
        options(source.path(), destination.path()),
    )
    .build()?;

    assert!(report.rebuilt.is_empty());
    assert!(report.completed.contains_key("notes/readme.txt"));
    assert!(logs_contain("is not part of the game"));

    Ok(())
}

#[test]
fn existing_outputs_are_not_overwritten() -> Result<()> {
    let source = tempfile::tempdir()?;
    let destination = tempfile::tempdir()?;
    write(source.path(), "a.bin", b"a");

    let index = MemoryIndex::new();
    Builder::new(&index, options(source.path(), destination.path())).build()?;

    let again = Builder::new(&index, options(source.path(), destination.path())).build();
    assert!(matches!(again, Err(Error::OutputExists(_))));

    let forced = BuildOptions::builder()
        .source(source.path().to_path_buf())
        .destination(destination.path().to_path_buf())
        .allow_overwrite(true)
        .build();
    Builder::new(&index, forced).build()?;

    Ok(())
}

/// A 2x2 B8G8R8A8 texture with two mips, the 1x1 one resident
fn texture_resources() -> (Vec<u8>, Vec<u8>) {
    let header = AvtxHeader {
        version: 1,
        dimension: 2,
        pixel_format: 87,
        width: 2,
        height: 2,
        depth: 1,
        declared_mips: 2,
        resident_mips: 1,
        ..Default::default()
    };

    let mut base = Cursor::new(Vec::new());
    header.write(&mut base).expect("header");
    base.get_mut().extend([9u8; 4]);

    (base.into_inner(), vec![7u8; 16])
}

#[traced_test]
#[test]
fn edited_textures_are_imported_and_packed() -> Result<()> {
    let game = tempfile::tempdir()?;
    let source = tempfile::tempdir()?;
    let destination = tempfile::tempdir()?;

    let (base, hmddsc) = texture_resources();
    write(
        game.path(),
        "archives/textures.ee",
        &sarc(&[("textures/rock.ddsc", &base), ("models/rock.modelc", b"m")]),
    );
    write(game.path(), "textures/rock.hmddsc", &hmddsc);

    let index = DirectoryIndex::scan(game.path())?;
    let texture = apex_avtx::load(&index, "textures/rock.ddsc", &BasicCodec)?;
    let mut dds = apex_avtx::export::export(&texture)?;
    dds[INTERCHANGE_HEADER_LEN..INTERCHANGE_HEADER_LEN + 16].copy_from_slice(&[1u8; 16]);
    write(source.path(), "textures/rock.ddsc.dds", &dds);
    write(source.path(), "textures/rock.ddsc.REFERENCE_ONLY.png", b"png");

    let report = Builder::new(&index, options(source.path(), destination.path())).build()?;

    assert_eq!(report.rebuilt, vec!["archives/textures.ee"]);
    assert_eq!(
        fs::read(destination.path().join("textures/rock.hmddsc"))?,
        vec![1u8; 16]
    );
    assert_eq!(fs::read(destination.path().join("textures/rock.ddsc"))?, base);
    assert!(!destination
        .path()
        .join("textures/rock.ddsc.REFERENCE_ONLY.png")
        .exists());

    let pack = SarcArchive::new(fs::read(destination.path().join("archives/textures.ee"))?)?;
    let rock = pack.by_name("textures/rock.ddsc").expect("rock");
    assert!(rock.is_symlink());
    assert_eq!(rock.length as usize, base.len());

    Ok(())
}
