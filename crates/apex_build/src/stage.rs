//! Collecting edited files.
//!
//! Every regular file below the source tree is a replacement for the asset with the same logical path, except for
//! files that only exist to help editing:
//!
//! - `*.deca_sha1sum` checksum sidecars
//! - anything marked `REFERENCE_ONLY`
//! - raw texture resources (`.ddsc`, `.hmddsc`, `.atx`, `.atxN`), which are produced from `.ddsc.dds` files

use apex_avtx::texture::is_texture_resource;
use apex_avtx::PixelCodec;
use apex_vfs::AssetIndex;
use indexmap::IndexMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::output::OutputTree;

/// Logical paths and the files holding their replacement bytes
pub type StagingSet = IndexMap<String, PathBuf>;

const CHECKSUM_EXTENSION: &str = "deca_sha1sum";
const REFERENCE_MARKER: &str = "REFERENCE_ONLY";
const INTERCHANGE_SUFFIX: &str = ".ddsc.dds";

/// What to do with a file of the source tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedKind {
    /// Not used for the build
    Skip,
    /// An edited texture to import
    Texture,
    /// A replacement, used as is
    Verbatim,
}

/// Classify the file at `logical`
pub fn classify(logical: &str) -> StagedKind {
    let name = logical.rsplit('/').next().unwrap_or(logical);
    let extension = name.rsplit_once('.').map(|(_, e)| e);

    let reference = logical.split('/').any(|part| part.contains(REFERENCE_MARKER));

    if extension == Some(CHECKSUM_EXTENSION) || reference {
        StagedKind::Skip
    } else if name.ends_with(INTERCHANGE_SUFFIX) {
        StagedKind::Texture
    } else if extension.is_some_and(is_texture_resource) {
        StagedKind::Skip
    } else {
        StagedKind::Verbatim
    }
}

/// Logical path of `file` below `root`, using `/` as separator
pub fn logical_path(root: &Path, file: &Path) -> Result<String> {
    let invalid = || Error::InvalidPath(file.to_path_buf());
    let relative = file.strip_prefix(root).map_err(|_| invalid())?;

    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;
    Ok(parts.join("/"))
}

/// Copy or import every usable file below `source` into `output`.
#[instrument(skip(index, codec, output), err)]
pub fn stage<I, C>(index: &I, codec: &C, source: &Path, output: &OutputTree) -> Result<StagingSet>
where
    I: AssetIndex + ?Sized,
    C: PixelCodec + ?Sized,
{
    let mut staging = StagingSet::new();

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let logical = logical_path(source, entry.path())?;
        match classify(&logical) {
            StagedKind::Skip => {
                debug!(logical, "skipping");
            }
            StagedKind::Texture => {
                let texture_path = &logical[..logical.len() - ".dds".len()];
                info!("importing {logical}");

                let texture = apex_avtx::load(index, texture_path, codec)?;
                let edited = BufReader::new(File::open(entry.path())?);
                for (resource, bytes) in apex_avtx::import::import(&texture, edited)? {
                    let target = output.write(&resource, &bytes)?;
                    staging.insert(resource, target);
                }
            }
            StagedKind::Verbatim => {
                info!("staging {logical}");
                let target = output.copy(&logical, entry.path())?;
                staging.insert(logical, target);
            }
        }
    }

    Ok(staging)
}
