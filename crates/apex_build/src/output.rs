//! The working output tree

use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::error::{Error, Result};

/// Files written below a destination directory, addressed by logical path
#[derive(Debug, Clone)]
pub struct OutputTree {
    root: PathBuf,
    allow_overwrite: bool,
}

impl OutputTree {
    pub fn new(root: impl Into<PathBuf>, allow_overwrite: bool) -> Self {
        Self {
            root: root.into(),
            allow_overwrite,
        }
    }

    /// Location of `logical` below the destination
    pub fn path_of(&self, logical: &str) -> PathBuf {
        logical
            .split('/')
            .filter(|p| !p.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    fn prepare(&self, logical: &str) -> Result<PathBuf> {
        let target = self.path_of(logical);
        if !self.allow_overwrite && target.exists() {
            return Err(Error::OutputExists(target));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(target)
    }

    /// Write `data` as `logical`
    pub fn write(&self, logical: &str, data: &[u8]) -> Result<PathBuf> {
        let target = self.prepare(logical)?;
        trace!(logical, target = %target.display(), len = data.len(), "writing");
        fs::write(&target, data)?;
        Ok(target)
    }

    /// Copy the file `source` to `logical`
    pub fn copy(&self, logical: &str, source: &Path) -> Result<PathBuf> {
        let target = self.prepare(logical)?;
        trace!(logical, target = %target.display(), "copying");
        fs::copy(source, &target)?;
        Ok(target)
    }
}
