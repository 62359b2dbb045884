//! An asset index over an extracted game directory

use apex_sarc::types::MAGIC;
use apex_sarc::SarcArchive;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, trace};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::index::AssetIndex;
use crate::node::{AssetNode, NewNode, NodeId, NodeKind, NodeTable};

/// Extensions of archives which are final and never rebuilt
const TERMINAL_EXTENSIONS: &[&str] = &["arc", "tab"];

/// [`AssetIndex`] over the files below a directory
#[derive(Debug)]
pub struct DirectoryIndex {
    root: PathBuf,
    table: NodeTable,
    files: Vec<PathBuf>,
}

impl DirectoryIndex {
    /// Walk `root` and register every file below it, including the members of SARC containers.
    #[instrument(skip_all, err, fields(root = %root.as_ref().display()))]
    pub fn scan(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut index = DirectoryIndex {
            root: root.clone(),
            table: NodeTable::default(),
            files: Vec::new(),
        };

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(path) = logical_path(&root, entry.path()) else {
                debug!(path = %entry.path().display(), "skipping non UTF-8 path");
                continue;
            };

            index.register_file(path, entry.path())?;
        }

        info!(files = index.files.len(), nodes = index.table.len(), "scanned game directory");
        Ok(index)
    }

    fn register_file(&mut self, path: String, file: &Path) -> Result<()> {
        let byte_length = file.metadata()?.len();
        let terminal = file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| TERMINAL_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));

        let kind = if terminal {
            NodeKind::TerminalArchive
        } else {
            let mut magic = Vec::with_capacity(MAGIC.len());
            File::open(file)?
                .take(MAGIC.len() as u64)
                .read_to_end(&mut magic)?;
            match SarcArchive::sniff(&magic) {
                true => NodeKind::Container,
                false => NodeKind::Opaque,
            }
        };

        trace!(path, ?kind, "registering file");
        self.files.push(file.to_path_buf());
        let id = self.table.push(NewNode {
            logical_path: Some(path),
            kind,
            parent: None,
            byte_offset: 0,
            byte_length,
            symlink: false,
            resource: Some(self.files.len() - 1),
        });

        if kind == NodeKind::Container {
            let data = std::fs::read(file)?;
            self.table.register_members(id, data)?;
        }

        Ok(())
    }

    /// The scanned directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file on disk a node's bytes are stored in
    pub fn file_of(&self, node: &AssetNode) -> Option<&Path> {
        self.table
            .resource(node.id)
            .and_then(|r| self.files.get(r))
            .map(PathBuf::as_path)
    }
}

impl AssetIndex for DirectoryIndex {
    fn resolve(&self, path: &str) -> Vec<&AssetNode> {
        self.table.resolve(path)
    }

    fn node(&self, id: NodeId) -> Option<&AssetNode> {
        self.table.get(id)
    }

    fn open(&self, node: &AssetNode) -> Result<Box<dyn Read + '_>> {
        if node.symlink {
            return Err(Error::NotEmbedded(node.display_path()));
        }

        let file = self
            .file_of(node)
            .ok_or_else(|| Error::NotEmbedded(node.display_path()))?;

        let mut file = File::open(file)?;
        file.seek(SeekFrom::Start(node.byte_offset))?;
        Ok(Box::new(file.take(node.byte_length)))
    }
}

/// `file` relative to `root`, joined with `/`
fn logical_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
