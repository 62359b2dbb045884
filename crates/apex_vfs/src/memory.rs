//! An asset index kept entirely in memory

use std::io::{Cursor, Read};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::index::AssetIndex;
use crate::node::{AssetNode, NewNode, NodeId, NodeKind, NodeTable};

/// In-memory [`AssetIndex`]
///
/// ```
/// # fn doit() -> apex_vfs::error::Result<()>
/// # {
/// use apex_vfs::{AssetIndex, MemoryIndex, NodeKind};
///
/// let mut index = MemoryIndex::new();
/// index.add(Some("settings/player.bin"), NodeKind::Opaque, None, Some(b"hp=100".to_vec()));
///
/// assert_eq!(index.read_path("settings/player.bin")?, b"hp=100");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MemoryIndex {
    table: NodeTable,
    blobs: Vec<Vec<u8>>,
}

impl MemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, optionally backed by `data`.
    ///
    /// Nodes without data are known to the index but cannot be opened.
    pub fn add(
        &mut self,
        path: Option<&str>,
        kind: NodeKind,
        parent: Option<NodeId>,
        data: Option<Vec<u8>>,
    ) -> NodeId {
        let byte_length = data.as_ref().map_or(0, |d| d.len() as u64);
        let resource = data.map(|d| {
            self.blobs.push(d);
            self.blobs.len() - 1
        });

        self.table.push(NewNode {
            logical_path: path.map(str::to_string),
            kind,
            parent,
            byte_offset: 0,
            byte_length,
            symlink: false,
            resource,
        })
    }

    /// Register a SARC container and every member inside it.
    #[instrument(skip(self, data), err)]
    pub fn add_sarc(
        &mut self,
        path: Option<&str>,
        data: Vec<u8>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let id = self.add(path, NodeKind::Container, parent, Some(data.clone()));
        self.table.register_members(id, data)?;
        debug!(%id, nodes = self.table.len(), "registered container");
        Ok(id)
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no node is registered
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }
}

impl AssetIndex for MemoryIndex {
    fn resolve(&self, path: &str) -> Vec<&AssetNode> {
        self.table.resolve(path)
    }

    fn node(&self, id: NodeId) -> Option<&AssetNode> {
        self.table.get(id)
    }

    fn open(&self, node: &AssetNode) -> Result<Box<dyn Read + '_>> {
        let not_embedded = || Error::NotEmbedded(node.display_path());
        if node.symlink {
            return Err(not_embedded());
        }

        let blob = self
            .table
            .resource(node.id)
            .and_then(|r| self.blobs.get(r))
            .ok_or_else(not_embedded)?;

        let start = node.byte_offset as usize;
        let end = start + node.byte_length as usize;
        let slice = blob.get(start..end).ok_or_else(not_embedded)?;

        Ok(Box::new(Cursor::new(slice)))
    }
}

#[cfg(test)]
mod test {
    use apex_sarc::SarcWriter;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::index::AssetIndex;
    use crate::memory::MemoryIndex;
    use crate::node::NodeKind;

    #[test]
    fn nodes_without_data_are_not_readable() {
        let mut index = MemoryIndex::new();
        let id = index.add(Some("gone.bin"), NodeKind::Opaque, None, None);

        let node = index.node(id).expect("node");
        assert!(matches!(index.read(node), Err(Error::NotEmbedded(_))));
        assert!(matches!(
            index.read_path("gone.bin"),
            Err(Error::NotFound(path)) if path == "gone.bin"
        ));
    }

    #[traced_test]
    #[test]
    fn members_are_read_from_the_container() -> Result<()> {
        let mut sarc = SarcWriter::default();
        sarc.add_file("a.txt", b"hello".to_vec())
            .add_symlink("b.txt", 7)
            .add_file("c.txt", b"world".to_vec());

        let mut index = MemoryIndex::new();
        let root = index.add_sarc(Some("root.sarc"), sarc.finish(Vec::new())?, None)?;

        assert_eq!(index.len(), 4);
        assert_eq!(index.read_path("a.txt")?, b"hello");
        assert_eq!(index.read_path("c.txt")?, b"world");

        let b = index.resolve("b.txt")[0];
        assert_eq!(index.parent(b).map(|p| p.id), Some(root));
        assert!(matches!(index.read(b), Err(Error::NotEmbedded(_))));

        Ok(())
    }

    #[test]
    fn open_path_falls_through_symlinks() -> Result<()> {
        let mut sarc = SarcWriter::default();
        sarc.add_symlink("shared.bin", 3);

        let mut index = MemoryIndex::new();
        index.add_sarc(Some("root.sarc"), sarc.finish(Vec::new())?, None)?;
        index.add(Some("shared.bin"), NodeKind::Opaque, None, Some(b"abc".to_vec()));

        assert_eq!(index.resolve("shared.bin").len(), 2);
        assert_eq!(index.read_path("shared.bin")?, b"abc");

        Ok(())
    }
}
