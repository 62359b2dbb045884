//! The contract shared by every asset index

use std::io::Read;

use crate::error::{Error, Result};
use crate::node::{AssetNode, NodeId};

/// Lookup and access to the assets of a game
pub trait AssetIndex {
    /// Every node registered under `path`, in registration order
    fn resolve(&self, path: &str) -> Vec<&AssetNode>;

    /// Node with the given id
    fn node(&self, id: NodeId) -> Option<&AssetNode>;

    /// Open a stream over the bytes of `node`.
    ///
    /// Fails with [`Error::NotEmbedded`] when the node has no readable bytes, for example a symlink member.
    fn open(&self, node: &AssetNode) -> Result<Box<dyn Read + '_>>;

    /// The node `node` is stored in
    fn parent(&self, node: &AssetNode) -> Option<&AssetNode> {
        node.parent.and_then(|id| self.node(id))
    }

    /// Whether anything is registered under `path`
    fn contains(&self, path: &str) -> bool {
        !self.resolve(path).is_empty()
    }

    /// Read all bytes of `node`
    fn read(&self, node: &AssetNode) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(node.byte_length as usize);
        self.open(node)?.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Open the first readable node registered under `path`
    fn open_path(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        for node in self.resolve(path) {
            match self.open(node) {
                Err(Error::NotEmbedded(_)) => continue,
                result => return result,
            }
        }

        Err(Error::NotFound(path.to_string()))
    }

    /// Read the first readable node registered under `path`
    fn read_path(&self, path: &str) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.open_path(path)?.read_to_end(&mut data)?;
        Ok(data)
    }
}
