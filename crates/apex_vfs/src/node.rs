//! Nodes of the asset index

use apex_sarc::SarcArchive;
use derive_more::{Display, From};
use indexmap::IndexMap;
use tracing::trace;

use crate::error::Result;

/// Identifier of a node inside one index
#[derive(Debug, Display, From, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// What a node is, as far as rebuilding is concerned
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A SARC container whose directory can be patched
    Container,
    /// A transparent wrapper around a single payload, its parent is the meaningful container
    Wrapper,
    /// A final on-disk archive which is never rebuilt
    TerminalArchive,
    /// Any other asset
    Opaque,
}

/// A single asset known to the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNode {
    /// Identifier of this node
    pub id: NodeId,
    /// Logical path, `None` for anonymous embedded assets
    pub logical_path: Option<String>,
    /// Kind of asset
    pub kind: NodeKind,
    /// The node this asset is stored in
    pub parent: Option<NodeId>,
    /// Offset of the asset inside its physical resource
    pub byte_offset: u64,
    /// Size of the asset
    pub byte_length: u64,
    /// Whether this is a container member stored elsewhere
    pub symlink: bool,
}

impl AssetNode {
    /// The logical path, or a placeholder naming the node id
    pub fn display_path(&self) -> String {
        match &self.logical_path {
            Some(path) => path.clone(),
            None => format!("<anonymous {}>", self.id),
        }
    }
}

/// Storage shared by the index implementations
#[derive(Debug, Default)]
pub(crate) struct NodeTable {
    nodes: Vec<AssetNode>,
    resources: Vec<Option<usize>>,
    paths: IndexMap<String, Vec<NodeId>>,
}

pub(crate) struct NewNode {
    pub logical_path: Option<String>,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub byte_offset: u64,
    pub byte_length: u64,
    pub symlink: bool,
    pub resource: Option<usize>,
}

impl NodeTable {
    pub fn push(&mut self, node: NewNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(path) = &node.logical_path {
            self.paths.entry(path.clone()).or_default().push(id);
        }

        self.nodes.push(AssetNode {
            id,
            logical_path: node.logical_path,
            kind: node.kind,
            parent: node.parent,
            byte_offset: node.byte_offset,
            byte_length: node.byte_length,
            symlink: node.symlink,
        });
        self.resources.push(node.resource);
        id
    }

    pub fn resolve(&self, path: &str) -> Vec<&AssetNode> {
        self.paths
            .get(path)
            .map(|ids| ids.iter().map(|id| &self.nodes[id.0]).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, id: NodeId) -> Option<&AssetNode> {
        self.nodes.get(id.0)
    }

    pub fn resource(&self, id: NodeId) -> Option<usize> {
        self.resources.get(id.0).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Register every member of the container `container`, whose bytes are `data`.
    ///
    /// Members that are containers themselves are registered recursively.
    pub fn register_members(&mut self, container: NodeId, data: Vec<u8>) -> Result<()> {
        let (base_offset, resource) = match self.get(container) {
            Some(node) => (node.byte_offset, self.resource(container)),
            None => return Ok(()),
        };

        let sarc = SarcArchive::new(data)?;
        for entry in sarc.entries() {
            let payload = sarc.payload(entry)?;
            let kind = match payload {
                Some(bytes) if SarcArchive::sniff(bytes) => NodeKind::Container,
                _ => NodeKind::Opaque,
            };

            trace!(container = %container, path = %entry.path, ?kind, "registering member");
            let id = self.push(NewNode {
                logical_path: Some(entry.path.to_string()),
                kind,
                parent: Some(container),
                byte_offset: base_offset + entry.offset as u64,
                byte_length: entry.length as u64,
                symlink: entry.is_symlink(),
                resource,
            });

            if let (NodeKind::Container, Some(bytes)) = (kind, payload) {
                self.register_members(id, bytes.to_vec())?;
            }
        }

        Ok(())
    }
}
