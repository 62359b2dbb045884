//! Which containers need which members.

use apex_vfs::{AssetIndex, AssetNode, NodeKind};
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::stage::StagingSet;

/// Containers to rebuild, each with the members that have to be staged first
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    depends: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    /// Record that `container` has to be rebuilt once `member` is staged.
    pub fn add(&mut self, container: impl Into<String>, member: impl Into<String>) {
        self.depends
            .entry(container.into())
            .or_default()
            .insert(member.into());
    }

    /// Members of `container`
    pub fn members(&self, container: &str) -> Option<&IndexSet<String>> {
        self.depends.get(container)
    }

    /// Every container with its members, in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexSet<String>)> {
        self.depends.iter()
    }

    pub fn len(&self) -> usize {
        self.depends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depends.is_empty()
    }
}

/// The container a change to `node` has to be written into, if any.
///
/// Wrappers are looked through, terminal archives end the walk.
fn dependency_target<'a, I>(index: &'a I, node: &AssetNode) -> Option<&'a AssetNode>
where
    I: AssetIndex + ?Sized,
{
    let mut parent = index.parent(node)?;
    loop {
        match parent.kind {
            NodeKind::Wrapper => parent = index.parent(parent)?,
            NodeKind::TerminalArchive => return None,
            NodeKind::Container | NodeKind::Opaque => return Some(parent),
        }
    }
}

/// Find every container that has to be rebuilt for the staged files, to any depth.
#[instrument(skip_all, err, fields(staged = staging.len()))]
pub fn discover<I>(index: &I, staging: &StagingSet) -> Result<DependencyGraph>
where
    I: AssetIndex + ?Sized,
{
    let mut graph = DependencyGraph::default();
    let mut visited = IndexSet::new();
    let mut worklist = staging.keys().cloned().collect::<VecDeque<_>>();

    while let Some(path) = worklist.pop_front() {
        if !visited.insert(path.clone()) {
            continue;
        }

        let nodes = index.resolve(&path);
        if nodes.is_empty() {
            warn!("{path} is not part of the game, it will not be packed");
            continue;
        }

        for node in nodes {
            let Some(container) = dependency_target(index, node) else {
                continue;
            };

            let Some(container_path) = &container.logical_path else {
                return Err(Error::MissingDependencyTarget {
                    container: container.display_path(),
                    member: path,
                });
            };

            debug!(container = %container_path, member = %path, "dependency");
            graph.add(container_path.as_str(), path.as_str());
            worklist.push_back(container_path.clone());
        }
    }

    Ok(graph)
}
