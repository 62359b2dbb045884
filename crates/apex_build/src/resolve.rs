//! Rebuilding containers in dependency order.
//!
//! Resolution runs in passes. In every pass each container whose members are all staged is rebuilt, written to
//! the output tree and staged itself, which may make its own container ready in a later pass. Resolution ends
//! when a pass completes nothing: either everything is done, or what is left can never be built.

use apex_sarc::SarcArchive;
use apex_vfs::{AssetIndex, NodeKind};
use indexmap::IndexMap;
use itertools::Itertools;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::output::OutputTree;
use crate::stage::StagingSet;

/// Rebuild every container of `graph`, adding each to `staging` once done.
///
/// Returns the rebuilt containers in the order they were completed.
#[instrument(skip_all, err, fields(containers = graph.len()))]
pub fn resolve<I>(
    index: &I,
    graph: &DependencyGraph,
    staging: &mut StagingSet,
    output: &OutputTree,
) -> Result<Vec<String>>
where
    I: AssetIndex + ?Sized,
{
    let mut rebuilt = Vec::new();

    loop {
        let mut progress = false;
        let mut pending = Vec::new();

        for (container, members) in graph.iter() {
            if staging.contains_key(container) {
                continue;
            }

            if !members.iter().all(|m| staging.contains_key(m)) {
                pending.push(container.clone());
                continue;
            }

            let replacements = members
                .iter()
                .filter_map(|m| staging.get(m).map(|p| (m.clone(), p.clone())))
                .collect::<IndexMap<_, _>>();
            let target = rebuild_container(index, container, &replacements, output)?;

            staging.insert(container.clone(), target);
            rebuilt.push(container.clone());
            progress = true;
        }

        if pending.is_empty() {
            return Ok(rebuilt);
        }

        if !progress {
            return Err(Error::UnresolvedBuild {
                pending: pending.into_iter().sorted().collect(),
            });
        }

        debug!(pending = pending.len(), "starting another pass");
    }
}

/// Rebuild the container `path` with `replacements` and write it to the output tree.
#[instrument(skip(index, replacements, output), err)]
pub fn rebuild_container<I>(
    index: &I,
    path: &str,
    replacements: &IndexMap<String, PathBuf>,
    output: &OutputTree,
) -> Result<PathBuf>
where
    I: AssetIndex + ?Sized,
{
    let nodes = index.resolve(path);
    let node = match nodes.iter().find(|n| n.kind == NodeKind::Container) {
        Some(node) => *node,
        None => {
            return Err(match nodes.first() {
                Some(other) => Error::UnsupportedContainer {
                    path: path.to_string(),
                    kind: other.kind,
                },
                None => Error::MissingDependencyTarget {
                    container: path.to_string(),
                    member: replacements.keys().join(", "),
                },
            })
        }
    };

    let sarc = SarcArchive::new(index.read(node)?)?;
    let data = sarc.rebuild(replacements)?;

    info!(
        "rebuilt {path} ({} entries, {} replaced)",
        sarc.len(),
        replacements.len()
    );
    output.write(path, &data)
}
