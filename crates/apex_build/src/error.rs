//! Error types that can be emitted from this library

use apex_vfs::NodeKind;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`walkdir::Error`]
    #[error(transparent)]
    WalkError(#[from] walkdir::Error),

    /// Transparent wrapper for [`apex_sarc::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    SarcError(#[from] apex_sarc::error::Error),

    /// Transparent wrapper for [`apex_vfs::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    IndexError(#[from] apex_vfs::error::Error),

    /// Transparent wrapper for [`apex_avtx::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    TextureError(#[from] apex_avtx::error::Error),

    /// A container has to be rebuilt but its format cannot be written
    #[error("cannot rebuild {path}, {kind} nodes are not supported")]
    UnsupportedContainer {
        /// Logical path of the container
        path: String,
        /// What the index knows it as
        kind: NodeKind,
    },

    /// A container a member depends on cannot be referenced
    #[error("container {container} of {member} is not addressable in the asset index")]
    MissingDependencyTarget {
        /// Logical path, or a placeholder for anonymous containers
        container: String,
        /// The member that led to the container
        member: String,
    },

    /// Resolution stopped with containers left over
    #[error("build failed, could not complete: {}", .pending.join(", "))]
    #[diagnostic(help(
        "the containers depend on each other or on members the asset index does not know"
    ))]
    UnresolvedBuild {
        /// Every container that could not be rebuilt
        pending: Vec<String>,
    },

    /// An output file exists already
    #[error("refusing to overwrite {0}")]
    #[diagnostic(help("allow overwriting to replace existing build outputs"))]
    OutputExists(PathBuf),

    /// A staged file has a path that cannot be used as a logical path
    #[error("{0} is not a valid logical path")]
    InvalidPath(PathBuf),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
