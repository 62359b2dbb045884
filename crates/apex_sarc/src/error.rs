//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is an invalid sarc container
    #[error("file is an invalid sarc container")]
    InvalidArchive,

    /// unsupported sarc directory version {0}
    #[error("unsupported sarc directory version {0}")]
    UnsupportedVersion(u32),

    /// member {path} is {size} bytes and cannot be placed inside a single block
    #[error("member {path} is {size} bytes and cannot be placed inside a single block")]
    #[diagnostic(help("members larger than 32 MiB have to be shipped as loose files"))]
    OversizedMember {
        /// Path of the offending member
        path: String,
        /// Size of the offending payload
        size: u64,
    },

    /// member {0} points outside of the container
    #[error("member {0} points outside of the container")]
    MemberOutOfBounds(String),

    /// block size {0} is not usable for placing members
    #[error("block size {0} is not usable for placing members")]
    InvalidBlockSize(u64),

    /// data offset {0:#x} does not fit into a 32 bit field
    #[error("data offset {0:#x} does not fit into a 32 bit field")]
    OffsetOverflow(u64),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
