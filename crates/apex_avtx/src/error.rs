//! Error types that can be emitted from this library

use miette::Diagnostic;
use std::path::PathBuf;
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

    /// Transparent wrapper for [`apex_vfs::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    IndexError(#[from] apex_vfs::error::Error),

    /// Transparent wrapper for [`image::ImageError`]
    #[error(transparent)]
    ImageError(#[from] image::ImageError),

    /// A resource ended in the middle of a mip
    #[error("{resource} ended after {actual} of {expected} bytes")]
    InsufficientData {
        /// Logical path of the resource
        resource: String,
        /// Bytes needed for the mip
        expected: usize,
        /// Bytes that were available
        actual: usize,
    },

    /// Export would overwrite existing files
    #[error("refusing to overwrite {}", .0.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    #[diagnostic(help("pass allow_overwrite to replace existing files"))]
    OutputCollision(Vec<PathBuf>),

    /// No size or decoder is known for a pixel format
    #[error("unsupported pixel format {0}")]
    UnsupportedPixelFormat(u32),

    /// The interchange file does not carry a DX10 header
    #[error("interchange file is not a DX10 DDS file")]
    InvalidInterchange,

    /// The path does not name a texture
    #[error("{0} is not a texture")]
    NotATexture(String),

    /// None of the mips of a texture could be loaded
    #[error("{0} has no loaded mips")]
    NoMipsLoaded(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
