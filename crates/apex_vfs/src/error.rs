//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`apex_sarc::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    SarcError(#[from] apex_sarc::error::Error),

    /// no asset is registered under {0}
    #[error("no asset is registered under {0}")]
    NotFound(String),

    /// {0} is not embedded in any readable resource
    #[error("{0} is not embedded in any readable resource")]
    NotEmbedded(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
