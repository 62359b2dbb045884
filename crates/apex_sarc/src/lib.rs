//! This library handles reading, rebuilding and creating **SARC** containers used by the *Apex* engine.
//!
//! # SARC Container Format Documentation
//!
//! A SARC file bundles many named member files behind a directory block. Members can either be embedded
//! in the data region of the container or be *symlinks*: entries whose stored offset is `0`, telling the
//! engine to load that member from somewhere else (usually a loose file of the same path).
//!
//! ## File Structure
//!
//! A SARC file consists of a fixed preamble, followed by the directory block and the data region.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic length           | 4 bytes: Fixed value `4`                                   |
//! | 0x0004         | Magic                  | 4 bytes: "SARC"                                            |
//! | 0x0008         | Version                | 4 bytes: Directory layout version (`2` or `3`)             |
//! | 0x000C         | Directory Length       | 4 bytes: Size of the directory block following the header  |
//!
//! The data region starts at `16 + directory length`.
//!
//! ### Version 2 Directory
//!
//! The directory is a sequence of variable sized records, terminated by the end of the directory block
//! or a record with a zero name length.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name Length            | 4 bytes: Length of the (NUL padded) name                |
//! | 0x0004         | Name                   | (Name Length) bytes: Member path                        |
//! | +0x0000        | Data Offset            | 4 bytes: Offset of the member data, `0` for a symlink   |
//! | +0x0004        | Data Length            | 4 bytes: Size of the member data                        |
//!
//! ### Version 3 Directory
//!
//! The directory starts with a string block (`u32` length followed by NUL terminated paths), followed by
//! fixed size records.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name Offset            | 4 bytes: Offset of the path inside the string block     |
//! | 0x0004         | Data Offset            | 4 bytes: Offset of the member data, `0` for a symlink   |
//! | 0x0008         | Data Length            | 4 bytes: Size of the member data                        |
//! | 0x000C         | Path Hash              | 4 bytes: Hash of the member path                        |
//! | 0x0010         | Extension Hash         | 4 bytes: Hash of the member extension                   |
//!
//! ## Placement Rules
//!
//! Embedded member data never straddles a 32 MiB boundary and always starts on a 4 byte boundary.
//! See [`layout`] for the exact algorithm.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
pub mod layout;
pub mod read;
pub mod rebuild;
pub mod types;
pub mod write;

pub use layout::{plan_layout, Layout, Placement, MAX_BLOCK_SIZE};
pub use read::SarcArchive;
pub use rebuild::{ReplacementSource, Replacements};
pub use types::SarcEntry;
pub use write::SarcWriter;
