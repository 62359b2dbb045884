//! An index over every asset of an *Apex* engine game.
//!
//! Assets are addressed by their logical path (`settings/hp_settings/player.bin`). The same logical path can
//! show up several times, for example as a loose file and as a member of one or more SARC containers, so
//! lookups return every node registered under a path in registration order.
//!
//! Each [`AssetNode`] knows its parent container, which is what allows a build to work out which containers
//! have to be rebuilt after one of their members changed.
//!
//! Two implementations of [`AssetIndex`] are provided:
//!
//! - [`MemoryIndex`] keeps everything in memory and is mostly useful for tools and tests.
//! - [`DirectoryIndex`] scans an extracted game directory and looks inside every SARC container it finds.

pub mod directory;
pub mod error;
pub mod index;
pub mod memory;
pub mod node;

pub use directory::DirectoryIndex;
pub use index::AssetIndex;
pub use memory::MemoryIndex;
pub use node::{AssetNode, NodeId, NodeKind};
