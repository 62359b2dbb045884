//! Rebuilds the containers of an *Apex* engine game around a tree of edited files.
//!
//! A build runs in three steps:
//!
//! 1. [`stage`](stage::stage) copies every edited file into the destination tree, turning edited `.ddsc.dds`
//!    textures back into native texture resources on the way.
//! 2. [`discover`](graph::discover) asks the asset index which containers hold the staged files, which containers
//!    hold those containers, and so on.
//! 3. [`resolve`](resolve::resolve) rebuilds every container once all of its changed members are available, until
//!    everything is done or nothing else can be done.
//!
//! Replaced members are turned into symlink entries, so the game loads them from the loose file written next to
//! the rebuilt container.
//!
//! ```no_run
//! # fn doit() -> apex_build::error::Result<()>
//! # {
//! use apex_build::{BuildOptions, Builder};
//! use apex_vfs::DirectoryIndex;
//!
//! let index = DirectoryIndex::scan("game/dropzone")?;
//! let options = BuildOptions::builder()
//!     .source("mods/src".into())
//!     .destination("mods/build".into())
//!     .build();
//!
//! let report = Builder::new(&index, options).build()?;
//! for (path, file) in &report.completed {
//!     println!("{path} -> {}", file.display());
//! }
//! # Ok(())
//! # }
//! ```

use apex_avtx::{BasicCodec, PixelCodec};
use apex_vfs::AssetIndex;
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::{info, instrument};

pub mod error;
pub mod graph;
pub mod output;
pub mod resolve;
pub mod stage;

use crate::error::Result;
use crate::output::OutputTree;

/// Where a build reads from and writes to
#[derive(Debug, Clone, bon::Builder)]
pub struct BuildOptions {
    /// Tree of edited files, laid out by logical path
    pub source: PathBuf,

    /// Tree the staged files and rebuilt containers are written to
    pub destination: PathBuf,

    /// Replace files that already exist in the destination
    #[builder(default)]
    pub allow_overwrite: bool,
}

/// What a build produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Every completed logical path and the file holding it
    pub completed: IndexMap<String, PathBuf>,

    /// Containers that were rebuilt, in the order they were completed
    pub rebuilt: Vec<String>,
}

/// Runs builds against one asset index
#[derive(Debug)]
pub struct Builder<'a, I: AssetIndex + ?Sized, C: PixelCodec = BasicCodec> {
    index: &'a I,
    codec: C,
    options: BuildOptions,
}

impl<'a, I: AssetIndex + ?Sized> Builder<'a, I> {
    /// Builder using [`BasicCodec`] for textures
    pub fn new(index: &'a I, options: BuildOptions) -> Self {
        Builder {
            index,
            codec: BasicCodec,
            options,
        }
    }
}

impl<'a, I: AssetIndex + ?Sized, C: PixelCodec> Builder<'a, I, C> {
    /// Use another pixel codec for texture imports
    pub fn with_codec<D: PixelCodec>(self, codec: D) -> Builder<'a, I, D> {
        Builder {
            index: self.index,
            codec,
            options: self.options,
        }
    }

    /// Stage, discover and resolve.
    #[instrument(skip_all, err, fields(source = %self.options.source.display()))]
    pub fn build(&self) -> Result<BuildReport> {
        let output = OutputTree::new(&self.options.destination, self.options.allow_overwrite);

        let mut staging = stage::stage(self.index, &self.codec, &self.options.source, &output)?;
        info!("staged {} files", staging.len());

        let graph = graph::discover(self.index, &staging)?;
        info!("{} containers to rebuild", graph.len());

        let rebuilt = resolve::resolve(self.index, &graph, &mut staging, &output)?;
        info!("build complete, rebuilt {} containers", rebuilt.len());

        Ok(BuildReport {
            completed: staging,
            rebuilt,
        })
    }
}
