use apex_build::{BuildOptions, Builder};
use apex_vfs::DirectoryIndex;
use clap::Args;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct BuildArgs {
    /// The game data directory
    #[arg(short, long, value_name = "DIR")]
    game: PathBuf,

    /// A directory of edited files, laid out by logical path
    #[arg(short, long, value_name = "DIR")]
    source: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    destination: PathBuf,

    /// Allow overwriting files in the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl BuildArgs {
    pub fn handle(&self) -> Result<()> {
        info!("indexing {}", self.game.display());
        let index = DirectoryIndex::scan(&self.game)
            .context(format!("indexing {}", self.game.display()))?;

        let options = BuildOptions::builder()
            .source(self.source.clone())
            .destination(self.destination.clone())
            .allow_overwrite(self.overwrite)
            .build();

        let report = Builder::new(&index, options)
            .build()
            .context(format!("building {}", self.source.display()))?;

        for container in &report.rebuilt {
            println!("{} {container}", "rebuilt".green());
        }
        println!(
            "{} files written to {}",
            report.completed.len(),
            self.destination.display()
        );

        Ok(())
    }
}
