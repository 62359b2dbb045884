use apex_avtx::{export_files, BasicCodec, ExportOptions};
use apex_vfs::DirectoryIndex;
use clap::Args;
use miette::{Context, Result};
use std::path::PathBuf;

#[derive(Args)]
pub struct ExportArgs {
    /// The game data directory
    #[arg(short, long, value_name = "DIR")]
    game: PathBuf,

    /// Logical path of the texture, e.g. textures/rock.ddsc
    #[arg(short, long, value_name = "PATH")]
    path: String,

    /// Where to write the exported files, extensions are added
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting existing files
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExportArgs {
    pub fn handle(&self) -> Result<()> {
        let index = DirectoryIndex::scan(&self.game)
            .context(format!("indexing {}", self.game.display()))?;

        let options = ExportOptions::builder()
            .allow_overwrite(self.overwrite)
            .build();
        let written = export_files(&index, &self.path, &self.output, &BasicCodec, options)
            .context(format!("exporting {}", self.path))?;

        for file in written {
            println!("{}", file.display());
        }

        Ok(())
    }
}
