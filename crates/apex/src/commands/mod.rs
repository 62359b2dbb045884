pub mod build;
pub mod sarc;
pub mod texture;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Rebuild game containers around a directory of edited files
    Build(build::BuildArgs),
    /// Handle SARC files
    Sarc {
        #[command(subcommand)]
        command: sarc::SarcCommands,
    },
    /// Handle textures
    Texture {
        #[command(subcommand)]
        command: texture::TextureCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Build(build) => build.handle(),
            Commands::Sarc { command } => command.handle(),
            Commands::Texture { command } => command.handle(),
        }
    }
}
