pub mod export;

#[derive(clap::Subcommand)]
pub enum TextureCommands {
    /// Export a texture to a DDS file and a PNG preview
    Export(export::ExportArgs),
}

impl TextureCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            TextureCommands::Export(export) => export.handle(),
        }
    }
}
