pub mod list;
pub mod pack;

#[derive(clap::Subcommand)]
pub enum SarcCommands {
    /// List the entries of a SARC file
    List(list::ListArgs),
    /// Pack a directory into a SARC file
    Pack(pack::PackArgs),
}

impl SarcCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            SarcCommands::List(list) => list.handle(),
            SarcCommands::Pack(pack) => pack.handle(),
        }
    }
}
