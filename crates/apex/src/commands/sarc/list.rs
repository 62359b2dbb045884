use apex_sarc::SarcArchive;
use clap::Args;
use itertools::Itertools;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input SARC file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Sort entries by path instead of directory order
    #[arg(long, default_value_t = false)]
    sorted: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let data = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", self.file.display()))?;
        let sarc = SarcArchive::new(data)?;

        println!(
            "version {}, {} entries, data starts at {:#x}",
            sarc.header().version,
            sarc.len(),
            sarc.data_start()
        );

        let entries = match self.sorted {
            true => sarc
                .entries()
                .iter()
                .sorted_by(|a, b| a.path.cmp(&b.path))
                .collect_vec(),
            false => sarc.entries().iter().collect_vec(),
        };

        for entry in entries {
            if entry.is_symlink() {
                println!(
                    "{:>10} {:>10} {} {}",
                    "-",
                    entry.length,
                    entry.path,
                    "(symlink)".yellow()
                );
            } else {
                println!("{:>#10x} {:>10} {}", entry.offset, entry.length, entry.path);
            }
        }

        Ok(())
    }
}
