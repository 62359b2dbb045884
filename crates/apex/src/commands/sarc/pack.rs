use apex_sarc::SarcWriter;
use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing::info;
use walkdir::WalkDir;

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target SARC file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", &self.file.display());

        let files = WalkDir::new(&self.directory)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let out = if !self.overwrite {
            File::create_new(&self.file)
        } else {
            File::create(&self.file)
        }
        .into_diagnostic()
        .context(format!("creating {}", &self.file.display()))?;

        let mut sarc = SarcWriter::default();
        for file in files {
            let name = file
                .path()
                .strip_prefix(&self.directory)
                .into_diagnostic()?;
            let logical = name
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect::<Option<Vec<_>>>()
                .ok_or(miette!("unable to convert {} to a string", name.display()))?
                .join("/");
            info!("packing {logical}");

            let data = std::fs::read(file.path())
                .into_diagnostic()
                .context(format!("reading {}", file.path().display()))?;
            sarc.add_file(logical, data);
        }

        sarc.finish(BufWriter::new(out))
            .context("finalizing sarc file")?
            .flush()
            .into_diagnostic()?;

        Ok(())
    }
}
