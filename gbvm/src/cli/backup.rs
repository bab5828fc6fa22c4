// gbvm/src/cli/backup.rs
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use gbvm_common::config::Config;
use gbvm_common::error::Result;
use gbvm_common::model::Manifest;
use gbvm_core::check::installed::get_installed_binaries;
use tracing::debug;

#[derive(Args, Debug)]
pub struct Backup {
    /// Where to write the manifest; standard output when omitted
    pub file: Option<PathBuf>,
}

impl Backup {
    pub fn run(&self, config: &Config) -> Result<()> {
        let manifest = Manifest::from(get_installed_binaries(config)?);

        let Some(file) = &self.file else {
            print!("{}", manifest.to_json_string()?);
            return Ok(());
        };

        manifest.save(file)?;
        debug!("Wrote {} records to {}", manifest.len(), file.display());
        println!(
            "{} {} binaries to {}",
            "Saved".green().bold(),
            manifest.len(),
            file.display()
        );
        Ok(())
    }
}
