// gbvm/src/cli/list.rs
use clap::Args;
use colored::Colorize;
use gbvm_common::config::Config;
use gbvm_common::error::Result;
use gbvm_common::model::{InstalledBinary, Manifest};
use gbvm_core::check::installed::get_installed_binaries;

#[derive(Args, Debug)]
pub struct List {
    /// Print `name<TAB>version` for each binary
    #[arg(long, conflicts_with = "json")]
    pub versions: bool,

    /// Print the full inventory as manifest JSON
    #[arg(long)]
    pub json: bool,
}

impl List {
    pub fn run(&self, config: &Config) -> Result<()> {
        let installed = get_installed_binaries(config)?;

        if self.json {
            print!("{}", Manifest::from(installed).to_json_string()?);
            return Ok(());
        }

        if installed.is_empty() {
            eprintln!(
                "{}",
                format!("No Go binaries found in {}", config.bin_dir().display()).yellow()
            );
            return Ok(());
        }

        for binary in &installed {
            println!("{}", self.format_line(binary));
        }
        Ok(())
    }

    fn format_line(&self, binary: &InstalledBinary) -> String {
        if self.versions {
            format!("{}\t{}", binary.name, binary.version)
        } else {
            binary.name.clone()
        }
    }
}
