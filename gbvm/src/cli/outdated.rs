// gbvm/src/cli/outdated.rs
use clap::Args;
use colored::Colorize;
use gbvm_common::config::Config;
use gbvm_common::error::Result;
use gbvm_core::check::installed::get_installed_binaries;
use gbvm_core::check::{check_for_updates, UpdateInfo};
use gbvm_net::ProxyClient;
use prettytable::{format, Cell, Row, Table};

#[derive(Args, Debug)]
pub struct Outdated {
    /// Leave out binaries built from a working tree
    #[arg(long)]
    pub skip_dev: bool,
}

impl Outdated {
    pub fn run(&self, config: &Config) -> Result<()> {
        let installed = get_installed_binaries(config)?;
        let client = ProxyClient::new(config)?;
        let check = check_for_updates(&installed, &client, self.skip_dev);

        for (name, error) in &check.errors {
            eprintln!("{} {}: {}", "failed to check".red().bold(), name.cyan(), error);
        }

        if check.updates.is_empty() {
            println!("{}", "All binaries are up to date".green());
        } else {
            build_table(&check.updates).printstd();
            println!(
                "{} of {} binaries can be upgraded",
                check.updates.len().to_string().bold(),
                installed.len()
            );
        }
        Ok(())
    }
}

fn build_table(updates: &[UpdateInfo]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.add_row(Row::new(vec![
        Cell::new("Name").style_spec("b"),
        Cell::new("Module").style_spec("b"),
        Cell::new("Installed").style_spec("b"),
        Cell::new("Latest").style_spec("b"),
    ]));
    for update in updates {
        table.add_row(Row::new(vec![
            Cell::new(&update.name).style_spec("Fc"),
            Cell::new(&update.module),
            Cell::new(&update.installed_version),
            Cell::new(&update.available_version).style_spec("Fg"),
        ]));
    }
    table
}
