// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use args::{Cli, Commands};
use clap::Parser;
use fogman::{init_database, utils::open_config_file};
use log::debug;

mod args;
mod completions;
mod instance;
mod strace;
mod table;

const BUILD_INFO: &str = env!("FOGMAN_BUILD_INFO");

fn main() -> anyhow::Result<()> {
    // env_logger reads the log level from RUST_LOG.
    let _ = env_logger::try_init();

    let cli = Cli::parse();
    cli.execute()
}

impl Cli {
    pub(crate) fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Version => {
                println!("fogman {BUILD_INFO}");
                return Ok(());
            }
            Commands::Completions(args) => return completions::generate(args),
            Commands::Instance(_) | Commands::Strace(_) => {}
        }

        let mut config = open_config_file(&self.config);
        if let Some(db) = &self.db {
            config = config.with_database_path(db.as_str());
        }
        debug!("Using database {}", config.database().path);
        let mut conn = init_database(&config)?;

        match &self.command {
            Commands::Instance(i) => i.execute(&mut conn),
            Commands::Strace(s) => s.execute(&mut conn),
            Commands::Version | Commands::Completions(_) => Ok(()),
        }
    }
}
