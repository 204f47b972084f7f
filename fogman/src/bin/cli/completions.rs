// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use std::{fs::create_dir_all, path::PathBuf};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::args::Cli;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
pub struct Args {
    /// Output directory
    out_dir: PathBuf,
    /// Optional: shell to generate completions for
    #[clap(long, short)]
    shell: Option<Shell>,
}

pub fn generate(args: &Args) -> Result<(), anyhow::Error> {
    let Args { out_dir, shell } = args;
    create_dir_all(out_dir)?;

    let shells = match shell {
        Some(shell) => vec![*shell],
        None => vec![
            Shell::Bash,
            Shell::Elvish,
            Shell::Fish,
            Shell::PowerShell,
            Shell::Zsh,
        ],
    };

    for shell in shells {
        let mut cmd = Cli::command().name("fogman").version(VERSION);
        let path = clap_complete::generate_to(shell, &mut cmd, "fogman", out_dir)?;
        eprintln!("completion script generated at {path:?}");
    }
    Ok(())
}
