// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "deepwork",
    about = "A planning agent that delegates to sub-agents over a shared virtual workspace",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the deep agent on a prompt and print its final answer
    Run {
        /// YAML mock-responses script (overrides config and DEEPWORK_MOCK_RESPONSES)
        #[arg(long, value_name = "FILE")]
        responses: Option<PathBuf>,

        /// Seed the virtual file system: virtual PATH gets the contents of LOCAL.
        /// May be repeated: --files question.txt=./q.txt --files notes.md=./n.md
        #[arg(long = "files", value_name = "PATH=LOCAL", value_parser = parse_seed_file)]
        files: Vec<(String, PathBuf)>,

        /// Write the final virtual files below this directory
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Task for the agent; read from stdin when omitted
        #[arg(value_name = "PROMPT")]
        prompt: Option<String>,
    },
    /// List the sub-agents the primary agent can delegate to
    Agents,
    /// Print the effective configuration and exit
    ShowConfig,
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse a `PATH=LOCAL` seed argument.
fn parse_seed_file(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((path, local)) if !path.is_empty() && !local.is_empty() => {
            Ok((path.to_string(), PathBuf::from(local)))
        }
        _ => Err(format!("expected PATH=LOCAL, got `{raw}`")),
    }
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "deepwork", &mut std::io::stdout());
}
