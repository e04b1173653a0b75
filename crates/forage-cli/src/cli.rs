use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "forage",
    about = "Forage: namespaced key/value stores over one shared table",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a script of store operations against a fresh table
    Run(RunArgs),
    /// Show the key prefix a store would use
    Prefix(PrefixArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Script file, one `<store> <op> [args..]` per line
    pub script: PathBuf,
    /// TOML store configuration; its store is addressed as `.` in the script
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Stop at the first line that fails to parse
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct PrefixArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub store_name: Option<String>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
