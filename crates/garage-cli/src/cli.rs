use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use garage_store::DEFAULT_DATA_DIR;

#[derive(Parser)]
#[command(
    name = "garage",
    about = "Inspect and maintain stored garage vehicles",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding one record document per owner
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Garage configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

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
    /// List an owner's stored vehicles
    List(OwnerArgs),
    /// Show one stored vehicle with its cargo
    Show(RecordArgs),
    /// Delete a stored vehicle without spawning it
    Discard(RecordArgs),
    /// Print the document path for an owner
    Path(OwnerArgs),
    /// Check every document in the data directory
    Verify,
}

#[derive(Args)]
pub struct OwnerArgs {
    /// Owner (player) id
    pub owner: String,
}

#[derive(Args)]
pub struct RecordArgs {
    /// Owner (player) id
    pub owner: String,
    /// Position in the owner's list, starting at 0
    pub index: usize,
}
