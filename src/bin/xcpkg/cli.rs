//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// xcpkg - list the targets and Swift packages of an Xcode project
#[derive(Parser)]
#[command(name = "xcpkg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Read settings from this file instead of the user config
    #[arg(long, global = true, env = "XCPKG_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List targets and the package products each one links
    Targets(TargetsArgs),

    /// List Swift packages
    Packages(PackagesArgs),

    /// Print the parsed project as JSON
    Dump(DumpArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ProjectArg {
    /// Path to the .xcodeproj bundle (defaults to the only one in the current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct TargetsArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Only show targets linking at least one package product
    #[arg(long)]
    pub with_packages: bool,
}

#[derive(Args)]
pub struct PackagesArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Only show local packages
    #[arg(long, conflicts_with = "remote")]
    pub local: bool,

    /// Only show remote packages
    #[arg(long)]
    pub remote: bool,
}

#[derive(Args)]
pub struct DumpArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Print on a single line
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
