//! `xcpkg dump` command

use anyhow::{Context, Result};

use crate::cli::DumpArgs;
use xcpkg::util::Config;

pub fn execute(args: DumpArgs, config: &Config) -> Result<()> {
    let project = super::open_project(&args.project, config)?;

    let json = if args.compact {
        serde_json::to_string(&project)
    } else {
        serde_json::to_string_pretty(&project)
    }
    .context("failed to serialize project")?;

    println!("{}", json);
    Ok(())
}
