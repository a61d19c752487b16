//! Command implementations

pub mod completions;
pub mod dump;
pub mod packages;
pub mod targets;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::cli::ProjectArg;
use xcpkg::util::Config;
use xcpkg::{Project, ProjectParser};

/// Load the file named by `--config`, or discover the user config.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::discover()),
    }
}

/// Parse the project named on the command line.
pub fn open_project(arg: &ProjectArg, config: &Config) -> Result<Project> {
    let bundle = match arg.path {
        Some(ref path) => path.clone(),
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            find_bundle(&cwd)?
        }
    };

    let parser = ProjectParser::live().with_config(config.parse.clone());
    Ok(parser.parse_project(&bundle)?)
}

/// The single `.xcodeproj` bundle in `dir`.
fn find_bundle(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut bundles: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir() && path.extension().is_some_and(|ext| ext == "xcodeproj"))
        .collect();
    bundles.sort();

    match bundles.len() {
        0 => bail!(
            "no .xcodeproj bundle in {}\n\
             help: pass the path of a project bundle",
            dir.display()
        ),
        1 => Ok(bundles.remove(0)),
        _ => bail!(
            "{} .xcodeproj bundles in {}, pick one\n\
             help: pass the path of a project bundle",
            bundles.len(),
            dir.display()
        ),
    }
}
