//! `xcpkg packages` command

use anyhow::Result;

use crate::cli::PackagesArgs;
use xcpkg::util::Config;
use xcpkg::SwiftPackage;

pub fn execute(args: PackagesArgs, config: &Config) -> Result<()> {
    let project = super::open_project(&args.project, config)?;

    let packages = project
        .swift_packages()
        .iter()
        .filter(|p| !args.local || p.is_local())
        .filter(|p| !args.remote || !p.is_local());

    for package in packages {
        match package {
            SwiftPackage::Local(local) => {
                println!("{} (local) {}", local.name, local.file_url);
            }
            SwiftPackage::Remote(remote) => {
                let pin = remote
                    .pin
                    .as_ref()
                    .map(|pin| format!(" @ {}", pin))
                    .unwrap_or_default();
                println!("{} (remote) {}{}", remote.name, remote.repository_url, pin);
                for product in &remote.products {
                    println!("    {}", product);
                }
            }
        }
    }

    Ok(())
}
