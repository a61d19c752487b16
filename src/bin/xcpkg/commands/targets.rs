//! `xcpkg targets` command

use anyhow::Result;

use crate::cli::TargetsArgs;
use xcpkg::util::Config;

pub fn execute(args: TargetsArgs, config: &Config) -> Result<()> {
    let project = super::open_project(&args.project, config)?;

    for target in project.targets() {
        if args.with_packages && target.package_product_dependencies.is_empty() {
            continue;
        }

        println!("{} ({})", target.name, target.kind);
        for product in &target.package_product_dependencies {
            println!("    {}", product);
        }
    }

    Ok(())
}
