//! `vess init`: Write a default configuration file.

use clap::Args;
use std::path::Path;

use vess_core::EngineConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, path: &Path) -> anyhow::Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    EngineConfig::default().save(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
