use std::path::PathBuf;

use anyhow::ensure;
use gauntlet_core::{print_success, Config};

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(default_value = "./")]
    dir: PathBuf,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let dest = args.dir.join(Config::FILENAME);
    ensure!(!dest.exists(), "'{}' already exists", dest.to_string_lossy());

    fsutil::mkdir_all(&args.dir)?;
    fsutil::write(&dest, Config::example_toml())?;

    print_success!("Successfully generated {}", dest.to_string_lossy());
    Ok(())
}
