use gauntlet_core::{action, print_success};

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {}

pub async fn exec(_args: &Args, global: &GlobalArgs) -> SubcmdResult {
    let cfg = global.load_config()?;
    action::build_toolchain(&cfg).await?;
    print_success!("Build succeeded");
    Ok(())
}
