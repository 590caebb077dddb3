pub mod build;
pub mod init;
pub mod run;

use std::path::PathBuf;

use gauntlet_core::Config;

use crate::util;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Path to the config file (default: search ancestor dirs for gauntlet.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    #[command(alias("b"))]
    Build(build::Args),

    Init(init::Args),

    #[command(alias("r"))]
    Run(run::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Build(args) => build::exec(args, self).await,
            Init(args) => init::exec(args, self),
            Run(args) => run::exec(args, self).await,
        }
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::from_toml_file(path.clone()),
            None => Config::from_file_finding_in_ancestors(util::current_dir()),
        }
    }
}
