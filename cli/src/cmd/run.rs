use std::path::PathBuf;

use anyhow::bail;
use gauntlet_core::{action, testing::RunResult};
use serde_json::json;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Run exactly one test case, given its source path
    /// (e.g. testdata/compiler/c-add.gt)
    #[arg()] // positional argument
    pub case: Option<PathBuf>,

    /// Restrict the run to one configured suite
    #[arg(short, long)]
    pub suite: Option<String>,

    /// Skip the toolchain build step
    #[arg(long)]
    pub no_build: bool,

    /// Print the run summary as JSON at the end
    #[arg(long)]
    pub json: bool,
}

pub async fn exec(args: &Args, global: &GlobalArgs) -> SubcmdResult {
    let cfg = global.load_config()?;

    if !args.no_build {
        action::build_toolchain(&cfg).await?;
    }

    let mut results: Vec<(String, RunResult)> = Vec::new();

    if let Some(case_path) = &args.case {
        let (suite, case) = action::select_single_case(&cfg, case_path)?;
        log::info!("Using test case: {}", case.name());
        let res = action::run_suite(&cfg, suite, Some(&case)).await?;
        results.push((suite.name.clone(), res));
    } else {
        for suite in cfg.select_suites(args.suite.as_deref())? {
            println!("\n==================");
            println!(" Testing: {}", suite.name);
            println!("------------------");
            let res = action::run_suite(&cfg, suite, None).await?;
            let stop = !res.is_pass();
            results.push((suite.name.clone(), res));
            // Fail-fast across suites too: a broken toolchain fails the
            // same way in every remaining suite.
            if stop {
                break;
            }
        }
    }

    if args.json {
        let summary: Vec<_> = results
            .iter()
            .map(|(name, res)| json!({ "suite": name, "result": res }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if results.iter().any(|(_, res)| !res.is_pass()) {
        bail!("Test run failed");
    }
    Ok(())
}
