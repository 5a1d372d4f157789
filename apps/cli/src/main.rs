#![allow(clippy::print_stdout)]

pub mod args;

use crate::args::Cli;
use anyhow::{Context, bail};
use catalog::actions;
use catalog::domain::result::ActionResult;
use catalog_logger::Logger;
use clap::Parser;

#[catalog_runtime::main(memory_efficient)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::builder().name(env!("CARGO_BIN_NAME")).level(cli.log_level);
    let _log = match &cli.log_dir {
        Some(dir) => logger.path(dir).init()?,
        None => logger.init()?,
    };

    let request = cli.request();
    let results = actions::run(&request)
        .await
        .with_context(|| format!("{} failed", request.action.label()))?;

    report(&results, cli.json)?;

    let failures = results.iter().filter(|result| result.status.is_failure()).count();
    if failures > 0 {
        bail!("{failures} of {} results failed", results.len());
    }
    Ok(())
}

fn report(results: &[ActionResult], json: bool) -> anyhow::Result<()> {
    for result in results {
        if json {
            println!("{}", serde_json::to_string(result).context("Failed to encode result")?);
        } else {
            println!("{result}");
        }
    }
    Ok(())
}
