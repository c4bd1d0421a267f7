//! The `filterchain plan` command.

use filterchain_core::{Config, ImageOperations, Pipeline};
use serde::Serialize;

use super::run::FilterArgs;

#[derive(Debug, Serialize)]
struct Plan<'a> {
    work_name: &'a str,
    #[serde(flatten)]
    pipeline: &'a Pipeline,
}

/// Print the pipeline a request would run as JSON.
pub fn execute(args: FilterArgs, config: &Config) -> anyhow::Result<()> {
    println!("{}", render(&args, config)?);
    Ok(())
}

fn render(args: &FilterArgs, config: &Config) -> anyhow::Result<String> {
    let ops =
        ImageOperations::new(&args.to_request())?.with_work_name(&config.pipeline.work_name);
    let plan = Plan {
        work_name: ops.work_name(),
        pipeline: ops.pipeline(),
    };
    Ok(serde_json::to_string_pretty(&plan)?)
}
