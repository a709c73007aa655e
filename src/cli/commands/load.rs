//! Load command - print library source for `eval`

use super::build_resolver;
use crate::cli::args::LoadArgs;
use crate::config::Config;
use crate::error::{ShmgrError, ShmgrResult};
use crate::ui;
use std::io::Write;

/// Execute the load command.
///
/// Stdout receives the concatenated source of every library that resolved,
/// in request order, and nothing else. Each failed request is reported on
/// stderr and makes the command fail after all requests were attempted.
pub async fn execute(args: LoadArgs, config: &Config) -> ShmgrResult<()> {
    let resolver = build_resolver(config, args.cache_dir.as_deref()).await;
    let resolution = resolver.resolve_many(args.libraries.as_slice()).await;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&resolution.script())
        .and_then(|()| stdout.flush())
        .map_err(|e| ShmgrError::io("writing library source to stdout", e))?;

    for failure in &resolution.failures {
        ui::error_with_hint(
            &format!("{}: {}", failure.token, failure.error),
            failure.error.hint(),
        );
    }

    match resolution.failures.len() {
        0 => Ok(()),
        n => Err(ShmgrError::User(format!(
            "{} of {} libraries could not be loaded",
            n,
            args.libraries.len()
        ))),
    }
}
