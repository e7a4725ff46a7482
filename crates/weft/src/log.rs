//! Stderr logging for the CLI.
//!
//! The filter comes from `WEFT_LOG`, then `RUST_LOG`, and defaults to `warn`.

use std::env;

use tracing_subscriber::EnvFilter;

pub(crate) fn init() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter()?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(anyhow::Error::from_boxed)?;
    Ok(())
}

fn filter() -> anyhow::Result<EnvFilter> {
    let directives = env::var("WEFT_LOG").or_else(|_| env::var("RUST_LOG"));
    match directives {
        Ok(directives) => Ok(EnvFilter::try_new(&directives)?),
        Err(_) => Ok(EnvFilter::new("warn")),
    }
}
