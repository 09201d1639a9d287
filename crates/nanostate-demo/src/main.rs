#![forbid(unsafe_code)]

//! nanostate demo binary entry point.

use std::io::{self, Write};

use nanostate_demo::{app, cli};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "nanostate=info";

fn main() {
    let opts = cli::Opts::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = app::run(&opts, &mut out).and_then(|()| out.flush().map_err(Into::into)) {
        tracing::error!(message = "demo.failed", error = %e);
        eprintln!("Demo error: {e}");
        std::process::exit(1);
    }
}
