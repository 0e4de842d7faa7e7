use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log output goes
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Discard,
}

/// Install the global subscriber. `RUST_LOG` overrides the default `warn` level.
pub fn init(target: LogTarget<'_>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // A second init (e.g. from tests) keeps the first subscriber
    match target {
        LogTarget::Stderr => {
            let _ = builder.with_writer(io::stderr).try_init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        LogTarget::Discard => {
            let _ = builder.with_writer(io::sink).try_init();
        }
    }
    Ok(())
}
