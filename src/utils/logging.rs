use tracing::Level;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Sets up the global tracing subscriber. Per-round narration stays on
/// stdout via println; this channel carries diagnostics and recoverable
/// failures (persistence warnings, connection attempt debug output).
pub fn init_logging() {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(Level::INFO.into())
        .add_directive("qjack=debug".parse().expect("static directive parses"));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false));

    // A second init (tests) is fine to ignore.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
