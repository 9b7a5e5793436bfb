//! Logging setup for the replay CLI
//!
//! Logs go to stderr so replay output on stdout stays clean. Set
//! `DEBUG_LOGGING=1` to enable debug output for waymark crates.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Filter directive for the given debug flag
fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        // debug for our crates, warnings only from dependencies
        "warn,waymark=debug,waymark_core=debug"
    } else {
        "warn,waymark=info,waymark_core=info"
    }
}

/// Install the global subscriber. `verbose` has the same effect as
/// `DEBUG_LOGGING=1`.
pub fn init(verbose: bool) {
    let debug_logging = verbose || std::env::var("DEBUG_LOGGING").is_ok();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter = EnvFilter::new(filter_directive(debug_logging));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .try_init();

    tracing::debug!(debug_logging, "Logging initialized");
}
