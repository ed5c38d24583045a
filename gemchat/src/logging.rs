//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the filter follows the `-v` count.
/// Logs go to stderr so they never mix with the terminal chat transcript.
pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "gemchat=info,warn",
        1 => "gemchat=debug,tower_http=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
