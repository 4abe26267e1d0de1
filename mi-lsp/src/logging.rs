//! Log subscriber setup.
//!
//! Output always goes to stderr: stdout carries the JSON-RPC stream and must never see a log
//! line. The filter directive is taken from `MI_LSP_LOG`, then `RUST_LOG`, then the configured
//! `logging.level`, using the usual `EnvFilter` syntax (e.g. `debug`, `mi_lsp=trace`).

use mi_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MI_LSP_LOG";

/// Pick the filter directive, first match wins.
fn select_directive(server_env: Option<String>, rust_log: Option<String>, configured: &str) -> String {
    server_env
        .or(rust_log)
        .unwrap_or_else(|| configured.to_string())
}

fn build_filter(configured: &str) -> EnvFilter {
    let directive = select_directive(
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
        configured,
    );
    EnvFilter::builder().parse_lossy(directive)
}

/// Install the global subscriber. A second call keeps the first subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = build_filter(&config.level);
    let installed = match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    if let Err(err) = installed {
        eprintln!("mi-lsp: log subscriber not installed: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_variable_wins() {
        let directive = select_directive(Some("trace".into()), Some("info".into()), "warn");
        assert_eq!(directive, "trace");
    }

    #[test]
    fn rust_log_beats_configuration() {
        assert_eq!(select_directive(None, Some("info".into()), "warn"), "info");
    }

    #[test]
    fn configuration_is_the_fallback() {
        assert_eq!(select_directive(None, None, "mi_lsp=debug"), "mi_lsp=debug");
    }
}
