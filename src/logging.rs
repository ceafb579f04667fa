use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable consulted before RUST_LOG
pub const LOG_ENV_VAR: &str = "PR_BOARD_LOG";

/// Pick the filter directive: PR_BOARD_LOG, then RUST_LOG, then a default
/// that only shows warnings (or debug output with --verbose)
pub fn filter_directive(verbose: bool, lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup(LOG_ENV_VAR)
        .or_else(|| lookup("RUST_LOG"))
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| {
            let level = if verbose { "debug" } else { "warn" };
            format!("{}={}", env!("CARGO_CRATE_NAME"), level)
        })
}

/// Install the global subscriber. Logs go to stderr so JSON on stdout stays
/// clean for piping.
pub fn initialize_logging(verbose: bool) -> anyhow::Result<()> {
    let directive = filter_directive(verbose, |name| std::env::var(name).ok());
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| anyhow::anyhow!("Invalid log filter {:?}: {}", directive, e))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(filter_directive(false, |_| None), "pr_board=warn");
        assert_eq!(filter_directive(true, |_| None), "pr_board=debug");
    }

    #[test]
    fn test_dedicated_env_var_wins() {
        let directive = filter_directive(true, |name| match name {
            LOG_ENV_VAR => Some("pr_board=trace".to_string()),
            "RUST_LOG" => Some("info".to_string()),
            _ => None,
        });
        assert_eq!(directive, "pr_board=trace");
    }

    #[test]
    fn test_rust_log_fallback() {
        let directive = filter_directive(false, |name| {
            (name == "RUST_LOG").then(|| "info".to_string())
        });
        assert_eq!(directive, "info");
    }
}
