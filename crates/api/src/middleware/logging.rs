//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Wires the global subscriber. `RUST_LOG` wins over the configured level,
/// so a deployment can be made chattier without a config rollout.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    if json_output(&config.format) {
        registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .init();
    } else {
        registry.with(fmt::layer().pretty().with_target(true)).init();
    }
}

/// Structured output everywhere except an explicit `pretty` opt-in.
fn json_output(format: &str) -> bool {
    !format.eq_ignore_ascii_case("pretty")
}

#[cfg(test)]
mod tests {
    use super::json_output;

    #[test]
    fn output_is_json_unless_pretty_requested() {
        assert!(json_output("json"));
        assert!(json_output("anything-else"));
        assert!(!json_output("pretty"));
        assert!(!json_output("PRETTY"));
    }
}
