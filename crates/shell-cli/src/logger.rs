use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global subscriber.
///
/// `RUST_LOG` picks the filter, `warn` when unset. `trace` turns on the
/// per-instruction state dump of the engine.
pub fn setup_logger(trace: bool) {
    INIT.call_once(|| {
        let mut env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        if trace {
            if let Ok(directive) = "ls8_cpu=trace".parse() {
                env_filter = env_filter.add_directive(directive);
            }
        }

        tracing_subscriber::fmt()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    });
}
