//! Tracing/logging pipeline bootstrap.

use stacks_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for the whole process.
///
/// Verbosity is controlled through `RUST_LOG` (defaults to `info`), the
/// output format through [`TelemetrySettings::log_format`]. Calling this
/// twice returns an error from the subscriber registry, which we surface
/// rather than panic on.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
