#![forbid(unsafe_code)]

//! Structured logging setup.
//!
//! The crate emits `tracing` events under the `ftui_sizewatch` target:
//! `debug` for polling start/stop and disposal, `trace` for each recorded
//! size change, `warn` for degraded inputs. Applications normally install
//! their own subscriber; [`init_json_logging`] is a convenience for
//! production binaries that want line-delimited JSON.

#[cfg(feature = "tracing-json")]
use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "ftui_sizewatch=info";

/// Install a global JSON subscriber filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
}
