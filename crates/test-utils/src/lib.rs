//! Shared fixtures for the assetflow integration tests: config builders, a
//! recording tool backend and tracing/timeout helpers.

pub mod builders;
pub mod fake_backend;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Upper bound for async tests that wait on channels or the serve loop.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Send `tracing` output through the harness capture (shown for failing
/// tests, or with `--nocapture`). `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("assetflow=debug,warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `fut`, panicking after [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(output) => output,
        Err(_) => panic!("test did not finish within {TEST_TIMEOUT:?}"),
    }
}
