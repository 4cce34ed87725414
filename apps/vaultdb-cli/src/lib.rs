//! Shared plumbing for the vaultdb binaries.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Log to stderr so stdout stays the human-readable report.
///
/// `RUST_LOG` overrides the default `warn,vaultdb=info` filter.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warn,vaultdb_core=info,vaultdb_embed=info,vaultdb_vector=info,vaultdb_ingest=info")
        });
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .try_init();
    });
}

/// Process exit status for an error that escaped `main`.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<vaultdb_core::Error>().map(vaultdb_core::Error::exit_code).unwrap_or(1)
}
