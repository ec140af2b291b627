//! Environment/runtime helpers
//!
//! Sanity checks run once at startup.

use tracing::{info, warn};

/// Returns whether the static client bundle exists; a missing bundle only
/// disables the SPA, the API keeps working.
pub async fn ensure_env(frontend_dir: &str) -> anyhow::Result<bool> {
    match tokio::fs::metadata(frontend_dir).await {
        Ok(meta) if meta.is_dir() => {
            info!(%frontend_dir, "serving client bundle");
            Ok(true)
        }
        Ok(_) => Err(anyhow::anyhow!("{frontend_dir} exists but is not a directory")),
        Err(_) => {
            warn!(%frontend_dir, "client bundle directory not found; static assets will 404");
            Ok(false)
        }
    }
}
