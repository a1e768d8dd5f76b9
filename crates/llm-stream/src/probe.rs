//! Local-backend liveness check.
//!
//! Callers run this before opening a session against a local server; the
//! session itself never probes.
use tracing::debug;

use crate::config::ProbeConfig;

/// Returns `true` when `GET {base_url}/api/tags` answers `200 OK` within the
/// probe timeout.
pub async fn is_reachable(config: &ProbeConfig) -> bool {
    let client = match reqwest::Client::builder().timeout(config.timeout).build() {
        Ok(client) => client,
        Err(err) => {
            debug!(error = %err, "failed to build probe client");
            return false;
        }
    };
    let url = config.tags_url();
    match client.get(&url).send().await {
        Ok(response) => {
            let status = response.status();
            debug!(%url, %status, "liveness probe answered");
            status == reqwest::StatusCode::OK
        }
        Err(err) => {
            debug!(%url, error = %err, "liveness probe failed");
            false
        }
    }
}
