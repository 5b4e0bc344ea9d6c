//! Remote catalog aggregation with per-remote fetch memoization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::debug;

use crate::config::Settings;
use crate::local::LocalState;
use crate::version::error::CatalogError;
use crate::version::ordering;
use crate::version::sources::source_for;
use crate::version::types::VersionEntry;

type FetchFuture = Shared<BoxFuture<'static, Result<Arc<Vec<VersionEntry>>, CatalogError>>>;

/// Aggregates and caches remote version listings.
///
/// The raw fetch for each remote runs at most once per catalog lifetime:
/// concurrent callers share the in-flight future instead of issuing
/// duplicate requests. Listing annotations are recomputed per call.
pub struct VersionCatalog {
    settings: Arc<Settings>,
    client: reqwest::Client,
    inflight: Mutex<HashMap<String, FetchFuture>>,
}

impl VersionCatalog {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            client: reqwest::Client::builder()
                .user_agent(concat!("nvx/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Every version a remote offers, annotated against the local state
    /// and sorted most-recent-first.
    pub async fn remote_versions(
        &self,
        remote_name: &str,
        local: &LocalState,
    ) -> Result<Vec<VersionEntry>, CatalogError> {
        let raw = self.fetch_raw(remote_name).await?;
        let mut entries: Vec<VersionEntry> = raw.as_ref().clone();
        for entry in &mut entries {
            entry.local = local
                .installed
                .iter()
                .any(|ident| ident.same_release(&entry.ident));
            entry.current = local
                .current
                .as_ref()
                .is_some_and(|ident| ident.same_release(&entry.ident));
            entry.default = local
                .default
                .as_ref()
                .is_some_and(|ident| ident.same_release(&entry.ident));
        }
        entries.sort_by(|a, b| ordering::compare(&b.ident, &a.ident));
        Ok(entries)
    }

    /// Memoized raw fetch; the check-then-insert under the lock keeps it
    /// at one in-flight request per remote name.
    async fn fetch_raw(&self, remote_name: &str) -> Result<Arc<Vec<VersionEntry>>, CatalogError> {
        let fut = {
            let mut inflight = self.inflight.lock().expect("catalog cache lock poisoned");
            match inflight.get(remote_name) {
                Some(fut) => fut.clone(),
                None => {
                    let fut = fetch_remote(
                        remote_name.to_string(),
                        self.settings.clone(),
                        self.client.clone(),
                    )
                    .boxed()
                    .shared();
                    inflight.insert(remote_name.to_string(), fut.clone());
                    fut
                }
            }
        };
        fut.await
    }
}

async fn fetch_remote(
    remote_name: String,
    settings: Arc<Settings>,
    client: reqwest::Client,
) -> Result<Arc<Vec<VersionEntry>>, CatalogError> {
    let Some(uri) = settings.remote_uri(&remote_name).map(str::to_string) else {
        return Err(CatalogError::UnknownRemote(remote_name));
    };
    let source = source_for(&remote_name, &uri, &settings, client)?;
    debug!(remote = %remote_name, %uri, "fetching remote version catalog");
    let versions = source.fetch_versions().await?;
    debug!(remote = %remote_name, count = versions.len(), "catalog fetched");
    Ok(Arc::new(versions))
}
