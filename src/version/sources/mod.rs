//! Source adapters for remote version catalogs.
//!
//! A configured remote URI picks one of three adapters: a path template
//! with placeholders is a network share, a `github.com/<owner>/<repo>`
//! URI is a releases API, anything else is an index.json listing.

use crate::config::Settings;
use crate::version::error::CatalogError;
use crate::version::types::VersionEntry;

pub mod index;
pub mod releases;
pub mod share;

pub use index::{ExtensionPolicy, IndexSource};
pub use releases::ReleasesSource;
pub use share::ShareSource;

/// One upstream listing of downloadable versions.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch and normalize every available version from this source.
    ///
    /// Entries come back unsorted and unannotated; the catalog applies
    /// ordering and the local/current/default flags.
    async fn fetch_versions(&self) -> Result<Vec<VersionEntry>, CatalogError>;
}

/// Pick the adapter for a configured remote URI.
pub fn source_for(
    remote_name: &str,
    uri: &str,
    settings: &Settings,
    client: reqwest::Client,
) -> Result<Box<dyn SourceAdapter>, CatalogError> {
    if uri.contains("{version}") {
        return Ok(Box::new(ShareSource::new(remote_name, uri)?));
    }
    if let Some(source) =
        ReleasesSource::from_uri(remote_name, uri, &settings.github_api_base, client.clone())
    {
        return Ok(Box::new(source));
    }
    let policy = ExtensionPolicy {
        force_msi: settings.force_msi,
        use_xz: settings.use_xz,
    };
    Ok(Box::new(IndexSource::new(remote_name, uri, policy, client)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_templates_must_carry_an_arch_placeholder() {
        let settings = Settings::default();
        let result = source_for(
            "share",
            "/mnt/builds/{version}/node.tar.gz",
            &settings,
            reqwest::Client::new(),
        );
        assert!(matches!(
            result,
            Err(CatalogError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn dispatch_accepts_each_uri_shape() {
        let settings = Settings::default();
        let client = reqwest::Client::new();
        assert!(source_for("a", "/mnt/{version}/{arch}/node.tar.gz", &settings, client.clone()).is_ok());
        assert!(source_for("b", "https://github.com/o/r/releases", &settings, client.clone()).is_ok());
        assert!(source_for("c", "https://nodejs.org/dist", &settings, client).is_ok());
    }
}
