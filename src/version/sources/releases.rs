//! GitHub releases source adapter.
//!
//! A remote configured with a `github.com/<owner>/<repo>` URI is served
//! from the releases API. An optional asset-name filter regex rides in the
//! URI fragment: `https://github.com/foo/bar/releases#linux-.*\.tar\.gz`.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use semver::Version;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::CatalogError;
use crate::version::sources::SourceAdapter;
use crate::version::types::{PackageInfo, VersionEntry, VersionIdent, normalize_arch, normalize_os};

static OWNER_REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/#]+)/([^/#]+)").expect("owner/repo pattern is valid")
});

/// Archive suffixes recognized in asset filenames, longest first so
/// `.tar.gz` wins over `.gz`.
const ASSET_EXTS: &[&str] = &[".tar.xz", ".tar.gz", ".zip", ".7z", ".msi", ".pkg"];

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    browser_download_url: String,
}

pub struct ReleasesSource {
    client: reqwest::Client,
    remote_name: String,
    owner: String,
    repo: String,
    api_base: String,
    asset_filter: Option<Regex>,
}

impl ReleasesSource {
    /// Build a source from a configured URI, or None when the URI is not
    /// a GitHub releases location.
    pub fn from_uri(
        remote_name: impl Into<String>,
        uri: &str,
        api_base: &str,
        client: reqwest::Client,
    ) -> Option<Self> {
        let caps = OWNER_REPO_RE.captures(uri)?;
        let asset_filter = uri.split_once('#').and_then(|(_, pattern)| {
            Regex::new(pattern)
                .map_err(|e| warn!(%uri, "ignoring invalid asset filter: {e}"))
                .ok()
        });
        Some(Self {
            client,
            remote_name: remote_name.into(),
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            asset_filter,
        })
    }

    fn release_entry(&self, release: Release) -> Option<VersionEntry> {
        let tag = release.tag_name.trim_start_matches(|c: char| !c.is_ascii_digit());
        let version = Version::parse(tag)
            .map_err(|e| debug!(tag = %release.tag_name, "skipping unparseable tag: {e}"))
            .ok()?;

        let packages: Vec<PackageInfo> = release
            .assets
            .iter()
            .filter_map(|asset| {
                let filename = asset.browser_download_url.rsplit('/').next()?;
                if let Some(filter) = &self.asset_filter
                    && !filter.is_match(filename)
                {
                    return None;
                }
                let (os, arch, ext) = parse_asset_name(filename)?;
                Some(PackageInfo {
                    os,
                    arch,
                    ext,
                    uri: asset.browser_download_url.clone(),
                    checksum_uri: None,
                })
            })
            .collect();

        // A release with no recognizable platform build isn't installable.
        if packages.is_empty() {
            return None;
        }

        Some(VersionEntry {
            ident: VersionIdent::Remote {
                remote: self.remote_name.clone(),
                version,
                arch: None,
            },
            label: None,
            os: None,
            local: false,
            current: false,
            default: false,
            packages,
        })
    }
}

/// Extract (os, arch, ext) from an asset filename by token scan.
fn parse_asset_name(filename: &str) -> Option<(String, String, String)> {
    let ext = ASSET_EXTS
        .iter()
        .find(|ext| filename.ends_with(**ext))?
        .trim_start_matches('.');
    // "x86_64" would split apart on '_'; fold it before tokenizing.
    let stem = filename[..filename.len() - ext.len() - 1]
        .to_ascii_lowercase()
        .replace("x86_64", "x64");

    let mut os = None;
    let mut arch = None;
    for token in stem.split(['-', '_', '.']) {
        match token {
            "win" | "windows" | "osx" | "macos" | "darwin" | "linux" | "aix" | "sunos" => {
                os.get_or_insert(normalize_os(token));
            }
            "x86" | "ia32" | "x64" | "amd64" | "arm" | "arm64" | "aarch64" | "armv7l"
            | "ppc64" | "ppc64le" | "s390x" => {
                arch.get_or_insert(canonical_arch(token));
            }
            _ => {}
        }
    }

    Some((os?, arch?, ext.to_string()))
}

fn canonical_arch(token: &str) -> String {
    match token {
        "aarch64" => "arm64".to_string(),
        _ => normalize_arch(token),
    }
}

#[async_trait::async_trait]
impl SourceAdapter for ReleasesSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionEntry>, CatalogError> {
        let uri = format!(
            "{}/repos/{}/{}/releases",
            self.api_base, self.owner, self.repo
        );

        let response = self
            .client
            .get(&uri)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| CatalogError::Fetch {
                uri: uri.clone(),
                source: Arc::new(e),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound { uri });
        }
        let body = response.text().await.map_err(|e| CatalogError::Fetch {
            uri: uri.clone(),
            source: Arc::new(e),
        })?;
        if !status.is_success() {
            // The releases API explains failures (rate limits, auth) in
            // the body; keep it for diagnostics.
            warn!(%uri, %status, "releases fetch failed");
            return Err(CatalogError::Http {
                uri,
                status: status.as_u16(),
                body,
            });
        }

        let releases: Vec<Release> =
            serde_json::from_str(&body).map_err(|e| CatalogError::InvalidIndexFormat {
                uri: uri.clone(),
                detail: e.to_string(),
            })?;

        Ok(releases
            .into_iter()
            .filter_map(|release| self.release_entry(release))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("node-v8.0.0-linux-x64.tar.gz", Some(("linux", "x64", "tar.gz")))]
    #[case("node-v8.0.0-win-x64.7z", Some(("win", "x64", "7z")))]
    #[case("runtime-8.0.0-darwin-arm64.tar.xz", Some(("darwin", "arm64", "tar.xz")))]
    #[case("runtime_macos_aarch64.zip", Some(("darwin", "arm64", "zip")))]
    #[case("node-v8.0.0-linux-x86_64.tar.gz", Some(("linux", "x64", "tar.gz")))]
    #[case("SHASUMS256.txt", None)]
    #[case("node-v8.0.0-headers.tar.gz", None)]
    fn parse_asset_name_extracts_platform_triples(
        #[case] filename: &str,
        #[case] expected: Option<(&str, &str, &str)>,
    ) {
        let parsed = parse_asset_name(filename);
        assert_eq!(
            parsed,
            expected.map(|(os, arch, ext)| (os.to_string(), arch.to_string(), ext.to_string()))
        );
    }

    #[test]
    fn from_uri_requires_a_github_location() {
        let client = reqwest::Client::new();
        assert!(
            ReleasesSource::from_uri("r", "https://nodejs.org/dist", "https://api.github.com", client.clone())
                .is_none()
        );
        let source = ReleasesSource::from_uri(
            "r",
            "https://github.com/some-org/runtime/releases",
            "https://api.github.com",
            client,
        )
        .unwrap();
        assert_eq!(source.owner, "some-org");
        assert_eq!(source.repo, "runtime");
    }

    fn releases_source(api_base: &str, uri: &str) -> ReleasesSource {
        ReleasesSource::from_uri("test2", uri, api_base, reqwest::Client::new()).unwrap()
    }

    #[tokio::test]
    async fn fetch_versions_maps_assets_to_packages() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/some-org/runtime/releases")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"tag_name": "v2.1.0", "assets": [
                        {"browser_download_url": "https://example.test/dl/runtime-v2.1.0-linux-x64.tar.gz"},
                        {"browser_download_url": "https://example.test/dl/runtime-v2.1.0-win-x64.zip"},
                        {"browser_download_url": "https://example.test/dl/SHASUMS256.txt"}
                    ]},
                    {"tag_name": "not-a-version", "assets": []},
                    {"tag_name": "v2.0.0", "assets": [
                        {"browser_download_url": "https://example.test/dl/notes.txt"}
                    ]}
                ]"#,
            )
            .create_async()
            .await;

        let source = releases_source(&server.url(), "https://github.com/some-org/runtime/releases");
        let entries = source.fetch_versions().await.unwrap();

        mock.assert_async().await;
        // Unparseable tags and releases with no usable assets drop out.
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].ident.version().map(ToString::to_string).as_deref(),
            Some("2.1.0")
        );
        assert_eq!(entries[0].packages.len(), 2);
        assert_eq!(entries[0].packages[0].os, "linux");
        assert_eq!(entries[0].packages[1].ext, "zip");
    }

    #[tokio::test]
    async fn asset_filter_from_uri_fragment_excludes_assets() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/some-org/runtime/releases")
            .with_status(200)
            .with_body(
                r#"[
                    {"tag_name": "v2.1.0", "assets": [
                        {"browser_download_url": "https://example.test/dl/runtime-v2.1.0-linux-x64.tar.gz"},
                        {"browser_download_url": "https://example.test/dl/runtime-v2.1.0-win-x64.zip"}
                    ]}
                ]"#,
            )
            .create_async()
            .await;

        let source = releases_source(
            &server.url(),
            r"https://github.com/some-org/runtime/releases#linux-.*\.tar\.gz",
        );
        let entries = source.fetch_versions().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].packages.len(), 1);
        assert_eq!(entries[0].packages[0].os, "linux");
    }

    #[tokio::test]
    async fn missing_repo_maps_to_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/some-org/runtime/releases")
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let source = releases_source(&server.url(), "https://github.com/some-org/runtime/releases");
        let result = source.fetch_versions().await;
        assert!(matches!(result, Err(CatalogError::NotFound { .. })));
    }

    #[tokio::test]
    async fn non_404_failures_surface_the_response_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/some-org/runtime/releases")
            .with_status(403)
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let source = releases_source(&server.url(), "https://github.com/some-org/runtime/releases");
        match source.fetch_versions().await {
            Err(CatalogError::Http { status, body, .. }) => {
                assert_eq!(status, 403);
                assert!(body.contains("rate limit"));
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }
}
