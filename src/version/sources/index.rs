//! nodejs.org-style index.json source adapter.
//!
//! The index is a JSON array of release records, each naming the platform
//! builds that were published for it. Archive extension selection encodes
//! historical packaging quirks as an explicit rule table.

use std::sync::Arc;

use semver::Version;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::CatalogError;
use crate::version::sources::SourceAdapter;
use crate::version::types::{PackageInfo, VersionEntry, VersionIdent, normalize_os};

/// Inclusive-lower, exclusive-upper version range compared on the numeric
/// triple only; prerelease builds follow their release's rules.
#[derive(Debug, Clone, Copy)]
struct VersionRange {
    min: (u64, u64, u64),
    max: (u64, u64, u64),
}

impl VersionRange {
    const fn below(max: (u64, u64, u64)) -> Self {
        Self { min: (0, 0, 0), max }
    }

    const fn between(min: (u64, u64, u64), max: (u64, u64, u64)) -> Self {
        Self { min, max }
    }

    fn contains(&self, version: &Version) -> bool {
        let key = (version.major, version.minor, version.patch);
        key >= self.min && key < self.max
    }
}

/// Windows releases before 4.5.0 only shipped MSI installers, no 7z archives.
const MSI_ONLY: &[VersionRange] = &[VersionRange::below((4, 5, 0))];

/// Releases that never published .tar.xz archives: early 0.10/0.12 lines
/// and the io.js 1.x-3.x era.
const XZ_MISSING: &[VersionRange] = &[
    VersionRange::below((0, 10, 42)),
    VersionRange::between((0, 11, 0), (0, 12, 10)),
    VersionRange::between((1, 0, 0), (4, 0, 0)),
];

/// Archive-extension selection, driven by the rule tables above plus the
/// user's overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionPolicy {
    pub force_msi: bool,
    pub use_xz: bool,
}

impl ExtensionPolicy {
    pub fn archive_ext(&self, os: &str, version: &Version) -> &'static str {
        if os == "win" {
            if self.force_msi || MSI_ONLY.iter().any(|r| r.contains(version)) {
                "msi"
            } else {
                "7z"
            }
        } else if self.use_xz && !XZ_MISSING.iter().any(|r| r.contains(version)) {
            "tar.xz"
        } else {
            "tar.gz"
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexRelease {
    version: String,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    lts: LtsTag,
}

/// The `lts` field is `false` or a codename string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LtsTag {
    Codename(String),
    Flag(bool),
}

impl Default for LtsTag {
    fn default() -> Self {
        LtsTag::Flag(false)
    }
}

impl LtsTag {
    fn codename(self) -> Option<String> {
        match self {
            LtsTag::Codename(name) => Some(name),
            LtsTag::Flag(_) => None,
        }
    }
}

pub struct IndexSource {
    client: reqwest::Client,
    remote_name: String,
    base_uri: String,
    policy: ExtensionPolicy,
}

impl IndexSource {
    pub fn new(
        remote_name: impl Into<String>,
        uri: &str,
        policy: ExtensionPolicy,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            remote_name: remote_name.into(),
            base_uri: uri.trim_end_matches('/').to_string(),
            policy,
        }
    }

    fn release_entry(&self, release: IndexRelease) -> Option<VersionEntry> {
        let version = Version::parse(release.version.strip_prefix('v').unwrap_or(&release.version))
            .map_err(|e| debug!(version = %release.version, "skipping unparseable release: {e}"))
            .ok()?;

        // Releases before 0.7 predate the managed download layout.
        if version.major == 0 && version.minor < 7 {
            return None;
        }

        let mut platforms: Vec<(String, String)> = Vec::new();
        for file in &release.files {
            let mut parts = file.split('-');
            let (Some(os), Some(arch)) = (parts.next(), parts.next()) else {
                continue;
            };
            if !is_platform_token(os) {
                continue;
            }
            let platform = (normalize_os(os), arch.to_string());
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }

        let packages = platforms
            .into_iter()
            .map(|(os, arch)| {
                let ext = self.policy.archive_ext(&os, &version);
                let uri = match (os.as_str(), ext) {
                    // MSI downloads predate the os-qualified naming scheme.
                    ("win", "msi") => format!(
                        "{}/v{version}/node-v{version}-{arch}.msi",
                        self.base_uri
                    ),
                    ("win", _) => format!(
                        "{}/v{version}/node-v{version}-win-{arch}.{ext}",
                        self.base_uri
                    ),
                    _ => format!(
                        "{}/v{version}/node-v{version}-{os}-{arch}.{ext}",
                        self.base_uri
                    ),
                };
                PackageInfo {
                    os,
                    arch,
                    ext: ext.to_string(),
                    uri,
                    checksum_uri: Some(format!("{}/v{version}/SHASUMS256.txt", self.base_uri)),
                }
            })
            .collect();

        Some(VersionEntry {
            ident: VersionIdent::Remote {
                remote: self.remote_name.clone(),
                version,
                arch: None,
            },
            label: release.lts.codename(),
            os: None,
            local: false,
            current: false,
            default: false,
            packages,
        })
    }
}

fn is_platform_token(token: &str) -> bool {
    matches!(
        token,
        "win" | "osx" | "darwin" | "linux" | "aix" | "sunos"
    )
}

#[async_trait::async_trait]
impl SourceAdapter for IndexSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionEntry>, CatalogError> {
        let uri = format!("{}/index.json", self.base_uri);

        let response = self
            .client
            .get(&uri)
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
            warn!(%uri, %status, "version index fetch failed");
            return Err(CatalogError::Http {
                uri,
                status: status.as_u16(),
                body,
            });
        }

        let releases: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| CatalogError::InvalidIndexFormat {
                uri: uri.clone(),
                detail: e.to_string(),
            })?;

        let entries = releases
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<IndexRelease>(value) {
                Ok(release) => self.release_entry(release),
                Err(e) => {
                    warn!(%uri, "skipping malformed index record: {e}");
                    None
                }
            })
            .collect();

        Ok(entries)
    }
}
