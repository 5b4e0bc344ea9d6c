//! Network-share source adapter.
//!
//! The remote URI is a path template carrying `{version}` and `{arch}`
//! placeholders (and optionally `{os}`), e.g.
//! `/mnt/builds/{version}/node-{version}-{os}-{arch}.tar.gz`. Versions are
//! discovered by enumerating version-named subdirectories and probing each
//! architecture's substituted path for existence.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::version::error::CatalogError;
use crate::version::sources::SourceAdapter;
use crate::version::types::{
    PackageInfo, VersionEntry, VersionIdent, host_os, parse_version_token,
};

static VERSION_DIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?\d+\.\d+\.\d+(-[0-9A-Za-z.\-]+)?$").expect("version dir pattern is valid")
});

/// Architectures probed for each discovered version.
const PROBE_ARCHS: &[&str] = &["x86", "x64", "arm", "arm64", "ppc64"];

pub struct ShareSource {
    remote_name: String,
    template: String,
}

impl ShareSource {
    pub fn new(remote_name: impl Into<String>, template: &str) -> Result<Self, CatalogError> {
        for required in ["{version}", "{arch}"] {
            if !template.contains(required) {
                return Err(CatalogError::InvalidTemplate {
                    template: template.to_string(),
                    detail: format!("missing {required} placeholder"),
                });
            }
        }
        Ok(Self {
            remote_name: remote_name.into(),
            template: template.to_string(),
        })
    }

    /// Directory holding the version subdirectories: everything before the
    /// first placeholder, cut back to the last path separator.
    fn base_dir(&self) -> &str {
        let prefix = self
            .template
            .split('{')
            .next()
            .unwrap_or_default();
        match prefix.rfind(['/', '\\']) {
            Some(i) => &prefix[..i.max(1)],
            None => ".",
        }
    }

    fn substituted(&self, version_dir: &str, arch: &str) -> String {
        self.template
            .replace("{version}", version_dir)
            .replace("{arch}", arch)
            .replace("{os}", host_os())
    }
}

fn ext_of(path: &str) -> String {
    for known in [".tar.xz", ".tar.gz"] {
        if path.ends_with(known) {
            return known.trim_start_matches('.').to_string();
        }
    }
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl SourceAdapter for ShareSource {
    async fn fetch_versions(&self) -> Result<Vec<VersionEntry>, CatalogError> {
        let base = self.base_dir().to_string();
        let mut dir = tokio::fs::read_dir(&base).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CatalogError::NotFound { uri: base.clone() }
            } else {
                CatalogError::Io {
                    path: base.clone(),
                    source: Arc::new(e),
                }
            }
        })?;

        let mut entries = Vec::new();
        while let Some(dirent) = dir.next_entry().await.map_err(|e| CatalogError::Io {
            path: base.clone(),
            source: Arc::new(e),
        })? {
            let name = dirent.file_name().to_string_lossy().into_owned();
            if !VERSION_DIR_RE.is_match(&name) {
                continue;
            }
            let Some(version) = parse_version_token(&name) else {
                continue;
            };

            let mut packages = Vec::new();
            for arch in PROBE_ARCHS {
                let candidate = self.substituted(&name, arch);
                // A missing or unreadable combination is not an error,
                // just an absent build.
                if tokio::fs::metadata(&candidate).await.is_ok() {
                    packages.push(PackageInfo {
                        os: host_os().to_string(),
                        arch: (*arch).to_string(),
                        ext: ext_of(&candidate),
                        uri: candidate,
                        checksum_uri: None,
                    });
                }
            }
            if packages.is_empty() {
                debug!(version = %name, "no architecture builds found, skipping");
                continue;
            }

            entries.push(VersionEntry {
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
            });
        }

        Ok(entries)
    }
}
