//! Installed-version enumeration and environment inspection.
//!
//! Installed versions live at `<home>/<remote>/<version>/<arch>`. The
//! currently-active version is inferred from a PATH component under the
//! nvx home; the default version from the `<home>/default` symlink.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::Settings;
use crate::version::types::{VersionEntry, VersionIdent, normalize_arch, parse_version_token};

/// What is installed and active on this machine, injected into the
/// catalog and resolver rather than re-scanned ambiently.
#[derive(Debug, Clone, Default)]
pub struct LocalState {
    pub installed: Vec<VersionIdent>,
    pub current: Option<VersionIdent>,
    pub default: Option<VersionIdent>,
}

impl LocalState {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Scan the nvx home and environment into a `LocalState`.
pub fn scan(settings: &Settings) -> LocalState {
    LocalState {
        installed: installed_versions(settings),
        current: current_version(settings),
        default: default_version(settings),
    }
}

/// Enumerate `<home>/<remote>/<version>/<arch>` install triples. A home
/// that doesn't exist yet simply has nothing installed.
pub fn installed_versions(settings: &Settings) -> Vec<VersionIdent> {
    let mut found = Vec::new();
    let Ok(remotes) = std::fs::read_dir(&settings.home) else {
        return found;
    };
    for remote_dir in remotes.flatten() {
        let remote = remote_dir.file_name().to_string_lossy().into_owned();
        if !settings.known_remote(&remote) {
            continue;
        }
        let Ok(versions) = std::fs::read_dir(remote_dir.path()) else {
            continue;
        };
        for version_dir in versions.flatten() {
            let name = version_dir.file_name().to_string_lossy().into_owned();
            let Some(version) = parse_version_token(&name) else {
                debug!(dir = %name, "skipping non-version directory");
                continue;
            };
            let Ok(archs) = std::fs::read_dir(version_dir.path()) else {
                continue;
            };
            for arch_dir in archs.flatten() {
                let arch = arch_dir.file_name().to_string_lossy().into_owned();
                found.push(VersionIdent::Remote {
                    remote: remote.clone(),
                    version: version.clone(),
                    arch: Some(normalize_arch(&arch)),
                });
            }
        }
    }
    found.sort();
    found
}

/// Installed versions plus configured aliases as annotated, sorted
/// (most recent first) listing entries.
pub fn entries(settings: &Settings) -> Vec<VersionEntry> {
    let state = scan(settings);
    let mut entries: Vec<VersionEntry> = state
        .installed
        .iter()
        .map(|ident| VersionEntry {
            ident: ident.clone(),
            label: None,
            os: None,
            local: true,
            current: state.current.as_ref() == Some(ident),
            default: state.default.as_ref() == Some(ident),
            packages: Vec::new(),
        })
        .collect();
    for (name, path) in &settings.aliases {
        let ident = VersionIdent::Path {
            path: PathBuf::from(path),
        };
        entries.push(VersionEntry {
            current: state.current.as_ref() == Some(&ident),
            default: state.default.as_ref() == Some(&ident),
            ..VersionEntry::alias(name.clone(), path.clone())
        });
    }
    entries.sort_by(|a, b| b.ident.cmp(&a.ident));
    entries
}

/// The version whose bin directory is on PATH, if any.
fn current_version(settings: &Settings) -> Option<VersionIdent> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        if let Ok(rel) = dir.strip_prefix(&settings.home)
            && let Some(ident) = ident_from_relative(rel, settings)
        {
            return Some(ident);
        }
    }
    None
}

/// The version the `<home>/default` symlink points at. A link leading
/// outside the home is a plain path version.
fn default_version(settings: &Settings) -> Option<VersionIdent> {
    let target = std::fs::read_link(settings.home.join("default")).ok()?;
    let target = if target.is_relative() {
        settings.home.join(target)
    } else {
        target
    };
    match target.strip_prefix(&settings.home) {
        Ok(rel) => ident_from_relative(rel, settings),
        Err(_) => Some(VersionIdent::Path { path: target }),
    }
}

/// Interpret a home-relative `<remote>/<version>/<arch>[/bin]` path.
fn ident_from_relative(rel: &Path, settings: &Settings) -> Option<VersionIdent> {
    let mut parts = rel.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    });
    let remote = parts.next()?;
    if !settings.known_remote(&remote) {
        return None;
    }
    let version = parse_version_token(&parts.next()?)?;
    let arch = parts.next()?;
    Some(VersionIdent::Remote {
        remote,
        version,
        arch: Some(normalize_arch(&arch)),
    })
}
