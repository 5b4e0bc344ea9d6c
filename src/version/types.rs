//! Core version model: identities, catalog entries, filters

use std::fmt;
use std::path::{Path, PathBuf};

use semver::Version;

/// Canonicalize an architecture token from user input or upstream metadata.
///
/// Only the x86/x64 aliases are folded; other tokens (arm, arm64, ppc64, ...)
/// pass through as typed.
pub fn normalize_arch(token: &str) -> String {
    match token.to_ascii_lowercase().as_str() {
        "x86" | "32" | "ia32" => "x86".to_string(),
        "x64" | "64" | "amd64" => "x64".to_string(),
        _ => token.to_string(),
    }
}

/// Normalize an OS token from upstream metadata ("osx" predates "darwin"
/// in the nodejs.org index).
pub fn normalize_os(token: &str) -> String {
    match token.to_ascii_lowercase().as_str() {
        "osx" | "macos" => "darwin".to_string(),
        "windows" => "win".to_string(),
        other => other.to_string(),
    }
}

/// Default architecture token for the host machine.
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86" => "x86",
        "x86_64" => "x64",
        "arm" => "arm",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        other => other,
    }
}

/// OS token for the host machine.
pub fn host_os() -> &'static str {
    match std::env::consts::OS {
        "windows" => "win",
        "macos" => "darwin",
        other => other,
    }
}

/// Parse a `vX.Y.Z[-pre]` token (directory name, release tag) into a version.
pub fn parse_version_token(token: &str) -> Option<Version> {
    Version::parse(token.strip_prefix('v').unwrap_or(token)).ok()
}

/// Special selection labels plus user-defined alias names.
///
/// The four special tokens select by rule rather than by literal match;
/// `Named` matches an entry's label (an alias name or LTS codename).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Latest,
    Lts,
    Current,
    Default,
    Named(String),
}

impl Label {
    pub fn is_special(&self) -> bool {
        !matches!(self, Label::Named(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Latest => f.write_str("latest"),
            Label::Lts => f.write_str("lts"),
            Label::Current => f.write_str("current"),
            Label::Default => f.write_str("default"),
            Label::Named(name) => f.write_str(name),
        }
    }
}

/// A possibly-partial semantic version used on the filter side.
///
/// Matching is component-wise: "5.6" matches 5.6.x but never 5.60.0.
/// A full triple without a prerelease suffix matches only non-prerelease
/// candidates; a given suffix must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPrefix {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub prerelease: Option<String>,
}

impl VersionPrefix {
    pub fn full(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor: Some(minor),
            patch: Some(patch),
            prerelease: None,
        }
    }

    pub fn matches(&self, version: &Version) -> bool {
        if version.major != self.major {
            return false;
        }
        if let Some(minor) = self.minor
            && version.minor != minor
        {
            return false;
        }
        let Some(patch) = self.patch else {
            // Partial prefix constrains only the components it names.
            return match &self.prerelease {
                Some(pre) => version.pre.as_str() == pre,
                None => true,
            };
        };
        if version.patch != patch {
            return false;
        }
        match &self.prerelease {
            Some(pre) => version.pre.as_str() == pre,
            None => version.pre.is_empty(),
        }
    }
}

impl fmt::Display for VersionPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
        }
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

/// What uniquely identifies an installed or downloadable version.
///
/// A remote-managed version is a (remote, version, arch) triple; an
/// alias-defined version is just a directory path and never carries a
/// semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionIdent {
    Remote {
        remote: String,
        version: Version,
        arch: Option<String>,
    },
    Path {
        path: PathBuf,
    },
}

impl VersionIdent {
    pub fn remote(&self) -> Option<&str> {
        match self {
            VersionIdent::Remote { remote, .. } => Some(remote),
            VersionIdent::Path { .. } => None,
        }
    }

    pub fn version(&self) -> Option<&Version> {
        match self {
            VersionIdent::Remote { version, .. } => Some(version),
            VersionIdent::Path { .. } => None,
        }
    }

    pub fn arch(&self) -> Option<&str> {
        match self {
            VersionIdent::Remote { arch, .. } => arch.as_deref(),
            VersionIdent::Path { .. } => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            VersionIdent::Remote { .. } => None,
            VersionIdent::Path { path } => Some(path),
        }
    }

    /// Same remote and version, disregarding architecture. Used for the
    /// `local` annotation, where any installed arch of a release counts.
    pub fn same_release(&self, other: &VersionIdent) -> bool {
        match (self, other) {
            (
                VersionIdent::Remote {
                    remote: ra,
                    version: va,
                    ..
                },
                VersionIdent::Remote {
                    remote: rb,
                    version: vb,
                    ..
                },
            ) => ra == rb && va == vb,
            (VersionIdent::Path { path: pa }, VersionIdent::Path { path: pb }) => pa == pb,
            _ => false,
        }
    }
}

impl fmt::Display for VersionIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionIdent::Remote {
                remote,
                version,
                arch,
            } => {
                write!(f, "{remote}/{version}")?;
                if let Some(arch) = arch {
                    write!(f, "/{arch}")?;
                }
                Ok(())
            }
            VersionIdent::Path { path } => write!(f, "{}", path.display()),
        }
    }
}

/// One downloadable archive for a specific (os, arch) combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub os: String,
    pub arch: String,
    pub ext: String,
    pub uri: String,
    pub checksum_uri: Option<String>,
}

/// A version in a listing: identity plus display/selection metadata.
///
/// The `local`, `current`, and `default` flags are transient listing
/// annotations, recomputed for every listing and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub ident: VersionIdent,
    /// LTS codename for catalog entries, alias name for path entries.
    pub label: Option<String>,
    pub os: Option<String>,
    pub local: bool,
    pub current: bool,
    pub default: bool,
    pub packages: Vec<PackageInfo>,
}

impl VersionEntry {
    pub fn remote(remote: impl Into<String>, version: Version) -> Self {
        Self {
            ident: VersionIdent::Remote {
                remote: remote.into(),
                version,
                arch: None,
            },
            label: None,
            os: None,
            local: false,
            current: false,
            default: false,
            packages: Vec::new(),
        }
    }

    pub fn alias(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            ident: VersionIdent::Path { path: path.into() },
            label: Some(name.into()),
            os: None,
            local: false,
            current: false,
            default: false,
            packages: Vec::new(),
        }
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        if let VersionIdent::Remote { arch: slot, .. } = &mut self.ident {
            *slot = Some(arch.into());
        }
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A parsed version specifier, used as a filter over candidate sets.
///
/// Absent fields impose no constraint; `os` is informational and always
/// defaulted from the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFilter {
    pub remote_name: Option<String>,
    pub prefix: Option<VersionPrefix>,
    pub label: Option<Label>,
    pub arch: Option<String>,
    pub os: String,
}

impl fmt::Display for VersionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(remote) = &self.remote_name {
            write!(f, "{remote}/")?;
        }
        match (&self.prefix, &self.label) {
            (Some(prefix), _) => write!(f, "{prefix}")?,
            (None, Some(label)) => write!(f, "{label}")?,
            (None, None) => f.write_str("*")?,
        }
        if let Some(arch) = &self.arch {
            write!(f, "/{arch}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("x86", "x86")]
    #[case("32", "x86")]
    #[case("ia32", "x86")]
    #[case("X64", "x64")]
    #[case("64", "x64")]
    #[case("amd64", "x64")]
    #[case("arm64", "arm64")]
    #[case("armv7l", "armv7l")]
    #[case("ppc64", "ppc64")]
    fn normalize_arch_canonicalizes_only_x86_x64_aliases(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(normalize_arch(input), expected);
    }

    #[rstest]
    #[case("osx", "darwin")]
    #[case("darwin", "darwin")]
    #[case("linux", "linux")]
    fn normalize_os_folds_osx_into_darwin(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_os(input), expected);
    }

    fn prefix(major: u64, minor: Option<u64>, patch: Option<u64>) -> VersionPrefix {
        VersionPrefix {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    #[rstest]
    #[case(prefix(5, Some(6), None), "5.6.7", true)]
    #[case(prefix(5, Some(6), None), "5.6.0", true)]
    #[case(prefix(5, Some(6), None), "5.60.0", false)] // component-wise, not string prefix
    #[case(prefix(5, None, None), "5.6.7", true)]
    #[case(prefix(5, None, None), "50.0.0", false)]
    #[case(prefix(5, Some(6), Some(7)), "5.6.7", true)]
    #[case(prefix(5, Some(6), Some(7)), "5.6.8", false)]
    #[case(prefix(5, Some(6), Some(7)), "5.6.7-rc1", false)] // exact triple excludes prereleases
    fn version_prefix_matches_component_wise(
        #[case] prefix: VersionPrefix,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        let version = Version::parse(version).unwrap();
        assert_eq!(prefix.matches(&version), expected);
    }

    #[test]
    fn version_prefix_with_prerelease_requires_exact_suffix() {
        let prefix = VersionPrefix {
            major: 5,
            minor: Some(0),
            patch: Some(0),
            prerelease: Some("rc1".to_string()),
        };
        assert!(prefix.matches(&Version::parse("5.0.0-rc1").unwrap()));
        assert!(!prefix.matches(&Version::parse("5.0.0-rc2").unwrap()));
        assert!(!prefix.matches(&Version::parse("5.0.0").unwrap()));
    }

    #[test]
    fn idents_are_equal_only_with_matching_remote_version_and_arch() {
        let a = VersionIdent::Remote {
            remote: "node".to_string(),
            version: Version::new(8, 0, 0),
            arch: Some("x64".to_string()),
        };
        let same = a.clone();
        let other_arch = VersionIdent::Remote {
            remote: "node".to_string(),
            version: Version::new(8, 0, 0),
            arch: Some("x86".to_string()),
        };
        assert_eq!(a, same);
        assert_ne!(a, other_arch);
        assert!(a.same_release(&other_arch));
    }

    #[test]
    fn path_idents_compare_by_path() {
        let a = VersionIdent::Path {
            path: PathBuf::from("/opt/node-custom"),
        };
        let b = VersionIdent::Path {
            path: PathBuf::from("/opt/node-custom"),
        };
        let c = VersionIdent::Path {
            path: PathBuf::from("/opt/other"),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.same_release(&VersionIdent::Remote {
            remote: "node".to_string(),
            version: Version::new(1, 0, 0),
            arch: None,
        }));
    }
}
