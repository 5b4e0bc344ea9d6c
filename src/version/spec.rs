//! Version specifier parsing.
//!
//! Grammar: `[remote/] (semver | latest | lts | current | default | alias) [/arch]`
//! where `semver` is one to three dot-separated integer groups, an optional
//! leading `v`, and an optional free-form `-suffix`. The special labels are
//! case-insensitive. Single-group versions are accepted so prefix filters
//! like `node/5` work.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{DEFAULT_REMOTE_KEY, Settings};
use crate::version::error::SpecError;
use crate::version::types::{Label, VersionFilter, VersionPrefix, host_os, normalize_arch};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([0-9A-Za-z][0-9A-Za-z.\-]*))?$")
        .expect("version pattern is valid")
});

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][0-9A-Za-z_\-]*$").expect("name pattern is valid"));

/// Parses specifier strings against an injected remote map; the map is a
/// configuration collaborator, never reached for ambiently.
pub struct SpecParser<'a> {
    settings: &'a Settings,
}

enum Body {
    Version(VersionPrefix),
    Label(Label),
}

impl<'a> SpecParser<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Parse a specifier into a filter. With `require_full`, a specifier
    /// that leaves the remote or architecture undetermined is an error.
    pub fn parse(&self, spec: &str, require_full: bool) -> Result<VersionFilter, SpecError> {
        let spec = spec.trim();
        let segments: Vec<&str> = spec.split('/').collect();
        if spec.is_empty() || segments.len() > 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(SpecError::InvalidFormat(spec.to_string()));
        }

        // Two segments are ambiguous between remote/body and body/arch;
        // an arch-token second segment wins only when the first segment
        // stands alone as a version or special label.
        let (remote_seg, body_seg, arch_seg) = match segments.as_slice() {
            [body] => (None, *body, None),
            [a, b] if is_arch_token(b) && stands_alone(a) => (None, *a, Some(*b)),
            [a, b] => (Some(*a), *b, None),
            [remote, body, arch] => (Some(*remote), *body, Some(*arch)),
            _ => return Err(SpecError::InvalidFormat(spec.to_string())),
        };

        if let Some(remote) = remote_seg
            && !NAME_RE.is_match(remote)
        {
            return Err(SpecError::InvalidFormat(spec.to_string()));
        }

        let body = parse_body(body_seg).ok_or_else(|| SpecError::InvalidFormat(spec.to_string()))?;
        let (prefix, label) = match body {
            Body::Version(prefix) => (Some(prefix), None),
            Body::Label(label) => (None, Some(label)),
        };

        let remote_name = match remote_seg {
            Some(remote) => {
                if !self.settings.known_remote(remote) {
                    return Err(SpecError::UnknownRemote(remote.to_string()));
                }
                Some(remote.to_string())
            }
            // A bare alias name matches path-based entries, which live
            // outside any remote; everything else defaults to the
            // configured default remote.
            None if matches!(label, Some(Label::Named(_))) => None,
            None => Some(
                self.settings
                    .default_remote()
                    .ok_or_else(|| SpecError::UnknownRemote(DEFAULT_REMOTE_KEY.to_string()))?
                    .to_string(),
            ),
        };

        let arch = arch_seg.map(normalize_arch);

        if require_full {
            if remote_name.is_none() {
                return Err(SpecError::MissingRemote(spec.to_string()));
            }
            if arch.is_none() {
                return Err(SpecError::MissingArch(spec.to_string()));
            }
        }

        Ok(VersionFilter {
            remote_name,
            prefix,
            label,
            arch,
            os: host_os().to_string(),
        })
    }
}

/// Whether a token can be the body of a specifier with no remote prefix,
/// for disambiguating `lts/x64` (body/arch) from `test1/5` (remote/body).
fn stands_alone(token: &str) -> bool {
    matches!(
        parse_body(token),
        Some(Body::Version(_))
            | Some(Body::Label(Label::Latest | Label::Lts | Label::Current | Label::Default))
    )
}

fn is_arch_token(token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    matches!(
        token.as_str(),
        "x86" | "32" | "ia32" | "x64" | "64" | "amd64"
    ) || token.starts_with("arm")
        || token.starts_with("ppc")
        || token.starts_with("s390")
}

fn parse_body(token: &str) -> Option<Body> {
    if let Some(caps) = VERSION_RE.captures(token) {
        let major = caps[1].parse().ok()?;
        let minor = caps.get(2).map(|m| m.as_str().parse()).transpose().ok()?;
        let patch = caps.get(3).map(|m| m.as_str().parse()).transpose().ok()?;
        let prerelease = caps.get(4).map(|m| m.as_str().to_string());
        return Some(Body::Version(VersionPrefix {
            major,
            minor,
            patch,
            prerelease,
        }));
    }
    let label = match token.to_ascii_lowercase().as_str() {
        "latest" => Label::Latest,
        "lts" => Label::Lts,
        "current" => Label::Current,
        "default" => Label::Default,
        _ if NAME_RE.is_match(token) => Label::Named(token.to_string()),
        _ => return None,
    };
    Some(Body::Label(label))
}
