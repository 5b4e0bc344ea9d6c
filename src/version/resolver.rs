//! Specifier-to-version resolution.
//!
//! `find` turns a filter plus a candidate set into at most one concrete
//! version; every higher-level operation (install, use, link, upgrade)
//! goes through it, so a wrong answer here silently switches the
//! developer to the wrong runtime.

use std::collections::HashSet;

use crate::version::ordering;
use crate::version::types::{Label, VersionEntry, VersionFilter, VersionIdent, host_arch};

pub struct VersionResolver {
    host_arch: String,
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionResolver {
    pub fn new() -> Self {
        Self {
            host_arch: host_arch().to_string(),
        }
    }

    /// Resolver with a fixed fallback architecture instead of the host's.
    pub fn with_arch(arch: impl Into<String>) -> Self {
        Self {
            host_arch: arch.into(),
        }
    }

    /// Select the single best match for a filter, or None. No match is a
    /// valid outcome, not an error; callers decide whether it's fatal.
    pub fn find(
        &self,
        filter: &VersionFilter,
        candidates: &[VersionEntry],
    ) -> Option<VersionEntry> {
        let mut matches = self.narrow(filter, candidates);

        // When one logical version survives with several architectures,
        // picking "first" would choose one arbitrarily; narrow to the
        // requested (or host) architecture instead.
        let archs: HashSet<&str> = matches.iter().filter_map(|c| c.ident.arch()).collect();
        if archs.len() > 1 {
            let wanted = filter.arch.as_deref().unwrap_or(&self.host_arch);
            matches.retain(|c| c.ident.arch() == Some(wanted));
        }

        let winner = matches.first()?;
        let mut resolved = (*winner).clone();
        if let VersionIdent::Remote { arch, .. } = &mut resolved.ident
            && arch.is_none()
        {
            // Catalog entries carry no arch of their own; fill in the
            // requested or host default.
            *arch = Some(
                filter
                    .arch
                    .clone()
                    .unwrap_or_else(|| self.host_arch.clone()),
            );
        }
        Some(resolved)
    }

    /// All matches for a filter, sorted most-recent-first. Unlike `find`
    /// this keeps every architecture, so listings show the full picture.
    pub fn list(&self, filter: &VersionFilter, candidates: &[VersionEntry]) -> Vec<VersionEntry> {
        self.narrow(filter, candidates)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Structural match plus special-label narrowing, sorted
    /// most-recent-first.
    fn narrow<'a>(
        &self,
        filter: &VersionFilter,
        candidates: &'a [VersionEntry],
    ) -> Vec<&'a VersionEntry> {
        let mut matches: Vec<&VersionEntry> = candidates
            .iter()
            .filter(|c| structural_match(filter, c))
            .collect();
        matches.sort_by(|a, b| ordering::compare(&b.ident, &a.ident));

        match filter.label {
            Some(Label::Latest) => {
                matches.retain(|c| c.ident.path().is_none());
            }
            Some(Label::Lts) => {
                // Upstream release metadata marks LTS channel releases
                // with a codename label.
                matches.retain(|c| {
                    c.ident.path().is_none() && c.label.as_deref().is_some_and(|l| !l.is_empty())
                });
            }
            Some(Label::Current) => matches.retain(|c| c.current),
            Some(Label::Default) => matches.retain(|c| c.default),
            Some(Label::Named(_)) | None => {}
        }
        matches
    }
}

/// A candidate matches when every present filter field agrees with it.
/// Absent fields impose no constraint; a named label matches the entry's
/// label case-insensitively; an arch constraint only binds candidates
/// that declare an arch of their own.
fn structural_match(filter: &VersionFilter, candidate: &VersionEntry) -> bool {
    if let Some(remote) = &filter.remote_name
        && candidate.ident.remote() != Some(remote.as_str())
    {
        return false;
    }
    if let Some(prefix) = &filter.prefix {
        match candidate.ident.version() {
            Some(version) if prefix.matches(version) => {}
            _ => return false,
        }
    }
    if let Some(Label::Named(name)) = &filter.label
        && !candidate
            .label
            .as_deref()
            .is_some_and(|label| label.eq_ignore_ascii_case(name))
    {
        return false;
    }
    if let (Some(wanted), Some(have)) = (filter.arch.as_deref(), candidate.ident.arch())
        && wanted != have
    {
        return false;
    }
    true
}
