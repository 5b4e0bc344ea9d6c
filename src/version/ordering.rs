//! Total ordering over version identities.
//!
//! The comparator is ascending; listings and resolution want
//! most-recent-first and reverse it at the call site.

use std::cmp::Ordering;

use crate::version::types::VersionIdent;

/// Strict total order: remote name, then semantic version (numeric per
/// component, prerelease before its release), then architecture.
/// Path-based aliases are their own namespace keyed by path and sort
/// after every remote-managed version, never interleaved numerically.
pub fn compare(a: &VersionIdent, b: &VersionIdent) -> Ordering {
    match (a, b) {
        (
            VersionIdent::Remote {
                remote: ra,
                version: va,
                arch: aa,
            },
            VersionIdent::Remote {
                remote: rb,
                version: vb,
                arch: ab,
            },
        ) => ra
            .cmp(rb)
            .then_with(|| va.cmp(vb))
            .then_with(|| aa.cmp(ab)),
        (VersionIdent::Remote { .. }, VersionIdent::Path { .. }) => Ordering::Less,
        (VersionIdent::Path { .. }, VersionIdent::Remote { .. }) => Ordering::Greater,
        (VersionIdent::Path { path: pa }, VersionIdent::Path { path: pb }) => pa.cmp(pb),
    }
}

impl Ord for VersionIdent {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl PartialOrd for VersionIdent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rstest::rstest;
    use semver::Version;

    use super::*;

    fn remote(remote: &str, version: &str, arch: Option<&str>) -> VersionIdent {
        VersionIdent::Remote {
            remote: remote.to_string(),
            version: Version::parse(version).unwrap(),
            arch: arch.map(str::to_string),
        }
    }

    fn path(p: &str) -> VersionIdent {
        VersionIdent::Path {
            path: PathBuf::from(p),
        }
    }

    #[test]
    fn numeric_components_never_compare_lexicographically() {
        let nine = remote("node", "9.0.0", None);
        let ten = remote("node", "10.0.0", None);
        assert_eq!(compare(&nine, &ten), Ordering::Less);
    }

    #[test]
    fn prerelease_sorts_before_its_release() {
        let rc = remote("node", "5.0.0-rc1", None);
        let release = remote("node", "5.0.0", None);
        assert_eq!(compare(&rc, &release), Ordering::Less);
    }

    #[test]
    fn remote_name_orders_before_version() {
        let a = remote("alt", "99.0.0", None);
        let b = remote("node", "1.0.0", None);
        assert_eq!(compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn missing_arch_sorts_before_present() {
        let bare = remote("node", "8.0.0", None);
        let x64 = remote("node", "8.0.0", Some("x64"));
        assert_eq!(compare(&bare, &x64), Ordering::Less);
    }

    #[test]
    fn path_idents_sort_after_remote_idents() {
        let alias = path("/opt/custom");
        let newest = remote("zzz", "999.0.0", Some("x64"));
        assert_eq!(compare(&newest, &alias), Ordering::Less);
        assert_eq!(compare(&alias, &newest), Ordering::Greater);
    }

    #[rstest]
    #[case(remote("node", "9.0.0", None), remote("node", "10.0.0", None))]
    #[case(remote("node", "5.0.0-rc1", None), remote("node", "5.0.0", None))]
    #[case(remote("a", "2.0.0", None), remote("b", "1.0.0", None))]
    #[case(remote("node", "1.0.0", Some("x64")), path("/opt/custom"))]
    #[case(path("/a"), path("/b"))]
    fn comparator_is_antisymmetric(#[case] a: VersionIdent, #[case] b: VersionIdent) {
        assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn comparator_is_transitive_across_namespaces() {
        let idents = [
            remote("alt", "1.0.0", None),
            remote("node", "5.0.0-rc1", None),
            remote("node", "5.0.0", None),
            remote("node", "5.0.0", Some("x64")),
            remote("node", "10.0.0", Some("x86")),
            path("/opt/a"),
            path("/opt/b"),
        ];
        for a in &idents {
            for b in &idents {
                for c in &idents {
                    if compare(a, b) != Ordering::Greater && compare(b, c) != Ordering::Greater {
                        assert_ne!(
                            compare(a, c),
                            Ordering::Greater,
                            "transitivity violated for {a}, {b}, {c}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn sorting_a_catalog_is_deterministic() {
        let mut versions = vec![
            remote("node", "10.0.0", None),
            remote("node", "9.0.0", None),
            remote("node", "9.11.2", None),
            remote("node", "9.2.0", None),
        ];
        versions.sort();
        let ordered: Vec<String> = versions.iter().map(ToString::to_string).collect();
        assert_eq!(
            ordered,
            vec!["node/9.0.0", "node/9.2.0", "node/9.11.2", "node/10.0.0"]
        );
    }
}
