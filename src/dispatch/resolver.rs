//! Two-tier version resolution.
//!
//! # Responsibilities
//! - Exact tier: return the handler whose version equals the request's
//! - Range tier: return the greatest handler version not above the request's
//! - Explicit `NotFound` when neither tier applies
//!
//! # Design Decisions
//! - Exact matches win over any range match
//! - An ambiguous comparison against a candidate excludes that candidate only
//! - Among qualifying candidates, those no comparable candidate beats are
//!   ranked by a fixed key, so the result never depends on map order
//! - Pure read over the registry

use std::cmp::{Ordering, Reverse};

use axum::http::Method;

use crate::dispatch::error::DispatchError;
use crate::dispatch::registry::{MethodTable, Registry, Tier};
use crate::version::{Platform, PlatformVersion, Version};

/// A successful resolution.
#[derive(Debug)]
pub struct Resolved<'a, H> {
    pub handler: &'a H,
    /// Version the handler was registered under.
    pub version: &'a Version,
    pub tier: Tier,
}

impl<'a, H> Clone for Resolved<'a, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, H> Copy for Resolved<'a, H> {}

impl<H> Registry<H> {
    /// Select the handler for `method` at `request`.
    pub fn resolve(
        &self,
        method: &Method,
        request: &Version,
    ) -> Result<Resolved<'_, H>, DispatchError> {
        let found = self
            .table(method)
            .and_then(|table| exact_match(table, request).or_else(|| range_match(table, request)));

        match found {
            Some(resolved) => {
                tracing::debug!(
                    method = %method,
                    request = %request,
                    handler = %resolved.version,
                    tier = %resolved.tier,
                    "Resolved versioned handler"
                );
                Ok(resolved)
            }
            None => {
                tracing::debug!(method = %method, request = %request, "No versioned handler applies");
                Err(DispatchError::NotFound {
                    method: method.clone(),
                    version: request.clone(),
                })
            }
        }
    }
}

/// Resolve and return only the handler.
pub fn resolve<'a, H>(
    method: &Method,
    request: &Version,
    registry: &'a Registry<H>,
) -> Result<&'a H, DispatchError> {
    registry.resolve(method, request).map(|r| r.handler)
}

fn exact_match<'a, H>(table: &'a MethodTable<H>, request: &Version) -> Option<Resolved<'a, H>> {
    let exact = table.tier(Tier::Exact);

    // Structural hit first; otherwise the narrowest semantically equal key.
    let (version, handler) = exact.get_key_value(request).or_else(|| {
        exact
            .iter()
            .filter(|(version, _)| request.matches(version))
            .min_by(|(a, _), (b, _)| narrowness(a).cmp(&narrowness(b)).then_with(|| by_label(a, b)))
    })?;

    Some(Resolved {
        handler,
        version,
        tier: Tier::Exact,
    })
}

fn range_match<'a, H>(table: &'a MethodTable<H>, request: &Version) -> Option<Resolved<'a, H>> {
    let candidates: Vec<(&'a Version, &'a H)> = table
        .tier(Tier::Range)
        .iter()
        .filter(|(version, _)| match request.order(version) {
            Some(ord) => ord != Ordering::Less,
            None => {
                tracing::trace!(request = %request, candidate = %version, "Skipping incomparable handler");
                false
            }
        })
        .collect();

    // Keep candidates no comparable candidate beats. The comparison is not
    // transitive across axes, so if every candidate is beaten, keep them all.
    let unbeaten: Vec<(&'a Version, &'a H)> = candidates
        .iter()
        .copied()
        .filter(|(version, _)| {
            !candidates
                .iter()
                .any(|(other, _)| other.order(version) == Some(Ordering::Greater))
        })
        .collect();
    let pool = if unbeaten.is_empty() { &candidates } else { &unbeaten };

    let (version, handler) = pool
        .iter()
        .copied()
        .max_by(|(a, _), (b, _)| rank(request, a, b))?;

    Some(Resolved {
        handler,
        version,
        tier: Tier::Range,
    })
}

/// Total order over range candidates: the axis each matched the request on
/// (earlier priority ranks higher), then the value on that axis, then label.
fn rank(request: &Version, a: &Version, b: &Version) -> Ordering {
    rank_key(request, a)
        .cmp(&rank_key(request, b))
        .then_with(|| by_label(a, b))
}

fn rank_key<'v>(
    request: &Version,
    candidate: &'v Version,
) -> Option<(Reverse<Platform>, Option<&'v PlatformVersion>)> {
    let (req, app) = (request.as_app()?, candidate.as_app()?);
    let axis = req.deciding_axis(app)?;
    Some((Reverse(axis), app.get(axis)))
}

fn narrowness(version: &Version) -> usize {
    version.as_app().map_or(0, |app| app.platforms().count())
}

fn by_label(a: &Version, b: &Version) -> Ordering {
    a.to_string().cmp(&b.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::AppVersion;
    use std::collections::HashSet;

    fn pv(s: &str) -> PlatformVersion {
        PlatformVersion::parse(s).unwrap()
    }

    fn all(s: &str) -> Version {
        AppVersion::all(pv(s)).into()
    }

    fn ios(s: &str) -> Version {
        AppVersion::only(Platform::Ios, pv(s)).into()
    }

    fn android(s: &str) -> Version {
        AppVersion::only(Platform::Android, pv(s)).into()
    }

    fn sample() -> Registry<&'static str> {
        let mut builder = Registry::builder();
        builder
            .register(Method::GET, all("1.0"), Tier::Range, "H1")
            .unwrap()
            .register(Method::GET, all("1.1"), Tier::Exact, "H2")
            .unwrap()
            .register(Method::GET, all("1.4"), Tier::Range, "H3")
            .unwrap()
            .register(Method::GET, all("3.0"), Tier::Range, "H4")
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_worked_example() {
        let registry = sample();
        let cases = [
            ("1.0", Some("H1")),
            ("1.1", Some("H2")),
            ("1.2", Some("H1")),
            ("1.4", Some("H3")),
            ("2.0", Some("H3")),
            ("4.0", Some("H4")),
            ("0.5", None),
        ];

        for (request, expected) in cases {
            for version in [ios(request), android(request), all(request)] {
                let got = resolve(&Method::GET, &version, &registry).ok().copied();
                assert_eq!(got, expected, "request {version}");
            }
        }
    }

    #[test]
    fn test_resolved_reports_tier() {
        let registry = sample();
        let hit = registry.resolve(&Method::GET, &ios("1.1")).unwrap();
        assert_eq!(hit.tier, Tier::Exact);
        assert_eq!(hit.version, &all("1.1"));

        let hit = registry.resolve(&Method::GET, &ios("1.1.5")).unwrap();
        assert_eq!(hit.tier, Tier::Range);
        assert_eq!(*hit.handler, "H1");
    }

    #[test]
    fn test_exact_beats_newer_range() {
        let mut builder = Registry::builder();
        builder
            .register(Method::GET, ios("1.0"), Tier::Range, "range-old")
            .unwrap()
            .register(Method::GET, ios("2.0"), Tier::Range, "range-new")
            .unwrap()
            .register(Method::GET, ios("5.0"), Tier::Exact, "exact")
            .unwrap();
        let registry = builder.build();

        assert_eq!(resolve(&Method::GET, &ios("5.0"), &registry), Ok(&"exact"));
        assert_eq!(resolve(&Method::GET, &ios("5.1"), &registry), Ok(&"range-new"));
    }

    #[test]
    fn test_unknown_method_is_not_found() {
        let registry = sample();
        let err = resolve(&Method::DELETE, &ios("2.0"), &registry).unwrap_err();
        assert_eq!(
            err,
            DispatchError::NotFound {
                method: Method::DELETE,
                version: ios("2.0"),
            }
        );
    }

    #[test]
    fn test_absent_request_hits_floor_only() {
        let mut builder = Registry::builder();
        builder
            .register(Method::GET, Version::Absent, Tier::Range, "floor")
            .unwrap()
            .register(Method::GET, ios("1.0"), Tier::Range, "v1")
            .unwrap();
        let registry = builder.build();

        assert_eq!(resolve(&Method::GET, &Version::Absent, &registry), Ok(&"floor"));
        assert_eq!(resolve(&Method::GET, &ios("0.1"), &registry), Ok(&"floor"));
        assert_eq!(resolve(&Method::GET, &ios("1.3"), &registry), Ok(&"v1"));
        // No usable axis for Android: only the floor qualifies.
        assert_eq!(resolve(&Method::GET, &android("9"), &registry), Ok(&"floor"));

        assert!(resolve(&Method::GET, &Version::Absent, &sample()).is_err());
    }

    #[test]
    fn test_absent_exact_matches_only_absent() {
        let mut builder = Registry::builder();
        builder
            .register(Method::POST, Version::Absent, Tier::Exact, "unversioned")
            .unwrap();
        let registry = builder.build();

        assert_eq!(resolve(&Method::POST, &Version::Absent, &registry), Ok(&"unversioned"));
        assert!(resolve(&Method::POST, &ios("1.0"), &registry).is_err());
    }

    #[test]
    fn test_incomparable_candidate_is_skipped() {
        let mut builder = Registry::builder();
        builder
            .register(Method::GET, ios("1.0"), Tier::Range, "ios")
            .unwrap()
            .register(Method::GET, android("0.1"), Tier::Range, "android")
            .unwrap();
        let registry = builder.build();

        assert_eq!(resolve(&Method::GET, &ios("1.2"), &registry), Ok(&"ios"));
        assert_eq!(resolve(&Method::GET, &android("0.2"), &registry), Ok(&"android"));

        let web: Version = AppVersion::only(Platform::Web, pv("5.0")).into();
        assert!(resolve(&Method::GET, &web, &registry).is_err());
    }

    #[test]
    fn test_multi_platform_request_breaks_ties_by_axis() {
        let mut builder = Registry::builder();
        builder
            .register(Method::GET, ios("1.0"), Tier::Range, "ios-1.0")
            .unwrap()
            .register(Method::GET, ios("2.0"), Tier::Range, "ios-2.0")
            .unwrap()
            .register(Method::GET, android("3.0"), Tier::Range, "android-3.0")
            .unwrap();
        let registry = builder.build();

        let request: Version =
            AppVersion::new(Some(pv("2.5")), Some(pv("4.0")), None).unwrap().into();
        // ios and android candidates cannot be ordered; the iOS axis ranks first.
        assert_eq!(resolve(&Method::GET, &request, &registry), Ok(&"ios-2.0"));
    }

    fn bundle(ios: &str, android: &str) -> Version {
        AppVersion::new(Some(pv(ios)), Some(pv(android)), None).unwrap().into()
    }

    /// Resolve `request` against fresh registries holding `entries`, rotating
    /// the insertion order, and collect every distinct answer.
    fn answers(entries: &[(Version, &'static str)], request: &Version) -> HashSet<&'static str> {
        let mut seen = HashSet::new();
        for round in 0..64 {
            let mut builder = Registry::builder();
            for i in 0..entries.len() {
                let (version, name) = &entries[(i + round) % entries.len()];
                builder
                    .register(Method::GET, version.clone(), Tier::Range, *name)
                    .unwrap();
            }
            let registry = builder.build();
            seen.insert(*resolve(&Method::GET, request, &registry).unwrap());
        }
        seen
    }

    #[test]
    fn test_cross_axis_candidates_resolve_the_same_in_every_registry() {
        // ios-2 and android-3 cannot be ordered; android-3 beats the bundle,
        // which beats ios-2. Only android-3 is unbeaten.
        let entries = [
            (ios("2"), "ios-2"),
            (android("3"), "android-3"),
            (bundle("3", "1"), "bundle-3-1"),
        ];
        let seen = answers(&entries, &bundle("5", "5"));
        assert_eq!(seen, HashSet::from(["android-3"]));
    }

    #[test]
    fn test_fully_cyclic_candidates_fall_back_to_fixed_rank() {
        // ios-2 > bundle-1-9 > android-5 > bundle-3-4 > ios-2: every candidate
        // is beaten, so the iOS axis and its value decide.
        let entries = [
            (ios("2"), "ios-2"),
            (bundle("1", "9"), "bundle-1-9"),
            (android("5"), "android-5"),
            (bundle("3", "4"), "bundle-3-4"),
        ];
        let seen = answers(&entries, &bundle("5", "10"));
        assert_eq!(seen, HashSet::from(["bundle-3-4"]));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let registry = sample();
        let request = ios("2.2");
        let first = resolve(&Method::GET, &request, &registry);
        for _ in 0..16 {
            assert_eq!(resolve(&Method::GET, &request, &registry), first);
        }
    }
}
