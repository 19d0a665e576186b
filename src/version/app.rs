//! App versions across the iOS, Android and Web axes.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::error::{VersionError, VersionResult};
use crate::version::platform::PlatformVersion;

/// A platform axis an app version can carry.
///
/// Declaration order is priority order: `Ios < Android < Web`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
}

impl Platform {
    /// Fixed priority used to pick the first shared axis.
    pub const PRIORITY: [Platform; 3] = [Platform::Ios, Platform::Android, Platform::Web];

    /// Lowercase name, as used in config keys and headers.
    pub fn name(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Web => "web",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Platform::Ios => "IOS",
            Platform::Android => "Android",
            Platform::Web => "WEB",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A request or handler version with up to one value per platform.
///
/// Equality and hashing are structural so the type can key a map; ordering
/// is partial and goes through [`AppVersion::compare`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAppVersion")]
pub struct AppVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    ios: Option<PlatformVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    android: Option<PlatformVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web: Option<PlatformVersion>,
}

#[derive(Deserialize)]
struct RawAppVersion {
    ios: Option<PlatformVersion>,
    android: Option<PlatformVersion>,
    web: Option<PlatformVersion>,
}

impl TryFrom<RawAppVersion> for AppVersion {
    type Error = VersionError;

    fn try_from(raw: RawAppVersion) -> Result<Self, Self::Error> {
        AppVersion::new(raw.ios, raw.android, raw.web)
    }
}

impl AppVersion {
    /// Build a version. At least one platform must be set.
    pub fn new(
        ios: Option<PlatformVersion>,
        android: Option<PlatformVersion>,
        web: Option<PlatformVersion>,
    ) -> VersionResult<Self> {
        if ios.is_none() && android.is_none() && web.is_none() {
            return Err(VersionError::Invalid);
        }
        Ok(Self { ios, android, web })
    }

    /// The same version on every platform.
    pub fn all(version: PlatformVersion) -> Self {
        Self {
            ios: Some(version.clone()),
            android: Some(version.clone()),
            web: Some(version),
        }
    }

    /// A version set on a single platform.
    pub fn only(platform: Platform, version: PlatformVersion) -> Self {
        let mut app = Self {
            ios: None,
            android: None,
            web: None,
        };
        *app.slot_mut(platform) = Some(version);
        app
    }

    pub fn ios(&self) -> Option<&PlatformVersion> {
        self.ios.as_ref()
    }

    pub fn android(&self) -> Option<&PlatformVersion> {
        self.android.as_ref()
    }

    pub fn web(&self) -> Option<&PlatformVersion> {
        self.web.as_ref()
    }

    /// Value on the given axis, if present.
    pub fn get(&self, platform: Platform) -> Option<&PlatformVersion> {
        match platform {
            Platform::Ios => self.ios.as_ref(),
            Platform::Android => self.android.as_ref(),
            Platform::Web => self.web.as_ref(),
        }
    }

    fn slot_mut(&mut self, platform: Platform) -> &mut Option<PlatformVersion> {
        match platform {
            Platform::Ios => &mut self.ios,
            Platform::Android => &mut self.android,
            Platform::Web => &mut self.web,
        }
    }

    /// Present axes in priority order.
    pub fn platforms(&self) -> impl Iterator<Item = (Platform, &PlatformVersion)> + '_ {
        Platform::PRIORITY
            .into_iter()
            .filter_map(move |p| self.get(p).map(|v| (p, v)))
    }

    /// True when exactly one platform is set.
    pub fn is_specific(&self) -> bool {
        self.platforms().count() == 1
    }

    /// First axis, in priority order, present on both sides.
    pub fn deciding_axis(&self, other: &AppVersion) -> Option<Platform> {
        Platform::PRIORITY
            .into_iter()
            .find(|p| self.get(*p).is_some() && other.get(*p).is_some())
    }

    /// Order two app versions.
    ///
    /// With a specific side the first shared axis decides. Two multi-platform
    /// versions order only when every shared axis agrees.
    pub fn compare(&self, other: &AppVersion) -> VersionResult<Ordering> {
        self.order(other).ok_or_else(|| self.ambiguous(other))
    }

    /// [`AppVersion::compare`] without building an error.
    pub fn order(&self, other: &AppVersion) -> Option<Ordering> {
        let narrow = self.is_specific() || other.is_specific();
        let mut decided: Option<Ordering> = None;

        for platform in Platform::PRIORITY {
            let (Some(a), Some(b)) = (self.get(platform), other.get(platform)) else {
                continue;
            };
            let ord = a.cmp(b);
            if narrow {
                return Some(ord);
            }
            match decided {
                None => decided = Some(ord),
                Some(prev) if prev != ord => return None,
                Some(_) => {}
            }
        }

        decided
    }

    fn ambiguous(&self, other: &AppVersion) -> VersionError {
        VersionError::Ambiguous {
            left: self.to_string(),
            right: other.to_string(),
        }
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<AppVersion: ")?;
        for (platform, version) in self.platforms() {
            write!(f, "({}:{})", platform.label(), version)?;
        }
        f.write_str(">")
    }
}

/// A version that may be absent.
///
/// `Absent` is the floor: below every app version, equal only to itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Version {
    #[default]
    Absent,
    Present(AppVersion),
}

impl Version {
    /// Build from optional per-platform strings. `all` fills any platform not
    /// given explicitly; nothing at all yields [`Version::Absent`].
    pub fn parse_parts(
        all: Option<&str>,
        ios: Option<&str>,
        android: Option<&str>,
        web: Option<&str>,
    ) -> VersionResult<Self> {
        let pick = |specific: Option<&str>| -> VersionResult<Option<PlatformVersion>> {
            specific.or(all).map(PlatformVersion::parse).transpose()
        };

        let (ios, android, web) = (pick(ios)?, pick(android)?, pick(web)?);
        if ios.is_none() && android.is_none() && web.is_none() {
            return Ok(Version::Absent);
        }
        AppVersion::new(ios, android, web).map(Version::Present)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Version::Absent)
    }

    pub fn as_app(&self) -> Option<&AppVersion> {
        match self {
            Version::Absent => None,
            Version::Present(app) => Some(app),
        }
    }

    /// Three-way comparison; fails only for two unorderable app versions.
    pub fn compare(&self, other: &Version) -> VersionResult<Ordering> {
        match (self, other) {
            (Version::Absent, Version::Absent) => Ok(Ordering::Equal),
            (Version::Absent, Version::Present(_)) => Ok(Ordering::Less),
            (Version::Present(_), Version::Absent) => Ok(Ordering::Greater),
            (Version::Present(a), Version::Present(b)) => a.compare(b),
        }
    }

    /// Like [`Version::compare`], `None` when unorderable.
    pub fn order(&self, other: &Version) -> Option<Ordering> {
        match (self, other) {
            (Version::Present(a), Version::Present(b)) => a.order(b),
            _ => self.compare(other).ok(),
        }
    }

    /// Semantic equality. An ambiguous comparison is not a match.
    pub fn matches(&self, other: &Version) -> bool {
        self.order(other) == Some(Ordering::Equal)
    }
}

impl From<AppVersion> for Version {
    fn from(app: AppVersion) -> Self {
        Version::Present(app)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Absent => f.write_str("<NoAppVersion>"),
            Version::Present(app) => fmt::Display::fmt(app, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pv(s: &str) -> PlatformVersion {
        PlatformVersion::parse(s).unwrap()
    }

    fn ios(s: &str) -> AppVersion {
        AppVersion::only(Platform::Ios, pv(s))
    }

    fn android(s: &str) -> AppVersion {
        AppVersion::only(Platform::Android, pv(s))
    }

    fn web(s: &str) -> AppVersion {
        AppVersion::only(Platform::Web, pv(s))
    }

    #[test]
    fn test_requires_a_platform() {
        assert_eq!(AppVersion::new(None, None, None), Err(VersionError::Invalid));
        assert!(AppVersion::new(None, Some(pv("1")), None).is_ok());
    }

    #[test]
    fn test_priority_follows_declaration_order() {
        assert!(Platform::PRIORITY.windows(2).all(|w| w[0] < w[1]));
        assert!(Platform::Ios < Platform::Web);
    }

    #[test]
    fn test_order_agrees_with_compare() {
        let bundle = AppVersion::new(Some(pv("2.0")), Some(pv("0.5")), None).unwrap();
        assert_eq!(ios("1.0").order(&bundle), Some(Ordering::Less));
        assert_eq!(AppVersion::all(pv("1.0")).order(&bundle), None);
        assert_eq!(Version::Absent.order(&Version::from(web("1"))), Some(Ordering::Less));
    }

    #[test]
    fn test_is_specific() {
        assert!(ios("1.0").is_specific());
        assert!(!AppVersion::all(pv("1.0")).is_specific());
        let two = AppVersion::new(Some(pv("1")), Some(pv("2")), None).unwrap();
        assert!(!two.is_specific());
    }

    #[test]
    fn test_specific_against_bundle_uses_first_shared_axis() {
        let bundle = AppVersion::new(None, Some(pv("2.0")), Some(pv("9.0"))).unwrap();
        assert_eq!(android("1.5").compare(&bundle), Ok(Ordering::Less));
        assert_eq!(bundle.compare(&web("9.0")), Ok(Ordering::Equal));
        assert_eq!(web("10").compare(&bundle), Ok(Ordering::Greater));
    }

    #[test]
    fn test_priority_order_picks_ios_first() {
        let request = AppVersion::new(Some(pv("1.0")), None, None).unwrap();
        let handler = AppVersion::new(Some(pv("2.0")), Some(pv("0.1")), None).unwrap();
        assert_eq!(request.compare(&handler), Ok(Ordering::Less));
        assert_eq!(request.deciding_axis(&handler), Some(Platform::Ios));
    }

    #[test]
    fn test_no_shared_axis_is_ambiguous() {
        assert!(matches!(
            ios("1.4.2").compare(&android("2.0")),
            Err(VersionError::Ambiguous { .. })
        ));
        assert!(matches!(
            android("1").compare(&web("1")),
            Err(VersionError::Ambiguous { .. })
        ));
    }

    #[test]
    fn test_bundles_order_only_when_shared_axes_agree() {
        let low = AppVersion::all(pv("1.0"));
        let high = AppVersion::all(pv("1.4"));
        assert_eq!(low.compare(&high), Ok(Ordering::Less));
        assert_eq!(low.compare(&low), Ok(Ordering::Equal));

        let crossed = AppVersion::new(Some(pv("2.0")), Some(pv("0.5")), None).unwrap();
        assert!(matches!(
            low.compare(&crossed),
            Err(VersionError::Ambiguous { .. })
        ));
    }

    #[test]
    fn test_absent_is_the_floor() {
        let absent = Version::Absent;
        let some = Version::from(ios("0.0.1"));
        assert_eq!(absent.compare(&some), Ok(Ordering::Less));
        assert_eq!(some.compare(&absent), Ok(Ordering::Greater));
        assert_eq!(absent.compare(&Version::Absent), Ok(Ordering::Equal));
        assert!(absent.matches(&Version::Absent));
        assert!(!absent.matches(&some));
        assert!(absent.is_absent());
    }

    #[test]
    fn test_matches_is_reflexive_and_never_fails() {
        let values = [
            Version::from(ios("1.0")),
            Version::from(AppVersion::all(pv("3.2.1"))),
            Version::from(AppVersion::new(Some(pv("1")), None, Some(pv("7"))).unwrap()),
            Version::Absent,
        ];
        for value in &values {
            assert!(value.matches(value), "{value} should equal itself");
        }
        assert!(!Version::from(ios("1")).matches(&Version::from(android("1"))));
    }

    #[test]
    fn test_display_lists_present_platforms() {
        let app = AppVersion::new(Some(pv("1.4.2")), Some(pv("2.0")), None).unwrap();
        assert_eq!(app.to_string(), "<AppVersion: (IOS:1.4.2)(Android:2.0)>");
        assert_eq!(ios("1.4.2").to_string(), "<AppVersion: (IOS:1.4.2)>");
        assert_eq!(Version::Absent.to_string(), "<NoAppVersion>");
    }

    #[test]
    fn test_parse_parts() {
        assert_eq!(Version::parse_parts(None, None, None, None), Ok(Version::Absent));

        let all = Version::parse_parts(Some("1.0"), None, Some("2.0"), None).unwrap();
        let app = all.as_app().unwrap();
        assert_eq!(app.ios(), Some(&pv("1.0")));
        assert_eq!(app.android(), Some(&pv("2.0")));
        assert_eq!(app.web(), Some(&pv("1.0")));

        assert!(matches!(
            Version::parse_parts(None, Some("1.a"), None, None),
            Err(VersionError::Malformed(_))
        ));
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        let parsed: AppVersion = serde_json::from_str(r#"{"ios":"1.2"}"#).unwrap();
        assert_eq!(parsed, ios("1.2"));
        assert!(serde_json::from_str::<AppVersion>("{}").is_err());
    }
}
