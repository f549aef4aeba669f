use semver::{BuildMetadata, Version};

/// Parse a registered version string into a semver::Version.
///
/// Candidates must be complete `major.minor.patch` versions; a leading `v`
/// is tolerated. Build metadata is dropped so it never affects ordering.
///
/// Examples:
/// - "1.2.3" -> Version(1, 2, 3)
/// - "v1.2.3" -> Version(1, 2, 3)
/// - "1.2" -> None
pub fn parse_candidate(version: &str) -> Option<Version> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    let mut parsed = Version::parse(version).ok()?;
    parsed.build = BuildMetadata::EMPTY;
    Some(parsed)
}

/// Pick the highest entry of `versions` accepted by `satisfies`.
///
/// Returns the entry as it was registered (not normalized). Entries that do
/// not parse are skipped. Among equal versions the earliest entry is kept.
pub fn max_matching<F>(versions: &[String], satisfies: F) -> Option<String>
where
    F: Fn(&Version) -> bool,
{
    versions
        .iter()
        .filter_map(|v| parse_candidate(v).map(|parsed| (v, parsed)))
        .filter(|(_, parsed)| satisfies(parsed))
        .reduce(|best, current| if current.1 > best.1 { current } else { best })
        .map(|(original, _)| original.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", Some(Version::new(1, 2, 3)))]
    #[case("v1.2.3", Some(Version::new(1, 2, 3)))]
    #[case(" 2.0.0 ", Some(Version::new(2, 0, 0)))]
    #[case("1.2.3+build.5", Some(Version::new(1, 2, 3)))]
    #[case("1.2", None)]
    #[case("invalid", None)]
    fn parse_candidate_returns_expected(#[case] input: &str, #[case] expected: Option<Version>) {
        assert_eq!(parse_candidate(input), expected);
    }

    #[test]
    fn parse_candidate_keeps_prerelease() {
        let parsed = parse_candidate("1.0.0-beta.1").unwrap();
        assert_eq!(parsed.pre.as_str(), "beta.1");
    }

    #[rstest]
    #[case(vec![], None)]
    #[case(vec!["1.0.0", "2.0.0", "1.5.0"], Some("2.0.0"))]
    #[case(vec!["v1.0.0", "2.0.0", "v3.0.0"], Some("v3.0.0"))]
    #[case(vec!["invalid", "1.0.0", "not-semver"], Some("1.0.0"))]
    #[case(vec!["invalid", "not-semver"], None)]
    #[case(vec!["1.0.0+a", "1.0.0+b"], Some("1.0.0+a"))]
    #[case(vec!["v2.0.0", "2.0.0"], Some("v2.0.0"))]
    #[case(vec!["1.0.0", "2.0.0+b", "2.0.0+a"], Some("2.0.0+b"))]
    fn max_matching_picks_highest(#[case] versions: Vec<&str>, #[case] expected: Option<&str>) {
        let versions: Vec<String> = versions.into_iter().map(|s| s.to_string()).collect();
        assert_eq!(
            max_matching(&versions, |_| true),
            expected.map(|s| s.to_string())
        );
    }

    #[test]
    fn max_matching_applies_predicate() {
        let versions: Vec<String> = ["1.0.0", "1.4.0", "2.0.0"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            max_matching(&versions, |v| v.major == 1),
            Some("1.4.0".to_string())
        );
        assert_eq!(max_matching(&versions, |v| v.major == 3), None);
    }
}
