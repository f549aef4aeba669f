//! Cargo range matcher
//!
//! Delegates to `semver::VersionReq`, so the accepted syntax is exactly what
//! Cargo accepts in a dependency requirement:
//! - `1.2.3`, `^1.2.3` - caret (>=1.2.3 <2.0.0, narrower for 0.x)
//! - `~1.2.3` - tilde (>=1.2.3 <1.3.0)
//! - `=1.2.3`, `>=1.2.3`, `<2` - comparison operators
//! - `1.2.*`, `1.*`, `*` - wildcards
//! - `>=1.2, <2` - comma-separated AND

use semver::VersionReq;
use tracing::warn;

use crate::version::matcher::{RangeMatcher, RangeSyntax};
use crate::version::semver::max_matching;

pub struct CargoRangeMatcher;

impl RangeMatcher for CargoRangeMatcher {
    fn syntax(&self) -> RangeSyntax {
        RangeSyntax::Cargo
    }

    fn max_satisfying(&self, versions: &[String], range: &str) -> Option<String> {
        let req = match VersionReq::parse(range.trim()) {
            Ok(req) => req,
            Err(e) => {
                warn!("Invalid cargo requirement {}: {}", range, e);
                return None;
            }
        };

        max_matching(versions, |version| req.matches(version))
    }
}
