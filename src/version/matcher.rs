//! Range satisfaction abstraction for different version dialects

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;

use crate::version::matchers::{CargoRangeMatcher, NpmRangeMatcher};

/// Dialect a range expression is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RangeSyntax {
    /// npm ranges (`^1.0.0`, `1.x || >=3.0.0`, `1.0.0 - 2.0.0`)
    #[default]
    Npm,
    /// Cargo requirements (`^1.0`, `>=1.2, <2`)
    Cargo,
}

impl RangeSyntax {
    /// Returns the string representation of the syntax
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeSyntax::Npm => "npm",
            RangeSyntax::Cargo => "cargo",
        }
    }

    /// Returns the matcher implementing this syntax
    pub fn matcher(self) -> Box<dyn RangeMatcher> {
        match self {
            RangeSyntax::Npm => Box::new(NpmRangeMatcher),
            RangeSyntax::Cargo => Box::new(CargoRangeMatcher),
        }
    }
}

impl std::str::FromStr for RangeSyntax {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "npm" => Ok(RangeSyntax::Npm),
            "cargo" => Ok(RangeSyntax::Cargo),
            _ => Err(()),
        }
    }
}

/// Trait for dialect-specific range satisfaction
///
/// Implementations never fail: an unparseable range simply matches nothing.
#[cfg_attr(test, automock)]
pub trait RangeMatcher: Send + Sync {
    /// Returns the syntax this matcher understands
    fn syntax(&self) -> RangeSyntax;

    /// Returns the highest entry of `versions` satisfying `range`
    ///
    /// The entry is returned exactly as it appears in `versions`.
    fn max_satisfying(&self, versions: &[String], range: &str) -> Option<String>;
}
