//! npm range matcher
//!
//! Ranges are desugared into comparator sets before matching:
//! - `1.2.3`, `=1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0, narrower for 0.x)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1`, `*`, empty - wildcards and partial versions
//! - `1.0.0 - 2.0.0` - inclusive hyphen range
//! - `>=1.0.0 <2.0.0` - AND (space-separated), `^1.0.0 || ^2.0.0` - OR

use semver::{BuildMetadata, Prerelease, Version};
use tracing::warn;

use crate::version::matcher::{RangeMatcher, RangeSyntax};
use crate::version::semver::max_matching;

pub struct NpmRangeMatcher;

const OPERATORS: [&str; 7] = [">=", "<=", ">", "<", "=", "^", "~"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Eq => *version == self.version,
            Op::Gt => *version > self.version,
            Op::Gte => *version >= self.version,
            Op::Lt => *version < self.version,
            Op::Lte => *version <= self.version,
        }
    }

    /// Comparator that nothing outside prereleases of 0.0.0 satisfies
    fn nothing() -> Self {
        Self::new(Op::Lt, Version::new(0, 0, 0))
    }
}

/// A version with possibly-missing components (`1`, `1.2`, `1.x`, `*`)
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix('v').unwrap_or(text);
        let text = match text.split_once('+') {
            Some(("", _)) => return None,
            Some((core, _)) => core,
            None => text,
        };
        let (core, pre) = match text.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (text, None),
        };

        let mut parts = core.split('.').filter(|part| !part.is_empty());
        let major = Self::component(parts.next())?;
        let minor = Self::component(parts.next())?;
        let patch = Self::component(parts.next())?;
        if parts.next().is_some() {
            return None;
        }

        // A wildcard cannot be followed by a concrete component
        if (major.is_none() && minor.is_some()) || (minor.is_none() && patch.is_some()) {
            return None;
        }

        let pre = match pre {
            Some(pre) if patch.is_some() => Prerelease::new(pre).ok()?,
            Some(_) => return None,
            None => Prerelease::EMPTY,
        };

        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    /// `None` for an invalid component, `Some(None)` for a wildcard or a
    /// missing one. Numbers are plain digits without a leading zero.
    fn component(part: Option<&str>) -> Option<Option<u64>> {
        match part {
            None | Some("x") | Some("X") | Some("*") => Some(None),
            Some(digits) => {
                if !digits.bytes().all(|b| b.is_ascii_digit())
                    || (digits.len() > 1 && digits.starts_with('0'))
                {
                    return None;
                }
                digits.parse::<u64>().ok().map(Some)
            }
        }
    }

    fn is_any(&self) -> bool {
        self.major.is_none()
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    /// Lowest version the partial covers
    fn floor(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
            build: BuildMetadata::EMPTY,
        }
    }

    /// First version past a partial (`1` -> 2.0.0, `1.2` -> 1.3.0)
    fn ceiling(&self) -> Version {
        let major = self.major.unwrap_or(0);
        match self.minor {
            None => Version::new(major.saturating_add(1), 0, 0),
            Some(minor) => Version::new(major, minor.saturating_add(1), 0),
        }
    }

    /// First version past the caret range rooted here
    fn caret_ceiling(&self) -> Version {
        match (self.major.unwrap_or(0), self.minor, self.patch) {
            (0, Some(0), Some(patch)) => Version::new(0, 0, patch.saturating_add(1)),
            (0, Some(minor), _) => Version::new(0, minor.saturating_add(1), 0),
            (major, _, _) => Version::new(major.saturating_add(1), 0, 0),
        }
    }
}

/// Space-separated comparators that must all hold
#[derive(Debug)]
struct ComparatorSet(Vec<Comparator>);

impl ComparatorSet {
    fn parse(text: &str) -> Option<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut comparators = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            if tokens.get(i + 1) == Some(&"-") {
                let from = Partial::parse(tokens[i])?;
                let to = Partial::parse(tokens.get(i + 2)?)?;
                comparators.extend(hyphen(&from, &to));
                i += 3;
                continue;
            }

            let token = tokens[i];
            if OPERATORS.contains(&token) {
                // Operator separated from its operand (">= 1.2.3")
                let operand = tokens.get(i + 1)?;
                comparators.extend(desugar(&format!("{token}{operand}"))?);
                i += 2;
            } else {
                comparators.extend(desugar(token)?);
                i += 1;
            }
        }

        Some(Self(comparators))
    }

    fn satisfies(&self, version: &Version) -> bool {
        if !self.0.iter().all(|c| c.matches(version)) {
            return false;
        }
        if version.pre.is_empty() {
            return true;
        }

        // Prereleases only match when a comparator opts in on the same tuple
        self.0.iter().any(|c| {
            !c.version.pre.is_empty()
                && c.version.major == version.major
                && c.version.minor == version.minor
                && c.version.patch == version.patch
        })
    }
}

/// `||`-separated comparator sets, any of which may hold
#[derive(Debug)]
struct NpmRange(Vec<ComparatorSet>);

impl NpmRange {
    fn parse(range: &str) -> Option<Self> {
        range
            .split("||")
            .map(ComparatorSet::parse)
            .collect::<Option<Vec<_>>>()
            .map(NpmRange)
    }

    fn satisfies(&self, version: &Version) -> bool {
        self.0.iter().any(|set| set.satisfies(version))
    }
}

fn desugar(token: &str) -> Option<Vec<Comparator>> {
    let op = OPERATORS
        .iter()
        .find(|op| token.starts_with(**op))
        .copied()
        .unwrap_or("");
    let partial = Partial::parse(&token[op.len()..])?;

    let comparators = match op {
        "^" => caret(&partial),
        "~" => tilde(&partial),
        ">" if partial.is_any() => vec![Comparator::nothing()],
        ">" if partial.is_full() => vec![Comparator::new(Op::Gt, partial.floor())],
        ">" => vec![Comparator::new(Op::Gte, partial.ceiling())],
        ">=" if partial.is_any() => vec![],
        ">=" => vec![Comparator::new(Op::Gte, partial.floor())],
        "<" if partial.is_any() => vec![Comparator::nothing()],
        "<" => vec![Comparator::new(Op::Lt, partial.floor())],
        "<=" if partial.is_any() => vec![],
        "<=" if partial.is_full() => vec![Comparator::new(Op::Lte, partial.floor())],
        "<=" => vec![Comparator::new(Op::Lt, partial.ceiling())],
        _ => exact(&partial),
    };
    Some(comparators)
}

fn exact(partial: &Partial) -> Vec<Comparator> {
    if partial.is_any() {
        vec![]
    } else if partial.is_full() {
        vec![Comparator::new(Op::Eq, partial.floor())]
    } else {
        vec![
            Comparator::new(Op::Gte, partial.floor()),
            Comparator::new(Op::Lt, partial.ceiling()),
        ]
    }
}

fn caret(partial: &Partial) -> Vec<Comparator> {
    if partial.is_any() {
        return vec![];
    }
    let ceiling = if partial.minor.is_none() {
        partial.ceiling()
    } else {
        partial.caret_ceiling()
    };
    vec![
        Comparator::new(Op::Gte, partial.floor()),
        Comparator::new(Op::Lt, ceiling),
    ]
}

fn tilde(partial: &Partial) -> Vec<Comparator> {
    if partial.is_any() {
        return vec![];
    }
    let ceiling = match (partial.major, partial.minor) {
        (Some(major), Some(minor)) => Version::new(major, minor.saturating_add(1), 0),
        _ => partial.ceiling(),
    };
    vec![
        Comparator::new(Op::Gte, partial.floor()),
        Comparator::new(Op::Lt, ceiling),
    ]
}

fn hyphen(from: &Partial, to: &Partial) -> Vec<Comparator> {
    let mut comparators = Vec::new();
    if !from.is_any() {
        comparators.push(Comparator::new(Op::Gte, from.floor()));
    }
    if to.is_full() {
        comparators.push(Comparator::new(Op::Lte, to.floor()));
    } else if !to.is_any() {
        comparators.push(Comparator::new(Op::Lt, to.ceiling()));
    }
    comparators
}

impl RangeMatcher for NpmRangeMatcher {
    fn syntax(&self) -> RangeSyntax {
        RangeSyntax::Npm
    }

    fn max_satisfying(&self, versions: &[String], range: &str) -> Option<String> {
        let Some(parsed) = NpmRange::parse(range) else {
            warn!("Invalid npm range: {}", range);
            return None;
        };

        max_matching(versions, |version| parsed.satisfies(version))
    }
}
