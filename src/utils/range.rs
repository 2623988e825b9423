//! Compact integer range expressions.
//!
//! A range expression is a comma-separated list of terms, each either a
//! single integer (`"2021"`) or an inclusive interval (`"2018-2020"`). The
//! same syntax drives the publish/update year filters and the download
//! selection over display indices.
//!
//! ```
//! use arxiv_paper::utils::RangeSpec;
//!
//! let spec: RangeSpec = "3,7-9".parse().unwrap();
//! assert!(spec.contains(8));
//! assert!(!spec.contains(5));
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a range expression
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("empty range expression")]
    Empty,

    #[error("malformed range term \"{0}\": expected \"k\" or \"n-m\"")]
    MalformedTerm(String),
}

/// One term of a range expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeTerm {
    Single(i64),
    Interval { low: i64, high: i64 },
}

impl RangeTerm {
    fn contains(&self, n: i64) -> bool {
        match *self {
            RangeTerm::Single(k) => n == k,
            RangeTerm::Interval { low, high } => low <= n && n <= high,
        }
    }

    fn parse(term: &str) -> Result<Self, RangeError> {
        let malformed = || RangeError::MalformedTerm(term.to_string());
        let bound = |s: &str| s.trim().parse::<i64>().map_err(|_| malformed());

        match term.split_once('-') {
            Some((low, high)) => {
                let low = bound(low)?;
                let high = bound(high)?;
                if low > high {
                    tracing::warn!(
                        "range term \"{}\" has its low bound above its high bound and will never match",
                        term.trim()
                    );
                }
                Ok(RangeTerm::Interval { low, high })
            }
            None => Ok(RangeTerm::Single(bound(term)?)),
        }
    }
}

impl fmt::Display for RangeTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeTerm::Single(k) => write!(f, "{}", k),
            RangeTerm::Interval { low, high } => write!(f, "{}-{}", low, high),
        }
    }
}

/// A parsed, immutable set of membership terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    terms: Vec<RangeTerm>,
}

impl RangeSpec {
    /// Parse a range expression such as `"3,7-9"`.
    pub fn parse(spec: &str) -> Result<Self, RangeError> {
        if spec.trim().is_empty() {
            return Err(RangeError::Empty);
        }

        let terms = spec
            .split(',')
            .map(RangeTerm::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { terms })
    }

    /// Parse an optional expression; `None` and blank strings mean "no filter".
    pub fn parse_optional(spec: Option<&str>) -> Result<Option<Self>, RangeError> {
        match spec {
            Some(s) if !s.trim().is_empty() => Self::parse(s).map(Some),
            _ => Ok(None),
        }
    }

    /// True iff `n` equals a singleton term or falls inside an interval term.
    pub fn contains(&self, n: i64) -> bool {
        self.terms.iter().any(|term| term.contains(n))
    }

    /// Membership test for 1-based display indices.
    pub fn contains_index(&self, index: usize) -> bool {
        i64::try_from(index).is_ok_and(|n| self.contains(n))
    }
}

impl FromStr for RangeSpec {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.terms.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", terms.join(","))
    }
}
