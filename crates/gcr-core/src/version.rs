//! # Version Contract
//!
//! The `major.minor` pair declared by the manifest and echoed by the index.
//! Contracts compare numerically, so `"1"` (the short form) equals `"1.0"`.

use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// A parsed `major.minor` version contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionContract {
    major: u32,
    minor: u32,
}

impl VersionContract {
    /// Create a contract from its components.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse `"<major>.<minor>"` or the short form `"<major>"`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError`] for empty components, non-digit characters,
    /// more than two components, or numbers that overflow `u32`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let reject = |reason| VersionError {
            input: input.to_string(),
            reason,
        };

        let (major, minor) = match input.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (input, None),
        };

        let major = parse_component(major).map_err(reject)?;
        let minor = match minor {
            Some(m) if m.contains('.') => return Err(reject("expected at most major.minor")),
            Some(m) => parse_component(m).map_err(reject)?,
            None => 0,
        };

        Ok(Self { major, minor })
    }

    /// Returns true if `input` is a valid contract written without a minor
    /// component, e.g. `"1"`.
    pub fn is_short_form(input: &str) -> bool {
        !input.contains('.') && Self::parse(input).is_ok()
    }

    /// The major component.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// The minor component.
    pub fn minor(&self) -> u32 {
        self.minor
    }
}

fn parse_component(s: &str) -> Result<u32, &'static str> {
    if s.is_empty() {
        return Err("empty version component");
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err("version components must be decimal digits");
    }
    s.parse().map_err(|_| "version component out of range")
}

impl FromStr for VersionContract {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_major_minor() {
        let v = VersionContract::parse("1.4").unwrap();
        assert_eq!(v.major(), 1);
        assert_eq!(v.minor(), 4);
        assert_eq!(v.to_string(), "1.4");
    }

    #[test]
    fn short_form_equals_zero_minor() {
        assert_eq!(
            VersionContract::parse("2").unwrap(),
            VersionContract::new(2, 0)
        );
        assert!(VersionContract::is_short_form("2"));
        assert!(!VersionContract::is_short_form("2.0"));
        assert!(!VersionContract::is_short_form("v2"));
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", ".", "1.", ".1", "1.2.3", "v1.0", "1.x", "-1", " 1.0"] {
            let err = VersionContract::parse(bad).unwrap_err();
            assert_eq!(err.input, bad);
        }
    }

    #[test]
    fn rejects_overflow() {
        let err = VersionContract::parse("99999999999.0").unwrap_err();
        assert_eq!(err.reason, "version component out of range");
    }

    #[test]
    fn orders_numerically() {
        let a: VersionContract = "1.9".parse().unwrap();
        let b: VersionContract = "1.10".parse().unwrap();
        assert!(a < b);
        assert!(VersionContract::new(2, 0) > b);
    }

    proptest! {
        /// Display output always parses back to the same contract.
        #[test]
        fn display_is_parseable(major in 0u32..10_000, minor in 0u32..10_000) {
            let v = VersionContract::new(major, minor);
            prop_assert_eq!(VersionContract::parse(&v.to_string()).unwrap(), v);
        }

        /// Parsing never panics on arbitrary input.
        #[test]
        fn parse_never_panics(s in "\\PC{0,12}") {
            let _ = VersionContract::parse(&s);
        }
    }
}
