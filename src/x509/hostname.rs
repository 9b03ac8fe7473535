//! Hostname grammar for attribute-based issuance

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CaError, Result};

/// ASCII alphanumerics, dot, asterisk and hyphen. Nothing else.
pub const HOSTNAME_PATTERN: &str = "^[A-Za-z0-9.*-]+$";

static HOSTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HOSTNAME_PATTERN).expect("hostname pattern is a valid regex"));

/// Check one hostname against [`HOSTNAME_PATTERN`].
pub fn validate_hostname(hostname: &str) -> Result<()> {
    if HOSTNAME_RE.is_match(hostname) {
        Ok(())
    } else {
        Err(CaError::InvalidHostname {
            hostname: hostname.to_string(),
            pattern: HOSTNAME_PATTERN,
        })
    }
}

/// Fails on the first hostname outside the grammar.
pub fn validate_hostnames<S: AsRef<str>>(hostnames: &[S]) -> Result<()> {
    hostnames
        .iter()
        .try_for_each(|hostname| validate_hostname(hostname.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_grammar() {
        for host in ["localhost", "example.test", "*.example.test", "a-b.c0", "10.0.0.1"] {
            assert!(validate_hostname(host).is_ok(), "{host} should pass");
        }
    }

    #[test]
    fn test_rejects_outside_grammar() {
        for host in ["", "bad host", "under_score", "tab\t", "ünï.test", "a/b", "x\n"] {
            let err = validate_hostname(host).unwrap_err();
            let CaError::InvalidHostname { hostname, pattern } = err else {
                panic!("{host:?} should fail with InvalidHostname");
            };
            assert_eq!(hostname, host);
            assert_eq!(pattern, HOSTNAME_PATTERN);
        }
    }

    #[test]
    fn test_list_reports_first_offender() {
        let hosts = vec!["ok.test".to_string(), "no way".to_string(), "also bad!".to_string()];
        match validate_hostnames(&hosts) {
            Err(CaError::InvalidHostname { hostname, .. }) => assert_eq!(hostname, "no way"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
