//! Property-test run profile read from the environment.
//!
//! CI raises case counts and enables forking through environment variables;
//! local runs fall back to the defaults each suite passes in.

use std::env;

use thiserror::Error;

/// Environment variable controlling proptest case counts.
pub const PROGTEST_CASES_ENV_KEY: &str = "PROGTEST_CASES";
/// Environment variable controlling proptest process forking.
pub const INVASION_PBT_FORK_ENV_KEY: &str = "INVASION_PBT_FORK";

/// Rejected override value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileOverrideError {
    /// The case count was not a positive integer.
    #[error("expected a positive case count, got `{raw}`")]
    InvalidCases {
        /// Raw override value.
        raw: String,
    },
    /// The fork switch was not a recognised boolean spelling.
    #[error("expected true/false/1/0/yes/no/on/off, got `{raw}`")]
    InvalidFork {
        /// Raw override value.
        raw: String,
    },
}

/// Runtime profile for property-test execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Loads the profile from the process environment.
    ///
    /// Invalid overrides are logged and replaced by the defaults.
    ///
    /// # Examples
    /// ```
    /// use invasion_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self::load_with(default_cases, default_fork, |key| env::var(key).ok())
    }

    /// Loads the profile through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Examples
    /// ```
    /// use invasion_test_support::ci::property_test_profile::{
    ///     PROGTEST_CASES_ENV_KEY, ProptestRunProfile,
    /// };
    ///
    /// let profile = ProptestRunProfile::load_with(64, false, |key| {
    ///     (key == PROGTEST_CASES_ENV_KEY).then(|| "512".to_owned())
    /// });
    /// assert_eq!(profile.cases(), 512);
    /// assert!(!profile.fork());
    /// ```
    #[must_use]
    pub fn load_with<F>(default_cases: u32, default_fork: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cases = resolve(&lookup, PROGTEST_CASES_ENV_KEY, default_cases, parse_cases);
        let fork = resolve(&lookup, INVASION_PBT_FORK_ENV_KEY, default_fork, parse_fork);
        Self { cases, fork }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether to run proptest cases in forked subprocesses.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }
}

fn resolve<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    parse: fn(&str) -> Result<T, ProfileOverrideError>,
) -> T
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    parse(&raw).unwrap_or_else(|error| {
        tracing::warn!(env = key, %error, "ignoring property-test profile override");
        default
    })
}

/// Parses a positive case count.
///
/// # Errors
/// Returns [`ProfileOverrideError::InvalidCases`] for zero, negative or
/// non-numeric input.
pub fn parse_cases(raw: &str) -> Result<u32, ProfileOverrideError> {
    match raw.trim().parse::<u32>() {
        Ok(cases) if cases > 0 => Ok(cases),
        _ => Err(ProfileOverrideError::InvalidCases {
            raw: raw.to_owned(),
        }),
    }
}

/// Parses a fork switch, ignoring case and surrounding whitespace.
///
/// # Errors
/// Returns [`ProfileOverrideError::InvalidFork`] for unrecognised input.
pub fn parse_fork(raw: &str) -> Result<bool, ProfileOverrideError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ProfileOverrideError::InvalidFork {
            raw: raw.to_owned(),
        }),
    }
}
