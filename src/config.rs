//! Configuration types, built from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Environment variable holding the comma-separated sender domain list.
pub const APPROVED_SENDER_DOMAINS: &str = "APPROVED_SENDER_DOMAINS";

const DEFAULT_STAGING_DIR: &str = "./data/staging";
const DEFAULT_MAX_CONCURRENT_ENTRIES: usize = 8;
const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
const DEFAULT_GRAPH_TIMEOUT_SECS: u64 = 30;

/// Sender domains allowed to submit documents.
///
/// Entries are compared with a case-sensitive suffix test against the
/// sender's domain. An empty list rejects every message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovedDomains(Vec<String>);

impl ApprovedDomains {
    /// Parse a comma-separated list. Entries are trimmed; empty entries dropped.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for ApprovedDomains {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|s| !s.is_empty()).collect())
    }
}

/// Intake pipeline configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Domains whose senders may submit documents.
    pub approved_domains: ApprovedDomains,
    /// Directory attachments are staged into.
    pub staging_dir: PathBuf,
    /// Upper bound on notification entries processed at once.
    pub max_concurrent_entries: usize,
}

impl IntakeConfig {
    /// Build config from environment variables.
    ///
    /// An empty `APPROVED_SENDER_DOMAINS` is refused here: with no approved
    /// domains every message would be silently rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Build config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let approved_domains =
            ApprovedDomains::parse(&lookup(APPROVED_SENDER_DOMAINS).unwrap_or_default());
        if approved_domains.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: APPROVED_SENDER_DOMAINS.into(),
                hint: "Set a comma-separated list of sender domains, e.g. \"example.com,partner.org\""
                    .into(),
            });
        }

        let staging_dir = lookup("STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR));

        let max_concurrent_entries = parse_value(
            &lookup,
            "MAX_CONCURRENT_ENTRIES",
            DEFAULT_MAX_CONCURRENT_ENTRIES,
        )?;
        if max_concurrent_entries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_CONCURRENT_ENTRIES".into(),
                message: "must be at least 1".into(),
            });
        }

        Ok(Self {
            approved_domains,
            staging_dir,
            max_concurrent_entries,
        })
    }
}

/// Microsoft Graph message store configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub base_url: String,
    pub access_token: SecretString,
    /// Mailbox (user id or UPN) attachments are read from; `me` when unset.
    pub mailbox: Option<String>,
    pub timeout: Duration,
}

impl GraphConfig {
    /// Build config from environment variables. `GRAPH_ACCESS_TOKEN` is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let access_token = lookup("GRAPH_ACCESS_TOKEN")
            .ok_or_else(|| ConfigError::MissingEnvVar("GRAPH_ACCESS_TOKEN".into()))?;

        let base_url = lookup("GRAPH_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mailbox = lookup("GRAPH_MAILBOX")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let timeout_secs = parse_value(&lookup, "GRAPH_TIMEOUT_SECS", DEFAULT_GRAPH_TIMEOUT_SECS)?;

        Ok(Self {
            base_url,
            access_token: SecretString::from(access_token),
            mailbox,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_value<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn parse_trims_and_drops_empty_entries() {
        let domains = ApprovedDomains::parse(" approved.com, ,partner.org ,");
        assert_eq!(domains.iter().collect::<Vec<_>>(), vec!["approved.com", "partner.org"]);
    }

    #[test]
    fn parse_empty_string_is_empty() {
        assert!(ApprovedDomains::parse("").is_empty());
        assert!(ApprovedDomains::parse(" , ,").is_empty());
    }

    #[test]
    fn parse_keeps_case() {
        let domains = ApprovedDomains::parse("Approved.COM");
        assert_eq!(domains.iter().next(), Some("Approved.COM"));
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn intake_defaults() {
        let config = IntakeConfig::from_lookup(lookup(&[(APPROVED_SENDER_DOMAINS, "approved.com")])).unwrap();
        assert_eq!(config.approved_domains.iter().collect::<Vec<_>>(), vec!["approved.com"]);
        assert_eq!(config.staging_dir, PathBuf::from("./data/staging"));
        assert_eq!(config.max_concurrent_entries, 8);
    }

    #[test]
    fn missing_domains_are_refused() {
        let err = IntakeConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref key, .. } if key == APPROVED_SENDER_DOMAINS));
    }

    #[test]
    fn blank_domain_list_is_refused() {
        let err = IntakeConfig::from_lookup(lookup(&[(APPROVED_SENDER_DOMAINS, " , ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    fn zero_concurrency_is_invalid() {
        let err = IntakeConfig::from_lookup(lookup(&[
            (APPROVED_SENDER_DOMAINS, "approved.com"),
            ("MAX_CONCURRENT_ENTRIES", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MAX_CONCURRENT_ENTRIES"));
    }

    #[test]
    fn unparsable_concurrency_is_invalid() {
        let err = IntakeConfig::from_lookup(lookup(&[
            (APPROVED_SENDER_DOMAINS, "approved.com"),
            ("MAX_CONCURRENT_ENTRIES", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MAX_CONCURRENT_ENTRIES"));
    }

    #[test]
    fn intake_overrides() {
        let config = IntakeConfig::from_lookup(lookup(&[
            (APPROVED_SENDER_DOMAINS, "approved.com,partner.org"),
            ("STAGING_DIR", "/var/spool/menus"),
            ("MAX_CONCURRENT_ENTRIES", " 3 "),
        ]))
        .unwrap();
        assert_eq!(config.staging_dir, PathBuf::from("/var/spool/menus"));
        assert_eq!(config.max_concurrent_entries, 3);
    }

    #[test]
    fn graph_requires_token() {
        let err = GraphConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "GRAPH_ACCESS_TOKEN"));
    }

    #[test]
    fn graph_trims_base_url_and_blank_mailbox() {
        let config = GraphConfig::from_lookup(lookup(&[
            ("GRAPH_ACCESS_TOKEN", "token"),
            ("GRAPH_BASE_URL", "http://localhost:8080/v1.0/"),
            ("GRAPH_MAILBOX", "  "),
            ("GRAPH_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v1.0");
        assert_eq!(config.mailbox, None);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
