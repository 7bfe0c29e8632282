//! Static signal pattern tables
//!
//! All pattern data used by the signal evaluators lives here so the lists
//! can be extended without touching evaluator logic.

use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// Email patterns
// ============================================================================

/// Bot-shaped local-part patterns, matched against the lowercased email.
/// Only the first match scores; the list order is most-generic first.
pub static BOT_LOCAL_PART_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^[a-z0-9]+\d{4,}@").unwrap(),
        Regex::new(r"^test\d+@").unwrap(),
        Regex::new(r"^user\d+@").unwrap(),
        Regex::new(r"^bot\d+@").unwrap(),
        Regex::new(r"^fake\d+@").unwrap(),
        Regex::new(r"^temp\d+@").unwrap(),
        Regex::new(r"^[a-z]{1,3}\d{5,}@").unwrap(),
    ]
});

/// Throwaway mail providers that accept signups without a real inbox.
pub const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "guerrillamail.com",
    "10minutemail.com",
    "tempmail.org",
    "throwaway.email",
    "temp-mail.org",
];

/// TLDs handed out for free and heavily used by freshly registered
/// throwaway domains. Stands in for a real domain-age lookup.
pub const SUSPICIOUS_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf", ".pw", ".xyz"];

// ============================================================================
// Phone patterns
// ============================================================================

/// Prefixes reserved for fiction or otherwise never allocated to subscribers.
pub const FAKE_PHONE_PREFIXES: &[&str] = &["555", "111", "000"];

// ============================================================================
// User-agent patterns
// ============================================================================

/// Keywords that identify automation frameworks, matched case-insensitively.
pub const BOT_UA_KEYWORDS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scraper",
    "headless",
    "phantom",
    "selenium",
    "automation",
    "puppeteer",
    "playwright",
];

/// Exact product tokens emitted by headless browser builds. Matched
/// case-sensitively and independently of the keyword list.
pub const HEADLESS_UA_MARKERS: &[&str] = &["HeadlessChrome", "PhantomJS"];

// ============================================================================
// Domain-age lookup
// ============================================================================

/// Pluggable domain-age check. A production deployment would back this with
/// a WHOIS or registrar API; the default implementation classifies by TLD.
pub trait DomainAgeCheck: Send + Sync {
    fn is_recently_registered(&self, domain: &str) -> bool;
}

/// Static stand-in for a real domain-age service: treats any domain on a
/// free-registration TLD as newly registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuspiciousTldList;

impl DomainAgeCheck for SuspiciousTldList {
    fn is_recently_registered(&self, domain: &str) -> bool {
        SUSPICIOUS_TLDS.iter().any(|tld| domain.ends_with(tld))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_local_part_patterns_compile() {
        assert_eq!(BOT_LOCAL_PART_PATTERNS.len(), 7);
    }

    #[test]
    fn test_tld_list_classifies_free_tlds() {
        let check = SuspiciousTldList;
        assert!(check.is_recently_registered("signups.xyz"));
        assert!(check.is_recently_registered("mail.tk"));
        assert!(!check.is_recently_registered("example.com"));
    }
}
