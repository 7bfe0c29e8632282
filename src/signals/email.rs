//! Email signal evaluator
//!
//! Scores an email address on three independent, additive checks: bot-shaped
//! local part, disposable mail provider, and newly registered domain.

use super::SignalReport;
use super::patterns::{
    BOT_LOCAL_PART_PATTERNS, DISPOSABLE_DOMAINS, DomainAgeCheck, SuspiciousTldList,
};

const BOT_PATTERN_SCORE: u32 = 40;
const DISPOSABLE_DOMAIN_SCORE: u32 = 60;
const NEW_DOMAIN_SCORE: u32 = 20;

/// Score threshold at which this evaluator considers the email bot-like.
const FLAG_THRESHOLD: u32 = 40;

/// Evaluate an email address using the static TLD list as the domain-age
/// check.
pub fn evaluate_email(email: &str) -> SignalReport {
    evaluate_email_with(email, &SuspiciousTldList)
}

/// Evaluate an email address with a caller-provided domain-age check.
pub fn evaluate_email_with(email: &str, domain_age: &dyn DomainAgeCheck) -> SignalReport {
    let email = email.trim().to_lowercase();
    let mut report = SignalReport::clean();

    // First matching local-part pattern scores once, however many match.
    if BOT_LOCAL_PART_PATTERNS.iter().any(|p| p.is_match(&email)) {
        report.add(BOT_PATTERN_SCORE, "Email follows bot-like pattern");
    }

    let domain = email.rsplit_once('@').map(|(_, d)| d).unwrap_or("");

    if DISPOSABLE_DOMAINS.contains(&domain) {
        report.add(DISPOSABLE_DOMAIN_SCORE, "Email uses a disposable domain");
    }

    if domain_age.is_recently_registered(domain) {
        report.add(NEW_DOMAIN_SCORE, "Email domain appears newly registered");
    }

    report.flagged = report.score >= FLAG_THRESHOLD;
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_shaped_local_parts_score_at_least_40() {
        for email in [
            "bot1234@example.com",
            "test99@example.com",
            "user42@example.com",
            "fake7@example.com",
            "temp88@example.com",
            "ab12345@example.com",
            "signup20249999@example.com",
        ] {
            let report = evaluate_email(email);
            assert!(report.score >= 40, "{} scored {}", email, report.score);
            assert!(report.flagged, "{} should be flagged", email);
        }
    }

    #[test]
    fn test_pattern_score_is_not_double_counted() {
        // Matches both the generic digits pattern and the test-prefix pattern.
        let report = evaluate_email("test1234@example.com");
        assert_eq!(report.score, 40);
        assert_eq!(report.reasons.len(), 1);
    }

    #[test]
    fn test_disposable_domain_stacks_with_pattern() {
        let report = evaluate_email("spammer99999@mailinator.com");
        assert_eq!(report.score, 100);
        assert!(report.flagged);
        assert_eq!(report.reasons.len(), 2);
    }

    #[test]
    fn test_suspicious_tld_scores_20() {
        let report = evaluate_email("jane.doe@startup.xyz");
        assert_eq!(report.score, 20);
        assert!(!report.flagged);
    }

    #[test]
    fn test_all_three_checks_stack() {
        // Pattern (+40) and TLD (+20); tempmail.org covers the disposable case
        // separately since no disposable domain uses a suspicious TLD.
        let report = evaluate_email("xy12345@mailer.tk");
        assert_eq!(report.score, 60);

        let report = evaluate_email("temp123@tempmail.org");
        assert_eq!(report.score, 100);
    }

    #[test]
    fn test_clean_email_scores_zero() {
        let report = evaluate_email("jane.doe@example.com");
        assert_eq!(report.score, 0);
        assert!(report.reasons.is_empty());
        assert!(!report.flagged);
    }

    #[test]
    fn test_uppercase_is_normalized() {
        let report = evaluate_email("BOT1234@EXAMPLE.COM");
        assert_eq!(report.score, 40);
    }

    #[test]
    fn test_custom_domain_age_check() {
        struct AlwaysNew;
        impl DomainAgeCheck for AlwaysNew {
            fn is_recently_registered(&self, _domain: &str) -> bool {
                true
            }
        }

        let report = evaluate_email_with("jane.doe@example.com", &AlwaysNew);
        assert_eq!(report.score, 20);
    }
}
