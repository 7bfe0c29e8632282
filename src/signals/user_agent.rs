//! User-agent signal evaluator

use super::SignalReport;
use super::patterns::{BOT_UA_KEYWORDS, HEADLESS_UA_MARKERS};

const MISSING_UA_SCORE: u32 = 70;
const BOT_KEYWORD_SCORE: u32 = 90;
const HEADLESS_MARKER_SCORE: u32 = 85;

/// Anything shorter than this cannot be a real browser identification.
const MIN_PLAUSIBLE_UA_LEN: usize = 10;

const FLAG_THRESHOLD: u32 = 70;

pub fn evaluate_user_agent(user_agent: &str) -> SignalReport {
    let mut report = SignalReport::clean();

    // A missing or truncated user agent is conclusive on its own; the
    // signature checks below only make sense on a real UA string.
    if user_agent.len() < MIN_PLAUSIBLE_UA_LEN {
        report.add(MISSING_UA_SCORE, "Missing or suspicious user agent");
        report.flagged = report.score >= FLAG_THRESHOLD;
        return report;
    }

    let lowered = user_agent.to_lowercase();
    if BOT_UA_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        report.add(BOT_KEYWORD_SCORE, "User agent matches bot signature");
    }

    // Exact headless product tokens stack with the keyword match.
    if HEADLESS_UA_MARKERS.iter().any(|m| user_agent.contains(m)) {
        report.add(
            HEADLESS_MARKER_SCORE,
            "User agent identifies a headless browser build",
        );
    }

    report.flagged = report.score >= FLAG_THRESHOLD;
    report
}
