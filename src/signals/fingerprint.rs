//! Device-fingerprint signal evaluator
//!
//! The fingerprint arrives as an opaque JSON blob assembled client-side. A
//! blob that fails to parse still scores (something is off), it just scores
//! lower than concrete automation markers.

use super::SignalReport;
use serde_json::Value;

const MISSING_FINGERPRINT_SCORE: u32 = 30;
const UNPARSEABLE_SCORE: u32 = 20;
const WEBDRIVER_SCORE: u32 = 90;
const NO_PLUGINS_SCORE: u32 = 40;
const HEADLESS_DEFAULTS_SCORE: u32 = 60;

/// Screen/timezone pair shipped as the out-of-the-box configuration of the
/// most common headless automation stack.
const HEADLESS_DEFAULT_RESOLUTION: &str = "1920x1080";
const HEADLESS_DEFAULT_TIMEZONE: &str = "UTC";

const FLAG_THRESHOLD: u32 = 60;

pub fn evaluate_fingerprint(raw: &str) -> SignalReport {
    let mut report = SignalReport::clean();

    if raw.trim().is_empty() {
        report.add(MISSING_FINGERPRINT_SCORE, "Missing device fingerprint");
        // A missing blob is scored but never flagged on its own: clients
        // with strict privacy settings legitimately send nothing.
        report.flagged = false;
        return report;
    }

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => {
            report.add(UNPARSEABLE_SCORE, "Invalid device fingerprint format");
            report.flagged = report.score >= FLAG_THRESHOLD;
            return report;
        }
    };

    if parsed.get("webdriver") == Some(&Value::Bool(true)) {
        report.add(WEBDRIVER_SCORE, "WebDriver automation flag present");
    }

    if parsed
        .get("plugins")
        .and_then(Value::as_array)
        .is_some_and(Vec::is_empty)
    {
        report.add(NO_PLUGINS_SCORE, "Browser reports no plugins");
    }

    let resolution = parsed.get("screenResolution").and_then(Value::as_str);
    let timezone = parsed.get("timezone").and_then(Value::as_str);
    if resolution == Some(HEADLESS_DEFAULT_RESOLUTION) && timezone == Some(HEADLESS_DEFAULT_TIMEZONE)
    {
        report.add(
            HEADLESS_DEFAULTS_SCORE,
            "Default headless browser configuration",
        );
    }

    report.flagged = report.score >= FLAG_THRESHOLD;
    report
}
