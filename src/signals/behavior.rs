//! Behavioral timing signal evaluator
//!
//! Works on client-reported form interaction telemetry. A request that
//! carries no sample at all scores nothing; absence of telemetry is treated
//! as permissive, not suspicious.

use super::SignalReport;
use serde::{Deserialize, Serialize};

const FAST_FORM_SCORE: u32 = 60;
const NO_MOUSE_SCORE: u32 = 40;
const UNIFORM_KEYSTROKES_SCORE: u32 = 70;

/// Humans rarely complete a signup form in under five seconds.
const MIN_HUMAN_FORM_MILLIS: u64 = 5_000;

/// Max deviation (ms) between keystroke intervals before the cadence is
/// considered machine-generated.
const KEYSTROKE_JITTER_MILLIS: u64 = 10;

/// Number of intervals after the first that must match its timing.
const UNIFORM_INTERVAL_COUNT: usize = 3;

const FLAG_THRESHOLD: u32 = 50;

/// Client-side form interaction telemetry, reported voluntarily at signup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSample {
    #[serde(default)]
    pub form_completion_millis: Option<u64>,
    #[serde(default)]
    pub mouse_movement_count: Option<u32>,
    #[serde(default)]
    pub keystroke_intervals_millis: Option<Vec<u64>>,
}

pub fn evaluate_behavior(sample: Option<&BehaviorSample>) -> SignalReport {
    let mut report = SignalReport::clean();
    let Some(sample) = sample else {
        return report;
    };

    if sample
        .form_completion_millis
        .is_some_and(|ms| ms < MIN_HUMAN_FORM_MILLIS)
    {
        report.add(FAST_FORM_SCORE, "Form completed suspiciously fast");
    }

    if sample.mouse_movement_count == Some(0) {
        report.add(NO_MOUSE_SCORE, "No mouse movement detected");
    }

    if sample
        .keystroke_intervals_millis
        .as_deref()
        .is_some_and(has_uniform_cadence)
    {
        report.add(
            UNIFORM_KEYSTROKES_SCORE,
            "Identical keystroke timing indicates automation",
        );
    }

    report.flagged = report.score >= FLAG_THRESHOLD;
    report
}

/// True when the first interval is within the jitter tolerance of each of
/// the next three intervals.
fn has_uniform_cadence(intervals: &[u64]) -> bool {
    let Some((&first, rest)) = intervals.split_first() else {
        return false;
    };
    rest.len() >= UNIFORM_INTERVAL_COUNT
        && rest[..UNIFORM_INTERVAL_COUNT]
            .iter()
            .all(|&i| i.abs_diff(first) <= KEYSTROKE_JITTER_MILLIS)
}
