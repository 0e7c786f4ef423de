//! Metric extraction from slash-command text.
//!
//! A command carries eight counts, in the order of [`Metric::ALL`]. Any
//! non-digit characters separate them, so `1 0 0 2 0 0 1 1` and
//! `grind 1,0,0,2,0,0,1,1` are equivalent.

use regex::Regex;
use std::{fmt, sync::LazyLock};

/// Number of counts a command must carry.
pub const METRIC_COUNT: usize = 8;

#[allow(clippy::expect_used)]
static TRIGGER_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:grind|update|metrics?)\s+").expect("trigger word pattern is valid")
});

// ASCII only; `\d` would also match other Unicode digits.
#[allow(clippy::expect_used)]
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// One slot of a [`MetricVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Talks,
    Instagram,
    TikTok,
    HelloTalk,
    Coffee,
    Blog,
    Run,
    Gym,
}

impl Metric {
    /// Every metric, in wire order.
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::Talks,
        Metric::Instagram,
        Metric::TikTok,
        Metric::HelloTalk,
        Metric::Coffee,
        Metric::Blog,
        Metric::Run,
        Metric::Gym,
    ];

    /// Short label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Talks => "Talks",
            Metric::Instagram => "IG",
            Metric::TikTok => "TT",
            Metric::HelloTalk => "HT",
            Metric::Coffee => "Coffee",
            Metric::Blog => "Blog",
            Metric::Run => "Run",
            Metric::Gym => "Gym",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Exactly eight counts, kept as decimal digit strings without leading
/// zeros so no count is ever truncated. Renders space-separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricVector([String; METRIC_COUNT]);

impl MetricVector {
    pub fn new(values: [u64; METRIC_COUNT]) -> Self {
        Self(values.map(|v| v.to_string()))
    }

    /// The count for `metric`, or `None` if it does not fit in a `u64`.
    pub fn get(&self, metric: Metric) -> Option<u64> {
        self.0[metric.index()].parse().ok()
    }

    /// The count for `metric` as decimal digits.
    pub fn digits(&self, metric: Metric) -> &str {
        &self.0[metric.index()]
    }
}

impl fmt::Display for MetricVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Parses the metric vector out of a command's text.
///
/// A leading `grind`, `update`, `metric` or `metrics` followed by whitespace
/// is dropped first. Returns `None` unless exactly [`METRIC_COUNT`] digit
/// runs remain.
pub fn parse_metrics(text: &str) -> Option<MetricVector> {
    let stripped = TRIGGER_WORD.replace(text, "");

    let runs: Vec<String> = DIGIT_RUN
        .find_iter(&stripped)
        .map(|run| normalize_digits(run.as_str()))
        .collect();

    <[String; METRIC_COUNT]>::try_from(runs).ok().map(MetricVector)
}

// "007" -> "7", "000" -> "0".
fn normalize_digits(run: &str) -> String {
    let trimmed = run.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Comma-separated labels in wire order, e.g. for usage hints.
pub fn metric_labels() -> String {
    Metric::ALL
        .iter()
        .map(|m| m.label())
        .collect::<Vec<_>>()
        .join(", ")
}
