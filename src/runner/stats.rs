use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

/// Standard percentile labels.
const PERCENTILE_P50: u64 = 50;
const PERCENTILE_P90: u64 = 90;
const PERCENTILE_P99: u64 = 99;
/// Rounding offset for percentile selection.
const PERCENTILE_ROUNDING: u64 = 50;
const PERCENT_DIVISOR: u64 = 100;

/// Why one iteration counted as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureReason {
    Source,
    Mapping,
    Transport,
    Timeout,
    Status(u16),
    Panic,
}

impl FailureReason {
    pub(crate) fn label(self) -> String {
        match self {
            FailureReason::Source => "source".to_owned(),
            FailureReason::Mapping => "mapping".to_owned(),
            FailureReason::Transport => "transport".to_owned(),
            FailureReason::Timeout => "timeout".to_owned(),
            FailureReason::Status(code) => format!("status {}", code),
            FailureReason::Panic => "panic".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success,
    Failure(FailureReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IterationRecord {
    pub(crate) elapsed_ms: u64,
    pub(crate) outcome: Outcome,
}

/// Aggregate outcome of one load test run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Per-iteration elapsed time, in submission order.
    pub response_times_ms: Vec<u64>,
    pub avg_response_time_ms: u64,
    pub min_response_time_ms: u64,
    pub max_response_time_ms: u64,
    pub p50_response_time_ms: u64,
    pub p90_response_time_ms: u64,
    pub p99_response_time_ms: u64,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
    /// Failed iterations per cause.
    pub failures: BTreeMap<String, u64>,
}

/// Folds iteration records into a [`RunResult`]. Owned by a single task, so
/// every record is counted exactly once.
#[derive(Debug, Default)]
pub(crate) struct RunAccumulator {
    successful: u64,
    failed: u64,
    response_times_ms: Vec<u64>,
    failures: BTreeMap<String, u64>,
}

impl RunAccumulator {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            response_times_ms: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, record: IterationRecord) {
        self.response_times_ms.push(record.elapsed_ms);
        match record.outcome {
            Outcome::Success => {
                self.successful = self.successful.saturating_add(1);
            }
            Outcome::Failure(reason) => {
                self.failed = self.failed.saturating_add(1);
                let count = self.failures.entry(reason.label()).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
    }

    pub(crate) fn finish(self, duration: Duration) -> RunResult {
        let total = self.response_times_ms.len() as u64;
        let sum = self
            .response_times_ms
            .iter()
            .fold(0_u64, |acc, value| acc.saturating_add(*value));
        let mut sorted = self.response_times_ms.clone();
        sorted.sort_unstable();

        RunResult {
            total_requests: total,
            successful_requests: self.successful,
            failed_requests: self.failed,
            avg_response_time_ms: sum.checked_div(total).unwrap_or(0),
            min_response_time_ms: sorted.first().copied().unwrap_or(0),
            max_response_time_ms: sorted.last().copied().unwrap_or(0),
            p50_response_time_ms: percentile(&sorted, PERCENTILE_P50),
            p90_response_time_ms: percentile(&sorted, PERCENTILE_P90),
            p99_response_time_ms: percentile(&sorted, PERCENTILE_P99),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            response_times_ms: self.response_times_ms,
            failures: self.failures,
        }
    }
}

/// Nearest-rank percentile over an ascending slice.
pub(crate) fn percentile(values: &[u64], percentile: u64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let count = values.len().saturating_sub(1) as u64;
    let index = percentile
        .saturating_mul(count)
        .saturating_add(PERCENTILE_ROUNDING)
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0);
    let idx = usize::try_from(index).unwrap_or_else(|_| values.len().saturating_sub(1));
    *values.get(idx).unwrap_or(&0)
}
