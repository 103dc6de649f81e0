use crate::args::OutputFormat;
use crate::error::AppResult;
use crate::runner::RunResult;

/// Renders the final summary in the requested format.
///
/// # Errors
///
/// Returns an error when JSON serialization fails.
pub(crate) fn render_summary(result: &RunResult, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Text => Ok(summary_lines(result).join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
    }
}

pub(crate) fn summary_lines(result: &RunResult) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Duration: {}ms", result.duration_ms));
    lines.push(format!("Total Requests: {}", result.total_requests));
    lines.push(format!("Successful: {}", result.successful_requests));
    lines.push(format!("Failed: {}", result.failed_requests));
    lines.push(format!("Avg Response Time: {}ms", result.avg_response_time_ms));
    lines.push(format!(
        "Min/Max Response Time: {}ms / {}ms",
        result.min_response_time_ms, result.max_response_time_ms
    ));
    lines.push(format!(
        "P50/P90/P99 Response Time: {}ms / {}ms / {}ms",
        result.p50_response_time_ms, result.p90_response_time_ms, result.p99_response_time_ms
    ));
    if !result.failures.is_empty() {
        lines.push("Failures:".to_owned());
        for (reason, count) in &result.failures {
            lines.push(format!("  {}: {}", reason, count));
        }
    }
    lines
}
