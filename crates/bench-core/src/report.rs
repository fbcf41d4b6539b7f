use crate::recorder::LatencySummary;

/// Render the end-of-run latency report in its fixed six-line format.
pub fn render_report(summary: &LatencySummary) -> String {
    let mut out = String::new();
    out.push_str("Latency Distribution (microseconds):\n");
    out.push_str(&format!("Min: {} µs\n", summary.min));
    out.push_str(&format!("Max: {} µs\n", summary.max));
    out.push_str(&format!("Mean: {} µs\n", summary.mean));
    out.push_str(&format!("P50: {} µs\n", summary.p50));
    out.push_str(&format!("P90: {} µs\n", summary.p90));
    out.push_str(&format!("P99: {} µs", summary.p99));
    out
}
