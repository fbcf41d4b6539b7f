use anyhow::Result;
use hdrhistogram::Histogram;

/// Lowest latency tracked at full precision, in microseconds.
pub const MIN_TRACKABLE_MICROS: u64 = 1;
/// Highest recordable latency in microseconds; larger samples are clamped.
pub const MAX_TRACKABLE_MICROS: u64 = 10_000_000;
/// Significant decimal digits preserved by the histogram bucketing.
pub const SIGNIFICANT_FIGURES: u8 = 3;

/// Latency recorder backed by an HDR histogram.
///
/// Not safe for concurrent mutation: callers serialize `record` through a
/// single shared lock and read statistics only after every writer is done.
pub struct LatencyRecorder {
    hist: Histogram<u64>,
}

impl LatencyRecorder {
    pub fn new() -> Result<Self> {
        let hist = Histogram::new_with_bounds(
            MIN_TRACKABLE_MICROS,
            MAX_TRACKABLE_MICROS,
            SIGNIFICANT_FIGURES,
        )?;
        Ok(Self { hist })
    }

    /// Record one latency sample in microseconds. Samples outside the
    /// trackable range are clamped to its bounds, never dropped.
    pub fn record(&mut self, micros: u64) {
        self.hist.saturating_record(micros);
    }

    pub fn len(&self) -> u64 {
        self.hist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hist.is_empty()
    }

    pub fn min(&self) -> u64 {
        self.hist.min()
    }

    pub fn max(&self) -> u64 {
        self.hist.max()
    }

    pub fn mean(&self) -> f64 {
        self.hist.mean()
    }

    /// Latency value below which the given fraction of samples fall.
    pub fn value_at_quantile(&self, quantile: f64) -> u64 {
        self.hist.value_at_quantile(quantile)
    }

    /// Snapshot of the distribution. Every statistic is zero when no
    /// samples have been recorded.
    pub fn summary(&self) -> LatencySummary {
        LatencySummary {
            samples: self.hist.len(),
            min: self.hist.min(),
            max: self.hist.max(),
            mean: self.hist.mean(),
            p50: self.hist.value_at_quantile(0.50),
            p90: self.hist.value_at_quantile(0.90),
            p99: self.hist.value_at_quantile(0.99),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    pub samples: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sample_collapses_all_statistics() {
        let mut recorder = LatencyRecorder::new().unwrap();
        recorder.record(500);

        let summary = recorder.summary();
        assert_eq!(summary.samples, 1);
        assert_eq!(summary.min, 500);
        assert_eq!(summary.max, 500);
        assert!((summary.mean - 500.0).abs() < 1e-9);
        assert_eq!(summary.p50, 500);
        assert_eq!(summary.p90, 500);
        assert_eq!(summary.p99, 500);
    }

    #[test]
    fn test_empty_recorder_reports_zeros() {
        let recorder = LatencyRecorder::new().unwrap();

        assert!(recorder.is_empty());
        let summary = recorder.summary();
        assert_eq!(summary.samples, 0);
        assert_eq!(summary.min, 0);
        assert_eq!(summary.max, 0);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.p50, 0);
        assert_eq!(summary.p99, 0);
    }

    #[test]
    fn test_quantiles_are_monotonic() {
        let mut recorder = LatencyRecorder::new().unwrap();
        for micros in [120, 340, 340, 2_500, 48_000, 950_000, 9_800_000] {
            recorder.record(micros);
        }

        let s = recorder.summary();
        assert!(s.min <= s.p50);
        assert!(s.p50 <= s.p90);
        assert!(s.p90 <= s.p99);
        assert!(s.p99 <= s.max);
        assert!(s.min as f64 <= s.mean);
        assert!(s.mean <= s.max as f64);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let samples = [800u64, 120, 5_000, 120, 33_000, 700, 9_999];

        let mut forward = LatencyRecorder::new().unwrap();
        for &v in samples.iter() {
            forward.record(v);
        }

        let mut reversed = LatencyRecorder::new().unwrap();
        for &v in samples.iter().rev() {
            reversed.record(v);
        }

        assert_eq!(forward.summary(), reversed.summary());
    }

    #[test]
    fn test_out_of_range_sample_is_clamped() {
        let mut recorder = LatencyRecorder::new().unwrap();
        recorder.record(25_000_000);

        assert_eq!(recorder.len(), 1);
        // Clamped to the histogram ceiling, within its 3-significant-figure
        // equivalence range.
        assert!(recorder.max() >= MAX_TRACKABLE_MICROS);
        assert!(recorder.max() < MAX_TRACKABLE_MICROS + 20_000);
    }

    #[test]
    fn test_percentiles_split_a_spread() {
        let mut recorder = LatencyRecorder::new().unwrap();
        for _ in 0..50 {
            recorder.record(100);
        }
        for _ in 0..30 {
            recorder.record(200);
        }
        for _ in 0..20 {
            recorder.record(500);
        }

        assert_eq!(recorder.len(), 100);
        let s = recorder.summary();
        assert_eq!(s.min, 100);
        assert_eq!(s.max, 500);
        assert!(s.p50 <= 200, "p50 should be at most 200, got {}", s.p50);
        assert!(s.p99 >= 200, "p99 should be at least 200, got {}", s.p99);
    }
}
