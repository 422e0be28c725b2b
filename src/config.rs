//! Analysis thresholds and tunables
//! Passed explicitly into derivation calls; there is no ambient state.

use std::time::Duration;

/// Thresholds shared by every report.
///
/// `suspicious_rate_pct` is the single canonical cutoff for flagging a
/// driver or customer. Earlier reporting iterations disagreed on the value
/// (10 in some, 15 in others); it is one knob here so every surface ranks
/// entities the same way.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Complaint-rate cutoff (percent) for the suspicious flag.
    pub suspicious_rate_pct: f64,
    /// Minimum deliveries/orders before an entity can be flagged. Keeps
    /// one-off noise out of the rankings.
    pub suspicious_min_volume: u64,
    /// IQR multiplier for outlier bounds.
    pub anomaly_iqr_k: f64,
    /// Number of K-Means clusters for behavioral grouping.
    pub cluster_count: usize,
    /// Seed for K-Means initialization, fixed for reproducible runs.
    pub cluster_seed: u64,
    /// How long a loaded dataset may be served from cache.
    pub cache_ttl: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            suspicious_rate_pct: 10.0,
            suspicious_min_volume: 20,
            anomaly_iqr_k: 1.5,
            cluster_count: 3,
            cluster_seed: 42,
            cache_ttl: Duration::from_secs(600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AnalysisConfig::default();
        assert!(cfg.suspicious_rate_pct > 0.0);
        assert!(cfg.suspicious_min_volume > 0);
        assert_eq!(cfg.cluster_seed, 42);
    }
}
