//! Windowed classifiers: z-score and IQR

use serde::Serialize;

use crate::config::Method;
use crate::stats;

/// Statistics that justified a decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum WindowStats {
    ZScore {
        rolling_mean: f64,
        rolling_std: f64,
    },
    Iqr {
        q1: f64,
        q3: f64,
        lower_bound: f64,
        upper_bound: f64,
    },
}

/// Outcome for one evaluable point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub stats: WindowStats,
    pub score: f64,
    pub is_anomaly: bool,
}

/// Judges a value against the readings that came before it.
///
/// `window` holds the baseline only, never the value being judged.
pub trait WindowClassifier {
    fn classify(&self, window: &[f64], value: f64) -> Classification;
}

// Z-SCORE //

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScore {
    threshold: f64,
}

impl ZScore {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl WindowClassifier for ZScore {
    fn classify(&self, window: &[f64], value: f64) -> Classification {
        let rolling_mean = stats::mean(window);
        let rolling_std = stats::population_std(window, rolling_mean);

        // flat baseline: nothing to measure against
        let score = if rolling_std == 0.0 {
            0.0
        } else {
            stats::standardize(value, rolling_mean, rolling_std)
        };

        Classification {
            stats: WindowStats::ZScore {
                rolling_mean,
                rolling_std,
            },
            score,
            is_anomaly: rolling_std > 0.0 && score.abs() > self.threshold,
        }
    }
}

// IQR //

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Iqr {
    k: f64,
}

impl Iqr {
    pub fn new(k: f64) -> Self {
        Self { k }
    }
}

impl WindowClassifier for Iqr {
    fn classify(&self, window: &[f64], value: f64) -> Classification {
        let sorted = stats::sorted(window);
        let q1 = stats::quantile_sorted(&sorted, 0.25);
        let q3 = stats::quantile_sorted(&sorted, 0.75);
        let width = q3 - q1;

        let lower_bound = q1 - self.k * width;
        let upper_bound = q3 + self.k * width;

        // signed distance to whichever fence was crossed
        let score = if width == 0.0 {
            0.0
        } else if value > upper_bound {
            value - upper_bound
        } else if value < lower_bound {
            value - lower_bound
        } else {
            0.0
        };

        Classification {
            stats: WindowStats::Iqr {
                q1,
                q3,
                lower_bound,
                upper_bound,
            },
            score,
            is_anomaly: score != 0.0,
        }
    }
}

// STRATEGY //

/// The detection strategy selected for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    ZScore(ZScore),
    Iqr(Iqr),
}

impl Strategy {
    pub fn new(method: Method, threshold: f64) -> Self {
        match method {
            Method::ZScore => Strategy::ZScore(ZScore::new(threshold)),
            Method::Iqr => Strategy::Iqr(Iqr::new(threshold)),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Strategy::ZScore(_) => Method::ZScore,
            Strategy::Iqr(_) => Method::Iqr,
        }
    }
}

impl WindowClassifier for Strategy {
    fn classify(&self, window: &[f64], value: f64) -> Classification {
        match self {
            Strategy::ZScore(z) => z.classify(window, value),
            Strategy::Iqr(iqr) => iqr.classify(window, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zscore_flags_large_deviation() {
        let c = ZScore::new(1.5).classify(&[10.0, 12.0, 11.0], 50.0);
        assert!(c.is_anomaly);
        assert!((c.score - 47.765).abs() < 0.01);
    }

    #[test]
    fn test_zscore_near_float_max() {
        let c = ZScore::new(3.0).classify(&[1e308, 1.5e308, 1e308, 1.5e308], -1e308);
        assert!(c.score.is_finite());
        assert!((c.score + 9.0).abs() < 1e-9);
        assert!(c.is_anomaly);
    }

    #[test]
    fn test_zscore_threshold_is_strict() {
        // mean 0, std 1 => score exactly 2
        let c = ZScore::new(2.0).classify(&[-1.0, 1.0], 2.0);
        assert_eq!(c.score, 2.0);
        assert!(!c.is_anomaly);
    }

    #[test]
    fn test_iqr_bounds_and_signed_score() {
        let iqr = Iqr::new(1.5);
        let window = [4.0, 1.0, 3.0, 2.0];

        let above = iqr.classify(&window, 10.0);
        assert_eq!(
            above.stats,
            WindowStats::Iqr {
                q1: 1.75,
                q3: 3.25,
                lower_bound: -0.5,
                upper_bound: 5.5,
            }
        );
        assert!(above.is_anomaly);
        assert_eq!(above.score, 4.5);

        let below = iqr.classify(&window, -2.0);
        assert!(below.is_anomaly);
        assert_eq!(below.score, -1.5);

        // sitting on the fence is not outside it
        let edge = iqr.classify(&window, 5.5);
        assert!(!edge.is_anomaly);
        assert_eq!(edge.score, 0.0);
    }

    #[test]
    fn test_iqr_zero_width_never_flags() {
        // quartiles coincide even though the window is not constant
        let c = Iqr::new(1.5).classify(&[1.0, 5.0, 5.0, 5.0, 9.0], 1000.0);
        assert!(!c.is_anomaly);
        assert_eq!(c.score, 0.0);
    }

    #[test]
    fn test_strategy_dispatch() {
        assert_eq!(Strategy::new(Method::Iqr, 1.5).method(), Method::Iqr);
        let s = Strategy::new(Method::ZScore, 3.0);
        assert!(matches!(
            s.classify(&[1.0, 2.0, 3.0], 2.0).stats,
            WindowStats::ZScore { .. }
        ));
    }
}
