use super::score::{round2, DASH};

/// Course default mapping from parallel efficiency to the share of
/// performance points, highest threshold first.
pub const DEFAULT_SCALE: [(f64, f64); 10] = [
    (0.50, 1.0),
    (0.45, 0.9),
    (0.42, 0.8),
    (0.40, 0.7),
    (0.37, 0.6),
    (0.35, 0.5),
    (0.32, 0.4),
    (0.30, 0.3),
    (0.27, 0.2),
    (0.25, 0.1),
];

/// Measured speedup and efficiency of a parallel implementation against
/// the sequential reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Metrics {
    pub efficiency: Option<f64>,
    pub acceleration_display: String,
    pub efficiency_display: String,
}

impl Metrics {
    fn undefined() -> Self {
        Metrics {
            efficiency: None,
            acceleration_display: DASH.to_owned(),
            efficiency_display: DASH.to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EfficiencyPolicy {
    pub num_proc: u32,
    /// `(threshold, percent)` pairs, expected in descending threshold order.
    pub scale: Vec<(f64, f64)>,
}

impl Default for EfficiencyPolicy {
    fn default() -> Self {
        EfficiencyPolicy {
            num_proc: 1,
            scale: DEFAULT_SCALE.to_vec(),
        }
    }
}

fn valid_time(time: Option<f64>) -> Option<f64> {
    time.filter(|t| t.is_finite() && *t > 0.0)
}

impl EfficiencyPolicy {
    pub fn metrics(&self, parallel_time: Option<f64>, seq_time: Option<f64>) -> Metrics {
        let (Some(parallel), Some(seq)) = (valid_time(parallel_time), valid_time(seq_time)) else {
            return Metrics::undefined();
        };
        let speedup = seq / parallel;
        let efficiency = speedup / f64::from(self.num_proc.max(1));
        Metrics {
            efficiency: Some(efficiency),
            acceleration_display: format!("{speedup:.2}"),
            efficiency_display: format!("{efficiency:.2}"),
        }
    }

    /// Performance points earned for `efficiency` out of `max_points`. The
    /// first threshold met (inclusive) wins; nothing met yields zero.
    pub fn points(&self, efficiency: Option<f64>, max_points: u32) -> f64 {
        let Some(efficiency) = efficiency else {
            return 0.0;
        };
        if max_points == 0 {
            return 0.0;
        }
        self.scale
            .iter()
            .find(|&&(threshold, _)| efficiency >= threshold)
            .map_or(0.0, |&(_, percent)| round2(f64::from(max_points) * percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn policy() -> EfficiencyPolicy {
        EfficiencyPolicy {
            num_proc: 4,
            scale: vec![(0.5, 1.0), (0.25, 0.5)],
        }
    }

    #[test]
    fn test_metrics() {
        let m = policy().metrics(Some(2.0), Some(8.0));
        assert_eq!(m.efficiency, Some(1.0));
        assert_eq!(m.acceleration_display, "4.00");
        assert_eq!(m.efficiency_display, "1.00");
    }

    #[test]
    fn test_metrics_invalid_times() {
        let p = policy();
        assert_eq!(p.metrics(None, Some(8.0)).efficiency, None);
        assert_eq!(p.metrics(Some(2.0), None).efficiency, None);
        assert_eq!(p.metrics(Some(0.0), Some(8.0)).efficiency, None);
        assert_eq!(p.metrics(Some(2.0), Some(-1.0)).efficiency, None);
        assert_eq!(p.metrics(Some(f64::NAN), Some(8.0)).efficiency, None);
        assert_eq!(p.metrics(Some(f64::INFINITY), Some(8.0)).efficiency, None);
        assert_eq!(p.metrics(None, None).acceleration_display, DASH);
    }

    #[test]
    fn test_zero_num_proc_is_treated_as_one() {
        let p = EfficiencyPolicy {
            num_proc: 0,
            ..policy()
        };
        assert_eq!(p.metrics(Some(4.0), Some(8.0)).efficiency, Some(2.0));
    }

    #[test]
    fn test_points_step_function() {
        let p = policy();
        assert_eq!(p.points(Some(1.0), 10), 10.0);
        assert_eq!(p.points(Some(0.5), 10), 10.0);
        assert_eq!(p.points(Some(0.49), 10), 5.0);
        assert_eq!(p.points(Some(0.25), 10), 5.0);
        assert_eq!(p.points(Some(0.125), 10), 0.0);
        assert_eq!(p.points(None, 10), 0.0);
        assert_eq!(p.points(Some(1.0), 0), 0.0);
    }

    #[test]
    fn test_points_rounding() {
        let p = EfficiencyPolicy::default();
        assert_eq!(p.points(Some(0.44), 7), 5.6);
        assert_eq!(p.points(Some(0.26), 3), 0.3);
    }

    #[test]
    fn test_points_non_decreasing_in_efficiency() {
        let p = EfficiencyPolicy::default();
        let mut rng = rand::rng();
        let mut samples = (0..500)
            .map(|_| rng.random_range(0.0..1.5))
            .collect::<Vec<f64>>();
        samples.sort_by(f64::total_cmp);
        let points = samples
            .iter()
            .map(|&e| p.points(Some(e), 20))
            .collect::<Vec<_>>();
        assert!(points.windows(2).all(|w| w[0] <= w[1]));
    }
}
