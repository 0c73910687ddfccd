use crate::{
    data::SubjectDataset,
    error::{Result, SurvivalError},
};

/// one step of the product-limit curve, at a distinct observed time
#[derive(Debug, Clone)]
pub struct KaplanMeierPoint {
    pub time: f64,
    pub deaths_at_time: usize,
    pub censored_at_time: usize,
    /// risk set size just before this time
    pub at_risk_at_time: usize,
    /// S(t), the product-limit estimate
    pub survival_probability: f64,
    /// Greenwood standard error of S(t)
    pub standard_error: f64,
    /// S(t) - z * SE, plain normal approximation; not clamped to [0, 1]
    pub lower_ci: f64,
    /// S(t) + z * SE
    pub upper_ci: f64,
}

impl KaplanMeierPoint {
    /// 1 - S(t)
    pub fn cumulative_incidence(&self) -> f64 {
        1.0 - self.survival_probability
    }

    /// -ln S(t); infinite once the curve hits zero
    pub fn cumulative_hazard(&self) -> f64 {
        -self.survival_probability.ln()
    }
}

/// the fitted survival curve
#[derive(Debug, Clone)]
pub struct KaplanMeierCurve {
    /// one point per distinct observed time, ascending
    pub points: Vec<KaplanMeierPoint>,
    pub n_total: usize,
    pub n_events: usize,
    /// first time with S(t) <= 0.5, `None` if the curve never gets there
    pub median_survival: Option<f64>,
}

impl KaplanMeierCurve {
    /// S(t) evaluated anywhere: the step function is right-continuous, so
    /// this is the estimate at the last point at or before `time`
    pub fn survival_at(&self, time: f64) -> f64 {
        let mut survival = 1.0;
        for point in &self.points {
            if point.time > time {
                break;
            }
            survival = point.survival_probability;
        }
        survival
    }
}

/// nonparametric survival curve estimator
///
/// Updates at every distinct time present in the data rather than at fixed
/// intervals, so the result doesn't depend on anyone's bin-width choice.
/// Censoring shrinks the risk set for later steps but never drops the curve.
#[derive(Debug, Clone)]
pub struct KaplanMeierEstimator {
    critical_value: f64,
}

impl Default for KaplanMeierEstimator {
    fn default() -> Self {
        Self {
            critical_value: 1.96, // 95% two-sided normal
        }
    }
}

impl KaplanMeierEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// override the z used for the confidence band
    pub fn with_critical_value(mut self, z: f64) -> Self {
        self.critical_value = z;
        self
    }

    /// fit the curve to a dataset
    pub fn fit(&self, data: &SubjectDataset) -> Result<KaplanMeierCurve> {
        if data.is_empty() {
            return Err(SurvivalError::EmptyInput);
        }

        let sorted = data.sorted_by_time();
        let n = sorted.len();

        let mut points = Vec::new();
        let mut at_risk = n;
        let mut survival = 1.0;
        let mut greenwood_sum = 0.0;
        let mut n_events = 0;
        let mut median = None;

        let mut i = 0;
        while i < n {
            let time = sorted[i].time;

            let mut deaths = 0usize;
            let mut censored = 0usize;
            while i < n && sorted[i].time == time {
                if sorted[i].event {
                    deaths += 1;
                } else {
                    censored += 1;
                }
                i += 1;
            }
            n_events += deaths;

            // every subject at this time is still in the risk set, so
            // at_risk >= deaths + censored >= 1 here
            survival *= (at_risk - deaths) as f64 / at_risk as f64;

            // Greenwood term; a step that empties the risk set contributes
            // nothing (the denominator would be zero, and S is 0 anyway)
            if at_risk > deaths {
                greenwood_sum +=
                    deaths as f64 / (at_risk as f64 * (at_risk - deaths) as f64);
            }
            let standard_error = survival * greenwood_sum.sqrt();

            let half_width = self.critical_value * standard_error;
            points.push(KaplanMeierPoint {
                time,
                deaths_at_time: deaths,
                censored_at_time: censored,
                at_risk_at_time: at_risk,
                survival_probability: survival,
                standard_error,
                lower_ci: survival - half_width,
                upper_ci: survival + half_width,
            });

            if median.is_none() && survival <= 0.5 {
                median = Some(time);
            }

            at_risk -= deaths + censored;
        }

        Ok(KaplanMeierCurve {
            points,
            n_total: n,
            n_events,
            median_survival: median,
        })
    }
}
