use crate::{
    data::SubjectDataset,
    error::{Result, SurvivalError},
};

/// one row of the actuarial life table
///
/// Intervals are half-open `[lower, upper)`; the last interval additionally
/// swallows everything at or above its lower bound, so a subject exactly at
/// the final boundary still lands in a row.
#[derive(Debug, Clone)]
pub struct RiskSetInterval {
    pub lower: f64,
    pub upper: f64,
    /// N_t - subjects entering the interval event-free and uncensored
    pub at_risk_start: usize,
    /// D_t - deaths inside the interval
    pub deaths: usize,
    /// C_t - censorings inside the interval
    pub censored: usize,
    /// N_t* = N_t - C_t/2, censoring assumed uniform within the interval
    pub effective_at_risk: f64,
    /// q_t = D_t / N_t*
    pub hazard_fraction: f64,
    /// p_t = 1 - q_t
    pub survival_fraction: f64,
    /// S_t = product of p_i for i <= t
    pub cumulative_survival: f64,
    /// nobody left at risk - the hazard is reported as 0 but means nothing
    pub undefined: bool,
}

/// groups subjects into caller-supplied time intervals
///
/// The interval partition is configuration, not a law of the method: pick
/// boundaries with [`LifeTableBuilder::new`] or let
/// [`LifeTableBuilder::equal_width`] split a range evenly.
#[derive(Debug, Clone)]
pub struct LifeTableBuilder {
    boundaries: Vec<f64>,
}

impl LifeTableBuilder {
    /// new builder from explicit boundaries `b0 < b1 < ... < bk`
    pub fn new(boundaries: Vec<f64>) -> Result<Self> {
        if boundaries.len() < 2 {
            return Err(SurvivalError::invalid_boundaries(
                "need at least 2 boundaries for 1 interval",
            ));
        }
        if boundaries.iter().any(|b| !b.is_finite()) {
            return Err(SurvivalError::invalid_boundaries(
                "boundaries must be finite",
            ));
        }
        for pair in boundaries.windows(2) {
            if pair[0] >= pair[1] {
                return Err(SurvivalError::invalid_boundaries(format!(
                    "boundaries must be strictly increasing, got {} then {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { boundaries })
    }

    /// evenly split `[lower, upper]` into `bins` intervals
    pub fn equal_width(lower: f64, upper: f64, bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(SurvivalError::invalid_boundaries("bins must be > 0"));
        }
        if !(lower.is_finite() && upper.is_finite()) || lower >= upper {
            return Err(SurvivalError::invalid_boundaries(format!(
                "bad range [{lower}, {upper}]"
            )));
        }
        let width = (upper - lower) / bins as f64;
        let mut boundaries: Vec<f64> = (0..bins).map(|i| lower + i as f64 * width).collect();
        boundaries.push(upper); // exact, avoids fp drift on the top end
        Self::new(boundaries)
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// build the life table, one row per interval in boundary order
    pub fn build(&self, data: &SubjectDataset) -> Result<Vec<RiskSetInterval>> {
        if data.is_empty() {
            return Err(SurvivalError::EmptyInput);
        }

        // times below b0 would silently fall out of the risk-set recurrence
        let min_time = data.min_time().unwrap_or(0.0);
        if min_time < self.boundaries[0] {
            return Err(SurvivalError::invalid_boundaries(format!(
                "first boundary {} is above the earliest observed time {min_time}",
                self.boundaries[0]
            )));
        }

        let n_intervals = self.boundaries.len() - 1;
        let mut rows = Vec::with_capacity(n_intervals);

        let mut at_risk = data.len();
        let mut cumulative_survival = 1.0;

        for i in 0..n_intervals {
            let lower = self.boundaries[i];
            let upper = self.boundaries[i + 1];
            let last = i == n_intervals - 1;

            let in_interval = |t: f64| {
                if last {
                    t >= lower // closed tail, no upper cap
                } else {
                    t >= lower && t < upper
                }
            };

            let mut deaths = 0usize;
            let mut censored = 0usize;
            for subject in data.subjects() {
                if in_interval(subject.time) {
                    if subject.event {
                        deaths += 1;
                    } else {
                        censored += 1;
                    }
                }
            }

            // half the censored are assumed gone before the deaths happen
            let effective_at_risk = at_risk as f64 - censored as f64 / 2.0;

            let (hazard_fraction, undefined) = if effective_at_risk > 0.0 {
                (deaths as f64 / effective_at_risk, false)
            } else {
                // empty tail interval - a valid row, not an error
                (0.0, true)
            };

            let survival_fraction = 1.0 - hazard_fraction;
            cumulative_survival *= survival_fraction;

            rows.push(RiskSetInterval {
                lower,
                upper,
                at_risk_start: at_risk,
                deaths,
                censored,
                effective_at_risk,
                hazard_fraction,
                survival_fraction,
                cumulative_survival,
                undefined,
            });

            at_risk -= deaths + censored;
        }

        Ok(rows)
    }
}
