use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::{
    data::SubjectDataset,
    error::{Result, SurvivalError},
};

/// per-group tallies of the log-rank comparison
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub label: String,
    /// group size
    pub n: usize,
    pub observed_deaths: f64,
    /// deaths the group would have seen under identical hazards,
    /// allocated in proportion to its share of the risk set
    pub expected_deaths: f64,
}

/// result of the log-rank test
#[derive(Debug, Clone)]
pub struct LogRankResult {
    pub groups: Vec<GroupSummary>,
    pub chi_square: f64,
    /// groups - 1
    pub degrees_of_freedom: usize,
    /// upper-tail chi-square probability
    pub p_value: f64,
}

/// compare survival between the dataset's groups
///
/// Subjects carry their own group label (assignment is the caller's problem,
/// e.g. a threshold rule on age); subjects without a label sit out the
/// comparison. Two groups use the pooled hypergeometric variance; for more
/// than two the statistic falls back to the usual sum of
/// `(observed - expected)^2 / expected`.
pub fn log_rank_test(data: &SubjectDataset) -> Result<LogRankResult> {
    if data.is_empty() {
        return Err(SurvivalError::EmptyInput);
    }

    let labels = data.groups();
    let n_groups = labels.len();
    if n_groups < 2 {
        return Err(SurvivalError::InsufficientGroups { found: n_groups });
    }

    let group_index = |subject_group: &str| -> usize {
        labels.iter().position(|l| l == subject_group).unwrap()
    };

    // grouped subjects sorted by time; the ungrouped never enter a risk set
    let mut rows: Vec<(f64, bool, usize)> = data
        .subjects()
        .iter()
        .filter_map(|s| s.group.as_deref().map(|g| (s.time, s.event, group_index(g))))
        .collect();
    rows.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    let mut at_risk = vec![0usize; n_groups];
    let mut group_n = vec![0usize; n_groups];
    for &(_, _, g) in &rows {
        at_risk[g] += 1;
        group_n[g] += 1;
    }

    let mut observed = vec![0.0f64; n_groups];
    let mut expected = vec![0.0f64; n_groups];
    let mut variance = 0.0f64;

    let n = rows.len();
    let mut i = 0;
    while i < n {
        let time = rows[i].0;

        let mut deaths = vec![0usize; n_groups];
        let mut removed = vec![0usize; n_groups];
        let mut deaths_total = 0usize;
        while i < n && rows[i].0 == time {
            let (_, event, g) = rows[i];
            if event {
                deaths[g] += 1;
                deaths_total += 1;
            }
            removed[g] += 1;
            i += 1;
        }

        let at_risk_total: usize = at_risk.iter().sum();

        if deaths_total > 0 && at_risk_total > 0 {
            let d = deaths_total as f64;
            let nt = at_risk_total as f64;

            for g in 0..n_groups {
                observed[g] += deaths[g] as f64;
                expected[g] += d * at_risk[g] as f64 / nt;
            }

            // hypergeometric variance of the group-0 death count; only
            // meaningful when more than one subject is at risk
            if at_risk_total > 1 && n_groups == 2 {
                let n1 = at_risk[0] as f64;
                let n2 = at_risk[1] as f64;
                variance += n1 * n2 * d * (nt - d) / (nt * nt * (nt - 1.0));
            }
        }

        for g in 0..n_groups {
            at_risk[g] -= removed[g];
        }
    }

    let chi_square = if n_groups == 2 {
        if variance > 0.0 {
            (observed[0] - expected[0]).powi(2) / variance
        } else {
            // no deaths anywhere: the null is trivially unchallenged
            0.0
        }
    } else {
        let mut statistic = 0.0;
        for g in 0..n_groups {
            if expected[g] > 0.0 {
                statistic += (observed[g] - expected[g]).powi(2) / expected[g];
            }
        }
        statistic
    };

    let degrees_of_freedom = n_groups - 1;
    let chi_dist = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| SurvivalError::numerical(format!("chi-square distribution: {e}")))?;
    let p_value = 1.0 - chi_dist.cdf(chi_square);

    let groups = labels
        .into_iter()
        .enumerate()
        .map(|(g, label)| GroupSummary {
            label,
            n: group_n[g],
            observed_deaths: observed[g],
            expected_deaths: expected[g],
        })
        .collect();

    Ok(LogRankResult {
        groups,
        chi_square,
        degrees_of_freedom,
        p_value,
    })
}
