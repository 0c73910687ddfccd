use std::collections::HashMap;

use ndarray::Array2;

use crate::error::{Result, SurvivalError};

/// one record of censored time-to-event data
#[derive(Debug, Clone)]
pub struct Subject {
    /// time to event or censoring (days)
    pub time: f64,
    /// true = event (death) observed, false = censored
    pub event: bool,
    /// named covariates; `None` marks a recorded-but-missing value
    pub covariates: HashMap<String, Option<f64>>,
    /// categorical label for stratified comparisons (age-band, sex, ...)
    pub group: Option<String>,
}

impl Subject {
    /// new subject with no covariates and no group
    pub fn new(time: f64, event: bool) -> Self {
        Self {
            time,
            event,
            covariates: HashMap::new(),
            group: None,
        }
    }

    /// attach a covariate; pass `None` for a missing measurement
    pub fn with_covariate(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        self.covariates.insert(name.into(), value);
        self
    }

    /// attach a group label
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// covariate value, `None` if absent or recorded as missing
    pub fn covariate(&self, name: &str) -> Option<f64> {
        self.covariates.get(name).copied().flatten()
    }
}

/// validated collection of subjects - the common input of every estimator
#[derive(Debug, Clone)]
pub struct SubjectDataset {
    subjects: Vec<Subject>,
}

impl SubjectDataset {
    /// build a dataset, validating every row
    ///
    /// Rejects negative or non-finite times. Rows with missing covariates or
    /// no group label are kept: each estimator decides per-field what it
    /// tolerates.
    pub fn new(subjects: Vec<Subject>) -> Result<Self> {
        for (i, subject) in subjects.iter().enumerate() {
            if !subject.time.is_finite() {
                return Err(SurvivalError::validation(format!(
                    "non-finite time at row {i}"
                )));
            }
            if subject.time < 0.0 {
                return Err(SurvivalError::validation(format!(
                    "negative time {} at row {i}",
                    subject.time
                )));
            }
        }
        Ok(Self { subjects })
    }

    /// how many subjects
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// how many observed events (deaths)
    pub fn n_events(&self) -> usize {
        self.subjects.iter().filter(|s| s.event).count()
    }

    /// subjects carrying exactly this group label
    pub fn filter_by_group(&self, group: &str) -> Self {
        let subjects = self
            .subjects
            .iter()
            .filter(|s| s.group.as_deref() == Some(group))
            .cloned()
            .collect();
        // rows were validated at construction
        Self { subjects }
    }

    /// subjects with `lower <= time < upper`, optionally restricted by event flag
    pub fn filter_by_time_range(&self, lower: f64, upper: f64, event: Option<bool>) -> Self {
        let subjects = self
            .subjects
            .iter()
            .filter(|s| s.time >= lower && s.time < upper)
            .filter(|s| event.map_or(true, |e| s.event == e))
            .cloned()
            .collect();
        Self { subjects }
    }

    /// references to all subjects, ascending by time
    pub fn sorted_by_time(&self) -> Vec<&Subject> {
        let mut refs: Vec<&Subject> = self.subjects.iter().collect();
        refs.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap());
        refs
    }

    /// distinct observed time values, ascending
    pub fn distinct_times(&self) -> Vec<f64> {
        let mut times: Vec<f64> = self.subjects.iter().map(|s| s.time).collect();
        times.sort_by(|a, b| a.partial_cmp(b).unwrap());
        times.dedup();
        times
    }

    pub fn min_time(&self) -> Option<f64> {
        self.subjects
            .iter()
            .map(|s| s.time)
            .min_by(|a, b| a.partial_cmp(b).unwrap())
    }

    pub fn max_time(&self) -> Option<f64> {
        self.subjects
            .iter()
            .map(|s| s.time)
            .max_by(|a, b| a.partial_cmp(b).unwrap())
    }

    /// distinct group labels in first-seen order (ungrouped subjects skipped)
    pub fn groups(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for subject in &self.subjects {
            if let Some(group) = &subject.group {
                if !labels.iter().any(|l| l == group) {
                    labels.push(group.clone());
                }
            }
        }
        labels
    }

    /// complete-case covariate matrix for handing off to an external cox solver
    ///
    /// Keeps only rows where every named covariate is present; a row missing
    /// any of them is excluded whole. Returns the matrix (kept rows ×
    /// `names.len()`, in `names` order) together with the kept row indices so
    /// the caller can line fitted values back up with the dataset.
    pub fn covariate_matrix(&self, names: &[&str]) -> Result<(Array2<f64>, Vec<usize>)> {
        if self.subjects.is_empty() {
            return Err(SurvivalError::EmptyInput);
        }

        let mut kept = Vec::new();
        let mut values = Vec::new();

        'rows: for (i, subject) in self.subjects.iter().enumerate() {
            let mut row = Vec::with_capacity(names.len());
            for &name in names {
                match subject.covariate(name) {
                    Some(v) => row.push(v),
                    None => continue 'rows,
                }
            }
            kept.push(i);
            values.extend(row);
        }

        let matrix = Array2::from_shape_vec((kept.len(), names.len()), values)
            .map_err(|e| SurvivalError::numerical(format!("covariate matrix shape: {e}")))?;

        Ok((matrix, kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lung_subjects() -> Vec<Subject> {
        vec![
            Subject::new(5.0, true)
                .with_covariate("age", Some(64.0))
                .with_group("old"),
            Subject::new(10.0, false)
                .with_covariate("age", Some(51.0))
                .with_group("young"),
            Subject::new(15.0, true)
                .with_covariate("age", None)
                .with_group("old"),
        ]
    }

    #[test]
    fn test_dataset_creation() {
        let data = SubjectDataset::new(lung_subjects()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.n_events(), 2);
        assert_eq!(data.min_time(), Some(5.0));
        assert_eq!(data.max_time(), Some(15.0));
    }

    #[test]
    fn test_negative_time_rejected() {
        let subjects = vec![Subject::new(-1.0, true)];
        assert!(SubjectDataset::new(subjects).is_err());
    }

    #[test]
    fn test_nan_time_rejected() {
        let subjects = vec![Subject::new(f64::NAN, false)];
        assert!(SubjectDataset::new(subjects).is_err());
    }

    #[test]
    fn test_zero_time_allowed() {
        let subjects = vec![Subject::new(0.0, true)];
        assert!(SubjectDataset::new(subjects).is_ok());
    }

    #[test]
    fn test_missing_covariate_row_kept() {
        let data = SubjectDataset::new(lung_subjects()).unwrap();
        // row with a missing age still counts as a subject
        assert_eq!(data.len(), 3);
        assert_eq!(data.subjects()[2].covariate("age"), None);
    }

    #[test]
    fn test_filter_by_group() {
        let data = SubjectDataset::new(lung_subjects()).unwrap();
        let old = data.filter_by_group("old");
        assert_eq!(old.len(), 2);
        assert!(old.subjects().iter().all(|s| s.group.as_deref() == Some("old")));
    }

    #[test]
    fn test_filter_by_time_range() {
        let data = SubjectDataset::new(lung_subjects()).unwrap();
        // half-open range: time=15 excluded
        let mid = data.filter_by_time_range(5.0, 15.0, None);
        assert_eq!(mid.len(), 2);

        let deaths = data.filter_by_time_range(0.0, 20.0, Some(true));
        assert_eq!(deaths.len(), 2);
    }

    #[test]
    fn test_sorted_by_time() {
        let mut subjects = lung_subjects();
        subjects.reverse();
        let data = SubjectDataset::new(subjects).unwrap();
        let sorted = data.sorted_by_time();
        assert_eq!(sorted[0].time, 5.0);
        assert_eq!(sorted[1].time, 10.0);
        assert_eq!(sorted[2].time, 15.0);
    }

    #[test]
    fn test_distinct_times_dedups() {
        let subjects = vec![
            Subject::new(3.0, true),
            Subject::new(3.0, false),
            Subject::new(7.0, true),
        ];
        let data = SubjectDataset::new(subjects).unwrap();
        assert_eq!(data.distinct_times(), vec![3.0, 7.0]);
    }

    #[test]
    fn test_groups_first_seen_order() {
        let data = SubjectDataset::new(lung_subjects()).unwrap();
        assert_eq!(data.groups(), vec!["old".to_string(), "young".to_string()]);
    }

    #[test]
    fn test_covariate_matrix_complete_case() {
        let data = SubjectDataset::new(lung_subjects()).unwrap();
        let (matrix, kept) = data.covariate_matrix(&["age"]).unwrap();

        // the row with the missing age drops out whole
        assert_eq!(kept, vec![0, 1]);
        assert_eq!(matrix.nrows(), 2);
        assert_eq!(matrix[[0, 0]], 64.0);
        assert_eq!(matrix[[1, 0]], 51.0);
    }

    #[test]
    fn test_covariate_matrix_unknown_name_drops_all() {
        let data = SubjectDataset::new(lung_subjects()).unwrap();
        let (matrix, kept) = data.covariate_matrix(&["weight_loss"]).unwrap();
        assert!(kept.is_empty());
        assert_eq!(matrix.nrows(), 0);
    }
}
