//! # survival stats
//!
//! life tables, kaplan-meier curves, and log-rank tests over censored
//! time-to-event data - the from-first-principles core of a survival
//! analysis, with no plotting or I/O attached
//!
//! ## what you get
//!
//! - a validated subject dataset that tolerates missing covariates
//! - actuarial life tables over caller-chosen interval boundaries
//! - the product-limit estimator w/ greenwood standard errors
//! - the log-rank test w/ chi-square p-values
//! - a complete-case covariate matrix for handing to an external cox solver
//!
//! ## quick start
//!
//! ```rust
//! use survival_stats::{KaplanMeierEstimator, Subject, SubjectDataset};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // a tiny cohort: two deaths, one censored
//! let data = SubjectDataset::new(vec![
//!     Subject::new(5.0, true),   // died at day 5
//!     Subject::new(10.0, false), // left the study at day 10
//!     Subject::new(15.0, true),  // died at day 15
//! ])?;
//!
//! let curve = KaplanMeierEstimator::new().fit(&data)?;
//! assert_eq!(curve.points.len(), 3);
//! assert!(curve.points[0].survival_probability < 1.0);
//! # Ok(())
//! # }
//! ```
//!
//! Every estimator is a pure function of the dataset: same input, same
//! output, nothing mutated, nothing retained.

pub mod data;
pub mod error;
pub mod kaplan_meier;
pub mod life_table;
pub mod log_rank;

pub use data::{Subject, SubjectDataset};
pub use error::{Result, SurvivalError};
pub use kaplan_meier::{KaplanMeierCurve, KaplanMeierEstimator, KaplanMeierPoint};
pub use life_table::{LifeTableBuilder, RiskSetInterval};
pub use log_rank::{log_rank_test, GroupSummary, LogRankResult};
