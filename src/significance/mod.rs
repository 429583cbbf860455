// Cross-group significance testing on end-of-run values
//
// Each group contributes one final value per run. Every unordered pair of
// groups is compared with a parametric test (Student's t) and a rank-based
// test (Mann-Whitney U, exact or normal approximation). Distributions come
// from statrs.
//
// Degenerate inputs (too few runs, constant samples) never abort the report:
// the affected pair carries a NaN p-value and the reason.

mod pairwise;
mod rank;
mod student;

pub use pairwise::{pairwise_tests, PairwiseResult, SignificanceReport, TestKind};
pub use rank::{mann_whitney_u, MannWhitneyTest};
pub use student::{student_t_test, StudentTest};
