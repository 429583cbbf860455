// Pairwise comparison of every group against every other group
//
// Pairs are enumerated as (i, j) with i < j in the caller's group order, so
// each unordered pair is tested exactly once per test kind and no group is
// compared with itself. A failing pair is recorded with a NaN p-value and
// the reason; the remaining pairs are still computed.

use crate::significance::rank::mann_whitney_u;
use crate::significance::student::student_t_test;
use serde::Serialize;

/// Hypothesis test applied to a pair of groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TestKind {
    /// Parametric, compares means assuming normality
    StudentT,
    /// Rank-based, no normality assumption
    MannWhitneyU,
}

impl TestKind {
    /// Every test kind, in report order
    pub const ALL: [TestKind; 2] = [TestKind::StudentT, TestKind::MannWhitneyU];

    /// Section title used in the textual report
    pub fn title(self) -> &'static str {
        match self {
            TestKind::StudentT => "Student's t test",
            TestKind::MannWhitneyU => "Mann Whitney u test",
        }
    }
}

/// p-value of one test on one unordered pair of groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseResult {
    pub group_a: String,
    pub group_b: String,
    pub test: TestKind,
    /// NaN when the test is undefined for these inputs
    pub p_value: f64,
    /// Why the p-value is undefined, if it is
    pub undefined_reason: Option<String>,
}

impl PairwiseResult {
    pub fn is_defined(&self) -> bool {
        self.undefined_reason.is_none()
    }

    /// `p < alpha`; undefined results are never significant
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.is_defined() && self.p_value < alpha
    }
}

/// All pairwise results of one pipeline invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignificanceReport {
    pub results: Vec<PairwiseResult>,
}

impl SignificanceReport {
    /// Results of one test kind, in pair order
    pub fn by_kind(&self, kind: TestKind) -> impl Iterator<Item = &PairwiseResult> {
        self.results.iter().filter(move |r| r.test == kind)
    }

    /// Look up the result for a pair regardless of argument order
    pub fn find(&self, kind: TestKind, a: &str, b: &str) -> Option<&PairwiseResult> {
        self.by_kind(kind).find(|r| {
            (r.group_a == a && r.group_b == b) || (r.group_a == b && r.group_b == a)
        })
    }

    pub fn undefined_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_defined()).count()
    }
}

fn run_test(kind: TestKind, a: &[f64], b: &[f64]) -> crate::error::Result<f64> {
    match kind {
        TestKind::StudentT => student_t_test(a, b).map(|t| t.pvalue),
        TestKind::MannWhitneyU => mann_whitney_u(a, b).map(|u| u.pvalue),
    }
}

/// Test every unordered pair of groups with every test kind
///
/// `groups` holds `(name, final_values)` in comparison order. With `G` groups
/// the report has `G * (G - 1) / 2` results per test kind.
///
/// # Example
/// ```
/// use fuzzstat::significance::{pairwise_tests, TestKind};
///
/// let groups = vec![
///     ("afl".to_string(), vec![10.0, 12.0, 11.0]),
///     ("honggfuzz".to_string(), vec![20.0, 22.0, 21.0]),
/// ];
/// let report = pairwise_tests(&groups);
/// let t = report.find(TestKind::StudentT, "afl", "honggfuzz").unwrap();
/// assert!(t.p_value < 0.05);
/// ```
pub fn pairwise_tests(groups: &[(String, Vec<f64>)]) -> SignificanceReport {
    let mut results = Vec::new();

    for kind in TestKind::ALL {
        for (i, (name_a, values_a)) in groups.iter().enumerate() {
            for (name_b, values_b) in &groups[i + 1..] {
                let (p_value, undefined_reason) = match run_test(kind, values_a, values_b) {
                    Ok(p) => (p, None),
                    Err(e) => {
                        tracing::warn!(
                            "{} undefined for {} --- {}: {}",
                            kind.title(),
                            name_a,
                            name_b,
                            e
                        );
                        (f64::NAN, Some(e.to_string()))
                    }
                };

                results.push(PairwiseResult {
                    group_a: name_a.clone(),
                    group_b: name_b.clone(),
                    test: kind,
                    p_value,
                    undefined_reason,
                });
            }
        }
    }

    SignificanceReport { results }
}
