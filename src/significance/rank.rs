// Mann-Whitney U test (two-sided) on final values
//
// Rank-based, no normality assumption. Small tie-free samples use the exact
// null distribution of U; everything else uses the normal approximation with
// tie and continuity corrections.

use crate::error::{Result, StatError};
use statrs::distribution::{ContinuousCDF, Normal};

/// Below this size of the smaller sample the exact distribution is used
pub const EXACT_MAX_SMALLER_SAMPLE: usize = 8;

/// Outcome of the Mann-Whitney U test
#[derive(Debug, Clone, PartialEq)]
pub struct MannWhitneyTest {
    /// U statistic of the first sample
    pub u: f64,
    /// Two-tailed p-value
    pub pvalue: f64,
    /// Whether the exact distribution was used
    pub exact: bool,
}

/// Average ranks (1-based) of `pooled` plus the size of every tie group
fn rank_with_ties(pooled: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..pooled.len()).collect();
    order.sort_by(|&i, &j| {
        pooled[i]
            .partial_cmp(&pooled[j])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; pooled.len()];
    let mut ties = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && pooled[order[end]] == pooled[order[start]] {
            end += 1;
        }
        // positions start..end share ranks start+1..=end
        let avg = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg;
        }
        ties.push(end - start);
        start = end;
    }

    (ranks, ties)
}

/// Number of arrangements giving each U for sample sizes `m` and `n`
///
/// Coefficients of the Gaussian binomial `[m+n choose m]`, built as
/// `prod (1 - q^(n+i)) / (1 - q^i)` for `i = 1..=m`.
fn exact_u_counts(m: usize, n: usize) -> Vec<f64> {
    let (m, n) = (m.min(n), m.max(n));
    let degree = m * n;
    let mut counts = vec![0.0; degree + 1];
    counts[0] = 1.0;

    for i in 1..=m {
        let shift = n + i;
        for k in (shift..=degree).rev() {
            counts[k] -= counts[k - shift];
        }
        for k in i..=degree {
            counts[k] += counts[k - i];
        }
    }

    counts
}

fn exact_pvalue(u_min: f64, n1: usize, n2: usize) -> f64 {
    let counts = exact_u_counts(n1, n2);
    let total: f64 = counts.iter().sum();
    let upto = u_min.floor() as usize;
    let lower_tail: f64 = counts.iter().take(upto + 1).sum::<f64>() / total;
    (2.0 * lower_tail).min(1.0)
}

/// Compare two samples with the Mann-Whitney U test
///
/// # Errors
/// - `DegenerateSample` when either sample is empty
/// - `Statistics` when all values in both samples are identical
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<MannWhitneyTest> {
    let (n1, n2) = (a.len(), b.len());
    if n1 == 0 || n2 == 0 {
        return Err(StatError::DegenerateSample {
            required: 1,
            actual: 0,
        });
    }

    let pooled: Vec<f64> = a.iter().chain(b).copied().collect();
    let (ranks, ties) = rank_with_ties(&pooled);

    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;

    let has_ties = ties.iter().any(|&t| t > 1);
    if n1.min(n2) < EXACT_MAX_SMALLER_SAMPLE && !has_ties {
        return Ok(MannWhitneyTest {
            u: u1,
            pvalue: exact_pvalue(u1.min(u2), n1, n2),
            exact: true,
        });
    }

    let n = (n1 + n2) as f64;
    let tie_term: f64 = ties
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let variance = (n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance <= 0.0 {
        return Err(StatError::Statistics(
            "U statistic undefined: all values are identical".to_string(),
        ));
    }

    let mu = (n1 * n2) as f64 / 2.0;
    let z = (u1.max(u2) - mu - 0.5) / variance.sqrt();
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| StatError::Statistics(format!("normal distribution: {}", e)))?;
    let pvalue = (2.0 * normal.cdf(-z)).clamp(0.0, 1.0);

    Ok(MannWhitneyTest {
        u: u1,
        pvalue,
        exact: false,
    })
}
