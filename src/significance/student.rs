// Student's two-sample t test on final values
//
// Pooled-variance variant, two-sided. The statistic is computed in f64 and the
// p-value comes from the Student-t CDF in statrs. Degenerate inputs are
// reported with a typed reason instead of a NaN.

use crate::error::{Result, StatError};
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

/// Outcome of Student's t test
#[derive(Debug, Clone, PartialEq)]
pub struct StudentTest {
    pub statistic: f64,
    /// Two-tailed p-value
    pub pvalue: f64,
    pub df: f64,
}

/// Sum of squared deviations from the sample mean
fn sum_sq_dev(values: &[f64]) -> f64 {
    values.variance() * (values.len() - 1) as f64
}

/// Compare two samples with Student's independent t test
///
/// # Errors
/// - `DegenerateSample` when either sample has fewer than 2 values
/// - `Statistics` when every value in both samples is identical (t undefined)
///
/// When both samples are constant but differ from each other the difference
/// is certain and the p-value is 0.
pub fn student_t_test(a: &[f64], b: &[f64]) -> Result<StudentTest> {
    let smallest = a.len().min(b.len());
    if smallest < 2 {
        return Err(StatError::DegenerateSample {
            required: 2,
            actual: smallest,
        });
    }

    let (n_a, n_b) = (a.len() as f64, b.len() as f64);
    let df = n_a + n_b - 2.0;
    let diff = a.mean() - b.mean();
    let pooled_ss = sum_sq_dev(a) + sum_sq_dev(b);

    if pooled_ss == 0.0 {
        if diff == 0.0 {
            return Err(StatError::Statistics(
                "t statistic undefined: both samples are constant and equal".to_string(),
            ));
        }
        let statistic = if diff > 0.0 {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };
        return Ok(StudentTest {
            statistic,
            pvalue: 0.0,
            df,
        });
    }

    let pooled_var = pooled_ss / df;
    let statistic = diff / (pooled_var * (1.0 / n_a + 1.0 / n_b)).sqrt();

    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| StatError::Statistics(format!("Student-t distribution: {}", e)))?;
    let pvalue = 2.0 * dist.sf(statistic.abs());

    Ok(StudentTest {
        statistic,
        pvalue: pvalue.clamp(0.0, 1.0),
        df,
    })
}
