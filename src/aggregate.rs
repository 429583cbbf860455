//! Per-group aggregation of aligned runs
//!
//! For every one-second slot the values of all runs of a group are reduced to
//! a mean and a Student-t confidence interval. Everything is computed in f64
//! with statrs; coverage counts routinely exceed what f32 represents exactly.

use crate::error::{Result, StatError};
use crate::series::AlignedSeries;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

/// Mean and confidence bounds of one slot across a group's runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateStat {
    pub mean: f64,
    /// Lower bound, clamped at zero (counts are never negative)
    pub lower: f64,
    pub upper: f64,
}

/// Aggregate statistics of one group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    /// One entry per slot
    pub stats: Vec<AggregateStat>,
    /// Last-slot value of each run, in run order
    pub final_values: Vec<f64>,
    /// Number of runs aggregated
    pub runs: usize,
    /// Two-tailed t critical value used for every slot (0 for a single run)
    pub t_critical: f64,
}

/// Series subsampled at a fixed stride for display
#[derive(Debug, Clone, PartialEq)]
pub struct DownsampledStats {
    /// Slot index divided by the stride
    pub bins: Vec<usize>,
    pub means: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl GroupAggregate {
    /// Every `step`-th slot of the aggregate, starting at slot 0
    pub fn downsample(&self, step: usize) -> DownsampledStats {
        let step = step.max(1);
        let picked: Vec<(usize, &AggregateStat)> =
            self.stats.iter().enumerate().step_by(step).collect();

        DownsampledStats {
            bins: picked.iter().map(|(idx, _)| idx / step).collect(),
            means: picked.iter().map(|(_, s)| s.mean).collect(),
            lower: picked.iter().map(|(_, s)| s.lower).collect(),
            upper: picked.iter().map(|(_, s)| s.upper).collect(),
        }
    }

    /// Statistic of the last slot
    pub fn final_stat(&self) -> Option<AggregateStat> {
        self.stats.last().copied()
    }
}

/// Two-tailed Student-t critical value for `confidence` and `df` degrees of freedom
pub fn t_critical(confidence: f64, df: usize) -> Result<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(StatError::InvalidConfig(format!(
            "confidence must be in (0, 1), got {}",
            confidence
        )));
    }
    if df == 0 {
        return Err(StatError::DegenerateSample {
            required: 2,
            actual: 1,
        });
    }

    let dist = StudentsT::new(0.0, 1.0, df as f64)
        .map_err(|e| StatError::Statistics(format!("Student-t distribution: {}", e)))?;
    Ok(dist.inverse_cdf((1.0 + confidence) / 2.0))
}

/// Mean and standard error of the mean of one slot
fn mean_and_sem(column: &[f64]) -> (f64, f64) {
    let mean = column.mean();
    if column.len() < 2 {
        return (mean, 0.0);
    }

    // Sample (n - 1) standard deviation
    let sem = column.std_dev() / (column.len() as f64).sqrt();
    (mean, sem)
}

/// Aggregate `series` slot by slot at the given confidence level
///
/// A single run yields a zero-width interval around its own values.
///
/// # Errors
/// - `DegenerateSample` when `series` is empty
/// - `SeriesLengthMismatch` when the runs were aligned to different horizons
pub fn aggregate(series: &[AlignedSeries], confidence: f64) -> Result<GroupAggregate> {
    let Some(first) = series.first() else {
        return Err(StatError::DegenerateSample {
            required: 1,
            actual: 0,
        });
    };

    let slots = first.len();
    if let Some(bad) = series.iter().find(|s| s.len() != slots) {
        return Err(StatError::SeriesLengthMismatch {
            expected: slots,
            actual: bad.len(),
        });
    }

    let runs = series.len();
    let t_crit = if runs > 1 {
        t_critical(confidence, runs - 1)?
    } else {
        tracing::warn!("single run: confidence interval collapses to the mean");
        0.0
    };

    let mut stats = Vec::with_capacity(slots);
    let mut column = vec![0.0f64; runs];

    for t in 0..slots {
        for (cell, run) in column.iter_mut().zip(series) {
            *cell = run.values()[t] as f64;
        }

        let (mean, sem) = mean_and_sem(&column);
        let half_width = sem * t_crit;
        stats.push(AggregateStat {
            mean,
            lower: (mean - half_width).max(0.0),
            upper: mean + half_width,
        });
    }

    let final_values = series
        .iter()
        .filter_map(|s| s.final_value())
        .map(|v| v as f64)
        .collect();

    Ok(GroupAggregate {
        stats,
        final_values,
        runs,
        t_critical: t_crit,
    })
}
