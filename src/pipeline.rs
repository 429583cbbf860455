//! Pipeline orchestration: load, align and aggregate every group, then test
//! all groups against each other
//!
//! Runs are loaded and aligned in parallel, and groups are processed in
//! parallel. Nothing is shared between tasks: each one owns its input files
//! and returns its own `Group`. Significance testing starts only after every
//! group has finished.

use crate::aggregate::{aggregate, GroupAggregate};
use crate::config::{ExperimentConfig, GroupConfig};
use crate::error::{Result, StatError};
use crate::series::{align, load_run, AlignedSeries, Run};
use crate::significance::{pairwise_tests, SignificanceReport, TestKind};
use rayon::prelude::*;

/// Plot attributes carried through untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayAttributes {
    pub line_color: Option<String>,
    pub line_style: Option<String>,
}

/// One group after alignment and aggregation
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub display: DisplayAttributes,
    /// Aligned runs, in data file order
    pub aligned: Vec<AlignedSeries>,
    pub aggregate: GroupAggregate,
}

impl Group {
    /// Align already-loaded runs and aggregate them
    pub fn from_runs(
        config: &GroupConfig,
        runs: &[Run],
        max_slot: usize,
        confidence: f64,
    ) -> Result<Self> {
        let aligned = runs
            .par_iter()
            .map(|run| align(run, max_slot))
            .collect::<Result<Vec<_>>>()?;
        Self::from_aligned(config, aligned, confidence)
    }

    /// Aggregate runs that are already aligned
    pub fn from_aligned(
        config: &GroupConfig,
        aligned: Vec<AlignedSeries>,
        confidence: f64,
    ) -> Result<Self> {
        tracing::info!("aggregating {} runs for {}", aligned.len(), config.name);
        let aggregate = aggregate(&aligned, confidence)?;

        Ok(Self {
            name: config.name.clone(),
            display: DisplayAttributes {
                line_color: config.line_color.clone(),
                line_style: config.line_style.clone(),
            },
            aligned,
            aggregate,
        })
    }

    pub fn final_values(&self) -> &[f64] {
        &self.aggregate.final_values
    }
}

/// A group dropped from the comparison
#[derive(Debug)]
pub struct GroupFailure {
    pub name: String,
    pub error: StatError,
}

/// Everything one pipeline invocation produces
#[derive(Debug)]
pub struct PipelineReport {
    /// Successful groups, in configuration order
    pub groups: Vec<Group>,
    pub failures: Vec<GroupFailure>,
    pub significance: SignificanceReport,
    pub confidence: f64,
    pub max_slot: usize,
}

impl PipelineReport {
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Human-readable summary of the comparison
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        report.push_str(&format!(
            "=== Coverage comparison ({} groups, horizon {}s, {}% confidence) ===\n\n",
            self.groups.len(),
            self.max_slot,
            self.confidence * 100.0
        ));

        for group in &self.groups {
            match group.aggregate.final_stat() {
                Some(stat) => report.push_str(&format!(
                    "{:<20} runs={:<3} final mean={:.2} [{:.2}, {:.2}]\n",
                    group.name, group.aggregate.runs, stat.mean, stat.lower, stat.upper
                )),
                None => report.push_str(&format!(
                    "{:<20} runs={:<3} (empty horizon)\n",
                    group.name, group.aggregate.runs
                )),
            }
        }

        if !self.failures.is_empty() {
            report.push_str(&format!("\nFailed groups ({}):\n", self.failures.len()));
            for failure in &self.failures {
                report.push_str(&format!("  - {}: {}\n", failure.name, failure.error));
            }
        }

        for kind in TestKind::ALL {
            let mut results = self.significance.by_kind(kind).peekable();
            if results.peek().is_none() {
                continue;
            }
            report.push_str(&format!("\n{}:\n", kind.title()));
            for result in results {
                match &result.undefined_reason {
                    None => report.push_str(&format!(
                        "  {} --- {} : p={:.6}\n",
                        result.group_a, result.group_b, result.p_value
                    )),
                    Some(reason) => report.push_str(&format!(
                        "  {} --- {} : undefined ({})\n",
                        result.group_a, result.group_b, reason
                    )),
                }
            }
        }

        report
    }
}

/// Load, align and aggregate one group from its log files
pub fn process_group(config: &GroupConfig, max_slot: usize, confidence: f64) -> Result<Group> {
    tracing::info!("aligning data for {}", config.name);

    let aligned = config
        .data_files
        .par_iter()
        .map(|path| {
            let run = load_run(path, max_slot)?;
            align(&run, max_slot)
        })
        .collect::<Result<Vec<_>>>()?;

    Group::from_aligned(config, aligned, confidence)
}

/// Run the whole comparison described by `config`
///
/// A group whose logs cannot be loaded, aligned or aggregated is reported in
/// `failures` and left out of significance testing; the other groups are
/// unaffected.
///
/// # Errors
/// `InvalidConfig` when the configuration does not validate.
pub fn run_pipeline(config: &ExperimentConfig) -> Result<PipelineReport> {
    config.validate().map_err(StatError::InvalidConfig)?;

    let max_slot = config
        .max_slot()
        .ok_or_else(|| {
            StatError::InvalidConfig(format!("max_time {} overflows", config.max_time))
        })?;
    let outcomes: Vec<(String, Result<Group>)> = config
        .groups
        .par_iter()
        .map(|group| {
            (
                group.name.clone(),
                process_group(group, max_slot, config.confidence),
            )
        })
        .collect();

    let mut groups = Vec::new();
    let mut failures = Vec::new();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(group) => groups.push(group),
            Err(error) => {
                tracing::warn!("skipping group {}: {}", name, error);
                failures.push(GroupFailure { name, error });
            }
        }
    }

    let finals: Vec<(String, Vec<f64>)> = groups
        .iter()
        .map(|g| (g.name.clone(), g.final_values().to_vec()))
        .collect();
    let significance = pairwise_tests(&finals);

    Ok(PipelineReport {
        groups,
        failures,
        significance,
        confidence: config.confidence,
        max_slot,
    })
}
