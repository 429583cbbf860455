//! Chart-ready series for an external plotting tool
//!
//! Nothing is rendered here. The overall chart shows one mean line plus a
//! shaded confidence band per group. The detailed chart shows one line per
//! run of a single group. Both are downsampled by the bucket stride and
//! exported as JSON. The plot context (labels, colors) travels inside each
//! value, so no global figure state is involved.

use crate::config::Bucket;
use crate::pipeline::Group;
use serde::{Deserialize, Serialize};

/// Mean line and confidence band of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSeries {
    pub name: String,
    pub line_color: Option<String>,
    pub line_style: Option<String>,
    pub bins: Vec<usize>,
    pub means: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Overall comparison chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallPlot {
    pub xlabel: String,
    pub ylabel: String,
    pub series: Vec<GroupSeries>,
}

impl OverallPlot {
    pub fn from_groups(groups: &[Group], bucket: Bucket, ylabel: &str) -> Self {
        let step = bucket.step();
        let series = groups
            .iter()
            .map(|group| {
                let down = group.aggregate.downsample(step);
                GroupSeries {
                    name: group.name.clone(),
                    line_color: group.display.line_color.clone(),
                    line_style: group.display.line_style.clone(),
                    bins: down.bins,
                    means: down.means,
                    lower: down.lower,
                    upper: down.upper,
                }
            })
            .collect();

        Self {
            xlabel: bucket.axis_title(),
            ylabel: ylabel.to_string(),
            series,
        }
    }
}

/// One run's line in the detailed chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSeries {
    /// Group name followed by the run index, e.g. `afl0`
    pub label: String,
    pub bins: Vec<usize>,
    pub values: Vec<u64>,
}

/// Per-run chart of a single group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedPlot {
    pub group: String,
    pub xlabel: String,
    pub ylabel: String,
    pub runs: Vec<RunSeries>,
}

impl DetailedPlot {
    pub fn from_group(group: &Group, bucket: Bucket, ylabel: &str) -> Self {
        let step = bucket.step();
        let runs = group
            .aligned
            .iter()
            .enumerate()
            .map(|(idx, series)| {
                let values = series.downsample(step);
                RunSeries {
                    label: format!("{}{}", group.name, idx),
                    bins: (0..values.len()).collect(),
                    values,
                }
            })
            .collect();

        Self {
            group: group.name.clone(),
            xlabel: bucket.axis_title(),
            ylabel: ylabel.to_string(),
            runs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupConfig;
    use crate::series::AlignedSeries;
    use std::path::PathBuf;

    fn group() -> Group {
        let config = GroupConfig {
            name: "afl".to_string(),
            data_files: vec![PathBuf::from("x")],
            line_color: Some("green".to_string()),
            line_style: Some(":".to_string()),
        };
        let aligned = vec![
            AlignedSeries::from_values((0..180).collect()),
            AlignedSeries::from_values((0..180).map(|v| v + 2).collect()),
        ];
        Group::from_aligned(&config, aligned, 0.95).unwrap()
    }

    #[test]
    fn test_overall_plot_downsamples_by_minute() {
        let plot = OverallPlot::from_groups(&[group()], Bucket::Min, "edges");
        assert_eq!(plot.xlabel, "time (min)");
        assert_eq!(plot.ylabel, "edges");

        let series = &plot.series[0];
        assert_eq!(series.bins, vec![0, 1, 2]);
        assert_eq!(series.means, vec![1.0, 61.0, 121.0]);
        assert_eq!(series.line_color.as_deref(), Some("green"));
        assert_eq!(series.lower.len(), 3);
        assert_eq!(series.upper.len(), 3);
    }

    #[test]
    fn test_detailed_plot_labels_runs() {
        let plot = DetailedPlot::from_group(&group(), Bucket::Min, "edges");
        assert_eq!(plot.runs.len(), 2);
        assert_eq!(plot.runs[0].label, "afl0");
        assert_eq!(plot.runs[1].label, "afl1");
        assert_eq!(plot.runs[1].values, vec![2, 62, 122]);
        assert_eq!(plot.runs[1].bins, vec![0, 1, 2]);
    }

    #[test]
    fn test_plot_json_round_trip() {
        let plot = OverallPlot::from_groups(&[group()], Bucket::Hour, "edges");
        let json = serde_json::to_string(&plot).unwrap();
        let back: OverallPlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.xlabel, "time (hour)");
        assert_eq!(back.series[0].name, "afl");
        assert_eq!(back.series[0].bins, plot.series[0].bins);
        assert_eq!(back.series[0].means, plot.series[0].means);
        for (a, b) in back.series[0].upper.iter().zip(&plot.series[0].upper) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
