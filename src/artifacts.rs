//! On-disk artifacts produced by a pipeline run
//!
//! Layout under `out_dir`:
//!
//! ```text
//! aligned/<group>/<run>.txt                     one value per slot (optional)
//! stat_data/<group>-mean-confi.txt              mean,lower,upper per slot
//! <project>_overall_stats<postfix>.txt          pairwise p-values
//! <project>_overall<postfix>.json               overall plot data
//! detailed/<group>/<project>_detailed<postfix>.json   per-run plot data
//! ```

use crate::aggregate::AggregateStat;
use crate::config::ExperimentConfig;
use crate::error::{Result, StatError};
use crate::pipeline::PipelineReport;
use crate::plot_data::{DetailedPlot, OverallPlot};
use crate::series::AlignedSeries;
use crate::significance::{SignificanceReport, TestKind};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Paths of every artifact for one experiment
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    pub out_dir: PathBuf,
    pub project: String,
    pub file_postfix: String,
}

impl ArtifactLayout {
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self {
            out_dir: config.out_dir.clone(),
            project: config.project.clone(),
            file_postfix: config.file_postfix.clone(),
        }
    }

    pub fn aligned_dir(&self, group: &str) -> PathBuf {
        self.out_dir.join("aligned").join(group)
    }

    pub fn aggregate_file(&self, group: &str) -> PathBuf {
        self.out_dir
            .join("stat_data")
            .join(format!("{}-mean-confi.txt", group))
    }

    pub fn stats_report_file(&self) -> PathBuf {
        self.out_dir.join(format!(
            "{}_overall_stats{}.txt",
            self.project, self.file_postfix
        ))
    }

    pub fn overall_plot_file(&self) -> PathBuf {
        self.out_dir
            .join(format!("{}_overall{}.json", self.project, self.file_postfix))
    }

    pub fn detailed_plot_file(&self, group: &str) -> PathBuf {
        self.out_dir.join("detailed").join(group).join(format!(
            "{}_detailed{}.json",
            self.project, self.file_postfix
        ))
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write an aligned series, one value per line
pub fn write_aligned(path: &Path, series: &AlignedSeries) -> Result<()> {
    create_parent(path)?;
    let mut out = BufWriter::new(fs::File::create(path)?);
    for value in series.values() {
        writeln!(out, "{}", value)?;
    }
    out.flush()?;
    Ok(())
}

/// Read back an aligned series written by [`write_aligned`]
pub fn read_aligned(path: &Path) -> Result<AlignedSeries> {
    let content = fs::read_to_string(path)?;
    let values = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            line.trim().parse::<u64>().map_err(|e| {
                StatError::malformed(path, idx + 1, format!("bad aligned value '{}': {}", line, e))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AlignedSeries::from_values(values))
}

/// Format aggregate statistics as `mean,lower,upper` lines
pub fn format_aggregate(stats: &[AggregateStat]) -> String {
    let mut out = String::with_capacity(stats.len() * 24);
    for stat in stats {
        out.push_str(&format!("{},{},{}\n", stat.mean, stat.lower, stat.upper));
    }
    out
}

/// Parse `mean,lower,upper` lines produced by [`format_aggregate`]
pub fn parse_aggregate(source: &Path, content: &str) -> Result<Vec<AggregateStat>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let fields: Vec<&str> = line.split(',').collect();
            let [mean, lower, upper] = fields.as_slice() else {
                return Err(StatError::malformed(
                    source,
                    idx + 1,
                    format!("expected 'mean,lower,upper', got '{}'", line),
                ));
            };

            let parse = |field: &str| {
                field.trim().parse::<f64>().map_err(|e| {
                    StatError::malformed(source, idx + 1, format!("bad number '{}': {}", field, e))
                })
            };

            Ok(AggregateStat {
                mean: parse(*mean)?,
                lower: parse(*lower)?,
                upper: parse(*upper)?,
            })
        })
        .collect()
}

/// Write a group's aggregate artifact
pub fn write_aggregate(path: &Path, stats: &[AggregateStat]) -> Result<()> {
    create_parent(path)?;
    fs::write(path, format_aggregate(stats))?;
    Ok(())
}

fn format_pvalue(p: f64) -> String {
    if p.is_nan() {
        "nan".to_string()
    } else {
        p.to_string()
    }
}

/// Render the textual significance report, one section per test kind
///
/// ```text
/// ### Student's t test ###
/// pvalue: afl --- honggfuzz : 0.00025
///
/// ### Mann Whitney u test ###
/// pvalue: afl --- honggfuzz : 0.1
///
/// ```
pub fn render_significance_report(report: &SignificanceReport) -> String {
    let mut out = String::new();
    for kind in TestKind::ALL {
        out.push_str(&format!("### {} ###\n", kind.title()));
        for result in report.by_kind(kind) {
            out.push_str(&format!(
                "pvalue: {} --- {} : {}\n",
                result.group_a,
                result.group_b,
                format_pvalue(result.p_value)
            ));
        }
        out.push('\n');
    }
    out
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    create_parent(path)?;
    let file = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// Paths written by [`write_all`]
#[derive(Debug, Clone, Default)]
pub struct WrittenArtifacts {
    pub aligned: Vec<PathBuf>,
    pub aggregates: Vec<PathBuf>,
    pub detailed_plots: Vec<PathBuf>,
    pub stats_report: PathBuf,
    pub overall_plot: PathBuf,
}

/// Write every artifact of `report`
pub fn write_all(report: &PipelineReport, config: &ExperimentConfig) -> Result<WrittenArtifacts> {
    let layout = ArtifactLayout::from_config(config);
    let mut written = WrittenArtifacts::default();

    for group in &report.groups {
        if config.persist_aligned {
            let dir = layout.aligned_dir(&group.name);
            for (idx, series) in group.aligned.iter().enumerate() {
                let path = dir.join(format!("{}.txt", idx));
                write_aligned(&path, series)?;
                written.aligned.push(path);
            }
        }

        let aggregate_path = layout.aggregate_file(&group.name);
        write_aggregate(&aggregate_path, &group.aggregate.stats)?;
        written.aggregates.push(aggregate_path);

        let detailed_path = layout.detailed_plot_file(&group.name);
        write_json(
            &detailed_path,
            &DetailedPlot::from_group(group, config.bucket, &config.ylabel),
        )?;
        written.detailed_plots.push(detailed_path);
    }

    written.stats_report = layout.stats_report_file();
    create_parent(&written.stats_report)?;
    fs::write(
        &written.stats_report,
        render_significance_report(&report.significance),
    )?;

    written.overall_plot = layout.overall_plot_file();
    write_json(
        &written.overall_plot,
        &OverallPlot::from_groups(&report.groups, config.bucket, &config.ylabel),
    )?;

    tracing::info!(
        "wrote {} aggregate files and stats report to {}",
        written.aggregates.len(),
        layout.out_dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::significance::PairwiseResult;
    use tempfile::TempDir;

    #[test]
    fn test_aggregate_round_trip() {
        let stats = vec![
            AggregateStat {
                mean: 11.0,
                lower: 8.515_862_2,
                upper: 13.484_137_8,
            },
            AggregateStat {
                mean: 1.0 / 3.0,
                lower: 0.0,
                upper: 1.767_541_3,
            },
        ];
        let text = format_aggregate(&stats);
        let parsed = parse_aggregate(Path::new("mem"), &text).unwrap();

        assert_eq!(parsed.len(), stats.len());
        for (a, b) in parsed.iter().zip(&stats) {
            assert!((a.mean - b.mean).abs() < 1e-12);
            assert!((a.lower - b.lower).abs() < 1e-12);
            assert!((a.upper - b.upper).abs() < 1e-12);
        }
    }

    #[test]
    fn test_aggregate_line_format() {
        let text = format_aggregate(&[AggregateStat {
            mean: 2.5,
            lower: 0.0,
            upper: 5.0,
        }]);
        assert_eq!(text, "2.5,0,5\n");
    }

    #[test]
    fn test_parse_aggregate_rejects_short_line() {
        let err = parse_aggregate(Path::new("agg.txt"), "1.0,2.0\n").unwrap_err();
        assert!(matches!(err, StatError::MalformedLog { line: 1, .. }));
    }

    #[test]
    fn test_aligned_round_trip_on_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aligned/afl/0.txt");
        let series = AlignedSeries::from_values(vec![1, 1, 2, 5, 5]);

        write_aligned(&path, &series).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 5);
        assert_eq!(read_aligned(&path).unwrap(), series);
    }

    #[test]
    fn test_significance_report_format() {
        let report = SignificanceReport {
            results: vec![
                PairwiseResult {
                    group_a: "afl".to_string(),
                    group_b: "hf".to_string(),
                    test: TestKind::StudentT,
                    p_value: 0.25,
                    undefined_reason: None,
                },
                PairwiseResult {
                    group_a: "afl".to_string(),
                    group_b: "hf".to_string(),
                    test: TestKind::MannWhitneyU,
                    p_value: f64::NAN,
                    undefined_reason: Some("constant".to_string()),
                },
            ],
        };

        assert_eq!(
            render_significance_report(&report),
            "### Student's t test ###\n\
             pvalue: afl --- hf : 0.25\n\
             \n\
             ### Mann Whitney u test ###\n\
             pvalue: afl --- hf : nan\n\
             \n"
        );
    }

    #[test]
    fn test_layout_paths() {
        let layout = ArtifactLayout {
            out_dir: PathBuf::from("out"),
            project: "libpng".to_string(),
            file_postfix: "_v2".to_string(),
        };
        assert_eq!(
            layout.aggregate_file("afl"),
            PathBuf::from("out/stat_data/afl-mean-confi.txt")
        );
        assert_eq!(
            layout.stats_report_file(),
            PathBuf::from("out/libpng_overall_stats_v2.txt")
        );
        assert_eq!(
            layout.detailed_plot_file("afl"),
            PathBuf::from("out/detailed/afl/libpng_detailed_v2.json")
        );
    }
}
