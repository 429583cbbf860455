//! Experiment configuration loaded from TOML
//!
//! An experiment file names the groups being compared and the run logs that
//! belong to each one, plus the statistical and display settings shared by
//! every group.
//!
//! # Example experiment.toml
//!
//! ```toml
//! project = "libpng"
//! out_dir = "out"
//! ylabel = "edges"
//! confidence = 0.95
//! max_time = 24
//! bucket = "h"
//!
//! [[group]]
//! name = "afl"
//! data_files = ["runs/afl/0.txt", "runs/afl/1.txt"]
//! line_color = "red"
//!
//! [[group]]
//! name = "honggfuzz"
//! data_files = ["runs/hf/0.txt", "runs/hf/1.txt"]
//! line_style = "--"
//! ```

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Seconds per hour of horizon
pub const SLOTS_PER_HOUR: usize = 3600;

/// Longest accepted horizon in hours (30 days)
pub const MAX_TIME_HOURS: u64 = 24 * 30;

/// Display granularity of the time axis
///
/// Only affects the stride used when exporting series for plotting; the
/// aggregate itself is always computed per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Bucket {
    #[serde(rename = "s", alias = "sec", alias = "seconds")]
    #[value(alias = "s")]
    Sec,
    #[serde(rename = "m", alias = "min", alias = "minutes")]
    #[value(alias = "m")]
    Min,
    #[default]
    #[serde(rename = "h", alias = "hour", alias = "hours")]
    #[value(alias = "h")]
    Hour,
}

impl Bucket {
    /// Stride in seconds between two exported points
    pub fn step(self) -> usize {
        match self {
            Bucket::Sec => 1,
            Bucket::Min => 60,
            Bucket::Hour => 3600,
        }
    }

    /// Axis unit label
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Sec => "sec",
            Bucket::Min => "min",
            Bucket::Hour => "hour",
        }
    }

    /// Axis title used by the plot export, e.g. `time (hour)`
    pub fn axis_title(self) -> String {
        format!("time ({})", self.label())
    }
}

/// One competitor being compared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Group (fuzzer) name, unique within an experiment
    pub name: String,

    /// One log file per run
    pub data_files: Vec<PathBuf>,

    /// Plot line color; display only
    #[serde(default)]
    pub line_color: Option<String>,

    /// Plot line style; display only
    #[serde(default)]
    pub line_style: Option<String>,
}

/// Root configuration for an experiment file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Project name, used as the prefix of the overall artifacts
    #[serde(default = "default_project")]
    pub project: String,

    /// Directory receiving every artifact
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Suffix appended to overall artifact names
    #[serde(default)]
    pub file_postfix: String,

    /// Y axis title for exported plot data
    #[serde(default = "default_ylabel")]
    pub ylabel: String,

    /// Confidence level of the per-step interval, in (0, 1)
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Horizon in hours; samples after it are discarded
    pub max_time: u64,

    /// Display granularity for exported series
    #[serde(default)]
    pub bucket: Bucket,

    /// Write the aligned per-run series next to the aggregates
    #[serde(default = "default_persist_aligned")]
    pub persist_aligned: bool,

    /// Groups in comparison order
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupConfig>,
}

fn default_project() -> String {
    "fuzz".to_string()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_ylabel() -> String {
    "coverage".to_string()
}

fn default_confidence() -> f64 {
    0.95
}

fn default_persist_aligned() -> bool {
    true
}

/// Names end up in artifact paths and must stay inside `out_dir`
fn has_separator(name: &str) -> bool {
    name.contains(['/', '\\'])
}

impl ExperimentConfig {
    /// Load an experiment from a TOML file
    ///
    /// Relative data file paths are resolved against the directory holding
    /// the experiment file.
    ///
    /// ```no_run
    /// use fuzzstat::config::ExperimentConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = ExperimentConfig::from_file("experiment.toml")?;
    /// println!("Comparing {} groups", config.groups.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read experiment file {}", path.display()))?;
        let mut config = Self::from_str(&content)
            .with_context(|| format!("Failed to parse experiment file {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse an experiment from TOML text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Make relative data file paths relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for group in &mut self.groups {
            for file in &mut group.data_files {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
    }

    /// Number of one-second slots in the horizon, `None` on overflow
    pub fn max_slot(&self) -> Option<usize> {
        usize::try_from(self.max_time)
            .ok()?
            .checked_mul(SLOTS_PER_HOUR)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            ));
        }

        if self.max_time == 0 {
            return Err("max_time must be at least 1 hour".to_string());
        }
        if self.max_time > MAX_TIME_HOURS || self.max_slot().is_none() {
            return Err(format!(
                "max_time must be at most {} hours, got {}",
                MAX_TIME_HOURS, self.max_time
            ));
        }

        if has_separator(&self.project) {
            return Err(format!(
                "project '{}' must not contain path separators",
                self.project
            ));
        }
        if has_separator(&self.file_postfix) {
            return Err(format!(
                "file_postfix '{}' must not contain path separators",
                self.file_postfix
            ));
        }

        if self.groups.is_empty() {
            return Err("at least one [[group]] is required".to_string());
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() {
                return Err("group name must not be empty".to_string());
            }
            if has_separator(&group.name) || group.name == "." || group.name == ".." {
                return Err(format!(
                    "group name '{}' is not a valid directory name",
                    group.name
                ));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(format!("duplicate group name '{}'", group.name));
            }
            if group.data_files.is_empty() {
                return Err(format!("group '{}' has no data_files", group.name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
max_time = 1

[[group]]
name = "afl"
data_files = ["a/0.txt", "a/1.txt"]

[[group]]
name = "libfuzzer"
data_files = ["b/0.txt"]
line_color = "blue"
line_style = "--"
"#;

    #[test]
    fn test_defaults_applied() {
        let config = ExperimentConfig::from_str(MINIMAL).unwrap();
        assert_eq!(config.project, "fuzz");
        assert_eq!(config.out_dir, PathBuf::from("out"));
        assert_eq!(config.confidence, 0.95);
        assert_eq!(config.bucket, Bucket::Hour);
        assert!(config.persist_aligned);
        assert_eq!(config.ylabel, "coverage");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_group_order_and_display_attributes() {
        let config = ExperimentConfig::from_str(MINIMAL).unwrap();
        assert_eq!(config.groups[0].name, "afl");
        assert_eq!(config.groups[1].name, "libfuzzer");
        assert_eq!(config.groups[0].line_color, None);
        assert_eq!(config.groups[1].line_color.as_deref(), Some("blue"));
        assert_eq!(config.groups[1].line_style.as_deref(), Some("--"));
    }

    #[test]
    fn test_max_slot_is_hours_times_3600() {
        let config = ExperimentConfig::from_str(MINIMAL).unwrap();
        assert_eq!(config.max_slot(), Some(3600));
    }

    #[test]
    fn test_huge_horizon_rejected_without_overflow() {
        let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
        config.max_time = u64::MAX;
        assert_eq!(config.max_slot(), None);
        let err = config.validate().unwrap_err();
        assert!(err.contains("at most 720 hours"), "{}", err);

        config.max_time = MAX_TIME_HOURS + 1;
        assert!(config.validate().is_err());
        config.max_time = MAX_TIME_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_group_name_cannot_escape_out_dir() {
        for name in ["../x", "a/b", "..", ".", "a\\b"] {
            let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
            config.groups[0].name = name.to_string();
            let err = config.validate().unwrap_err();
            assert!(err.contains("not a valid directory name"), "{}: {}", name, err);
        }

        let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
        config.groups[0].name = "afl++".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_project_and_postfix_reject_separators() {
        let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
        config.project = "../libpng".to_string();
        assert!(config.validate().is_err());

        let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
        config.file_postfix = "_v2/../../x".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bucket_accepts_short_and_long_names() {
        for (text, expected) in [
            ("s", Bucket::Sec),
            ("sec", Bucket::Sec),
            ("m", Bucket::Min),
            ("minutes", Bucket::Min),
            ("h", Bucket::Hour),
            ("hour", Bucket::Hour),
        ] {
            let toml = format!("max_time = 1\nbucket = \"{}\"\n", text);
            let config = ExperimentConfig::from_str(&toml).unwrap();
            assert_eq!(config.bucket, expected, "bucket {}", text);
        }
    }

    #[test]
    fn test_bucket_rejects_unknown() {
        assert!(ExperimentConfig::from_str("max_time = 1\nbucket = \"d\"\n").is_err());
    }

    #[test]
    fn test_bucket_steps_and_labels() {
        assert_eq!(Bucket::Sec.step(), 1);
        assert_eq!(Bucket::Min.step(), 60);
        assert_eq!(Bucket::Hour.step(), 3600);
        assert_eq!(Bucket::Min.axis_title(), "time (min)");
    }

    #[test]
    fn test_invalid_confidence() {
        let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
        config.confidence = 1.0;
        assert!(config.validate().is_err());
        config.confidence = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
        config.max_time = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
        config.groups[1].name = "afl".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn test_group_without_files_rejected() {
        let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
        config.groups[0].data_files.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_groups_rejected() {
        let config = ExperimentConfig::from_str("max_time = 2\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_paths_keeps_absolute() {
        let mut config = ExperimentConfig::from_str(MINIMAL).unwrap();
        config.groups[0].data_files[1] = PathBuf::from("/abs/run.txt");
        config.resolve_paths(Path::new("/exp"));
        assert_eq!(config.groups[0].data_files[0], PathBuf::from("/exp/a/0.txt"));
        assert_eq!(config.groups[0].data_files[1], PathBuf::from("/abs/run.txt"));
    }
}
