//! CLI argument parsing for fuzzstat

use crate::config::{Bucket, ExperimentConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fuzzstat")]
#[command(version)]
#[command(about = "Compare repeated coverage-over-time runs with confidence bands and significance tests", long_about = None)]
pub struct Cli {
    /// Experiment file (TOML) listing groups and their run logs
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: PathBuf,

    /// Override the output directory
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Override the confidence level of the interval (e.g. 0.95)
    #[arg(long = "confidence", value_name = "LEVEL")]
    pub confidence: Option<f64>,

    /// Override the horizon in hours
    #[arg(long = "max-time", value_name = "HOURS")]
    pub max_time: Option<u64>,

    /// Override the time bucket used for exported plot data
    #[arg(short = 'b', long = "bucket", value_enum)]
    pub bucket: Option<Bucket>,

    /// Do not write the aligned per-run series
    #[arg(long = "no-persist-aligned")]
    pub no_persist_aligned: bool,

    /// Enable debug tracing output
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command line overrides on top of the experiment file
    pub fn apply_overrides(&self, config: &mut ExperimentConfig) {
        if let Some(out_dir) = &self.out_dir {
            config.out_dir = out_dir.clone();
        }
        if let Some(confidence) = self.confidence {
            config.confidence = confidence;
        }
        if let Some(max_time) = self.max_time {
            config.max_time = max_time;
        }
        if let Some(bucket) = self.bucket {
            config.bucket = bucket;
        }
        if self.no_persist_aligned {
            config.persist_aligned = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ExperimentConfig {
        ExperimentConfig::from_str("max_time = 24\n").unwrap()
    }

    #[test]
    fn test_cli_requires_config() {
        assert!(Cli::try_parse_from(["fuzzstat"]).is_err());
    }

    #[test]
    fn test_cli_parses_config_path() {
        let cli = Cli::parse_from(["fuzzstat", "--config", "exp.toml"]);
        assert_eq!(cli.config, PathBuf::from("exp.toml"));
        assert!(cli.out_dir.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_bucket_aliases() {
        let cli = Cli::parse_from(["fuzzstat", "-c", "exp.toml", "--bucket", "m"]);
        assert_eq!(cli.bucket, Some(Bucket::Min));
        let cli = Cli::parse_from(["fuzzstat", "-c", "exp.toml", "--bucket", "sec"]);
        assert_eq!(cli.bucket, Some(Bucket::Sec));
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let cli = Cli::parse_from(["fuzzstat", "-c", "exp.toml"]);
        let mut config = base_config();
        cli.apply_overrides(&mut config);
        assert_eq!(config, base_config());
    }

    #[test]
    fn test_overrides_applied() {
        let cli = Cli::parse_from([
            "fuzzstat",
            "-c",
            "exp.toml",
            "-o",
            "results",
            "--confidence",
            "0.99",
            "--max-time",
            "2",
            "--bucket",
            "sec",
            "--no-persist-aligned",
        ]);
        let mut config = base_config();
        cli.apply_overrides(&mut config);

        assert_eq!(config.out_dir, PathBuf::from("results"));
        assert_eq!(config.confidence, 0.99);
        assert_eq!(config.max_time, 2);
        assert_eq!(config.bucket, Bucket::Sec);
        assert!(!config.persist_aligned);
    }
}
