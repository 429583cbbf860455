// Run log parsing
//
// A run log holds one `<timeOffsetSeconds>:<value>` sample per line, in time
// order. Reading stops at the first sample beyond the horizon; later lines are
// never inspected.

use crate::error::{Result, StatError};
use std::fs;
use std::path::{Path, PathBuf};

/// One measurement: `value` observed `time_offset` seconds into the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub time_offset: u64,
    pub value: u64,
}

impl RawSample {
    pub fn new(time_offset: u64, value: u64) -> Self {
        Self { time_offset, value }
    }
}

/// Samples of a single repetition, ordered by time offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Log the samples came from (used in diagnostics)
    pub source: PathBuf,
    pub samples: Vec<RawSample>,
}

impl Run {
    pub fn new(source: impl Into<PathBuf>, samples: Vec<RawSample>) -> Self {
        Self {
            source: source.into(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Parse a single `time:value` line
fn parse_line(source: &Path, line_no: usize, line: &str) -> Result<RawSample> {
    let mut fields = line.split(':');
    let (Some(time), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(StatError::malformed(
            source,
            line_no,
            format!("expected '<time>:<value>', got '{}'", line),
        ));
    };

    let time_offset = time.trim().parse::<u64>().map_err(|e| {
        StatError::malformed(source, line_no, format!("bad time offset '{}': {}", time, e))
    })?;
    let value = value.trim().parse::<u64>().map_err(|e| {
        StatError::malformed(source, line_no, format!("bad value '{}': {}", value, e))
    })?;

    Ok(RawSample { time_offset, value })
}

/// Parse log text, keeping samples with `time_offset <= max_slot`
///
/// Blank lines are skipped. A time offset smaller than its predecessor is a
/// `MalformedLog` error since alignment relies on ordering.
pub fn parse_run(source: impl Into<PathBuf>, content: &str, max_slot: usize) -> Result<Run> {
    let source = source.into();
    let mut samples: Vec<RawSample> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let sample = parse_line(&source, idx + 1, line)?;
        if sample.time_offset > max_slot as u64 {
            break;
        }

        if let Some(prev) = samples.last() {
            if sample.time_offset < prev.time_offset {
                return Err(StatError::malformed(
                    &source,
                    idx + 1,
                    format!(
                        "time offset {} goes backwards (previous {})",
                        sample.time_offset, prev.time_offset
                    ),
                ));
            }
        }

        samples.push(sample);
    }

    Ok(Run { source, samples })
}

/// Read and parse a run log from disk
pub fn load_run(path: &Path, max_slot: usize) -> Result<Run> {
    let content = fs::read_to_string(path)?;
    let run = parse_run(path, &content, max_slot)?;
    tracing::debug!(
        "loaded {} samples from {} (horizon {}s)",
        run.len(),
        path.display(),
        max_slot
    );
    Ok(run)
}
