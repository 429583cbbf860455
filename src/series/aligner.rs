// Resampling onto a one-second virtual clock
//
// Runs report samples at irregular times. Every run of every group is mapped
// onto the same dense axis `0..max_slot` so that the aggregator can compare
// slot `t` across runs. Slot `t` holds the last value observed at or before
// `t`; slots before the first sample take the first sample's value.

use crate::error::{Result, StatError};
use crate::series::loader::Run;

/// A run resampled to exactly `max_slot` one-second slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedSeries {
    values: Vec<u64>,
}

impl AlignedSeries {
    pub fn from_values(values: Vec<u64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value in the last slot; the run's end state
    pub fn final_value(&self) -> Option<u64> {
        self.values.last().copied()
    }

    /// Every `step`-th slot starting at 0
    pub fn downsample(&self, step: usize) -> Vec<u64> {
        self.values.iter().step_by(step.max(1)).copied().collect()
    }
}

/// Align `run` onto `0..max_slot` with last-observation-carried-forward
///
/// # Errors
/// `MalformedLog` when the run holds no sample inside the horizon, since no
/// slot value can be derived from it.
///
/// # Example
/// ```
/// use fuzzstat::series::{align, RawSample, Run};
///
/// let run = Run::new("r.txt", vec![RawSample::new(0, 1), RawSample::new(5, 2)]);
/// let aligned = align(&run, 10).unwrap();
/// assert_eq!(aligned.values(), &[1, 1, 1, 1, 1, 2, 2, 2, 2, 2]);
/// ```
pub fn align(run: &Run, max_slot: usize) -> Result<AlignedSeries> {
    let samples = &run.samples;
    if samples.is_empty() {
        return Err(StatError::malformed(
            &run.source,
            0,
            "run has no samples inside the horizon",
        ));
    }

    let mut values = Vec::with_capacity(max_slot);
    let mut cursor = 0;

    for t in 0..max_slot as u64 {
        while cursor + 1 < samples.len() && samples[cursor + 1].time_offset <= t {
            cursor += 1;
        }
        values.push(samples[cursor].value);
    }

    Ok(AlignedSeries { values })
}
