// Per-run time series: log parsing and clock alignment
//
// Each run is handled in isolation. `load_run` turns a log file into ordered
// samples and `align` resamples those onto the shared one-second clock that
// the aggregator expects.

mod aligner;
mod loader;

pub use aligner::{align, AlignedSeries};
pub use loader::{load_run, parse_run, RawSample, Run};
