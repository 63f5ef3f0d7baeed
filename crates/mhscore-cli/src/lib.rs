//! Command-line front end for the mental health score pipeline.
//!
//! Subcommands map onto the modules below: `train` fits and persists the
//! artifacts, `predict` scores a CSV of records, `encoders` prints a
//! persisted encoder set, and `serve` exposes single-record prediction over
//! HTTP.
pub mod encoders;
pub mod predict;
pub mod serve;
pub mod train;
pub mod util;
