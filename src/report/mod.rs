//! Report renderers.
//!
//! - [`terminal`]: colored fingerprint blocks and the triage table with a
//!   summary box; respects `--verbose` / `--quiet`.
//! - [`csv`]: triaged rows as CSV for spreadsheets or further filtering.
//!
//! JSON output is plain `serde_json` over the models and lives in `main`.

pub mod csv;
pub mod terminal;
