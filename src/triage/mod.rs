//! Search-export triage.
//!
//! - [`registry`]: the CDN, hosting and keyword match lists.
//! - [`classifier`]: per-row verdicts and batch triage.
//! - [`dataset`]: CSV rows mapped onto [`DatasetRow`](crate::models::DatasetRow).

pub mod classifier;
pub mod dataset;
pub mod registry;
