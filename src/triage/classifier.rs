use serde::Serialize;
use tracing::debug;

use crate::errors::DataFormatError;
use crate::models::{Classification, DatasetRow, TriagedRow, Verdict};
use crate::triage::registry::{fold, Registries};

/// Assign a verdict to one row. First matching rule wins:
///
/// 1. `org` contains a CDN entry → [`Verdict::Ignored`]
/// 2. `org` contains a hosting entry → [`Verdict::SharedHosting`]
/// 3. `title` or `host` contains a keyword → [`Verdict::CriticalAsset`]
/// 4. otherwise → [`Verdict::PotentialOrigin`]
///
/// Keyword text comes from the scanned host itself, so it is only trusted
/// once CDN and hosting noise is out of the way.
pub fn classify(row: &DatasetRow, registries: &Registries) -> Classification {
    let org = fold(&row.org);

    if let Some(entry) = registries.cdn.find(&org) {
        return matched(Verdict::Ignored, entry);
    }

    if let Some(entry) = registries.hosting.find(&org) {
        return matched(Verdict::SharedHosting, entry);
    }

    // The separator keeps a keyword from straddling the two fields.
    let text = fold(&format!("{} {}", row.title, row.host));
    if let Some(keyword) = registries.keywords.find(&text) {
        return matched(Verdict::CriticalAsset, keyword);
    }

    Classification {
        verdict: Verdict::PotentialOrigin,
        matched: None,
    }
}

fn matched(verdict: Verdict, entry: &str) -> Classification {
    Classification {
        verdict,
        matched: Some(entry.to_string()),
    }
}

/// Result of triaging a whole dataset.
#[derive(Debug, Default, Serialize)]
pub struct TriageReport {
    /// Classified rows in input order.
    pub rows: Vec<TriagedRow>,
    /// Rows that could not be read, in input order.
    pub skipped: Vec<DataFormatError>,
}

impl TriageReport {
    /// Rows whose verdict is PotentialOrigin or CriticalAsset.
    pub fn candidate_count(&self) -> usize {
        self.rows.iter().filter(|r| r.verdict.is_candidate()).count()
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.rows.iter().filter(|r| r.verdict == verdict).count()
    }
}

/// Classify every readable row independently, preserving order.
///
/// Unreadable rows are recorded in [`TriageReport::skipped`] and never abort
/// the batch.
pub fn triage<I>(rows: I, registries: &Registries) -> TriageReport
where
    I: IntoIterator<Item = (u64, Result<DatasetRow, DataFormatError>)>,
{
    let mut report = TriageReport::default();

    for (line, row) in rows {
        match row {
            Ok(row) => {
                let classification = classify(&row, registries);
                debug!(line, ip = %row.ip, verdict = %classification.verdict, "classified row");
                report.rows.push(TriagedRow {
                    line,
                    keyword: classification.flagged_keyword().map(str::to_string),
                    verdict: classification.verdict,
                    row,
                });
            }
            Err(err) => {
                debug!("skipping row: {}", err);
                report.skipped.push(err);
            }
        }
    }

    report
}
