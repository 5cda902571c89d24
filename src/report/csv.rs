use std::io;

use anyhow::Result;

use crate::triage::classifier::TriageReport;

/// Write every triaged row (Ignored included) as CSV.
pub fn render<W: io::Write>(report: &TriageReport, out: W) -> Result<()> {
    let mut wtr = ::csv::Writer::from_writer(out);
    wtr.write_record(["line", "ip", "org", "title", "host", "verdict", "keyword"])?;

    for triaged in &report.rows {
        let line = triaged.line.to_string();
        let verdict = triaged.verdict.to_string();
        wtr.write_record([
            line.as_str(),
            triaged.row.ip.as_str(),
            triaged.row.org.as_str(),
            triaged.row.title.as_str(),
            triaged.row.host.as_str(),
            verdict.as_str(),
            triaged.keyword.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
