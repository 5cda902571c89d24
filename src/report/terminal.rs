use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{HashOutcome, Verdict};
use crate::triage::classifier::TriageReport;
use crate::triage::registry::Registries;

fn banner() {
    println!("\n {} v{}", "favhunt".bold(), env!("CARGO_PKG_VERSION"));
}

/// Render fingerprints and search queries for every `hash` target.
pub fn render_hashes(outcomes: &[HashOutcome], quiet: bool) {
    if quiet {
        for outcome in outcomes {
            match &outcome.asset {
                Some(asset) => println!("{}\t{}", asset.fingerprint, outcome.target),
                None => println!("{}\t{}", "error".red(), outcome.target),
            }
        }
        return;
    }

    banner();

    for outcome in outcomes {
        println!(" {}", "─".repeat(52));
        match (&outcome.asset, &outcome.error) {
            (Some(asset), _) => {
                println!(" {} {}", "[+]".green().bold(), outcome.target);
                println!("   Source       : {}", asset.source);
                println!("   File size    : {} bytes", asset.size);
                println!("   MurmurHash3  : {}", asset.fingerprint.to_string().bold());
                println!();
                println!("   Shodan       : {}", asset.queries.shodan);
                println!("   FOFA         : {}", asset.queries.fofa);
                println!("   ZoomEye      : {}", asset.queries.zoomeye);
            }
            (None, Some(error)) => {
                println!(" {} {}", "[-]".red().bold(), outcome.target);
                println!("   {}", error.message.red());
                if let Some(hint) = error.hint {
                    println!("   {} {}", "hint:".yellow(), hint);
                }
            }
            (None, None) => {}
        }

        for attempt in &outcome.attempts {
            let status = attempt
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "no response".to_string());
            println!(
                "   {} {:?} {} → {}",
                "·".dimmed(),
                attempt.kind,
                attempt.url.dimmed(),
                status
            );
        }
    }
    println!(" {}\n", "─".repeat(52));
}

/// Render the triage table and summary.
pub fn render_triage(
    report: &TriageReport,
    path: &Path,
    registries: &Registries,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let candidates = report.candidate_count();
    let critical = report.count(Verdict::CriticalAsset);
    let potential = report.count(Verdict::PotentialOrigin);
    let shared = report.count(Verdict::SharedHosting);
    let ignored = report.count(Verdict::Ignored);

    if quiet {
        println!(
            "Rows: {}  Candidates: {}  Critical: {}  Potential: {}  Shared: {}  Ignored: {}  Skipped: {}",
            report.rows.len(),
            candidates,
            critical.to_string().red(),
            potential.to_string().green(),
            shared.to_string().yellow(),
            ignored,
            report.skipped.len(),
        );
        return Ok(());
    }

    banner();
    println!(" Analyzing: {}", path.display());
    println!(
        " Rules    : {} CDN, {} hosting, {} keywords\n",
        registries.cdn.len(),
        registries.hosting.len(),
        registries.keywords.len()
    );

    let shown: Vec<_> = report
        .rows
        .iter()
        .filter(|r| verbose || r.verdict != Verdict::Ignored)
        .collect();

    if !shown.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("IP Address").add_attribute(Attribute::Bold),
                Cell::new("Org").add_attribute(Attribute::Bold),
                Cell::new("Title/Host").add_attribute(Attribute::Bold),
                Cell::new("Verdict").add_attribute(Attribute::Bold),
                Cell::new("Keyword").add_attribute(Attribute::Bold),
            ]);

        for triaged in shown {
            let verdict_color = match triaged.verdict {
                Verdict::Ignored => Color::DarkGrey,
                Verdict::SharedHosting => Color::Yellow,
                Verdict::PotentialOrigin => Color::Green,
                Verdict::CriticalAsset => Color::Red,
            };
            let mut verdict_cell = Cell::new(triaged.verdict.to_string())
                .fg(verdict_color)
                .set_alignment(CellAlignment::Center);
            if triaged.verdict == Verdict::CriticalAsset {
                verdict_cell = verdict_cell.add_attribute(Attribute::Bold);
            }

            let org: String = triaged.row.org.chars().take(25).collect();
            table.add_row(vec![
                Cell::new(&triaged.row.ip),
                Cell::new(org),
                Cell::new(triaged.row.display_name()),
                verdict_cell,
                Cell::new(triaged.keyword.as_deref().unwrap_or("")),
            ]);
        }

        println!("{}\n", table);
    }

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Rows analyzed      : {:>5}", report.rows.len()));
    println!(" │  {:<48} │", format!("Critical asset     : {:>5}", critical));
    println!(" │  {:<48} │", format!("Potential origin   : {:>5}", potential));
    println!(" │  {:<48} │", format!("Shared hosting     : {:>5}", shared));
    println!(" │  {:<48} │", format!("Ignored (CDN)      : {:>5}", ignored));
    println!(" │  {:<48} │", format!("Skipped (bad rows) : {:>5}", report.skipped.len()));
    println!(" └────────────────────────────────────────────────────┘\n");

    if !report.skipped.is_empty() {
        println!(" {} Rows skipped:\n", "[WARN]".yellow().bold());
        for err in &report.skipped {
            println!("   {}", err);
        }
        println!();
    }

    if candidates == 0 {
        println!(
            " {} No obvious origin IPs found. Target might be fully behind CDN.\n",
            "[!]".yellow().bold()
        );
    } else {
        println!(
            " {} Analysis complete. Found {} potential origin candidates.\n",
            "[*]".blue().bold(),
            candidates
        );
    }

    Ok(())
}
