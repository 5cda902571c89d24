use std::io;
use std::net::IpAddr;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder};
use tracing::warn;

use crate::errors::DataFormatError;
use crate::models::DatasetRow;

/// A parsed row, or why it could not be parsed, tagged with its line number.
pub type RowResult = (u64, Result<DatasetRow, DataFormatError>);

const IP_ALIASES: &[&str] = &["ip"];
const ORG_ALIASES: &[&str] = &["org", "organization", "as_organization", "isp"];
const TITLE_ALIASES: &[&str] = &["title"];
const HOST_ALIASES: &[&str] = &["host", "domain"];

/// Header positions of the fields the classifier needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMap {
    pub ip: Option<usize>,
    pub org: Option<usize>,
    pub title: Option<usize>,
    pub host: Option<usize>,
}

impl ColumnMap {
    pub fn from_headers(headers: &ByteRecord) -> Self {
        let names: Vec<String> = headers
            .iter()
            .map(|h| {
                String::from_utf8_lossy(h)
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .to_lowercase()
            })
            .collect();

        // Aliases are tried in order so `host` wins over `domain` when both exist.
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| names.iter().position(|n| n == alias))
        };

        ColumnMap {
            ip: find(IP_ALIASES),
            org: find(ORG_ALIASES),
            title: find(TITLE_ALIASES),
            host: find(HOST_ALIASES),
        }
    }

    /// Build a row from one record. `ip` must be a present, parseable address
    /// and `org` must be present; `title` and `host` default to empty.
    pub fn row(&self, record: &ByteRecord, line: u64) -> Result<DatasetRow, DataFormatError> {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(|v| String::from_utf8_lossy(v).trim().to_string())
        };

        let ip = field(self.ip)
            .filter(|ip| !ip.is_empty())
            .ok_or(DataFormatError::MissingField { line, field: "ip" })?;
        if ip.parse::<IpAddr>().is_err() {
            return Err(DataFormatError::Malformed {
                line,
                reason: format!("`{ip}` is not an IP address"),
            });
        }
        let org = field(self.org).ok_or(DataFormatError::MissingField { line, field: "org" })?;

        Ok(DatasetRow::new(
            ip,
            org,
            field(self.title).unwrap_or_default(),
            field(self.host).unwrap_or_default(),
        ))
    }
}

/// Read every row of a CSV export. Read failures are fatal; per-row
/// problems come back as [`DataFormatError`]s.
pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<RowResult>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.byte_headers().context("cannot read CSV header")?.clone();
    let columns = ColumnMap::from_headers(&headers);
    if columns.ip.is_none() || columns.org.is_none() {
        warn!(?columns, "CSV header lacks an ip or org column; every row will be skipped");
    }

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    let mut last_line = 1u64;

    loop {
        match rdr.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or(last_line + 1);
                last_line = line;
                rows.push((line, columns.row(&record, line)));
            }
            Err(err) => return Err(err).context("cannot read CSV record"),
        }
    }

    Ok(rows)
}

pub fn read_path(path: &Path) -> Result<Vec<RowResult>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("cannot open dataset {}", path.display()))?;
    read_rows(io::BufReader::new(file))
}
