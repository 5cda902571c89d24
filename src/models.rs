use serde::Serialize;

use crate::errors::AssetResolutionError;
use crate::favicon::hash::fingerprint;
use crate::favicon::resolver::{Attempt, Resolution};

/// Signed 32-bit favicon fingerprint, as stored by Shodan, FOFA and ZoomEye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(pub i32);

impl Fingerprint {
    pub fn shodan_query(self) -> String {
        format!("http.favicon.hash:{}", self.0)
    }

    pub fn fofa_query(self) -> String {
        format!("icon_hash=\"{}\"", self.0)
    }

    pub fn zoomeye_query(self) -> String {
        format!("iconhash:\"{}\"", self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Search-engine queries derived from a [`Fingerprint`].
#[derive(Debug, Clone, Serialize)]
pub struct Queries {
    pub shodan: String,
    pub fofa: String,
    pub zoomeye: String,
}

impl From<Fingerprint> for Queries {
    fn from(fp: Fingerprint) -> Self {
        Queries {
            shodan: fp.shodan_query(),
            fofa: fp.fofa_query(),
            zoomeye: fp.zoomeye_query(),
        }
    }
}

/// A successfully hashed favicon target.
#[derive(Debug, Clone, Serialize)]
pub struct HashedAsset {
    /// URL or path the bytes were finally read from.
    pub source: String,
    pub size: usize,
    pub fingerprint: Fingerprint,
    pub queries: Queries,
}

/// Why a target could not be hashed, in report form.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionFailure {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl From<&AssetResolutionError> for ResolutionFailure {
    fn from(err: &AssetResolutionError) -> Self {
        ResolutionFailure {
            kind: err.kind(),
            message: err.to_string(),
            hint: err.hint(),
        }
    }
}

/// Result of one `hash` target: the fingerprint or the failure, plus every
/// request made on the way.
#[derive(Debug, Clone, Serialize)]
pub struct HashOutcome {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<HashedAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResolutionFailure>,
    pub attempts: Vec<Attempt>,
}

impl HashOutcome {
    /// Hash the resolved bytes, if any.
    pub fn from_resolution(target: String, resolution: Resolution) -> Self {
        let (asset, error) = match resolution.outcome {
            Ok(resolved) => {
                let fp = fingerprint(&resolved.bytes);
                let asset = HashedAsset {
                    source: resolved.origin,
                    size: resolved.bytes.len(),
                    fingerprint: fp,
                    queries: fp.into(),
                };
                (Some(asset), None)
            }
            Err(err) => (None, Some(ResolutionFailure::from(&err))),
        };

        HashOutcome {
            target,
            asset,
            error,
            attempts: resolution.attempts,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.asset.is_some()
    }
}

/// One row of a search-engine export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    pub ip: String,
    pub org: String,
    pub title: String,
    pub host: String,
}

impl DatasetRow {
    pub fn new(
        ip: impl Into<String>,
        org: impl Into<String>,
        title: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        DatasetRow {
            ip: ip.into(),
            org: org.into(),
            title: title.into(),
            host: host.into(),
        }
    }

    /// Title, or the host when the title is empty, cut to 35 characters.
    pub fn display_name(&self) -> String {
        if self.title.is_empty() {
            return self.host.clone();
        }
        if self.title.chars().count() > 35 {
            let cut: String = self.title.chars().take(35).collect();
            format!("{}...", cut)
        } else {
            self.title.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Organization belongs to a CDN; never the origin.
    Ignored,
    SharedHosting,
    PotentialOrigin,
    CriticalAsset,
}

impl Verdict {
    /// Verdicts that count towards the origin candidate total.
    pub fn is_candidate(self) -> bool {
        matches!(self, Verdict::PotentialOrigin | Verdict::CriticalAsset)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Ignored => write!(f, "Ignored"),
            Verdict::SharedHosting => write!(f, "Shared Hosting"),
            Verdict::PotentialOrigin => write!(f, "Potential Origin"),
            Verdict::CriticalAsset => write!(f, "Critical Asset"),
        }
    }
}

/// Verdict for a single row plus the registry entry that decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub verdict: Verdict,
    /// Registry entry that matched; `None` for [`Verdict::PotentialOrigin`].
    pub matched: Option<String>,
}

impl Classification {
    /// The sensitive keyword annotation, present only on critical assets.
    pub fn flagged_keyword(&self) -> Option<&str> {
        match self.verdict {
            Verdict::CriticalAsset => self.matched.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriagedRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: u64,
    #[serde(flatten)]
    pub row: DatasetRow,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}
