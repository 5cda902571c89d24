use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AssetResolutionError;
use crate::favicon::fetch::{Fetched, Fetcher};
use crate::favicon::markup::{find_icon_reference, IconReference};

const IMAGE_EXTENSIONS: &[&str] = &[".ico", ".png", ".jpg", ".jpeg", ".svg"];

/// Where a favicon should come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// A page or a direct icon URL.
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for AssetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetSource::Url(url) => write!(f, "{}", url),
            AssetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptKind {
    /// The URL the user asked for.
    Direct,
    /// An icon declared in the page markup.
    Declared,
    /// The conventional `/favicon.ico` path.
    DefaultPath,
}

/// One HTTP request made while resolving a URL source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub kind: AttemptKind,
    pub url: String,
    /// `None` when the request never got a response.
    pub status: Option<u16>,
}

/// Fully buffered favicon bytes, ready for hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// URL or path the bytes were read from.
    pub origin: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct Resolution {
    pub attempts: Vec<Attempt>,
    pub outcome: Result<ResolvedAsset, AssetResolutionError>,
}

/// Resolution progress for a URL source. Each stage makes at most one
/// request; `Resolved` and `Failed` are terminal.
enum Stage {
    NotStarted,
    MarkupChecked {
        page: Url,
        reference: Option<IconReference>,
    },
    FallbackChecked {
        page: Url,
        response: Fetched,
    },
    Resolved(ResolvedAsset),
    Failed(AssetResolutionError),
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::NotStarted => "not-started",
            Stage::MarkupChecked { .. } => "markup-checked",
            Stage::FallbackChecked { .. } => "fallback-checked",
            Stage::Resolved(_) => "resolved",
            Stage::Failed(_) => "failed",
        }
    }
}

/// Turns an [`AssetSource`] into bytes: page → declared icon → default path.
pub struct Resolver<'a, F: Fetcher> {
    fetcher: &'a F,
    /// `None` disables the default-path fallback.
    fallback_path: Option<String>,
}

impl<'a, F: Fetcher> Resolver<'a, F> {
    pub fn new(fetcher: &'a F, fallback_path: Option<String>) -> Self {
        Resolver {
            fetcher,
            fallback_path,
        }
    }

    pub async fn resolve(&self, source: &AssetSource) -> Resolution {
        match source {
            AssetSource::File(path) => Resolution {
                attempts: Vec::new(),
                outcome: read_file(path).await,
            },
            AssetSource::Url(url) => self.resolve_url(url).await,
        }
    }

    async fn resolve_url(&self, raw: &str) -> Resolution {
        let mut attempts = Vec::new();
        let mut stage = Stage::NotStarted;

        loop {
            debug!(target_url = raw, stage = stage.name(), "resolving favicon");
            stage = match stage {
                Stage::NotStarted => self.check_page(raw, &mut attempts).await,
                Stage::MarkupChecked { page, reference } => match reference {
                    Some(IconReference::Inline(bytes)) => Stage::Resolved(ResolvedAsset {
                        origin: format!("{} (inline data URI)", page),
                        bytes,
                    }),
                    Some(IconReference::Remote(icon)) => {
                        self.fetch_declared(icon, &mut attempts).await
                    }
                    None => match &self.fallback_path {
                        Some(path) => self.check_fallback(page, path, &mut attempts).await,
                        None => Stage::Failed(AssetResolutionError::NoIconReference {
                            page: page.to_string(),
                        }),
                    },
                },
                Stage::FallbackChecked { page, response } => {
                    if response.is_success() {
                        Stage::Resolved(ResolvedAsset {
                            origin: response.url.to_string(),
                            bytes: response.body,
                        })
                    } else {
                        Stage::Failed(AssetResolutionError::FallbackNotFound {
                            page: page.to_string(),
                            url: response.url.to_string(),
                            status: response.status,
                        })
                    }
                }
                Stage::Resolved(asset) => {
                    return Resolution {
                        attempts,
                        outcome: Ok(asset),
                    }
                }
                Stage::Failed(err) => {
                    return Resolution {
                        attempts,
                        outcome: Err(err),
                    }
                }
            };
        }
    }

    async fn check_page(&self, raw: &str, attempts: &mut Vec<Attempt>) -> Stage {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(err) => {
                return Stage::Failed(AssetResolutionError::InvalidUrl {
                    url: raw.to_string(),
                    reason: err.to_string(),
                })
            }
        };

        let response = match self.request(AttemptKind::Direct, url, attempts).await {
            Ok(response) => response,
            Err(stage) => return stage,
        };

        if !response.is_success() {
            return Stage::Failed(AssetResolutionError::HttpStatus {
                url: response.url.to_string(),
                status: response.status,
            });
        }

        if looks_like_image(&response) {
            return Stage::Resolved(ResolvedAsset {
                origin: response.url.to_string(),
                bytes: response.body,
            });
        }

        let html = String::from_utf8_lossy(&response.body);
        let reference = find_icon_reference(&html, &response.url).unwrap_or_else(|err| {
            warn!("markup scan failed: {}", err);
            None
        });

        Stage::MarkupChecked {
            page: response.url,
            reference,
        }
    }

    async fn fetch_declared(&self, icon: Url, attempts: &mut Vec<Attempt>) -> Stage {
        let response = match self.request(AttemptKind::Declared, icon, attempts).await {
            Ok(response) => response,
            Err(stage) => return stage,
        };

        if response.is_success() {
            Stage::Resolved(ResolvedAsset {
                origin: response.url.to_string(),
                bytes: response.body,
            })
        } else {
            Stage::Failed(AssetResolutionError::IconNotFound {
                url: response.url.to_string(),
                status: response.status,
            })
        }
    }

    async fn check_fallback(&self, page: Url, path: &str, attempts: &mut Vec<Attempt>) -> Stage {
        let url = match page.join(path) {
            Ok(url) => url,
            Err(err) => {
                return Stage::Failed(AssetResolutionError::InvalidUrl {
                    url: path.to_string(),
                    reason: err.to_string(),
                })
            }
        };

        match self.request(AttemptKind::DefaultPath, url, attempts).await {
            Ok(response) => Stage::FallbackChecked { page, response },
            Err(stage) => stage,
        }
    }

    /// Issue one GET and record it. Transport failures become a terminal stage.
    async fn request(
        &self,
        kind: AttemptKind,
        url: Url,
        attempts: &mut Vec<Attempt>,
    ) -> Result<Fetched, Stage> {
        match self.fetcher.get(&url).await {
            Ok(response) => {
                attempts.push(Attempt {
                    kind,
                    url: url.to_string(),
                    status: Some(response.status),
                });
                Ok(response)
            }
            Err(source) => {
                attempts.push(Attempt {
                    kind,
                    url: url.to_string(),
                    status: None,
                });
                Err(Stage::Failed(AssetResolutionError::Unreachable {
                    url: url.to_string(),
                    source,
                }))
            }
        }
    }
}

fn looks_like_image(response: &Fetched) -> bool {
    let by_type = response
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().contains("image"))
        .unwrap_or(false);
    let path = response.url.path().to_ascii_lowercase();
    by_type || IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

async fn read_file(path: &Path) -> Result<ResolvedAsset, AssetResolutionError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(ResolvedAsset {
            origin: path.display().to_string(),
            bytes,
        }),
        Err(source) => Err(AssetResolutionError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::favicon::fetch::FetchError;

    /// In-memory transport. URLs not listed are unreachable.
    #[derive(Default)]
    struct Scripted {
        responses: HashMap<String, (u16, &'static str, Vec<u8>)>,
    }

    impl Scripted {
        fn with(mut self, url: &str, status: u16, content_type: &'static str, body: &[u8]) -> Self {
            self.responses
                .insert(url.to_string(), (status, content_type, body.to_vec()));
            self
        }
    }

    impl Fetcher for Scripted {
        async fn get(&self, url: &Url) -> Result<Fetched, FetchError> {
            match self.responses.get(url.as_str()) {
                Some((status, content_type, body)) => Ok(Fetched {
                    url: url.clone(),
                    status: *status,
                    content_type: Some(content_type.to_string()),
                    body: body.clone(),
                }),
                None => Err("connection refused".into()),
            }
        }
    }

    fn kinds(resolution: &Resolution) -> Vec<AttemptKind> {
        resolution.attempts.iter().map(|a| a.kind).collect()
    }

    fn fallback() -> Option<String> {
        Some("/favicon.ico".to_string())
    }

    #[tokio::test]
    async fn test_direct_image_url() {
        let fetcher = Scripted::default().with(
            "https://acme.example/static/logo.png",
            200,
            "application/octet-stream",
            b"PNGDATA",
        );
        let resolver = Resolver::new(&fetcher, fallback());
        let res = resolver
            .resolve(&AssetSource::Url("https://acme.example/static/logo.png".into()))
            .await;

        let asset = res.outcome.unwrap();
        assert_eq!(asset.bytes, b"PNGDATA");
        assert_eq!(res.attempts.len(), 1);
    }

    #[tokio::test]
    async fn test_declared_icon_is_followed() {
        let fetcher = Scripted::default()
            .with(
                "https://acme.example/",
                200,
                "text/html; charset=utf-8",
                br#"<link rel="shortcut icon" href="/assets/fav.ico">"#,
            )
            .with("https://acme.example/assets/fav.ico", 200, "image/x-icon", b"ICO");
        let resolver = Resolver::new(&fetcher, fallback());
        let res = resolver
            .resolve(&AssetSource::Url("https://acme.example".into()))
            .await;

        assert_eq!(kinds(&res), vec![AttemptKind::Direct, AttemptKind::Declared]);
        let asset = res.outcome.unwrap();
        assert_eq!(asset.origin, "https://acme.example/assets/fav.ico");
        assert_eq!(asset.bytes, b"ICO");
    }

    #[tokio::test]
    async fn test_fallback_used_without_reference() {
        let fetcher = Scripted::default()
            .with("https://acme.example/login", 200, "text/html", b"<html></html>")
            .with("https://acme.example/favicon.ico", 200, "image/x-icon", b"ICO");
        let resolver = Resolver::new(&fetcher, fallback());
        let res = resolver
            .resolve(&AssetSource::Url("https://acme.example/login".into()))
            .await;

        assert_eq!(kinds(&res), vec![AttemptKind::Direct, AttemptKind::DefaultPath]);
        assert_eq!(res.outcome.unwrap().bytes, b"ICO");
    }

    #[tokio::test]
    async fn test_fallback_not_found() {
        let fetcher = Scripted::default()
            .with("https://acme.example/", 200, "text/html", b"<html></html>")
            .with("https://acme.example/favicon.ico", 404, "text/html", b"nope");
        let resolver = Resolver::new(&fetcher, fallback());
        let res = resolver
            .resolve(&AssetSource::Url("https://acme.example/".into()))
            .await;

        match res.outcome {
            Err(AssetResolutionError::FallbackNotFound { status, url, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(url, "https://acme.example/favicon.ico");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_reference_without_fallback() {
        let fetcher =
            Scripted::default().with("https://acme.example/", 200, "text/html", b"<p>hi</p>");
        let resolver = Resolver::new(&fetcher, None);
        let res = resolver
            .resolve(&AssetSource::Url("https://acme.example/".into()))
            .await;

        assert!(matches!(
            res.outcome,
            Err(AssetResolutionError::NoIconReference { .. })
        ));
        assert_eq!(kinds(&res), vec![AttemptKind::Direct]);
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let fetcher = Scripted::default();
        let resolver = Resolver::new(&fetcher, fallback());
        let res = resolver
            .resolve(&AssetSource::Url("https://down.example/".into()))
            .await;

        assert!(matches!(
            res.outcome,
            Err(AssetResolutionError::Unreachable { .. })
        ));
        assert_eq!(res.attempts[0].status, None);
    }

    #[tokio::test]
    async fn test_page_error_status() {
        let fetcher =
            Scripted::default().with("https://acme.example/", 503, "text/html", b"busy");
        let resolver = Resolver::new(&fetcher, fallback());
        let res = resolver
            .resolve(&AssetSource::Url("https://acme.example/".into()))
            .await;

        assert!(matches!(
            res.outcome,
            Err(AssetResolutionError::HttpStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_declared_icon_missing() {
        let fetcher = Scripted::default()
            .with(
                "https://acme.example/",
                200,
                "text/html",
                br#"<link rel="icon" href="/gone.png">"#,
            )
            .with("https://acme.example/gone.png", 404, "text/html", b"");
        let resolver = Resolver::new(&fetcher, fallback());
        let res = resolver
            .resolve(&AssetSource::Url("https://acme.example/".into()))
            .await;

        assert!(matches!(
            res.outcome,
            Err(AssetResolutionError::IconNotFound { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_inline_icon_needs_no_second_request() {
        let fetcher = Scripted::default().with(
            "https://acme.example/",
            200,
            "text/html",
            br#"<link rel="icon" href="data:image/x-icon;base64,SUNP">"#,
        );
        let resolver = Resolver::new(&fetcher, fallback());
        let res = resolver
            .resolve(&AssetSource::Url("https://acme.example/".into()))
            .await;

        assert_eq!(res.outcome.unwrap().bytes, b"ICO");
        assert_eq!(res.attempts.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let fetcher = Scripted::default();
        let resolver = Resolver::new(&fetcher, fallback());
        let res = resolver
            .resolve(&AssetSource::Url("acme.example".into()))
            .await;

        assert!(matches!(
            res.outcome,
            Err(AssetResolutionError::InvalidUrl { .. })
        ));
        assert!(res.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favicon.ico");
        std::fs::write(&path, b"\x00\x00\x01\x00").unwrap();

        let fetcher = Scripted::default();
        let resolver = Resolver::new(&fetcher, fallback());

        let res = resolver.resolve(&AssetSource::File(path.clone())).await;
        assert_eq!(res.outcome.unwrap().bytes, b"\x00\x00\x01\x00");

        let missing = resolver
            .resolve(&AssetSource::File(dir.path().join("missing.ico")))
            .await;
        assert!(matches!(
            missing.outcome,
            Err(AssetResolutionError::FileUnreadable { .. })
        ));
    }
}
