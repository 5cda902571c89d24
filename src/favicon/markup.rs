use anyhow::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;
use reqwest::Url;

/// `rel` tokens that declare an icon, highest priority first.
/// `shortcut icon` is covered by the `icon` token.
const ICON_RELS: &[&str] = &["icon", "apple-touch-icon", "apple-touch-icon-precomposed"];

/// Where the markup says the icon lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconReference {
    Remote(Url),
    /// Icon embedded as a base-64 `data:` URI.
    Inline(Vec<u8>),
}

#[derive(Debug, Default)]
struct LinkTag {
    rel: Vec<String>,
    href: Option<String>,
}

/// Find the icon declared by `<link rel=...>` tags in `html`, resolved
/// against `base`. Returns `Ok(None)` when no usable reference exists.
pub fn find_icon_reference(html: &str, base: &Url) -> Result<Option<IconReference>> {
    let tag_re = Regex::new(r"(?is)<link\b([^>]*)>")?;
    // One match per attribute, quoted values included, so text inside a
    // value is never read as an attribute name.
    let attr_re =
        Regex::new(r#"(?s)([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)?;

    let links: Vec<LinkTag> = tag_re
        .captures_iter(html)
        .map(|tag| {
            let mut link = LinkTag::default();
            let mut seen_rel = false;
            let attrs = tag.get(1).map_or("", |m| m.as_str());
            for cap in attr_re.captures_iter(attrs) {
                let value = cap
                    .get(2)
                    .or_else(|| cap.get(3))
                    .or_else(|| cap.get(4))
                    .map(|m| m.as_str())
                    .unwrap_or("");
                // Duplicate attributes: the first occurrence wins.
                match cap[1].to_ascii_lowercase().as_str() {
                    "rel" if !seen_rel => {
                        seen_rel = true;
                        link.rel = value
                            .split_whitespace()
                            .map(|t| t.to_ascii_lowercase())
                            .collect();
                    }
                    "href" if link.href.is_none() => {
                        link.href = Some(value.trim().replace("&amp;", "&"));
                    }
                    _ => {}
                }
            }
            link
        })
        .collect();

    for rel in ICON_RELS {
        let href = links
            .iter()
            .filter(|l| l.rel.iter().any(|t| t == rel))
            .filter_map(|l| l.href.as_deref())
            .find(|h| !h.is_empty());

        if let Some(href) = href {
            return Ok(resolve_href(href, base));
        }
    }

    Ok(None)
}

fn resolve_href(href: &str, base: &Url) -> Option<IconReference> {
    if let Some(data) = href.strip_prefix("data:") {
        return decode_data_uri(data).map(IconReference::Inline);
    }
    base.join(href).ok().map(IconReference::Remote)
}

/// Decode the part of a `data:` URI after the scheme. Only base-64 payloads
/// carry binary icons, so anything else is treated as no reference.
fn decode_data_uri(data: &str) -> Option<Vec<u8>> {
    let (meta, payload) = data.split_once(',')?;
    if !meta.to_ascii_lowercase().ends_with(";base64") {
        return None;
    }
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64.decode(compact).ok()
}
