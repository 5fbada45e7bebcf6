//! Link header parsing
//!
//! Format: `<url>; rel="next"; results="true"; cursor="0:100:0", <url>; rel="previous"`

use regex::Regex;
use std::sync::LazyLock;

/// Cursor token inside a link target
static CURSOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"cursor=([^>&]+)").unwrap());

/// One comma-separated entry of a Link header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkDescriptor {
    /// Target URL without angle brackets
    pub url: String,
    /// Relation (`next`, `previous`, ...)
    pub rel: Option<String>,
    /// Sentry's `results` hint, when present
    pub results: Option<bool>,
}

impl LinkDescriptor {
    /// Cursor token embedded in the URL
    pub fn cursor_token(&self) -> Option<String> {
        CURSOR_RE
            .captures(&self.url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Split a Link header into its descriptors
pub fn parse_link_descriptors(header: &str) -> Vec<LinkDescriptor> {
    let mut descriptors = Vec::new();

    for part in header.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let mut descriptor = LinkDescriptor::default();
        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                descriptor.url = segment[1..segment.len() - 1].to_string();
            } else if let Some(value) = segment.strip_prefix("rel=") {
                descriptor.rel = Some(unquote(value).to_string());
            } else if let Some(value) = segment.strip_prefix("results=") {
                descriptor.results = Some(unquote(value).eq_ignore_ascii_case("true"));
            }
        }
        descriptors.push(descriptor);
    }

    descriptors
}

/// Extract the next-page cursor token from a Link header.
///
/// Returns `None` when no `rel="next"` descriptor exists, when it carries
/// no cursor, or when Sentry marks it with `results="false"`.
pub fn next_cursor(header: &str) -> Option<String> {
    let next = parse_link_descriptors(header)
        .into_iter()
        .find(|d| d.rel.as_deref() == Some("next"))?;

    if next.results == Some(false) {
        return None;
    }

    next.cursor_token()
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim_matches('\'')
}
