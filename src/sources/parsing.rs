//! Domain List Parsing
//!
//! Line-oriented list format:
//! - blank lines and lines starting with `#` or `//` are ignored
//! - every other line is normalized to a bare lower-case domain
//! - duplicates (after normalization) collapse to the first occurrence
//! - entries shorter than 2 characters are dropped
//!
//! The denylist is applied separately by [`filter_excluded`] so callers can
//! run it on hardcoded lists too.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Niche or unstable domains never worth probing
const EXCLUDED_DOMAINS: &[&str] = &[
    "1337x.to",
    "4pda.ws",
    "cms1.dzvr.ru",
    "rutor.info",
    "nnmclub.to",
    "kinogo.biz",
    "anidub.com",
    "lostfilm.tv",
    "baibako.tv",
    "toloka.to",
    "academy.creatio.com",
    "ads-twitter.com",
    "ua",
    "www.alza.hu",
    "alza.hu",
    "1018213540.rsc.cdn77.org",
];

/// Excluded TLD suffix
const EXCLUDED_SUFFIX: &str = ".ua";

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9+.\-]*://").expect("valid regex"));

/// Parse list text into normalized, de-duplicated domains
pub fn parse_domain_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut domains = Vec::new();

    for line in text.lines() {
        let Some(domain) = normalize_line(line) else {
            continue;
        };
        if seen.insert(domain.clone()) {
            domains.push(domain);
        }
    }

    domains
}

/// Normalize one list line; `None` for comments, blanks and too-short entries
pub fn normalize_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
        return None;
    }

    let domain = extract_domain(trimmed);
    (domain.len() >= 2).then_some(domain)
}

/// Reduce a URL-ish string to its bare host
///
/// Strips scheme, path, query, port and leading dots, then lower-cases.
pub fn extract_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = SCHEME_PREFIX.replace(&lowered, "");

    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();

    host.trim_start_matches('.').to_string()
}

/// Whether the denylist rejects `domain`
pub fn is_excluded(domain: &str) -> bool {
    let lower = domain.to_lowercase();
    EXCLUDED_DOMAINS.contains(&lower.as_str()) || lower.ends_with(EXCLUDED_SUFFIX)
}

/// Drop denylisted domains, preserving order
pub fn filter_excluded(domains: Vec<String>) -> Vec<String> {
    domains.into_iter().filter(|d| !is_excluded(d)).collect()
}
