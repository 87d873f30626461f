use std::sync::LazyLock;

use regex::Regex;

/// Counts outside this range are page noise (years, view counts, ...), not signatures.
pub const PLAUSIBLE_COUNT: std::ops::RangeInclusive<u64> = 1..=1_000_000;

/// Embedded page state. Exact, so the first match wins without range filtering.
/// These also match the same objects nested under `"signatureState"`.
static STATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#""signatureCount"\s*:\s*\{\s*"displayed"\s*:\s*(\d+)\s*,"#,
        r#""signatureCount"\s*:\s*\{\s*"total"\s*:\s*(\d+)\s*,"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static pattern must compile"))
    .collect()
});

/// Rendered text. For each pattern the largest plausible candidate wins.
static TEXT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(\d{1,3}(?:,\d{3})+|\d+)\s*signatures?",
        r"(?i)(\d{1,3}(?:,\d{3})+|\d+)\s*people\s*signed",
        r"(?i)(\d{1,3}(?:,\d{3})+|\d+)\s*supporters",
        r#"(?i)data-signature-count="(\d+)""#,
        r"(?i)signature-count[^>]*>(\d+)",
        r"(?i)petition-signatures[^>]*>(\d+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static pattern must compile"))
    .collect()
});

/// Parses `1,234` or `1234`.
pub fn parse_count(raw: &str) -> Option<u64> {
    raw.replace(',', "").parse().ok()
}

/// Extracts the signature count from a petition page, or `None` if nothing on
/// the page looks like one.
pub fn extract_signature_count(page: &str) -> Option<u64> {
    for pattern in STATE_PATTERNS.iter() {
        if let Some(count) = pattern
            .captures(page)
            .and_then(|captures| parse_count(&captures[1]))
        {
            tracing::debug!(pattern = pattern.as_str(), count, "count found in page state");
            return Some(count);
        }
    }

    for pattern in TEXT_PATTERNS.iter() {
        let largest = pattern
            .captures_iter(page)
            .filter_map(|captures| parse_count(&captures[1]))
            .filter(|count| PLAUSIBLE_COUNT.contains(count))
            .max();

        if let Some(count) = largest {
            tracing::debug!(pattern = pattern.as_str(), count, "count found in page text");
            return Some(count);
        }
    }

    None
}

/// Change.org pages, including `chng.it` short links.
pub fn is_petition_url(url: &str) -> bool {
    let Some((_, rest)) = url.trim().split_once("://") else {
        return false;
    };
    let authority = rest
        .split(|c: char| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let host = authority
        .rsplit('@')
        .next()
        .unwrap_or_default()
        .split(':')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    ["change.org", "chng.it"]
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}
