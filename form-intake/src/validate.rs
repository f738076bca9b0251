//! Origin, method and body checks for inbound submissions.
//!
//! Both origin strings are normalized by removing the first `www.` they
//! contain, then compared exactly. No scheme or trailing-slash tolerance.

const WWW: &str = "www.";

/// `POST` (case-sensitive) with a non-empty body.
pub fn is_valid_request(method: &str, body: &str) -> bool {
    method == "POST" && !body.is_empty()
}

/// `https://{domain}/` with the first `www.` removed from `domain`.
pub fn normalize_domain(domain: &str) -> String {
    format!("https://{}/", domain.replacen(WWW, "", 1))
}

/// The referer with its first `www.` removed.
pub fn normalize_referer(referer: &str) -> String {
    referer.replacen(WWW, "", 1)
}

/// A missing referer never matches.
pub fn is_valid_domain(domain: &str, referer: Option<&str>) -> bool {
    match referer {
        Some(referer) => normalize_domain(domain) == normalize_referer(referer),
        None => false,
    }
}
