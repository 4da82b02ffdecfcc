use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use url::Url;

lazy_static! {
    // Feed titles often end in a dash- or colon-separated source attribution.
    static ref TRAILING_SOURCE: Regex = Regex::new(r"\s+[-–—:|]\s*[^-–—:|]{2,80}$").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref PUNCTUATION: Regex = Regex::new(r"[^\w\s]").unwrap();
}

const TRACKING_PARAMS: &[&str] = &["utm_source", "utm_medium", "utm_campaign", "ref", "fbclid", "gclid"];

/// Normalize a title for dedup: drop the trailing source attribution,
/// collapse whitespace, strip punctuation, lowercase.
pub fn normalize_title(title: &str) -> String {
    let t = title.trim();
    let t = TRAILING_SOURCE.replace(t, "");
    let t = WHITESPACE.replace_all(&t, " ");
    let t = PUNCTUATION.replace_all(&t, "");
    t.trim().to_lowercase()
}

/// Canonicalize a URL for dedup: strip tracking parameters, sort the
/// remaining query pairs, drop the fragment, trim the trailing slash.
/// Unparseable input comes back unchanged.
pub fn canonicalize_url(raw: &str) -> String {
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !k.starts_with("utm_") && !TRACKING_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        url.set_query(Some(&query));
    }
    url.set_fragment(None);

    let trimmed = url.path().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        url.set_path("/");
    } else {
        url.set_path(&trimmed);
    }

    let mut out = url.to_string();
    // Url::to_string keeps a lone "/" on bare origins; the dedup key drops it.
    if url.path() == "/" && url.query().is_none() {
        out = out.trim_end_matches('/').to_string();
    }
    out
}

/// Hex sha256 over the content, the third dedup key.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Fuzzy equality between two normalized titles.
pub fn titles_similar(a: &str, b: &str, threshold: f64) -> bool {
    strsim::normalized_levenshtein(a, b) >= threshold
}

pub const SIMILARITY_THRESHOLD: f64 = 0.92;
