//! Site URL normalization for index queries and cache keys.

/// Canonicalize a user-supplied site URL into the form the index expects.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace and lowercase
/// 2. Strip a leading `http://` or `https://`
/// 3. Strip a leading `www.`
/// 4. Strip a single trailing slash
///
/// No validation is performed; malformed input passes through and simply
/// yields no captures downstream.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);

    without_www.strip_suffix('/').unwrap_or(without_www).to_string()
}
