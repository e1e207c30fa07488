/// Authority component of `scheme://authority/path?query#frag`.
///
/// Userinfo and port are kept, so `https://user@host:8443/x` yields
/// `user@host:8443`. Returns `None` when there is no `://`.
pub fn authority(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Tokens from `tokens` that occur anywhere in `payload`, ignoring case.
///
/// Result keeps the order of `tokens` and lists each token once.
pub fn matching_tokens(payload: &str, tokens: &[String]) -> Vec<String> {
    let haystack = payload.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for token in tokens {
        let needle = token.to_lowercase();
        if haystack.contains(&needle) && !found.contains(&needle) {
            found.push(needle);
        }
    }
    found
}
