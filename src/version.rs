//! Version token bumping
//!
//! A version token is an opaque, dot-delimited string embedded in artifact
//! names. On a successful run the engine increments the last purely numeric
//! component and persists the result as the new default.

/// Increment the last numeric component of a version token
///
/// Scans components from last to first and bumps the first one that is
/// purely decimal digits, leaving every other component untouched. Tokens
/// with no numeric component are returned unchanged; an empty token starts
/// the sequence at `0.0.1`.
///
/// # Examples
///
/// ```rust
/// use snapdir::version::bump_patch;
///
/// assert_eq!(bump_patch(""), "0.0.1");
/// assert_eq!(bump_patch("2"), "3");
/// assert_eq!(bump_patch("1.4.9"), "1.4.10");
/// assert_eq!(bump_patch("v-beta"), "v-beta");
/// ```
pub fn bump_patch(version: &str) -> String {
    if version.is_empty() {
        return "0.0.1".to_string();
    }

    let mut parts: Vec<String> = version.split('.').map(str::to_string).collect();
    for part in parts.iter_mut().rev() {
        if !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()) {
            // A digit run that does not fit in (or would overflow) u64
            // leaves the token unchanged rather than wrapping.
            match part.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
                Some(bumped) => {
                    *part = bumped.to_string();
                    return parts.join(".");
                }
                None => return version.to_string(),
            }
        }
    }

    // No numeric segment found
    version.to_string()
}
