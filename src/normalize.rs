//! Response text normalization.
//!
//! Vision models wrap their JSON in markdown fences, prepend apologies, or
//! append commentary. Normalization strips that decoration before any parse
//! attempt so the repair stages only ever see the candidate payload.

/// Normalizes raw model output down to the most likely JSON payload.
///
/// Two passes, both lossless with respect to the payload itself:
///
/// 1. If the trimmed text is wrapped in a markdown code fence (with an
///    optional language tag), the fence is removed.
/// 2. If the result contains a `{` ... `}` pair, the text is narrowed to
///    that inclusive span, discarding surrounding prose.
///
/// The function is idempotent and never fails; text with no recognizable
/// structure is returned trimmed.
///
/// # Examples
///
/// ```
/// use nutriparse::normalize;
///
/// assert_eq!(normalize("```json\n{\"a\":1}\n```"), "{\"a\":1}");
/// assert_eq!(normalize("Here you go: {\"a\":1} hope that helps"), "{\"a\":1}");
/// assert_eq!(normalize("  no json here  "), "no json here");
/// ```
pub fn normalize(raw: &str) -> String {
    let text = strip_fences(raw.trim());

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// Removes a surrounding markdown code fence, if present.
///
/// Handles both the common form with the payload on its own lines and the
/// compact form where the opening fence and payload share a line.
fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return text;
    };

    // Drop the language tag on the opening fence, when there is one.
    let rest = match rest.find('\n') {
        Some(idx) if rest[..idx].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[idx + 1..],
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    rest.trim()
}
