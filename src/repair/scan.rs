//! Shared single-pass scanning utilities for the repair stages.
//!
//! Every structural question the stages ask — what is still open, where the
//! last complete value ended, whether an offset sits inside a string — is
//! answered by one forward scan tracking string and escape state, never by
//! regexes over nested structure.

/// Scanner state after consuming some prefix of the input.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScanState {
    /// Currently open `{` / `[` delimiters, outermost first.
    pub open: Vec<char>,
    /// Whether the scan ended inside a string literal.
    pub in_string: bool,
    /// Whether the last consumed character was an unconsumed backslash.
    pub escaped: bool,
}

/// Advances the scanner by one character.
pub(crate) fn step(state: &mut ScanState, ch: char) {
    if state.in_string {
        if state.escaped {
            state.escaped = false;
        } else if ch == '\\' {
            state.escaped = true;
        } else if ch == '"' {
            state.in_string = false;
        }
        return;
    }

    match ch {
        '"' => state.in_string = true,
        '{' | '[' => state.open.push(ch),
        '}' => {
            if state.open.last() == Some(&'{') {
                state.open.pop();
            }
        }
        ']' => {
            if state.open.last() == Some(&'[') {
                state.open.pop();
            }
        }
        _ => {}
    }
}

/// Scans the whole input.
pub(crate) fn scan(text: &str) -> ScanState {
    let mut state = ScanState::default();
    for ch in text.chars() {
        step(&mut state, ch);
    }
    state
}

/// Scans the input up to (not including) byte offset `end`.
pub(crate) fn scan_prefix(text: &str, end: usize) -> ScanState {
    let mut state = ScanState::default();
    for (idx, ch) in text.char_indices() {
        if idx >= end {
            break;
        }
        step(&mut state, ch);
    }
    state
}

/// The characters that would close everything still open, in order.
///
/// An unterminated string is closed first, then collections innermost-out.
pub(crate) fn missing_closers(state: &ScanState) -> String {
    let mut closers = String::new();
    if state.in_string {
        closers.push('"');
    }
    for &open in state.open.iter().rev() {
        closers.push(if open == '{' { '}' } else { ']' });
    }
    closers
}

/// Maps a `serde_json` error position onto a byte offset in `text`.
///
/// serde_json reports 1-based line and column (column counted in
/// characters); the returned offset is always a char boundary, clamped to
/// the input length.
pub(crate) fn error_offset(text: &str, err: &serde_json::Error) -> Option<usize> {
    let line = err.line();
    if line == 0 {
        return None;
    }

    let mut line_start = 0;
    for (idx, candidate) in text.split('\n').enumerate() {
        if idx + 1 == line {
            let col = err.column().saturating_sub(1);
            let byte_col = candidate
                .char_indices()
                .nth(col)
                .map(|(i, _)| i)
                .unwrap_or(candidate.len());
            return Some(line_start + byte_col);
        }
        line_start += candidate.len() + 1;
    }

    Some(text.len())
}

/// Removes commas that directly precede a closing `}` or `]`.
///
/// String contents are left alone; only structural commas are dropped.
pub(crate) fn collapse_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut state = ScanState::default();

    for (idx, ch) in text.char_indices() {
        if !state.in_string && ch == ',' {
            let rest = text[idx + 1..].trim_start();
            if rest.starts_with('}') || rest.starts_with(']') {
                continue;
            }
        }
        step(&mut state, ch);
        result.push(ch);
    }

    result
}

/// Rewrites single-quoted strings to double-quoted ones.
///
/// A `'` opens a string only in a position where a string could start
/// (after `{`, `[`, `,`, `:`, or at the beginning), so apostrophes inside
/// double-quoted values survive untouched.
pub(crate) fn single_to_double_quotes(text: &str) -> String {
    if !text.contains('\'') {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut in_double = false;
    let mut in_single = false;
    let mut escaped = false;

    for ch in text.chars() {
        if escaped {
            result.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_double || in_single => {
                escaped = true;
                result.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                result.push(ch);
            }
            '\'' if !in_double => {
                if in_single {
                    in_single = false;
                    result.push('"');
                } else {
                    let tail = result.trim_end();
                    let opens = tail.is_empty()
                        || matches!(tail.chars().last(), Some('{' | '[' | ',' | ':'));
                    if opens {
                        in_single = true;
                        result.push('"');
                    } else {
                        result.push(ch);
                    }
                }
            }
            _ => result.push(ch),
        }
    }

    result
}

/// Removes raw control characters, escaping the meaningful ones in strings.
///
/// Inside strings `\n`, `\r`, and `\t` become their escape sequences and
/// other control characters are dropped; outside strings structural
/// whitespace is kept as-is.
pub(crate) fn strip_control_chars(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut state = ScanState::default();

    for ch in text.chars() {
        if ch.is_control() {
            if state.in_string {
                match ch {
                    '\n' => result.push_str("\\n"),
                    '\r' => result.push_str("\\r"),
                    '\t' => result.push_str("\\t"),
                    _ => {}
                }
            } else if matches!(ch, '\n' | '\r' | '\t') {
                result.push(ch);
            }
            continue;
        }
        step(&mut state, ch);
        result.push(ch);
    }

    result
}

/// Extracts the first balanced `{ ... }` span, honoring string state.
pub(crate) fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut state = ScanState::default();

    for (idx, ch) in text[start..].char_indices() {
        step(&mut state, ch);
        if ch == '}' && !state.in_string && state.open.is_empty() {
            return Some(&text[start..start + idx + ch.len_utf8()]);
        }
    }

    None
}

/// Truncates at the last complete `}` / `]` boundary before `offset` and
/// closes whatever remains open.
///
/// Returns `None` when no complete boundary exists before the offset, or
/// when truncation would reproduce the input unchanged.
pub(crate) fn truncate_balanced(text: &str, offset: usize) -> Option<String> {
    let end = offset.min(text.len());
    let mut state = ScanState::default();
    let mut last_close = None;

    for (idx, ch) in text.char_indices() {
        if idx >= end {
            break;
        }
        step(&mut state, ch);
        if !state.in_string && matches!(ch, '}' | ']') {
            last_close = Some(idx + ch.len_utf8());
        }
    }

    let cut = last_close?;
    let prefix = text[..cut].trim_end();
    let closers = missing_closers(&scan(prefix));
    if closers.is_empty() && prefix == text.trim_end() {
        return None;
    }

    let mut repaired = prefix.to_string();
    repaired.push_str(&closers);
    Some(repaired)
}
