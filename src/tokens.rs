//! Character-based token estimation and budget truncation.
//!
//! The estimate mirrors the common "four characters per token" heuristic,
//! discounted for whitespace and with one token per newline:
//!
//! ```text
//! estimate(text) = ceil((chars * 0.8 + newlines) / 4)
//! ```
//!
//! All arithmetic is done in integers (`ceil((4 * chars + 5 * newlines) / 20)`),
//! which is the same value without floating-point rounding surprises.

/// Marker appended to text cut down by [`truncate_to_limit`].
pub const TOKEN_TRUNCATION_MARKER: &str = "\n\n[Content truncated to fit token limit]";

/// Characters retained per budgeted token before the fit adjustment (`4 / 0.8`).
const CHARS_PER_BUDGET_TOKEN: usize = 5;

/// Share of the requested budget the pipeline is allowed to use, in tenths.
const SAFETY_MARGIN_TENTHS: usize = 9;

/// Estimates the number of tokens in `text`.
#[must_use]
pub fn estimate(text: &str) -> usize {
    let (chars, newlines) = text.chars().fold((0usize, 0usize), |(chars, newlines), c| {
        (chars + 1, newlines + usize::from(c == '\n'))
    });
    estimate_counts(chars, newlines)
}

/// Returns the budget the pipeline enforces for a requested maximum (90%).
#[must_use]
pub fn effective_budget(requested_max_tokens: usize) -> usize {
    requested_max_tokens.saturating_mul(SAFETY_MARGIN_TENTHS) / 10
}

/// Truncates `text` so that its estimate fits within `max_tokens`.
///
/// Text already within budget is returned unchanged. Otherwise at most
/// `max_tokens * 4 / 0.8` characters are kept, shortened further until the
/// kept prefix plus [`TOKEN_TRUNCATION_MARKER`] fits the budget. The result is
/// never longer than the input; when not even the marker fits, the result is
/// empty.
#[must_use]
pub fn truncate_to_limit(text: &str, max_tokens: usize) -> String {
    if estimate(text) <= max_tokens {
        return text.to_string();
    }

    let total_chars = text.chars().count();
    let marker_chars = TOKEN_TRUNCATION_MARKER.chars().count();
    let marker_newlines = TOKEN_TRUNCATION_MARKER.matches('\n').count();

    if total_chars < marker_chars {
        return String::new();
    }

    let keep_limit = max_tokens
        .saturating_mul(CHARS_PER_BUDGET_TOKEN)
        .min(total_chars - marker_chars);

    let kept: Vec<(usize, char)> = text.char_indices().take(keep_limit).collect();
    let mut keep = kept.len();
    let mut newlines = kept.iter().filter(|(_, c)| *c == '\n').count();

    while keep > 0 && estimate_counts(keep + marker_chars, newlines + marker_newlines) > max_tokens
    {
        keep -= 1;
        if kept[keep].1 == '\n' {
            newlines -= 1;
        }
    }

    if estimate_counts(keep + marker_chars, newlines + marker_newlines) > max_tokens {
        return String::new();
    }

    let end = keep.checked_sub(1).map_or(0, |last| kept[last].0 + kept[last].1.len_utf8());
    let mut out = String::with_capacity(end + TOKEN_TRUNCATION_MARKER.len());
    out.push_str(&text[..end]);
    out.push_str(TOKEN_TRUNCATION_MARKER);
    out
}

fn estimate_counts(chars: usize, newlines: usize) -> usize {
    (4 * chars + 5 * newlines).div_ceil(20)
}
