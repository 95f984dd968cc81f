//! Text helpers shared by the section builders.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use netrap_sdk::TIMESTAMP_FORMAT;

pub const REPORT_WIDTH: usize = 80;
pub const INDENT: &str = "  ";
pub const HOST_WIDTH: usize = 18;
pub const IP_WIDTH: usize = 16;
pub const TYPE_WIDTH: usize = 14;
pub const SITE_WIDTH: usize = 16;
pub const LABEL_WIDTH: usize = 24;
pub const VLANS_PER_LINE: usize = 10;
pub const NONE_FOUND: &str = "Inga enheter hittades";

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator <= 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Whole-number part of a day count, used for display and pluralization.
pub fn whole_days(days: f64) -> i64 {
    days.trunc() as i64
}

pub fn day_unit(days: f64) -> &'static str {
    if whole_days(days) == 1 { "dag" } else { "dagar" }
}

pub fn plural<'a>(count: i64, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// `count` followed by the matching noun form, e.g. `1 enhet`, `3 enheter`.
pub fn count_noun(count: usize, singular: &str, plural_form: &str) -> String {
    format!("{} {}", count, plural(count as i64, singular, plural_form))
}

/// Left-aligned `label:` padded to `LABEL_WIDTH`, then the value.
pub fn label_value(label: &str, value: impl std::fmt::Display) -> String {
    let label = format!("{label}:");
    format!("{}{:<width$}{}", INDENT, label, value, width = LABEL_WIDTH)
}

/// Drops padding left behind by empty trailing columns.
pub fn row(line: String) -> String {
    line.trim_end().to_string()
}

pub fn rule(ch: char) -> String {
    std::iter::repeat_n(ch, REPORT_WIDTH).collect()
}

/// Comma-separated list, `per_line` items per line. Continuation lines are
/// indented to the width of `label`.
pub fn wrap_list<T: std::fmt::Display>(
    label: &str,
    items: &[T],
    per_line: usize,
) -> Vec<String> {
    let indent = " ".repeat(label.chars().count());
    let chunks: Vec<&[T]> = items.chunks(per_line.max(1)).collect();
    let last = chunks.len().saturating_sub(1);

    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let prefix = if index == 0 { label } else { indent.as_str() };
            let joined = chunk
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let separator = if index < last { "," } else { "" };
            format!("{prefix}{joined}{separator}")
        })
        .collect()
}

/// Greedy word wrap to `width` characters. The first line starts with
/// `first_prefix`, later lines with `rest_prefix`.
pub fn wrap_paragraph(
    text: &str,
    width: usize,
    first_prefix: &str,
    rest_prefix: &str,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = first_prefix.to_string();
    let mut current_len = first_prefix.chars().count();
    let mut has_word = false;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if has_word && current_len + 1 + word_len > width {
            lines.push(std::mem::replace(&mut current, rest_prefix.to_string()));
            current_len = rest_prefix.chars().count();
            has_word = false;
        }
        if has_word {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
        has_word = true;
    }

    if has_word || lines.is_empty() {
        lines.push(row(current));
    }
    lines
}

/// Permissive ISO-8601 parse. A trailing `Z` is read as `+00:00`; offset
/// timestamps keep their own wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    let utc_suffix = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'));
    let normalized = match utc_suffix {
        Some(head) => format!("{head}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.naive_local());
    }
    for pattern in [
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M%:z",
    ] {
        if let Ok(parsed) = DateTime::parse_from_str(&normalized, pattern) {
            return Some(parsed.naive_local());
        }
    }
    for pattern in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, pattern) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
