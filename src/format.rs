//! Locale-correct formatting for Brazilian fiscal documents.
//!
//! Everything here is infallible: unparseable money is zero, unparseable
//! dates fall back to the raw input (showing raw data beats silently
//! dropping it), and unparseable times become empty strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// One PostScript point in millimeters.
pub const PT_TO_MM: f32 = 0.352_777_8;

/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

/// Format a raw decimal string as Brazilian currency text: thousands
/// separated by `.`, decimal comma, exactly two fraction digits.
///
/// `"876.13"` → `"876,13"`, `"1234567.8"` → `"1.234.567,80"`, anything
/// unparseable → `"0,00"`.
pub fn money(raw: &str) -> String {
    let value = raw.trim().parse::<f64>().unwrap_or(0.0);
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

/// Format a raw decimal quantity: whole values lose the fraction, others
/// keep up to four digits with trailing zeros trimmed, decimal comma.
/// Unparseable input is returned unchanged.
pub fn quantity(raw: &str) -> String {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return raw.to_string();
    };
    if value == value.floor() {
        return format!("{value:.0}");
    }
    let fixed = format!("{value:.4}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.replace('.', ",")
}

/// Format a timestamp or plain `YYYY-MM-DD` string as `DD/MM/YYYY`.
/// Input that parses as neither is returned unmodified.
pub fn date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%d/%m/%Y").to_string();
    }
    raw.to_string()
}

/// Format a timestamp as `HH:MM` (24-hour). Absent or unparseable input
/// yields an empty string.
pub fn time(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%H:%M").to_string();
    }
    String::new()
}

/// Group the 44-digit access key for display: a single space after every
/// 4th character, no trailing space. The ungrouped key is still what the
/// barcode encodes.
pub fn group_access_key(key: &str) -> String {
    key.chars()
        .collect::<Vec<_>>()
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// How many characters fit in `width_mm` at `font_size_pt`, using a fixed
/// characters-per-millimeter approximation of Helvetica metrics.
pub fn max_chars(width_mm: f32, font_size_pt: f32) -> usize {
    let char_w_mm = font_size_pt * PT_TO_MM * AVG_GLYPH_EM;
    if char_w_mm <= 0.0 {
        return 0;
    }
    (width_mm / char_w_mm).floor() as usize
}

/// Truncate `text` to at most `max` characters, marking truncation with a
/// trailing ellipsis when anything was cut.
pub fn truncate(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Greedy word wrap to at most `max_per_line` characters per line. Words
/// longer than a line are hard-split.
pub fn wrap(text: &str, max_per_line: usize) -> Vec<String> {
    if max_per_line == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();
        if current.is_empty() {
            if word_len <= max_per_line {
                current.push_str(word);
            } else {
                // Hard-split an oversized word.
                let mut rest: Vec<char> = word.chars().collect();
                while rest.len() > max_per_line {
                    lines.push(rest[..max_per_line].iter().collect());
                    rest.drain(..max_per_line);
                }
                current = rest.into_iter().collect();
            }
        } else if current_len + 1 + word_len <= max_per_line {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            if word_len <= max_per_line {
                current.push_str(word);
            } else {
                let mut rest: Vec<char> = word.chars().collect();
                while rest.len() > max_per_line {
                    lines.push(rest[..max_per_line].iter().collect());
                    rest.drain(..max_per_line);
                }
                current = rest.into_iter().collect();
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
