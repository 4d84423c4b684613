use chrono::{DateTime, Utc};

const WORDS_PER_MINUTE: usize = 200;

pub fn format_date_time(date_time: &DateTime<Utc>) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

/// e.g. `April 2, 2022`
pub fn format_long_date(date_time: &DateTime<Utc>) -> String {
    date_time.format("%B %-d, %Y").to_string()
}

/// Minutes needed to read `text`, rounded up. Empty text takes no time.
pub fn reading_time(text: &str) -> usize {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE)
}

/// Cuts `text` to at most `max_chars` characters, appending `...` when
/// something was dropped.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
    }
}
