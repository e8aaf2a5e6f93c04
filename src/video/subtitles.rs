use std::sync::LazyLock;

use regex::Regex;

use crate::sources::bilibili::SubtitleLine;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid markup tag pattern"));

/// Case-insensitive whole-phrase pattern. Inner whitespace matches any run
/// of whitespace, so a phrase split across spacing variants still matches.
/// A word boundary is required only on a side that ends in a word
/// character, since `\b` can never hold next to punctuation like `c++`.
pub fn phrase_pattern(phrase: &str) -> Option<Regex> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let (first, last) = (words.first()?, words.last()?);

    let boundary = |c: Option<char>| match c {
        Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
        _ => "",
    };
    let body: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    let pattern = format!(
        "(?i){}{}{}",
        boundary(first.chars().next()),
        body.join(r"\s+"),
        boundary(last.chars().next_back()),
    );
    Regex::new(&pattern).ok()
}

/// Remove highlight markup such as `<em class="keyword">` from search titles.
pub fn strip_markup(title: &str) -> String {
    TAG_REGEX.replace_all(title, "").into_owned()
}

/// Start time of the earliest subtitle line containing the phrase.
pub fn earliest_match(lines: &[SubtitleLine], pattern: &Regex) -> Option<f64> {
    lines
        .iter()
        .filter(|line| pattern.is_match(&line.content))
        .map(|line| line.from)
        .min_by(f64::total_cmp)
}

/// Playback URL, with `?t=` when the start time is known.
pub fn compose_video_url(bvid: &str, start_time: f64) -> String {
    let secs = start_time.floor() as u64;
    if secs > 0 {
        format!("https://www.bilibili.com/video/{bvid}?t={secs}")
    } else {
        format!("https://www.bilibili.com/video/{bvid}")
    }
}
