/// Returns the first candidate holding a non-blank string.
pub fn first_non_empty<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// Text processing utilities
pub mod text {
    use scraper::Html;

    /// Text nodes of an HTML fragment, concatenated with entities decoded and
    /// whitespace collapsed. Tags add no separators of their own.
    pub fn strip_tags(html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let text = fragment.root_element().text().collect::<String>();
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// `Some` only when the stripped text has content.
    pub fn plain_text(html: Option<&str>) -> Option<String> {
        html.map(strip_tags).filter(|text| !text.is_empty())
    }
}

/// Time utilities
pub mod time {
    use chrono::Duration;

    /// Compact `h`/`m`/`s` rendering: `1h0m0s`, `30m0s`, `45s`, `0s`.
    pub fn compact_duration(duration: Duration) -> String {
        let total = duration.num_seconds();
        let sign = if total < 0 { "-" } else { "" };
        let total = total.unsigned_abs();
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

        if hours > 0 {
            format!("{}{}h{}m{}s", sign, hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}{}m{}s", sign, minutes, seconds)
        } else {
            format!("{}{}s", sign, seconds)
        }
    }

    /// `compact_duration` with trailing `0` and `s` characters trimmed.
    pub fn trimmed_duration(duration: Duration) -> String {
        compact_duration(duration)
            .trim_end_matches(['0', 's'])
            .to_string()
    }
}
