//! Title sanitization and artifact naming.

/// Placeholder used when a title sanitizes down to nothing.
pub const DEFAULT_FALLBACK_TITLE: &str = "gemini_conversation";

/// Titles are cut to this many characters. Larger configured limits are clamped to it.
pub const DEFAULT_MAX_TITLE_LEN: usize = 100;

/// Knobs for [`sanitize_title`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRules {
    pub fallback: String,
    pub max_len: usize,
}

impl Default for TitleRules {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK_TITLE.to_string(),
            max_len: DEFAULT_MAX_TITLE_LEN,
        }
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Turn a raw conversation title into a file-name-safe stem.
///
/// Runs of whitespace and path-unsafe characters collapse to a single `_`,
/// everything outside `[A-Za-z0-9_.-]` is dropped, and the result is cut to
/// `rules.max_len` characters, never more than [`DEFAULT_MAX_TITLE_LEN`]. An
/// empty result yields `rules.fallback`.
pub fn sanitize_title(raw: &str, rules: &TitleRules) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    let mut in_run = false;
    for c in raw.trim().chars() {
        if is_separator(c) {
            if !in_run {
                collapsed.push('_');
                in_run = true;
            }
        } else {
            collapsed.push(c);
            in_run = false;
        }
    }

    let cleaned: String = collapsed
        .chars()
        .filter(|c| is_kept(*c))
        .take(rules.max_len.min(DEFAULT_MAX_TITLE_LEN))
        .collect();

    if cleaned.is_empty() {
        rules.fallback.clone()
    } else {
        cleaned
    }
}

/// `{title}_{millis}.{ext}`
pub fn artifact_filename(sanitized_title: &str, timestamp_millis: i64, extension: &str) -> String {
    format!("{sanitized_title}_{timestamp_millis}.{extension}")
}
