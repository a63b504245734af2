use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"));

/// Lowercases `raw` and replaces every character that is neither a word
/// character nor whitespace with a single space.
///
/// Whitespace is not collapsed, so `"hi, there"` becomes `"hi  there"`. The
/// result feeds both the extraction rules and the query embedding.
pub fn normalize_query(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    NON_WORD.replace_all(&lowered, " ").into_owned()
}
