use once_cell::sync::Lazy;
use regex::Regex;

/// A `$`-prefixed amount with optional thousands separators and decimals,
/// optionally followed by a unit word, or a bare number followed by a unit
/// word. Unit words match case-insensitively.
static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\d+(?:,\d+)*(?:\.\d+)?(?:\s*(?i:dollars|usd))?\b|\b\d+\s*(?i:dollars|usd)\b")
        .expect("money pattern is valid")
});

/// Punctuation removed before tokenizing, including the curly quotes the
/// site renders in headlines.
const STRIPPED_PUNCTUATION: [char; 7] = ['.', ',', ';', '?', '!', '‘', '’'];

/// True iff the text contains a monetary mention such as "$1,234.56",
/// "50 dollars" or "75 USD".
pub fn has_money_mention(text: &str) -> bool {
    MONEY_RE.is_match(text)
}

/// Counts word-aligned occurrences of `phrase` in `text`.
///
/// The text is lower-cased, stripped of punctuation, tokenized on
/// whitespace, and then grouped into NON-overlapping windows the size of the
/// phrase's word count; a window counts only when it equals the lower-cased
/// phrase exactly. A trailing window shorter than the phrase never matches.
/// This undercounts relative to a sliding-window scan and is intentional:
/// it mirrors the word-aligned counting the product shipped with.
pub fn count_phrase(text: &str, phrase: &str) -> usize {
    let phrase = phrase.to_lowercase();
    let phrase_len = phrase.split_whitespace().count();
    if phrase_len == 0 {
        return 0;
    }

    let normalized = text.to_lowercase().replace(&STRIPPED_PUNCTUATION[..], "");
    let words: Vec<&str> = normalized.split_whitespace().collect();

    words
        .chunks(phrase_len)
        .filter(|chunk| chunk.len() == phrase_len && chunk.join(" ") == phrase)
        .count()
}
