//! Text normalization for pattern comparison.

/// Canonical comparable form of `text`.
///
/// Lower-cases, drops every character that is neither a word character
/// (Unicode letter, digit, or `_`) nor whitespace, then collapses whitespace
/// runs to single spaces and trims. Collapsing last keeps the result a fixed
/// point: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
