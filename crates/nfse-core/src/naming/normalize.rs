//! Text normalization for filename segments.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::patterns::{
    LEADING_CONNECTIVES, LEADING_DOCUMENT_NUMBER, LEADING_PREFIX_WORD, NON_ALPHANUMERIC_RUN,
    NON_TOKEN_RUN, UNDERSCORE_RUN, WHITESPACE_RUN,
};

/// Decompose accented characters and drop the combining marks.
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Replace every run of non-alphanumeric ASCII characters with one underscore.
pub fn sanitize(s: &str) -> String {
    NON_ALPHANUMERIC_RUN.replace_all(s, "_").into_owned()
}

/// Like [`sanitize`] but keeps `-`, used for the number and date segments.
pub fn path_safe_token(s: &str) -> String {
    NON_TOKEN_RUN.replace_all(s.trim(), "_").into_owned()
}

/// Remove a leading CPF/CNPJ-like number followed by whitespace.
pub fn strip_leading_document_number(s: &str) -> String {
    LEADING_DOCUMENT_NUMBER
        .replace(s.trim(), "")
        .trim()
        .to_string()
}

/// Strip building/condominium prefix words from the start of a name.
///
/// Input is expected uppercased and accent-free. The result is always a
/// suffix of the input with whitespace collapsed.
pub fn strip_known_prefix_words(s: &str) -> String {
    let mut rest = s.trim();

    while let Some(m) = LEADING_PREFIX_WORD.find(rest) {
        if m.end() == 0 {
            break;
        }
        rest = rest[m.end()..].trim();
    }

    let rest = LEADING_CONNECTIVES.replace(rest, "");
    WHITESPACE_RUN.replace_all(rest.trim(), " ").into_owned()
}

/// Steps 1-3 of party-name cleaning: document number, accents, charset.
pub fn clean_party_name(s: &str) -> String {
    let without_number = strip_leading_document_number(s);
    sanitize(&strip_diacritics(&without_number))
}

/// Customer cleaning: party cleaning plus prefix-word stripping.
pub fn clean_customer_name(s: &str) -> String {
    let sanitized = clean_party_name(s);
    let spaced = UNDERSCORE_RUN.replace_all(&sanitized, " ");
    let normalized = strip_diacritics(spaced.trim()).to_uppercase();
    sanitize(&strip_known_prefix_words(&normalized))
}

/// True when a cleaned segment carries no alphanumeric content.
pub fn is_blank_segment(s: &str) -> bool {
    s.chars().all(|c| c == '_' || c == '-')
}
