//! Accept-Language to ICU-style locale normalization.

/// Locale used whenever the client hint is unusable.
pub const DEFAULT_LOCALE: &str = "en_US";

const DEFAULT_TAG: &str = "en-US";

/// Turns an `Accept-Language` header into an ICU locale such as `en_US`.
///
/// Only the first language range is considered and quality parameters are
/// dropped: `"en-US,en;q=0.9"` becomes `"en_US"`. Anything that is not
/// `ll` or `ll_RR` after normalization yields [`DEFAULT_LOCALE`].
pub fn normalize_locale(accept_language: &str) -> String {
    let first = accept_language.split(',').next().unwrap_or(DEFAULT_TAG);
    let first = first.split(';').next().unwrap_or(DEFAULT_TAG).trim();
    let first = if first.is_empty() { DEFAULT_TAG } else { first };

    let candidate = first.replace('-', "_");
    if is_icu_locale(&candidate) {
        candidate
    } else {
        DEFAULT_LOCALE.to_string()
    }
}

/// Matches `^[a-z]{2}(_[A-Z]{2})?$`.
fn is_icu_locale(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.len() {
        2 => bytes.iter().all(u8::is_ascii_lowercase),
        5 => {
            bytes[..2].iter().all(u8::is_ascii_lowercase)
                && bytes[2] == b'_'
                && bytes[3..].iter().all(u8::is_ascii_uppercase)
        }
        _ => false,
    }
}
