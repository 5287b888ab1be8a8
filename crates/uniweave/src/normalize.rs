//! Unicode normalization forms.
//!
//! Thin, allocation-returning wrappers over `unicode-normalization`, plus
//! FCC (Fast C Contiguous), which that crate does not provide directly.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::compose;

/// Normalization Form C (canonical composition).
pub fn nfc(text: &str) -> String {
    text.chars().nfc().collect()
}

/// Normalization Form D (canonical decomposition).
pub fn nfd(text: &str) -> String {
    text.chars().nfd().collect()
}

/// Normalization Form KC (compatibility composition).
pub fn nfkc(text: &str) -> String {
    text.chars().nfkc().collect()
}

/// Normalization Form KD (compatibility decomposition).
pub fn nfkd(text: &str) -> String {
    text.chars().nfkd().collect()
}

/// Returns `true` if `text` is already in NFC.
pub fn is_nfc(text: &str) -> bool {
    unicode_normalization::is_nfc(text)
}

/// Returns `true` if `text` is already in NFD.
pub fn is_nfd(text: &str) -> bool {
    unicode_normalization::is_nfd(text)
}

/// FCC: canonical decomposition followed by *contiguous* composition.
///
/// Unlike NFC, a combining mark only composes with the character immediately
/// before it; marks blocked by an intervening mark stay decomposed. FCC
/// output feeds collation and comparison pipelines that assume composition
/// never reaches across a blocking mark.
pub fn fcc(text: &str) -> String {
    let mut out: Vec<char> = Vec::with_capacity(text.len());
    for ch in text.chars().nfd() {
        if let Some(&last) = out.last()
            && let Some(composed) = compose(last, ch)
        {
            *out.last_mut().expect("non-empty") = composed;
            continue;
        }
        out.push(ch);
    }
    out.into_iter().collect()
}
