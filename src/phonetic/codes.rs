//! Phonetic encodings of a single name.
//!
//! Three independent encoders are applied to every name: Double Metaphone
//! (primary and alternate codes), Soundex and NYSIIS. Encoding is a pure
//! function of the normalized name.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use rphonetic::{DoubleMetaphone, Encoder, Nysiis, Soundex};
use unicode_normalization::UnicodeNormalization;

/// Lowercases and trims a name. Every index key and query goes through this.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Folds a normalized name to plain ASCII letters before encoding.
///
/// Diacritics are decomposed and dropped, a few ligatures are spelled out,
/// everything that is not a letter is removed.
fn ascii_letters(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.nfd() {
        if ch.is_ascii_alphabetic() {
            out.push(ch.to_ascii_lowercase());
            continue;
        }
        match ch {
            'ß' => out.push_str("ss"),
            'æ' | 'Æ' => out.push_str("ae"),
            'ø' | 'Ø' => out.push('o'),
            'đ' | 'Đ' => out.push('d'),
            'œ' | 'Œ' => out.push_str("oe"),
            _ => {}
        }
    }
    out
}

/// The codes of one name under each encoder.
///
/// An encoder that failed, or produced an empty code, contributes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneticCodes {
    /// Double Metaphone primary and (if different) alternate code.
    pub metaphone: Vec<String>,
    pub soundex: Option<String>,
    pub nysiis: Option<String>,
}

impl PhoneticCodes {
    /// Returns true if no encoder produced a code.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metaphone.is_empty() && self.soundex.is_none() && self.nysiis.is_none()
    }
}

/// Runs an encoder, turning a panic or an empty result into `None`.
fn guarded(encoder: &str, name: &str, encode: impl FnOnce() -> String) -> Option<String> {
    match panic::catch_unwind(AssertUnwindSafe(encode)) {
        Ok(code) if !code.is_empty() => Some(code),
        Ok(_) => None,
        Err(_) => {
            log::warn!("{encoder} failed to encode {name:?}, treating as no phonetic match");
            None
        }
    }
}

/// The three phonetic encoders, configured once.
pub struct PhoneticEncoder {
    metaphone: DoubleMetaphone,
    soundex: Soundex,
    nysiis: Nysiis,
}

impl PhoneticEncoder {
    /// Creates the encoders with their default settings (Metaphone codes of length 4).
    #[must_use]
    pub fn new() -> Self {
        Self {
            metaphone: DoubleMetaphone::default(),
            soundex: Soundex::default(),
            nysiis: Nysiis::default(),
        }
    }

    /// Encodes a name. Never fails: malformed, empty or non-alphabetic input
    /// yields an empty [`PhoneticCodes`].
    #[must_use]
    pub fn encode(&self, name: &str) -> PhoneticCodes {
        let letters = ascii_letters(&normalize_name(name));
        if letters.is_empty() {
            return PhoneticCodes::default();
        }

        let mut metaphone = Vec::with_capacity(2);
        if let Some(primary) = guarded("metaphone", name, || self.metaphone.encode(&letters)) {
            metaphone.push(primary);
        }
        if let Some(alternate) =
            guarded("metaphone", name, || self.metaphone.encode_alternate(&letters))
        {
            if !metaphone.contains(&alternate) {
                metaphone.push(alternate);
            }
        }

        PhoneticCodes {
            metaphone,
            soundex: guarded("soundex", name, || self.soundex.encode(&letters)),
            nysiis: guarded("nysiis", name, || self.nysiis.encode(&letters)),
        }
    }
}

impl Default for PhoneticEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhoneticEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhoneticEncoder").finish_non_exhaustive()
    }
}
