//! QWERTY adjacent-key substitutions.

use rand::seq::index;
use rand::{Rng, RngCore};

use crate::config::KeyboardConfig;
use crate::error::ValidationError;

const ROWS: [&str; 4] = ["1234567890", "qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Keys physically adjacent to `key` (lowercase), including the rows above and below.
fn neighbors(key: char, include_numeric: bool) -> Vec<char> {
    let Some((row, col)) = ROWS
        .iter()
        .enumerate()
        .find_map(|(r, keys)| keys.chars().position(|k| k == key).map(|c| (r, c)))
    else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for r in row.saturating_sub(1)..=(row + 1).min(ROWS.len() - 1) {
        if r == 0 && !include_numeric {
            continue;
        }
        let keys: Vec<char> = ROWS[r].chars().collect();
        for c in col.saturating_sub(1)..=(col + 1) {
            if (r, c) == (row, col) {
                continue;
            }
            if let Some(&k) = keys.get(c) {
                out.push(k);
            }
        }
    }
    out
}

/// Replaces a few characters of each word with a neighboring key.
///
/// For a word of `n` characters, `round(n * aug_char_p)` characters clamped
/// to `[aug_char_min, aug_char_max]` are replaced. Words shorter than
/// `min_char` are left as they are. Letter case is preserved.
#[derive(Debug, Clone)]
pub struct KeyboardAugmenter {
    config: KeyboardConfig,
    include_numeric: bool,
}

impl KeyboardAugmenter {
    /// Creates an augmenter that may also substitute digit keys.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for invalid bounds or probability.
    pub fn new(config: KeyboardConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            include_numeric: true,
        })
    }

    /// Never substitutes a letter with a digit, nor touches digits.
    #[must_use]
    pub fn without_digits(mut self) -> Self {
        self.include_numeric = false;
        self
    }

    /// Augments every sufficiently long space-separated word of `text`.
    pub fn augment(&self, text: &str, rng: &mut dyn RngCore) -> String {
        text.split(' ')
            .map(|word| self.augment_word(word, rng))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn augment_word(&self, word: &str, rng: &mut dyn RngCore) -> String {
        let mut chars: Vec<char> = word.chars().collect();
        if chars.len() < self.config.min_char {
            return word.to_string();
        }

        let candidates: Vec<(usize, Vec<char>)> = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| self.include_numeric || !c.is_ascii_digit())
            .filter_map(|(idx, c)| {
                let keys = neighbors(c.to_ascii_lowercase(), self.include_numeric);
                (!keys.is_empty()).then_some((idx, keys))
            })
            .collect();
        if candidates.is_empty() {
            return word.to_string();
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let wanted = (chars.len() as f64 * self.config.aug_char_p).round() as usize;
        let count = wanted
            .clamp(self.config.aug_char_min, self.config.aug_char_max)
            .min(candidates.len());

        for slot in index::sample(rng, candidates.len(), count) {
            let (pos, keys) = &candidates[slot];
            let replacement = keys[rng.gen_range(0..keys.len())];
            chars[*pos] = if chars[*pos].is_ascii_uppercase() {
                replacement.to_ascii_uppercase()
            } else {
                replacement
            };
        }
        chars.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn augmenter() -> KeyboardAugmenter {
        KeyboardAugmenter::new(KeyboardConfig::default()).unwrap()
    }

    #[test]
    fn test_neighbors() {
        let keys = neighbors('s', true);
        for k in ['a', 'd', 'w', 'e', 'z', 'x'] {
            assert!(keys.contains(&k), "missing {k} in {keys:?}");
        }
        assert!(!keys.contains(&'s'));
        assert!(neighbors('q', false).iter().all(|k| k.is_ascii_alphabetic()));
        assert!(neighbors('q', true).contains(&'1'));
        assert!(neighbors('@', true).is_empty());
    }

    #[test]
    fn test_short_words_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(augmenter().augment("Al Bo", &mut rng), "Al Bo");
    }

    #[test]
    fn test_augment_changes_between_one_and_three_chars() {
        let mut rng = StdRng::seed_from_u64(17);
        let aug = augmenter();
        for _ in 0..50 {
            let out = aug.augment("springfield", &mut rng);
            assert_eq!(out.chars().count(), 11);
            let changed = out.chars().zip("springfield".chars()).filter(|(a, b)| a != b).count();
            assert!((1..=3).contains(&changed), "{out}");
        }
    }

    #[test]
    fn test_case_preserved() {
        let mut rng = StdRng::seed_from_u64(5);
        let out = augmenter().augment("MAIN", &mut rng);
        assert!(out.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()), "{out}");
    }

    #[test]
    fn test_without_digits_never_emits_digits() {
        let mut rng = StdRng::seed_from_u64(23);
        let aug = augmenter().without_digits();
        for _ in 0..50 {
            let out = aug.augment("qwerty", &mut rng);
            assert!(!out.chars().any(|c| c.is_ascii_digit()), "{out}");
        }
    }

    #[test]
    fn test_without_digits_leaves_digits_in_place() {
        let config = KeyboardConfig {
            aug_char_p: 1.0,
            aug_char_min: 1,
            aug_char_max: 8,
            min_char: 1,
        };
        let aug = KeyboardAugmenter::new(config).unwrap().without_digits();
        let mut rng = StdRng::seed_from_u64(31);
        for _ in 0..50 {
            assert_eq!(aug.augment("1234", &mut rng), "1234");
            let out = aug.augment("ab12cd", &mut rng);
            assert_eq!(&out[2..4], "12", "{out}");
            assert!(out.chars().zip("ab12cd".chars()).any(|(a, b)| a != b), "{out}");
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = KeyboardConfig {
            aug_char_min: 4,
            aug_char_max: 2,
            ..KeyboardConfig::default()
        };
        assert!(KeyboardAugmenter::new(config).is_err());
    }
}
