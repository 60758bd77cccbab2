//! Name noisers and the name typo chain.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::RngCore;

use super::keyboard::KeyboardAugmenter;
use super::{draw, pick, Noiser};
use crate::config::{KeyboardConfig, NameNoiseConfig, TypoConfig};
use crate::error::ValidationError;
use crate::names::{make_name, NameVariantMap, NicknameTable};
use crate::phonetic::PhoneticIndex;

/// Ordered substring substitutions that sound alike. The first rule that
/// fires and changes the name wins.
pub const PHONETIC_RULES: [(&str, &str); 34] = [
    ("ph", "f"),
    ("ie", "y"),
    ("oo", "u"),
    ("ck", "k"),
    ("ght", "t"),
    ("tion", "shun"),
    ("ch", "k"),
    ("x", "z"),
    ("z", "s"),
    ("w", "v"),
    ("v", "f"),
    ("j", "g"),
    ("k", "c"),
    ("c", "s"),
    ("d", "t"),
    ("b", "p"),
    ("r", "l"),
    ("m", "n"),
    ("l", "r"),
    ("n", "m"),
    ("a", "e"),
    ("o", "a"),
    ("u", "o"),
    ("i", "e"),
    ("y", "i"),
    ("e", "i"),
    ("ae", "e"),
    ("ee", "i"),
    ("ea", "i"),
    ("ei", "ie"),
    ("oi", "oy"),
    ("ou", "ow"),
    ("aw", "ao"),
    ("ow", "au"),
];

/// Letters preferred when doubling a character.
const DOUBLING_PREFERENCE: [char; 6] = ['l', 'n', 's', 't', 'p', 'e'];

/// Misspells names: sound-alike substitutions, doubled-letter changes, or
/// a keyboard slip.
#[derive(Debug, Clone)]
pub struct TypoNoiser {
    config: TypoConfig,
    keyboard: KeyboardAugmenter,
}

impl TypoNoiser {
    /// # Errors
    ///
    /// Returns a `ValidationError` for an invalid typo chain or keyboard bounds.
    pub fn new(config: TypoConfig, keyboard: KeyboardConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            keyboard: KeyboardAugmenter::new(keyboard)?,
        })
    }

    /// Returns a misspelled, lowercased copy of `name`.
    pub fn typo(&self, name: &str, rng: &mut dyn RngCore) -> String {
        let name = name.to_lowercase();

        for (from, to) in PHONETIC_RULES {
            if draw(rng) < self.config.p_phonetic_replacement && name.contains(from) {
                let replaced = name.replace(from, to);
                if replaced != name {
                    log::trace!("typo {name:?}: rule {from}->{to}");
                    return replaced;
                }
            }
        }

        let p_rem = self.config.p_rem_duplicate_char;
        let p_add = p_rem + self.config.p_add_duplicate_char;
        let p_aug = p_add + self.config.p_random_augment;
        let u = draw(rng);
        let mut chars: Vec<char> = name.chars().collect();

        let doubled = chars
            .windows(2)
            .position(|pair| pair[0] == pair[1] && pair[0].is_alphabetic());
        if let Some(pos) = doubled.filter(|_| u < p_rem) {
            chars.remove(pos);
            return chars.into_iter().collect();
        }
        if u < p_add {
            let mut preference = DOUBLING_PREFERENCE;
            preference.shuffle(rng);
            if let Some(pos) = preference.iter().find_map(|c| chars.iter().position(|x| x == c)) {
                chars.insert(pos, chars[pos]);
            }
            return chars.into_iter().collect();
        }
        if u < p_aug {
            return self.keyboard.augment(&name, rng);
        }
        name
    }
}

impl Noiser<str> for TypoNoiser {
    type Output = String;

    fn noise(&self, value: &str, rng: &mut dyn RngCore) -> String {
        self.typo(value, rng)
    }
}

/// Noises given names (first and middle).
///
/// Branches, in priority order: nickname, canonical form of a nickname,
/// initial, then one draw over `[p_phonetic, +p_variant, +p_typo)` picking a
/// listed variant, a sound-alike corpus name, or a typo.
#[derive(Debug, Clone)]
pub struct FirstNameNoiser {
    config: NameNoiseConfig,
    typo: TypoNoiser,
    variants: Arc<NameVariantMap>,
    nicknames: Arc<NicknameTable>,
    phonetics: Arc<PhoneticIndex>,
}

impl FirstNameNoiser {
    /// # Errors
    ///
    /// Returns a `ValidationError` if the branch chain is invalid.
    pub fn new(
        config: NameNoiseConfig,
        typo: TypoNoiser,
        variants: Arc<NameVariantMap>,
        nicknames: Arc<NicknameTable>,
        phonetics: Arc<PhoneticIndex>,
    ) -> Result<Self, ValidationError> {
        config.validate("given_name")?;
        Ok(Self {
            config,
            typo,
            variants,
            nicknames,
            phonetics,
        })
    }

    fn choose(&self, name: &str, rng: &mut dyn RngCore) -> String {
        let c = &self.config;

        let u = draw(rng);
        if u < c.p_nickname {
            if let Some(nick) = self.nicknames.nicknames_of(name).and_then(|set| pick(set, rng)) {
                log::trace!("first name {name:?}: nickname");
                return nick.to_string();
            }
            if let Some(canon) = self.nicknames.canonicals_of(name).and_then(|set| pick(set, rng)) {
                log::trace!("first name {name:?}: canonical");
                return canon.to_string();
            }
        }

        if draw(rng) < c.p_initial {
            if let Some(first) = name.chars().next() {
                return format!("{}.", first.to_uppercase());
            }
        }

        let u = draw(rng);
        let variant_threshold = c.p_phonetic;
        let phonetic_threshold = variant_threshold + c.p_variant;
        let typo_threshold = phonetic_threshold + c.p_typo;
        if u < variant_threshold {
            if let Some(variant) = self.variants.get(name).and_then(|set| pick(set, rng)) {
                log::trace!("first name {name:?}: variant");
                return variant.to_string();
            }
        }
        if u < phonetic_threshold {
            let sounds_like = self.phonetics.lookup(name);
            let others: BTreeSet<String> =
                sounds_like.into_iter().filter(|n| n != &name.to_lowercase()).collect();
            if let Some(neighbor) = pick(&others, rng) {
                log::trace!("first name {name:?}: phonetic neighbor");
                return neighbor.to_string();
            }
        }
        if u < typo_threshold {
            log::trace!("first name {name:?}: typo");
            return self.typo.typo(name, rng);
        }
        name.to_string()
    }
}

impl Noiser<str> for FirstNameNoiser {
    type Output = String;

    fn noise(&self, value: &str, rng: &mut dyn RngCore) -> String {
        if value.trim().is_empty() {
            return value.to_string();
        }
        make_name(&self.choose(value.trim(), rng))
    }
}

/// Noises family names: a sound-alike surname or a typo, then optional
/// all-caps.
#[derive(Debug, Clone)]
pub struct LastNameNoiser {
    config: NameNoiseConfig,
    typo: TypoNoiser,
    phonetics: Arc<PhoneticIndex>,
}

impl LastNameNoiser {
    /// # Errors
    ///
    /// Returns a `ValidationError` if the branch chain is invalid.
    pub fn new(
        config: NameNoiseConfig,
        typo: TypoNoiser,
        phonetics: Arc<PhoneticIndex>,
    ) -> Result<Self, ValidationError> {
        config.validate("last_name")?;
        Ok(Self {
            config,
            typo,
            phonetics,
        })
    }

    fn choose(&self, name: &str, rng: &mut dyn RngCore) -> String {
        let c = &self.config;
        let u = draw(rng);
        // Surnames the index knows shift the typo threshold past the phonetic
        // branch, even when no other surname sounds alike.
        let typo_threshold = if self.phonetics.contains(name) {
            let lowered = name.to_lowercase();
            let others: BTreeSet<String> = self
                .phonetics
                .lookup(name)
                .into_iter()
                .filter(|n| *n != lowered)
                .collect();
            if u < c.p_phonetic {
                if let Some(neighbor) = pick(&others, rng) {
                    log::trace!("last name {name:?}: phonetic neighbor");
                    return neighbor.to_string();
                }
            }
            c.p_phonetic + c.p_typo
        } else {
            c.p_typo
        };
        if u < typo_threshold {
            log::trace!("last name {name:?}: typo");
            return self.typo.typo(name, rng);
        }
        name.to_string()
    }
}

impl Noiser<str> for LastNameNoiser {
    type Output = String;

    fn noise(&self, value: &str, rng: &mut dyn RngCore) -> String {
        if value.trim().is_empty() {
            return value.to_string();
        }
        let name = make_name(&self.choose(value.trim(), rng));
        if draw(rng) < self.config.p_uppercase {
            name.to_uppercase()
        } else {
            name
        }
    }
}
