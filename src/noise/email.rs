//! Email noiser.

use rand::seq::SliceRandom;
use rand::RngCore;

use super::keyboard::KeyboardAugmenter;
use super::{draw, Noiser};
use crate::config::{EmailNoiseConfig, KeyboardConfig};
use crate::error::ValidationError;

/// Extensions substituted for the original one.
pub const COMMON_EXTENSIONS: [&str; 4] = ["com", "net", "org", "co"];

/// Separator characters, in the order they are looked for.
pub const SEPARATORS: [char; 3] = ['.', '-', '_'];

/// Replaces the first separator found in `text` with a different one.
///
/// Separators are tried in [`SEPARATORS`] order; one that only occurs at the
/// start of `text` is skipped.
pub fn wrong_separator(text: &str, rng: &mut dyn RngCore) -> String {
    for sep in SEPARATORS {
        let Some(idx) = text.find(sep) else {
            continue;
        };
        if idx == 0 {
            continue;
        }
        let others: Vec<char> = SEPARATORS.iter().copied().filter(|s| *s != sep).collect();
        let Some(replacement) = others.choose(rng) else {
            continue;
        };
        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..idx]);
        out.push(*replacement);
        out.push_str(&text[idx + sep.len_utf8()..]);
        return out;
    }
    text.to_string()
}

/// Noises email addresses: local-part typo or separator swap, a different
/// extension, and a separator swap in the domain.
#[derive(Debug, Clone)]
pub struct EmailNoiser {
    config: EmailNoiseConfig,
    keyboard: KeyboardAugmenter,
}

impl EmailNoiser {
    /// # Errors
    ///
    /// Returns a `ValidationError` for invalid probabilities or keyboard bounds.
    pub fn new(config: EmailNoiseConfig, keyboard: KeyboardConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            keyboard: KeyboardAugmenter::new(keyboard)?.without_digits(),
        })
    }
}

impl Noiser<str> for EmailNoiser {
    type Output = String;

    fn noise(&self, value: &str, rng: &mut dyn RngCore) -> String {
        let c = &self.config;
        let Some((local, domain)) = value.split_once('@') else {
            return value.to_string();
        };
        let (mut base, mut extension) = match domain.rsplit_once('.') {
            Some((base, ext)) => (base.to_string(), Some(ext.to_string())),
            None => (domain.to_string(), None),
        };

        let u = draw(rng);
        let local = if u < c.p_localpart_typo {
            self.keyboard.augment(local, rng).replace(' ', "")
        } else if u < c.p_localpart_typo + c.p_wrong_separator {
            wrong_separator(local, rng)
        } else {
            local.to_string()
        };

        if draw(rng) < c.p_extension && extension.is_some() {
            extension = COMMON_EXTENSIONS.choose(rng).map(|ext| (*ext).to_string());
        }

        if draw(rng) < c.p_domain_separator && base.contains(SEPARATORS) {
            base = wrong_separator(&base, rng);
        }

        match extension {
            Some(ext) => format!("{local}@{base}.{ext}"),
            None => format!("{local}@{base}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet() -> EmailNoiseConfig {
        EmailNoiseConfig {
            p_localpart_typo: 0.0,
            p_wrong_separator: 0.0,
            p_extension: 0.0,
            p_domain_separator: 0.0,
        }
    }

    fn noiser(config: EmailNoiseConfig) -> EmailNoiser {
        EmailNoiser::new(config, KeyboardConfig::default()).unwrap()
    }

    #[test]
    fn test_wrong_separator_replaces_first_separator() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..20 {
            let out = wrong_separator("john.doe", &mut rng);
            assert!(out == "john-doe" || out == "john_doe", "{out}");
        }
    }

    #[test]
    fn test_wrong_separator_skips_leading_separator() {
        let mut rng = StdRng::seed_from_u64(8);
        let out = wrong_separator(".john-doe", &mut rng);
        assert!(out.starts_with(".john") && !out.contains('-'), "{out}");
        assert_eq!(wrong_separator("johndoe", &mut rng), "johndoe");
    }

    #[test]
    fn test_quiet_is_identity() {
        let mut rng = StdRng::seed_from_u64(8);
        let n = noiser(quiet());
        assert_eq!(n.noise("john.doe@gmail.com", &mut rng), "john.doe@gmail.com");
        assert_eq!(n.noise("not-an-email", &mut rng), "not-an-email");
    }

    #[test]
    fn test_extension_substitution() {
        let n = noiser(EmailNoiseConfig {
            p_extension: 1.0,
            ..quiet()
        });
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..30 {
            let out = n.noise("john.doe@gmail.com", &mut rng);
            let ext = out.strip_prefix("john.doe@gmail.").unwrap();
            assert!(COMMON_EXTENSIONS.contains(&ext), "{out}");
        }
    }

    #[test]
    fn test_domain_separator() {
        let n = noiser(EmailNoiseConfig {
            p_domain_separator: 1.0,
            ..quiet()
        });
        let mut rng = StdRng::seed_from_u64(8);
        let out = n.noise("rsmith@acme-corp.com", &mut rng);
        assert!(out == "rsmith@acme.corp.com" || out == "rsmith@acme_corp.com", "{out}");
    }

    #[test]
    fn test_localpart_typo_keeps_domain() {
        let n = noiser(EmailNoiseConfig {
            p_localpart_typo: 1.0,
            ..quiet()
        });
        let mut rng = StdRng::seed_from_u64(8);
        let out = n.noise("robert.smith@gmail.com", &mut rng);
        assert!(out.ends_with("@gmail.com"), "{out}");
        assert!(!out.contains(' '));
        assert!(!out.split('@').next().unwrap().chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_localpart_typo_keeps_digits() {
        let n = noiser(EmailNoiseConfig {
            p_localpart_typo: 1.0,
            ..quiet()
        });
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..50 {
            let out = n.noise("jsmith1985@gmail.com", &mut rng);
            let local = out.strip_suffix("@gmail.com").unwrap();
            assert!(local.ends_with("1985"), "{out}");
            assert_eq!(local.len(), "jsmith1985".len(), "{out}");
        }
    }
}
